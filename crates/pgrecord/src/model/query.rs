//! Deferred model query chain.

use crate::condition::Condition;
use crate::error::OrmResult;
use crate::gateway::Gateway;
use crate::model::{Model, Record};
use crate::row::Attrs;
use crate::stmt::{OrderExpr, Select, select};

/// A lazily built SELECT over a model's table.
///
/// Chain methods copy and extend; nothing runs until one of the terminal
/// operations (`all`, `first`, `count`, `exists`) is called with a gateway.
#[derive(Clone, Debug)]
pub struct Query {
    model: Model,
    filters: Vec<Condition>,
    order: Vec<OrderExpr>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Query {
    pub(crate) fn new(model: Model) -> Self {
        Self {
            model,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add one equality condition per supplied attribute.
    pub fn filter(&self, attrs: Attrs) -> Self {
        let mut next = self.clone();
        next.filters.push(self.model.attrs_condition(&attrs));
        next
    }

    /// Add an arbitrary condition node.
    pub fn filter_condition(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.filters.push(condition);
        next
    }

    pub fn order_by(&self, expr: OrderExpr) -> Self {
        let mut next = self.clone();
        next.order.push(expr);
        next
    }

    pub fn limit(&self, n: i64) -> Self {
        let mut next = self.clone();
        next.limit = Some(n);
        next
    }

    pub fn offset(&self, n: i64) -> Self {
        let mut next = self.clone();
        next.offset = Some(n);
        next
    }

    /// The filtered SELECT shape shared by row and count terminals.
    fn filtered(&self) -> Select {
        let mut stmt = select().from(self.model.table());
        for condition in &self.filters {
            stmt = stmt.filter(condition.clone());
        }
        stmt
    }

    fn to_select(&self) -> Select {
        let mut stmt = self.filtered();
        for expr in &self.order {
            stmt = stmt.order_by(expr.clone());
        }
        if let Some(n) = self.limit {
            stmt = stmt.limit(n);
        }
        if let Some(n) = self.offset {
            stmt = stmt.offset(n);
        }
        stmt
    }

    /// Run the query and hydrate every row.
    pub async fn all(&self, gateway: &impl Gateway) -> OrmResult<Vec<Record>> {
        let rows = self.to_select().execute(gateway).await?;
        Ok(rows
            .iter()
            .map(|row| Record::hydrated(self.model.clone(), row))
            .collect())
    }

    /// Run the query limited to one row.
    pub async fn first(&self, gateway: &impl Gateway) -> OrmResult<Option<Record>> {
        let rows = self.limit(1).to_select().execute(gateway).await?;
        Ok(rows
            .first()
            .map(|row| Record::hydrated(self.model.clone(), row)))
    }

    /// SELECT COUNT(*) with this query's filters. Ordering and paging do not
    /// apply to the aggregate.
    pub async fn count(&self, gateway: &impl Gateway) -> OrmResult<i64> {
        self.model.run_count(self.filtered(), gateway).await
    }

    /// Whether any row matches.
    pub async fn exists(&self, gateway: &impl Gateway) -> OrmResult<bool> {
        Ok(self.count(gateway).await? > 0)
    }
}
