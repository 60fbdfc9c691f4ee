//! SELECT builder and its clause compiler.

use crate::condition::{Condition, and};
use crate::error::{OrmError, OrmResult};
use crate::gateway::Gateway;
use crate::ident;
use crate::row::Row;
use crate::schema::{Column, Table};
use crate::stmt::Statement;

/// Aggregate function for a select item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    fn as_sql(self) -> &'static str {
        match self {
            AggregateFn::Count => "COUNT",
            AggregateFn::Sum => "SUM",
            AggregateFn::Avg => "AVG",
            AggregateFn::Min => "MIN",
            AggregateFn::Max => "MAX",
        }
    }

    fn default_alias(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }
}

/// One entry of an explicit selection list.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectExpr {
    /// A plain column, rendered `"physical" AS "alias"`.
    Column { column: Column, alias: String },
    /// An aggregate, rendered `FN("physical") AS "alias"` or `FN(*) AS "alias"`.
    Aggregate {
        func: AggregateFn,
        column: Option<Column>,
        alias: String,
    },
}

impl SelectExpr {
    /// Return the same expression under a different alias.
    pub fn alias(&self, alias: &str) -> Self {
        match self {
            SelectExpr::Column { column, .. } => SelectExpr::Column {
                column: column.clone(),
                alias: alias.to_string(),
            },
            SelectExpr::Aggregate { func, column, .. } => SelectExpr::Aggregate {
                func: *func,
                column: column.clone(),
                alias: alias.to_string(),
            },
        }
    }

    fn render(&self) -> String {
        match self {
            SelectExpr::Column { column, alias } => {
                format!("{} AS {}", column.quoted(), ident::quote(alias))
            }
            SelectExpr::Aggregate {
                func,
                column,
                alias,
            } => {
                let target = match column {
                    Some(c) => c.quoted(),
                    None => "*".to_string(),
                };
                format!("{}({}) AS {}", func.as_sql(), target, ident::quote(alias))
            }
        }
    }
}

impl From<&Column> for SelectExpr {
    fn from(column: &Column) -> Self {
        SelectExpr::Column {
            column: column.clone(),
            alias: column.logical().to_string(),
        }
    }
}

impl From<Column> for SelectExpr {
    fn from(column: Column) -> Self {
        SelectExpr::from(&column)
    }
}

fn aggregate(func: AggregateFn, column: Option<&Column>) -> SelectExpr {
    SelectExpr::Aggregate {
        func,
        column: column.cloned(),
        alias: func.default_alias().to_string(),
    }
}

/// COUNT(*) AS "count"
pub fn count_all() -> SelectExpr {
    aggregate(AggregateFn::Count, None)
}

/// COUNT(column) AS "count"
pub fn count(column: &Column) -> SelectExpr {
    aggregate(AggregateFn::Count, Some(column))
}

/// SUM(column) AS "sum"
pub fn sum(column: &Column) -> SelectExpr {
    aggregate(AggregateFn::Sum, Some(column))
}

/// AVG(column) AS "avg"
pub fn avg(column: &Column) -> SelectExpr {
    aggregate(AggregateFn::Avg, Some(column))
}

/// MIN(column) AS "min"
pub fn min(column: &Column) -> SelectExpr {
    aggregate(AggregateFn::Min, Some(column))
}

/// MAX(column) AS "max"
pub fn max(column: &Column) -> SelectExpr {
    aggregate(AggregateFn::Max, Some(column))
}

/// Sort direction for an ORDER BY entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderExpr {
    column: Column,
    direction: Direction,
}

/// Order ascending by a column.
pub fn asc(column: &Column) -> OrderExpr {
    OrderExpr {
        column: column.clone(),
        direction: Direction::Asc,
    }
}

/// Order descending by a column.
pub fn desc(column: &Column) -> OrderExpr {
    OrderExpr {
        column: column.clone(),
        direction: Direction::Desc,
    }
}

/// Join flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Clone, Debug)]
struct Join {
    kind: JoinKind,
    table: Table,
    on: Condition,
}

/// Persistent SELECT builder.
#[derive(Clone, Debug, Default)]
pub struct Select {
    from: Option<Table>,
    selection: Vec<SelectExpr>,
    joins: Vec<Join>,
    filter: Option<Condition>,
    group_by: Vec<Column>,
    order_by: Vec<OrderExpr>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the FROM table.
    pub fn from(&self, table: &Table) -> Self {
        let mut next = self.clone();
        next.from = Some(table.clone());
        next
    }

    /// Replace the selection list. An empty builder selects `*`.
    pub fn columns<I, T>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SelectExpr>,
    {
        let mut next = self.clone();
        next.selection = items.into_iter().map(Into::into).collect();
        next
    }

    /// Append one selection entry.
    pub fn add_column(&self, item: impl Into<SelectExpr>) -> Self {
        let mut next = self.clone();
        next.selection.push(item.into());
        next
    }

    /// Add a WHERE condition. Repeated calls AND-combine.
    pub fn filter(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.filter = Some(match next.filter.take() {
            Some(existing) => and(vec![existing, condition]),
            None => condition,
        });
        next
    }

    pub fn inner_join(&self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(&self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(&self, table: &Table, on: Condition) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    fn join(&self, kind: JoinKind, table: &Table, on: Condition) -> Self {
        let mut next = self.clone();
        next.joins.push(Join {
            kind,
            table: table.clone(),
            on,
        });
        next
    }

    /// Append an ORDER BY entry.
    pub fn order_by(&self, expr: OrderExpr) -> Self {
        let mut next = self.clone();
        next.order_by.push(expr);
        next
    }

    /// Append a GROUP BY column.
    pub fn group_by(&self, column: &Column) -> Self {
        let mut next = self.clone();
        next.group_by.push(column.clone());
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

    /// Compile to SQL and parameters.
    ///
    /// Clause order: SELECT, FROM, JOINs (each ON compiled with the running
    /// parameter index), WHERE, GROUP BY, ORDER BY, LIMIT, OFFSET.
    pub fn to_sql(&self) -> OrmResult<Statement> {
        let table = self.from.as_ref().ok_or(OrmError::MissingFromClause)?;

        let mut sql = String::from("SELECT ");
        if self.selection.is_empty() {
            sql.push('*');
        } else {
            let items: Vec<String> = self.selection.iter().map(SelectExpr::render).collect();
            sql.push_str(&items.join(", "));
        }
        sql.push_str(" FROM ");
        ident::quote_into(&mut sql, table.name());

        let mut params = Vec::new();
        let mut index = 1usize;

        for join in &self.joins {
            let on = join.on.compile(index);
            index = on.next_index;
            params.extend(on.params);
            sql.push(' ');
            sql.push_str(join.kind.as_sql());
            sql.push(' ');
            ident::quote_into(&mut sql, join.table.name());
            sql.push_str(" ON ");
            sql.push_str(&on.sql);
        }

        if let Some(condition) = &self.filter {
            let compiled = condition.compile(index);
            params.extend(compiled.params);
            sql.push_str(" WHERE ");
            sql.push_str(&compiled.sql);
        }

        if !self.group_by.is_empty() {
            let cols: Vec<String> = self.group_by.iter().map(Column::quoted).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&cols.join(", "));
        }

        if !self.order_by.is_empty() {
            let entries: Vec<String> = self
                .order_by
                .iter()
                .map(|o| format!("{} {}", o.column.quoted(), o.direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&entries.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(Statement { sql, params })
    }

    /// Compile and run against the gateway, returning all rows.
    pub async fn execute(&self, gateway: &impl Gateway) -> OrmResult<Vec<Row>> {
        let stmt = self.to_sql()?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "executing select");
        gateway.query(&stmt.sql, &stmt.params).await
    }
}
