//! Record-oriented layer on top of the statement builders.
//!
//! [`model`] discovers a table's sole primary-key column once, up front, and
//! the resulting [`Model`] exposes ActiveRecord-style verbs. Every verb takes
//! the gateway explicitly and issues at most one gateway call; nothing is
//! cached between calls.
//!
//! ```ignore
//! let posts = model(&schema.table)?;
//! let post = posts.create(attrs! { "title" => "Hello" }, &client).await?;
//! let found = posts.find(post.pk_value()?, &client).await?;
//! ```

mod query;
mod record;

pub use query::Query;
pub use record::Record;

use crate::condition::{Condition, and, eq};
use crate::error::{OrmError, OrmResult};
use crate::gateway::Gateway;
use crate::row::Attrs;
use crate::schema::{Column, Table};
use crate::stmt::{count_all, insert, select};
use crate::value::Value;

/// A table bound to its primary-key column.
#[derive(Clone, Debug)]
pub struct Model {
    table: Table,
    pk: Column,
}

/// Bind a model to a table.
///
/// Fails with [`OrmError::NoPrimaryKey`] when the table declares zero or
/// multiple primary-key columns, before any statement is built.
pub fn model(table: &Table) -> OrmResult<Model> {
    let pk = table.primary_key()?;
    Ok(Model {
        table: table.clone(),
        pk,
    })
}

/// One equality condition per supplied attribute, ANDed together.
fn attrs_condition(table: &Table, attrs: &Attrs) -> Condition {
    let conditions: Vec<Condition> = attrs
        .iter()
        .map(|(name, value)| eq(&table.column_ref(name), value.clone()))
        .collect();
    if conditions.len() == 1 {
        conditions.into_iter().next().unwrap_or(and(Vec::new()))
    } else {
        and(conditions)
    }
}

impl Model {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn primary_key(&self) -> &Column {
        &self.pk
    }

    /// Fetch by primary key. Zero rows is `Ok(None)`, not a failure.
    pub async fn find(
        &self,
        id: impl Into<Value>,
        gateway: &impl Gateway,
    ) -> OrmResult<Option<Record>> {
        let rows = select()
            .from(&self.table)
            .filter(eq(&self.pk, id))
            .limit(1)
            .execute(gateway)
            .await?;
        Ok(rows.first().map(|row| Record::hydrated(self.clone(), row)))
    }

    /// Fetch the first row matching every supplied attribute.
    pub async fn find_by(&self, attrs: Attrs, gateway: &impl Gateway) -> OrmResult<Option<Record>> {
        let rows = select()
            .from(&self.table)
            .filter(attrs_condition(&self.table, &attrs))
            .limit(1)
            .execute(gateway)
            .await?;
        Ok(rows.first().map(|row| Record::hydrated(self.clone(), row)))
    }

    /// Start a deferred query filtered by attribute equality.
    pub fn filter(&self, attrs: Attrs) -> Query {
        self.query().filter(attrs)
    }

    /// Start an unfiltered deferred query.
    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    /// Fetch every row.
    pub async fn all(&self, gateway: &impl Gateway) -> OrmResult<Vec<Record>> {
        self.query().all(gateway).await
    }

    /// Insert one row and hydrate the returned record.
    pub async fn create(&self, attrs: Attrs, gateway: &impl Gateway) -> OrmResult<Record> {
        let rows = insert(&self.table)
            .values(attrs)
            .returning()
            .execute(gateway)
            .await?;
        match rows.first() {
            Some(row) => Ok(Record::hydrated(self.clone(), row)),
            None => Err(OrmError::InsertFailed(self.table.name().to_string())),
        }
    }

    /// Count all rows.
    pub async fn count(&self, gateway: &impl Gateway) -> OrmResult<i64> {
        self.query().count(gateway).await
    }

    /// Whether any row exists.
    pub async fn exists(&self, gateway: &impl Gateway) -> OrmResult<bool> {
        self.query().exists(gateway).await
    }

    /// Construct an unpersisted record without touching the gateway.
    pub fn build(&self, attrs: Attrs) -> Record {
        Record::fresh(self.clone(), attrs)
    }

    pub(crate) fn attrs_condition(&self, attrs: &Attrs) -> Condition {
        attrs_condition(&self.table, attrs)
    }

    /// SELECT COUNT(*) over the given query shape, reading the aliased
    /// `count` column of the single result row.
    pub(crate) async fn run_count(
        &self,
        base: crate::stmt::Select,
        gateway: &impl Gateway,
    ) -> OrmResult<i64> {
        let rows = base.add_column(count_all()).execute(gateway).await?;
        rows.first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .ok_or_else(|| OrmError::decode("count", "aggregate row missing integer count"))
    }
}

#[cfg(test)]
mod tests;
