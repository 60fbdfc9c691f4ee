//! DELETE builder.

use crate::condition::{Condition, and};
use crate::error::OrmResult;
use crate::gateway::Gateway;
use crate::ident;
use crate::row::Row;
use crate::schema::Table;
use crate::stmt::Statement;

/// Persistent DELETE builder.
#[derive(Clone, Debug)]
pub struct Delete {
    table: Table,
    filter: Option<Condition>,
    returning: bool,
}

impl Delete {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            filter: None,
            returning: false,
        }
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

    /// Request `RETURNING *`.
    pub fn returning(&self) -> Self {
        let mut next = self.clone();
        next.returning = true;
        next
    }

    /// Compile to SQL and parameters.
    pub fn to_sql(&self) -> OrmResult<Statement> {
        let mut sql = format!("DELETE FROM {}", ident::quote(self.table.name()));
        let mut params = Vec::new();

        if let Some(condition) = &self.filter {
            let compiled = condition.compile(1);
            params.extend(compiled.params);
            sql.push_str(" WHERE ");
            sql.push_str(&compiled.sql);
        }

        if self.returning {
            sql.push_str(" RETURNING *");
        }

        Ok(Statement { sql, params })
    }

    /// Compile and run against the gateway. See [`Insert::execute`] for the
    /// returning/non-returning dispatch.
    ///
    /// [`Insert::execute`]: crate::stmt::Insert::execute
    pub async fn execute(&self, gateway: &impl Gateway) -> OrmResult<Vec<Row>> {
        let stmt = self.to_sql()?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "executing delete");
        if self.returning {
            gateway.execute_returning(&stmt.sql, &stmt.params).await
        } else {
            gateway.execute(&stmt.sql, &stmt.params).await?;
            Ok(Vec::new())
        }
    }
}
