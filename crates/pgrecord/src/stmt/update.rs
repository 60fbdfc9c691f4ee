//! UPDATE builder.

use crate::condition::{Condition, and};
use crate::error::{OrmError, OrmResult};
use crate::gateway::Gateway;
use crate::ident;
use crate::row::{Attrs, Row};
use crate::schema::Table;
use crate::stmt::Statement;
use crate::value::Value;

/// Persistent UPDATE builder.
#[derive(Clone, Debug)]
pub struct Update {
    table: Table,
    assignments: Attrs,
    filter: Option<Condition>,
    returning: bool,
}

impl Update {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: Attrs::new(),
            filter: None,
            returning: false,
        }
    }

    /// Assign one column. Assignments render in insertion order.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.assignments.put(name, value);
        next
    }

    /// Merge a whole attribute map into the assignment set.
    pub fn set_many(&self, attrs: Attrs) -> Self {
        let mut next = self.clone();
        for (name, value) in attrs.iter() {
            next.assignments.put(name, value.clone());
        }
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

    /// Request `RETURNING *`.
    pub fn returning(&self) -> Self {
        let mut next = self.clone();
        next.returning = true;
        next
    }

    /// Compile to SQL and parameters. The SET clause consumes placeholders
    /// first; a WHERE clause continues the same numbering.
    pub fn to_sql(&self) -> OrmResult<Statement> {
        if self.assignments.is_empty() {
            return Err(OrmError::NoColumnsToUpdate(self.table.name().to_string()));
        }

        let mut params = Vec::with_capacity(self.assignments.len());
        let mut sets = Vec::with_capacity(self.assignments.len());
        let mut index = 1usize;
        for (name, value) in self.assignments.iter() {
            sets.push(format!(
                "{} = ${index}",
                ident::quote(self.table.resolve(name))
            ));
            params.push(value.clone());
            index += 1;
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            ident::quote(self.table.name()),
            sets.join(", ")
        );

        if let Some(condition) = &self.filter {
            let compiled = condition.compile(index);
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
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "executing update");
        if self.returning {
            gateway.execute_returning(&stmt.sql, &stmt.params).await
        } else {
            gateway.execute(&stmt.sql, &stmt.params).await?;
            Ok(Vec::new())
        }
    }
}
