//! INSERT builder.

use crate::error::{OrmError, OrmResult};
use crate::gateway::Gateway;
use crate::ident;
use crate::row::{Attrs, Row};
use crate::schema::Table;
use crate::stmt::Statement;

/// Persistent INSERT builder.
///
/// The column list derives from the first value row; every further row must
/// carry exactly the same key set, enforced at `to_sql()` time. Value order
/// within later rows does not matter since values are looked up by key.
#[derive(Clone, Debug)]
pub struct Insert {
    table: Table,
    rows: Vec<Attrs>,
    returning: bool,
}

impl Insert {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            rows: Vec::new(),
            returning: false,
        }
    }

    /// Append one value row.
    pub fn values(&self, row: Attrs) -> Self {
        let mut next = self.clone();
        next.rows.push(row);
        next
    }

    /// Append several value rows.
    pub fn values_many(&self, rows: impl IntoIterator<Item = Attrs>) -> Self {
        let mut next = self.clone();
        next.rows.extend(rows);
        next
    }

    /// Request `RETURNING *`.
    pub fn returning(&self) -> Self {
        let mut next = self.clone();
        next.returning = true;
        next
    }

    /// Compile to SQL and parameters.
    ///
    /// Zero rows, or a first row carrying no columns, fail with
    /// [`OrmError::NoValuesToInsert`] before any SQL is assembled.
    pub fn to_sql(&self) -> OrmResult<Statement> {
        let first = self
            .rows
            .first()
            .ok_or_else(|| OrmError::NoValuesToInsert(self.table.name().to_string()))?;
        if first.is_empty() {
            return Err(OrmError::NoValuesToInsert(self.table.name().to_string()));
        }

        let keys: Vec<&str> = first.keys().collect();
        for (i, row) in self.rows.iter().enumerate().skip(1) {
            let matches = row.len() == keys.len() && keys.iter().all(|k| row.contains(k));
            if !matches {
                return Err(OrmError::validation(format!(
                    "insert row {i} does not share the first row's column set"
                )));
            }
        }

        let columns: Vec<String> = keys
            .iter()
            .map(|k| ident::quote(self.table.resolve(k)))
            .collect();

        let mut params = Vec::with_capacity(keys.len() * self.rows.len());
        let mut groups = Vec::with_capacity(self.rows.len());
        let mut index = 1usize;
        for row in &self.rows {
            let mut placeholders = Vec::with_capacity(keys.len());
            for key in &keys {
                let value = row.get(key).cloned().unwrap_or(crate::value::Value::Null);
                params.push(value);
                placeholders.push(format!("${index}"));
                index += 1;
            }
            groups.push(format!("({})", placeholders.join(", ")));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            ident::quote(self.table.name()),
            columns.join(", "),
            groups.join(", ")
        );
        if self.returning {
            sql.push_str(" RETURNING *");
        }

        Ok(Statement { sql, params })
    }

    /// Compile and run against the gateway.
    ///
    /// With `returning()`, dispatches `execute_returning` and yields the
    /// returned rows; otherwise dispatches `execute` and yields an empty
    /// sequence.
    pub async fn execute(&self, gateway: &impl Gateway) -> OrmResult<Vec<Row>> {
        let stmt = self.to_sql()?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "executing insert");
        if self.returning {
            gateway.execute_returning(&stmt.sql, &stmt.params).await
        } else {
            gateway.execute(&stmt.sql, &stmt.params).await?;
            Ok(Vec::new())
        }
    }
}
