//! Statement builders for SELECT / INSERT / UPDATE / DELETE.
//!
//! Builders are persistent values: every chain method takes `&self` and
//! returns a structurally-copied builder with exactly one field changed, so
//! a partially built statement can be branched and reused freely. Nothing
//! is shared mutably between the old and new value.
//!
//! `to_sql()` compiles the builder to a [`Statement`] (SQL text plus the
//! ordered parameter list); structural errors (missing FROM, empty
//! insert/update payloads) surface there, synchronously, before any I/O.
//! `execute()` compiles and dispatches a single call to an explicitly
//! injected [`Gateway`](crate::gateway::Gateway).
//!
//! ```ignore
//! let stmt = select()
//!     .from(&posts.table)
//!     .filter(eq(&posts.published, true))
//!     .order_by(desc(&posts.title))
//!     .limit(10)
//!     .to_sql()?;
//! assert_eq!(stmt.sql, "SELECT * FROM \"posts\" WHERE \"published\" = $1 ORDER BY \"title\" DESC LIMIT 10");
//! ```

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::{
    AggregateFn, Direction, JoinKind, OrderExpr, Select, SelectExpr, asc, avg, count, count_all,
    desc, max, min, sum,
};
pub use update::Update;

use crate::schema::Table;
use crate::value::Value;

/// A compiled statement: SQL text plus its ordered parameter list.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Create an unbound SELECT builder; bind a table with `from()`.
pub fn select() -> Select {
    Select::new()
}

/// Create an INSERT builder for the given table.
pub fn insert(table: &Table) -> Insert {
    Insert::new(table)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: &Table) -> Update {
    Update::new(table)
}

/// Create a DELETE builder for the given table.
pub fn delete(table: &Table) -> Delete {
    Delete::new(table)
}
