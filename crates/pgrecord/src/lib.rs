//! # pgrecord
//!
//! A schema-driven SQL statement builder with an ActiveRecord-style record
//! layer for Postgres.
//!
//! ## Features
//!
//! - **Declarative schema**: tables and columns are plain values built from
//!   per-type constructors and fluent modifiers
//! - **Persistent builders**: every chain method returns a new builder, so
//!   partially built statements can be branched and reused
//! - **Positional parameters**: conditions compile to `$1..$n` placeholders
//!   with a single index threaded through arbitrary nesting
//! - **Explicit execution**: statements run against an injected [`Gateway`];
//!   nothing is resolved from ambient state, and a fake gateway makes the
//!   whole stack testable without a database
//! - **Record layer**: `model(table)` gives find/create/save/destroy verbs
//!   over hydrated attribute maps
//!
//! ## Building statements
//!
//! ```ignore
//! use pgrecord::{eq, desc, select, table};
//!
//! pgrecord::table! {
//!     pub struct Posts => "posts" {
//!         id: uuid().primary_key(),
//!         title: text().not_null(),
//!         published: boolean().default_value(false),
//!     }
//! }
//!
//! let posts = Posts::new();
//! let stmt = select()
//!     .from(&posts.table)
//!     .filter(eq(&posts.published, true))
//!     .order_by(desc(&posts.title))
//!     .limit(10)
//!     .to_sql()?;
//!
//! let rows = select()
//!     .from(&posts.table)
//!     .execute(&client)
//!     .await?;
//! ```
//!
//! ## Records
//!
//! ```ignore
//! use pgrecord::{attrs, model};
//!
//! let m = model(&posts.table)?;
//! let post = m.create(attrs! { "title" => "Hello" }, &client).await?;
//! let mut post = m.find(post.pk_value()?, &client).await?.unwrap();
//! post.set("published", true);
//! post.save(&client).await?;
//! ```

pub mod condition;
pub mod error;
pub mod gateway;
mod ident;
pub mod model;
pub mod row;
pub mod schema;
pub mod stmt;
pub mod value;

pub use condition::{
    CompareOp, Compiled, Condition, and, between, eq, eq_col, gt, gte, ilike, in_array, is_not_null,
    is_null, like, lt, lte, ne, not, not_in_array, or,
};
pub use error::{OrmError, OrmResult};
pub use gateway::{Gateway, decode_row};
pub use model::{Model, Query, Record, model};
pub use row::{Attrs, Row};
pub use schema::{
    Column, ColumnDef, DefaultValue, ForeignKey, SqlType, Table, bigint, boolean, date,
    double_precision, integer, json, jsonb, numeric, real, serial, table, text, timestamp, uuid,
    varchar,
};
pub use stmt::{
    AggregateFn, Delete, Direction, Insert, JoinKind, OrderExpr, Select, SelectExpr, Statement,
    Update, asc, avg, count, count_all, delete, desc, insert, max, min, select, sum, update,
};
pub use value::Value;
