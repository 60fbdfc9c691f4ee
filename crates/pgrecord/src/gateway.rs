//! Execution gateway.
//!
//! Builders and models never hold a connection. Every `execute` takes the
//! gateway explicitly, so the same statement value can run against a pooled
//! client, a transaction, or a test double.

use tokio_postgres::types::{ToSql, Type};

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;

/// Anything that can run a compiled statement.
///
/// `query` returns result rows, `execute` returns the affected-row count,
/// and `execute_returning` runs a statement carrying a `RETURNING` clause
/// and yields the returned rows.
pub trait Gateway: Send + Sync {
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    fn execute_returning(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;
}

impl<G: Gateway> Gateway for &G {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        (*self).query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        (*self).execute(sql, params).await
    }

    async fn execute_returning(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        (*self).execute_returning(sql, params).await
    }
}

fn sql_params(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Decode one wire row into an owned [`Row`].
///
/// Unknown column types are an error rather than a silent `Null`, so schema
/// drift surfaces at the call that hit it.
pub fn decode_row(row: &tokio_postgres::Row) -> OrmResult<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_value(row, idx, column.type_())
            .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
        out.push(column.name(), value);
    }
    Ok(out)
}

fn decode_value(
    row: &tokio_postgres::Row,
    idx: usize,
    ty: &Type,
) -> Result<Value, tokio_postgres::Error> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?
            .map(|v| Value::Int(v as i64))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?
            .map(|v| Value::Int(v as i64))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Float(v as f64))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Float)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
    } else if *ty == Type::UUID {
        row.try_get::<_, Option<uuid::Uuid>>(idx)?.map(Value::Uuid)
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(Value::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
            .map(|v| Value::Timestamp(v.and_utc()))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(idx)?.map(Value::Date)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<serde_json::Value>>(idx)?.map(Value::Json)
    } else {
        return row
            .try_get::<_, Option<String>>(idx)
            .map(|v| v.map(Value::Text).unwrap_or(Value::Null));
    };
    Ok(value.unwrap_or(Value::Null))
}

macro_rules! impl_pg_gateway {
    ($client:ty) => {
        impl Gateway for $client {
            async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
                let params = sql_params(params);
                let rows = <$client>::query(self, sql, &params).await?;
                rows.iter().map(decode_row).collect()
            }

            async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
                let params = sql_params(params);
                Ok(<$client>::execute(self, sql, &params).await?)
            }

            async fn execute_returning(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
                Gateway::query(self, sql, params).await
            }
        }
    };
}

impl_pg_gateway!(tokio_postgres::Client);
impl_pg_gateway!(tokio_postgres::Transaction<'_>);
