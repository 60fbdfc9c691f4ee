use std::collections::VecDeque;
use std::sync::Mutex;

use crate::attrs;
use crate::error::OrmError;
use crate::gateway::Gateway;
use crate::model::model;
use crate::row::Row;
use crate::schema::{boolean, table, text, uuid};
use crate::stmt::desc;
use crate::value::Value;

crate::table! {
    struct Posts => "posts" {
        id: uuid().primary_key(),
        title: text().not_null(),
        published: boolean().default_value(false),
    }
}

/// Canned-response gateway that records every dispatched statement.
struct FakeGateway {
    responses: Mutex<VecDeque<Vec<Row>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeGateway {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn respond_with(self, rows: Vec<Row>) -> Self {
        self.responses.lock().unwrap().push_back(rows);
        self
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Vec<Row> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.responses.lock().unwrap().pop_front().unwrap_or_default()
    }
}

impl Gateway for FakeGateway {
    async fn query(&self, sql: &str, params: &[Value]) -> crate::error::OrmResult<Vec<Row>> {
        Ok(self.record(sql, params))
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> crate::error::OrmResult<u64> {
        Ok(self.record(sql, params).len() as u64)
    }

    async fn execute_returning(
        &self,
        sql: &str,
        params: &[Value],
    ) -> crate::error::OrmResult<Vec<Row>> {
        Ok(self.record(sql, params))
    }
}

fn post_row(id: &str, title: &str, published: bool) -> Row {
    Row::new()
        .with("id", id)
        .with("title", title)
        .with("published", published)
}

#[test]
fn model_requires_exactly_one_primary_key() {
    let none = table("logs", vec![("message", text())]);
    assert!(matches!(model(&none), Err(OrmError::NoPrimaryKey(_))));

    let several = table(
        "join_table",
        vec![("a", uuid().primary_key()), ("b", uuid().primary_key())],
    );
    assert!(matches!(model(&several), Err(OrmError::NoPrimaryKey(_))));
}

#[tokio::test]
async fn find_hydrates_the_matching_row() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![post_row("p1", "Hello", true)]);

    let found = m.find("p1", &gw).await.unwrap().unwrap();
    assert!(found.is_persisted());
    assert_eq!(found.get("title"), Some(&Value::Text("Hello".to_string())));

    let calls = gw.calls();
    assert_eq!(
        calls[0].0,
        "SELECT * FROM \"posts\" WHERE \"id\" = $1 LIMIT 1"
    );
    assert_eq!(calls[0].1, vec![Value::Text("p1".to_string())]);
}

#[tokio::test]
async fn find_missing_resolves_to_none() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();
    assert!(m.find("nonexistent-id", &gw).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_ands_attribute_equalities() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();

    let _ = m
        .find_by(attrs! { "title" => "Hello", "published" => true }, &gw)
        .await
        .unwrap();
    assert_eq!(
        gw.calls()[0].0,
        "SELECT * FROM \"posts\" WHERE (\"title\" = $1 AND \"published\" = $2) LIMIT 1"
    );
}

#[tokio::test]
async fn create_hydrates_the_returned_row() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![post_row("p9", "Hello", false)]);

    let created = m.create(attrs! { "title" => "Hello" }, &gw).await.unwrap();
    assert!(created.is_persisted());
    assert_eq!(created.get("id"), Some(&Value::Text("p9".to_string())));
    assert_eq!(
        gw.calls()[0].0,
        "INSERT INTO \"posts\" (\"title\") VALUES ($1) RETURNING *"
    );
}

#[tokio::test]
async fn create_with_zero_returned_rows_fails() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();
    let result = m.create(attrs! { "title" => "x" }, &gw).await;
    assert!(matches!(result, Err(OrmError::InsertFailed(t)) if t == "posts"));
}

#[tokio::test]
async fn query_chain_composes_order_and_paging() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();

    let _ = m
        .filter(attrs! { "published" => true })
        .order_by(desc(&posts.title))
        .limit(10)
        .offset(20)
        .all(&gw)
        .await
        .unwrap();
    assert_eq!(
        gw.calls()[0].0,
        "SELECT * FROM \"posts\" WHERE \"published\" = $1 ORDER BY \"title\" DESC LIMIT 10 OFFSET 20"
    );
}

#[tokio::test]
async fn query_chain_is_immutable() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();

    let base = m.filter(attrs! { "published" => true });
    let _branched = base.limit(1).order_by(desc(&posts.title));
    let _ = base.all(&gw).await.unwrap();
    assert_eq!(
        gw.calls()[0].0,
        "SELECT * FROM \"posts\" WHERE \"published\" = $1"
    );
}

#[tokio::test]
async fn count_reads_the_aggregate_row() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![Row::new().with("count", 3i64)]);

    let n = m
        .filter(attrs! { "published" => true })
        .count(&gw)
        .await
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(
        gw.calls()[0].0,
        "SELECT COUNT(*) AS \"count\" FROM \"posts\" WHERE \"published\" = $1"
    );
}

#[tokio::test]
async fn count_ignores_order_and_paging() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![Row::new().with("count", 0i64)]);

    let _ = m
        .query()
        .order_by(desc(&posts.title))
        .limit(5)
        .count(&gw)
        .await
        .unwrap();
    assert_eq!(gw.calls()[0].0, "SELECT COUNT(*) AS \"count\" FROM \"posts\"");
}

#[tokio::test]
async fn exists_is_count_greater_than_zero() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();

    let gw = FakeGateway::new().respond_with(vec![Row::new().with("count", 1i64)]);
    assert!(m.exists(&gw).await.unwrap());

    let gw = FakeGateway::new().respond_with(vec![Row::new().with("count", 0i64)]);
    assert!(!m.exists(&gw).await.unwrap());
}

#[tokio::test]
async fn build_then_save_inserts_and_flips_persisted() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![post_row("p2", "Draft", false)]);

    let mut record = m.build(attrs! { "title" => "Draft" });
    assert!(!record.is_persisted());

    record.save(&gw).await.unwrap();
    assert!(record.is_persisted());
    assert_eq!(record.get("id"), Some(&Value::Text("p2".to_string())));
    assert_eq!(
        gw.calls()[0].0,
        "INSERT INTO \"posts\" (\"title\") VALUES ($1) RETURNING *"
    );
}

#[tokio::test]
async fn save_on_persisted_updates_without_the_primary_key() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new()
        .respond_with(vec![post_row("p1", "Hello", false)])
        .respond_with(vec![post_row("p1", "Hello", true)]);

    let mut record = m.find("p1", &gw).await.unwrap().unwrap();
    record.set("published", true);
    record.save(&gw).await.unwrap();

    let calls = gw.calls();
    assert_eq!(
        calls[1].0,
        "UPDATE \"posts\" SET \"title\" = $1, \"published\" = $2 WHERE \"id\" = $3 RETURNING *"
    );
    assert_eq!(
        calls[1].1,
        vec![
            Value::Text("Hello".to_string()),
            Value::Bool(true),
            Value::Text("p1".to_string()),
        ]
    );
    assert_eq!(record.get("published"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn instance_update_replaces_attributes() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new()
        .respond_with(vec![post_row("p1", "Old", false)])
        .respond_with(vec![post_row("p1", "New", false)]);

    let mut record = m.find("p1", &gw).await.unwrap().unwrap();
    record.update(attrs! { "title" => "New" }, &gw).await.unwrap();
    assert_eq!(record.get("title"), Some(&Value::Text("New".to_string())));
    assert_eq!(
        gw.calls()[1].0,
        "UPDATE \"posts\" SET \"title\" = $1 WHERE \"id\" = $2 RETURNING *"
    );
}

#[tokio::test]
async fn destroy_flips_persisted_off() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![post_row("p1", "Hello", false)]);

    let mut record = m.find("p1", &gw).await.unwrap().unwrap();
    record.destroy(&gw).await.unwrap();
    assert!(!record.is_persisted());
    assert_eq!(gw.calls()[1].0, "DELETE FROM \"posts\" WHERE \"id\" = $1");
}

#[tokio::test]
async fn reload_with_zero_rows_is_record_not_found() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new().respond_with(vec![post_row("p1", "Hello", false)]);

    let mut record = m.find("p1", &gw).await.unwrap().unwrap();
    let err = record.reload(&gw).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn missing_pk_value_fails_before_any_gateway_call() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let gw = FakeGateway::new();

    let mut record = m.build(attrs! { "title" => "no id yet" });
    let err = record.destroy(&gw).await.unwrap_err();
    assert!(matches!(err, OrmError::NoPrimaryKey(_)));
    assert!(gw.calls().is_empty());
}

#[tokio::test]
async fn create_then_find_round_trips_attributes() {
    let posts = Posts::new();
    let m = model(&posts.table).unwrap();
    let row = post_row("p7", "Round trip", true);
    let gw = FakeGateway::new()
        .respond_with(vec![row.clone()])
        .respond_with(vec![row]);

    let created = m.create(attrs! { "title" => "Round trip" }, &gw).await.unwrap();
    let id = created.pk_value().unwrap();
    let found = m.find(id, &gw).await.unwrap().unwrap();
    assert_eq!(found.attributes(), created.attributes());
}
