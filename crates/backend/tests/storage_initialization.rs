mod common;

use backend::shared::config::DatabaseConfig;
use backend::shared::data::db;
use backend::shared::schema::ModelSchemas;
use common::{github, octocat};
use sea_orm::{ConnectionTrait, SqlxSqliteConnector, Statement};
use std::time::Duration;

async fn count_objects<C: ConnectionTrait>(conn: &C, kind: &str) -> i64 {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            conn.get_database_backend(),
            "SELECT COUNT(*) AS cnt FROM sqlite_master WHERE type = ? AND name LIKE 'a00%'",
            [kind.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "cnt").unwrap()
}

#[tokio::test]
async fn initializing_twice_is_idempotent() {
    let conn = db::connect(&DatabaseConfig::in_memory()).await.unwrap();

    let first = db::initialize_storage(conn.clone()).await.unwrap();
    let source = github(&first).await;
    first.add_contributor(octocat(&source)).await.unwrap();

    let second = db::initialize_storage(conn.clone()).await.unwrap();

    assert_eq!(first.schemas().len(), second.schemas().len());
    assert_eq!(
        serde_json::to_value(first.schemas()).unwrap(),
        serde_json::to_value(second.schemas()).unwrap()
    );
    assert_eq!(count_objects(&conn, "table").await, 2);
    assert_eq!(second.retrieve_all_contributors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn creates_lookup_index() {
    let conn = db::connect(&DatabaseConfig::in_memory()).await.unwrap();
    db::initialize_storage(conn.clone()).await.unwrap();

    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "SELECT COUNT(*) AS cnt FROM sqlite_master \
             WHERE type = 'index' AND name = 'ix_a002_contributor_external_id_source_id_username'"
                .to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let count: i64 = row.try_get("", "cnt").unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn registered_schema_serializes_for_inspection() {
    let schemas = ModelSchemas::build().unwrap();
    let json = serde_json::to_value(&schemas).unwrap();

    let contributor = &json[1];
    assert_eq!(contributor["table"], "a002_contributor");
    assert_eq!(contributor["foreign_keys"][0]["on_delete"], "NoAction");
    assert_eq!(contributor["indexes"][0]["unique"], false);
}

async fn foreign_keys_pragma<C: ConnectionTrait>(conn: &C) -> i32 {
    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "PRAGMA foreign_keys".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "foreign_keys").unwrap()
}

#[tokio::test]
async fn recycled_connection_keeps_configured_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("contributors.db").to_string_lossy().into_owned(),
        foreign_keys: false,
    };

    let pool = db::pool_options(&config)
        .min_connections(0)
        .max_lifetime(Duration::from_millis(50))
        .connect_with(db::connect_options(&config).unwrap())
        .await
        .unwrap();
    let broker = db::initialize_storage(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        .await
        .unwrap();
    let source = github(&broker).await;
    broker.add_contributor(octocat(&source)).await.unwrap();
    assert_eq!(foreign_keys_pragma(broker.conn()).await, 0);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(foreign_keys_pragma(broker.conn()).await, 0);
    assert_eq!(broker.retrieve_all_contributors().await.unwrap().len(), 1);
}
