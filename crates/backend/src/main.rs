use backend::shared::{config, data::db};
use backend::system;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    tracing::info!("Database path: {}", config.database.path);

    let broker = db::initialize_database(&config).await?;

    for schema in broker.schemas().iter() {
        tracing::info!(
            "{} -> {} ({} columns, {} indexes, {} foreign keys)",
            schema.entity,
            schema.table,
            schema.columns.len(),
            schema.indexes.len(),
            schema.foreign_keys.len()
        );
    }

    println!("{}", serde_json::to_string_pretty(broker.schemas())?);

    Ok(())
}
