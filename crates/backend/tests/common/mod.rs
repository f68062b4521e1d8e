#![allow(dead_code)]

use backend::shared::config::DatabaseConfig;
use backend::shared::data::broker::StorageBroker;
use backend::shared::data::db;
use contracts::domain::a001_source::aggregate::{Source, SourceDto};
use contracts::domain::a002_contributor::aggregate::ContributorDto;
use contracts::domain::common::AggregateId;

pub async fn in_memory_broker() -> StorageBroker {
    db::open(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory storage should initialize")
}

pub async fn github(broker: &StorageBroker) -> Source {
    broker
        .add_source(SourceDto {
            id: None,
            name: Some("GitHub".into()),
            url: Some("https://github.com".into()),
        })
        .await
        .expect("source should be stored")
}

pub fn octocat(source: &Source) -> ContributorDto {
    ContributorDto {
        external_id: Some("ext-1".into()),
        source_id: Some(source.id.as_string()),
        username: Some("octocat".into()),
        ..Default::default()
    }
}
