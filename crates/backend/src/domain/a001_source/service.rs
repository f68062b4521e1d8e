use super::repository;
use contracts::domain::a001_source::aggregate::{Source, SourceDto, SourceId};
use contracts::shared::metadata::{parse_id, require};
use sea_orm::TransactionTrait;

use crate::shared::data::broker::StorageBroker;
use crate::shared::data::error::{classify_delete_error, classify_write_error, StorageError};
use crate::shared::data::guard;

impl StorageBroker {
    /// Создание нового источника
    pub async fn add_source(&self, dto: SourceDto) -> Result<Source, StorageError> {
        let schema = self.schema_of::<Source>()?;

        // Валидация
        schema
            .validate(&dto)
            .map_err(|v| StorageError::constraint(schema.entity, v))?;
        let mut aggregate =
            Source::from_dto(&dto).map_err(|v| StorageError::constraint(schema.entity, v))?;

        // Before write
        aggregate.before_write();

        repository::insert(self.conn(), &aggregate)
            .await
            .map_err(|e| classify_write_error(schema, e))?;

        tracing::info!("Source {} created ({})", aggregate.id, aggregate.name);
        Ok(aggregate)
    }

    /// Обновление существующего источника
    pub async fn modify_source(&self, dto: SourceDto) -> Result<Source, StorageError> {
        let schema = self.schema_of::<Source>()?;
        let constraint = |v| StorageError::constraint(schema.entity, v);

        let id = require("id", &dto.id).map_err(constraint)?;
        let id = parse_id::<SourceId>("id", id).map_err(constraint)?;

        schema.validate(&dto).map_err(constraint)?;

        let mut aggregate = repository::get_by_id(self.conn(), id)
            .await?
            .ok_or_else(|| StorageError::not_found(schema.entity, id))?;

        aggregate.update(&dto).map_err(constraint)?;
        aggregate.before_write();

        repository::update(self.conn(), &aggregate)
            .await
            .map_err(|e| classify_write_error(schema, e))?;

        tracing::info!("Source {} updated", aggregate.id);
        Ok(aggregate)
    }

    /// Удаление источника
    ///
    /// Источник, на который ещё ссылаются участники, не удаляется:
    /// проверка зависимостей и удаление выполняются в одной транзакции.
    pub async fn remove_source_by_id(&self, id: SourceId) -> Result<Source, StorageError> {
        let schema = self.schema_of::<Source>()?;
        let txn = self.conn().begin().await?;

        let Some(source) = repository::get_by_id(&txn, id).await? else {
            txn.rollback().await?;
            return Err(StorageError::not_found(schema.entity, id));
        };

        let key = id.to_string();
        let guarded = guard::ensure_no_blocking_dependents(&txn, self.schemas(), schema, &key).await;
        if let Err(e) = guarded {
            txn.rollback().await?;
            return Err(e);
        }

        if let Err(e) = repository::delete(&txn, id).await {
            txn.rollback().await?;
            let (dependent, via) = self
                .schemas()
                .dependents_of(&schema.table)
                .next()
                .map(|(s, fk)| (s.entity, fk.column))
                .unwrap_or_default();
            return Err(classify_delete_error(schema, dependent, via, e));
        }

        txn.commit().await?;
        tracing::info!("Source {} deleted", id);
        Ok(source)
    }

    /// Получение источника по ID
    pub async fn retrieve_source_by_id(&self, id: SourceId) -> Result<Source, StorageError> {
        let schema = self.schema_of::<Source>()?;
        repository::get_by_id(self.conn(), id)
            .await?
            .ok_or_else(|| StorageError::not_found(schema.entity, id))
    }

    /// Получение списка всех источников
    pub async fn retrieve_all_sources(&self) -> Result<Vec<Source>, StorageError> {
        Ok(repository::list_all(self.conn()).await?)
    }
}
