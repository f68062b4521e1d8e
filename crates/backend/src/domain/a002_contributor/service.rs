use super::repository;
use contracts::domain::a001_source::aggregate::SourceId;
use contracts::domain::a002_contributor::aggregate::{Contributor, ContributorDto, ContributorId};
use contracts::shared::metadata::{parse_id, require, FieldViolation, ViolationKind};
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::domain::a001_source::repository as source_repository;
use crate::shared::data::broker::StorageBroker;
use crate::shared::data::error::{classify_write_error, StorageError};
use crate::shared::schema::EntitySchema;

/// Ссылка на источник должна указывать на существующую запись
async fn ensure_source_exists<C: ConnectionTrait>(
    db: &C,
    schema: &EntitySchema,
    source_id: SourceId,
) -> Result<(), StorageError> {
    if source_repository::exists(db, source_id).await? {
        return Ok(());
    }

    let principal = schema
        .foreign_key("source_id")
        .map(|fk| fk.principal_entity)
        .unwrap_or("Source");
    tracing::warn!("Contributor refers to missing {} {}", principal, source_id);
    Err(StorageError::constraint(
        schema.entity,
        FieldViolation::new(
            "source_id",
            ViolationKind::MissingReference {
                entity: principal.to_string(),
            },
        ),
    ))
}

impl StorageBroker {
    /// Создание нового участника
    pub async fn add_contributor(&self, dto: ContributorDto) -> Result<Contributor, StorageError> {
        let schema = self.schema_of::<Contributor>()?;
        let constraint = |v| StorageError::constraint(schema.entity, v);

        // Валидация
        schema.validate(&dto).map_err(constraint)?;
        let mut aggregate = Contributor::from_dto(&dto).map_err(constraint)?;

        // Before write
        aggregate.before_write();

        let txn = self.conn().begin().await?;
        if let Err(e) = ensure_source_exists(&txn, schema, aggregate.source_id).await {
            txn.rollback().await?;
            return Err(e);
        }
        if let Err(e) = repository::insert(&txn, &aggregate).await {
            txn.rollback().await?;
            return Err(classify_write_error(schema, e));
        }
        txn.commit().await?;

        tracing::info!(
            "Contributor {} created ({} from source {})",
            aggregate.id,
            aggregate.username,
            aggregate.source_id
        );
        Ok(aggregate)
    }

    /// Обновление существующего участника
    pub async fn modify_contributor(
        &self,
        dto: ContributorDto,
    ) -> Result<Contributor, StorageError> {
        let schema = self.schema_of::<Contributor>()?;
        let constraint = |v| StorageError::constraint(schema.entity, v);

        let id = require("id", &dto.id).map_err(constraint)?;
        let id = parse_id::<ContributorId>("id", id).map_err(constraint)?;

        schema.validate(&dto).map_err(constraint)?;

        let txn = self.conn().begin().await?;
        let Some(mut aggregate) = repository::get_by_id(&txn, id).await? else {
            txn.rollback().await?;
            return Err(StorageError::not_found(schema.entity, id));
        };

        if let Err(v) = aggregate.update(&dto) {
            txn.rollback().await?;
            return Err(constraint(v));
        }
        aggregate.before_write();

        if let Err(e) = ensure_source_exists(&txn, schema, aggregate.source_id).await {
            txn.rollback().await?;
            return Err(e);
        }
        if let Err(e) = repository::update(&txn, &aggregate).await {
            txn.rollback().await?;
            return Err(classify_write_error(schema, e));
        }
        txn.commit().await?;

        tracing::info!("Contributor {} updated", aggregate.id);
        Ok(aggregate)
    }

    /// Удаление участника
    pub async fn remove_contributor_by_id(
        &self,
        id: ContributorId,
    ) -> Result<Contributor, StorageError> {
        let schema = self.schema_of::<Contributor>()?;
        let txn = self.conn().begin().await?;

        let Some(contributor) = repository::get_by_id(&txn, id).await? else {
            txn.rollback().await?;
            return Err(StorageError::not_found(schema.entity, id));
        };
        repository::delete(&txn, id).await?;
        txn.commit().await?;

        tracing::info!("Contributor {} deleted", id);
        Ok(contributor)
    }

    /// Получение участника по ID
    pub async fn retrieve_contributor_by_id(
        &self,
        id: ContributorId,
    ) -> Result<Contributor, StorageError> {
        let schema = self.schema_of::<Contributor>()?;
        repository::get_by_id(self.conn(), id)
            .await?
            .ok_or_else(|| StorageError::not_found(schema.entity, id))
    }

    /// Получение списка всех участников
    pub async fn retrieve_all_contributors(&self) -> Result<Vec<Contributor>, StorageError> {
        Ok(repository::list_all(self.conn()).await?)
    }

    /// Участники одного источника
    pub async fn retrieve_contributors_by_source(
        &self,
        source_id: SourceId,
    ) -> Result<Vec<Contributor>, StorageError> {
        Ok(repository::list_by_source(self.conn(), source_id).await?)
    }

    /// Поиск участника по внешней идентичности (external_id, source_id, username)
    pub async fn retrieve_contributor_by_external_identity(
        &self,
        external_id: &str,
        source_id: SourceId,
        username: &str,
    ) -> Result<Vec<Contributor>, StorageError> {
        let found =
            repository::find_by_external_identity(self.conn(), external_id, source_id, username)
                .await?;
        tracing::debug!(
            "{} contributor(s) match {}/{}/{}",
            found.len(),
            external_id,
            source_id,
            username
        );
        Ok(found)
    }
}
