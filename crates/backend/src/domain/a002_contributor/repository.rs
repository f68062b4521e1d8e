use chrono::Utc;
use contracts::domain::a001_source::aggregate::SourceId;
use contracts::domain::a002_contributor::aggregate::{Contributor, ContributorId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::a001_source::repository as source_repository;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_contributor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub external_id: String,
    pub source_id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::a001_source::repository::Entity",
        from = "Column::SourceId",
        to = "crate::domain::a001_source::repository::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Source,
}

impl Related<source_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Source.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Contributor {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = ContributorId::from_string(&m.id).map_err(DbErr::Type)?;
        let source_id = SourceId::from_string(&m.source_id).map_err(DbErr::Type)?;
        Ok(Contributor {
            id,
            external_id: m.external_id,
            source_id,
            username: m.username,
            name: m.name,
            email: m.email,
            avatar_url: m.avatar_url,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
            },
        })
    }
}

fn into_aggregates(models: Vec<Model>) -> Result<Vec<Contributor>, DbErr> {
    models.into_iter().map(Contributor::try_from).collect()
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Contributor>, DbErr> {
    let models = Entity::find()
        .order_by_asc(Column::Username)
        .all(db)
        .await?;
    into_aggregates(models)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: ContributorId,
) -> Result<Option<Contributor>, DbErr> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    result.map(Contributor::try_from).transpose()
}

/// Участники, найденные в источнике (через связь belongs_to Source)
pub async fn list_by_source<C: ConnectionTrait>(
    db: &C,
    source_id: SourceId,
) -> Result<Vec<Contributor>, DbErr> {
    let models = Entity::find()
        .inner_join(source_repository::Entity)
        .filter(source_repository::Column::Id.eq(source_id.as_string()))
        .order_by_asc(Column::Username)
        .all(db)
        .await?;
    into_aggregates(models)
}

/// Поиск по тройке (external_id, source_id, username).
///
/// Тройка не уникальна, поэтому возвращается список.
pub async fn find_by_external_identity<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
    source_id: SourceId,
    username: &str,
) -> Result<Vec<Contributor>, DbErr> {
    let models = Entity::find()
        .filter(Column::ExternalId.eq(external_id))
        .filter(Column::SourceId.eq(source_id.as_string()))
        .filter(Column::Username.eq(username))
        .all(db)
        .await?;
    into_aggregates(models)
}

pub(crate) async fn insert<C: ConnectionTrait>(
    db: &C,
    aggregate: &Contributor,
) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(aggregate.id.as_string()),
        external_id: Set(aggregate.external_id.clone()),
        source_id: Set(aggregate.source_id.as_string()),
        username: Set(aggregate.username.clone()),
        name: Set(aggregate.name.clone()),
        email: Set(aggregate.email.clone()),
        avatar_url: Set(aggregate.avatar_url.clone()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
    };
    Entity::insert(active).exec(db).await?;
    Ok(())
}

pub(crate) async fn update<C: ConnectionTrait>(
    db: &C,
    aggregate: &Contributor,
) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(aggregate.id.as_string()),
        external_id: Set(aggregate.external_id.clone()),
        source_id: Set(aggregate.source_id.as_string()),
        username: Set(aggregate.username.clone()),
        name: Set(aggregate.name.clone()),
        email: Set(aggregate.email.clone()),
        avatar_url: Set(aggregate.avatar_url.clone()),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(db).await?;
    Ok(())
}

pub(crate) async fn delete<C: ConnectionTrait>(db: &C, id: ContributorId) -> Result<u64, DbErr> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::schema::{DeleteBehavior, ModelSchemas};
    use sea_orm::sea_query::ForeignKeyAction;
    use sea_orm::{IdenStatic, Iterable, RelationType};

    #[test]
    fn test_columns_match_registered_schema() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a002_contributor").unwrap();
        let columns: Vec<Column> = Column::iter().collect();
        let entity_columns: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
        let schema_columns: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
        assert_eq!(entity_columns, schema_columns);
    }

    #[test]
    fn test_relation_matches_registered_foreign_key() {
        let schemas = ModelSchemas::build().unwrap();
        let fk = schemas
            .get("a002_contributor")
            .and_then(|s| s.foreign_key("source_id"))
            .unwrap();
        assert_eq!(fk.on_delete, DeleteBehavior::NoAction);

        let def = Relation::Source.def();
        assert!(matches!(def.rel_type, RelationType::HasOne));
        assert!(matches!(def.on_delete, Some(ForeignKeyAction::NoAction)));
    }
}
