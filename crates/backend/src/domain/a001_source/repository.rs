use chrono::Utc;
use contracts::domain::a001_source::aggregate::{Source, SourceId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_source")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::domain::a002_contributor::repository::Entity")]
    Contributor,
}

impl Related<crate::domain::a002_contributor::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Source {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = SourceId::from_string(&m.id).map_err(DbErr::Type)?;
        Ok(Source {
            id,
            name: m.name,
            url: m.url,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
            },
        })
    }
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Source>, DbErr> {
    Entity::find()
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Source::try_from)
        .collect()
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: SourceId) -> Result<Option<Source>, DbErr> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    result.map(Source::try_from).transpose()
}

pub async fn exists<C: ConnectionTrait>(db: &C, id: SourceId) -> Result<bool, DbErr> {
    let count = Entity::find_by_id(id.as_string()).count(db).await?;
    Ok(count > 0)
}

pub(crate) async fn insert<C: ConnectionTrait>(db: &C, aggregate: &Source) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(aggregate.id.as_string()),
        name: Set(aggregate.name.clone()),
        url: Set(aggregate.url.clone()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
    };
    Entity::insert(active).exec(db).await?;
    Ok(())
}

pub(crate) async fn update<C: ConnectionTrait>(db: &C, aggregate: &Source) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(aggregate.id.as_string()),
        name: Set(aggregate.name.clone()),
        url: Set(aggregate.url.clone()),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(db).await?;
    Ok(())
}

pub(crate) async fn delete<C: ConnectionTrait>(db: &C, id: SourceId) -> Result<u64, DbErr> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::schema::ModelSchemas;
    use sea_orm::{IdenStatic, Iterable, RelationType};

    #[test]
    fn test_columns_match_registered_schema() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a001_source").unwrap();
        let columns: Vec<Column> = Column::iter().collect();
        let entity_columns: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
        let schema_columns: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
        assert_eq!(entity_columns, schema_columns);
    }

    #[test]
    fn test_has_many_contributors() {
        let def = Relation::Contributor.def();
        assert!(matches!(def.rel_type, RelationType::HasMany));
    }

    #[test]
    fn test_model_with_bad_id_is_rejected() {
        let model = Model {
            id: "not-a-uuid".into(),
            name: "GitHub".into(),
            url: "https://github.com".into(),
            created_at: None,
            updated_at: None,
        };
        assert!(matches!(Source::try_from(model), Err(DbErr::Type(_))));
    }
}
