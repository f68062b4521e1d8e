use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

use crate::domain::a001_source::aggregate::SourceId;
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::metadata::{parse_id, require, FieldMetadata, FieldValues, FieldViolation};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор участника
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorId(pub Uuid);

impl ContributorId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for ContributorId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ContributorId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for ContributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Участник (человек или бот), обнаруженный во внешнем источнике
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,

    /// Идентификатор, присвоенный внешним источником
    #[serde(rename = "externalId")]
    pub external_id: String,

    #[serde(rename = "sourceId")]
    pub source_id: SourceId,

    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,

    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Поля таблицы a002_contributor в порядке колонок
pub const FIELDS: &[FieldMetadata] = &[
    FieldMetadata::key("id"),
    FieldMetadata::text("external_id"),
    FieldMetadata::reference("source_id", "a001"),
    FieldMetadata::text("username"),
    FieldMetadata::text("name"),
    FieldMetadata::text("email"),
    FieldMetadata::text("avatar_url"),
    FieldMetadata::timestamp("created_at"),
    FieldMetadata::timestamp("updated_at"),
];

impl Contributor {
    /// Создать нового участника для вставки в БД
    pub fn new_for_insert(
        external_id: String,
        source_id: SourceId,
        username: String,
        name: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            id: ContributorId::new_v4(),
            external_id,
            source_id,
            username,
            name,
            email,
            avatar_url,
            metadata: EntityMetadata::new(),
        }
    }

    /// Собрать участника из DTO (обязательные поля должны присутствовать)
    pub fn from_dto(dto: &ContributorDto) -> Result<Self, FieldViolation> {
        let external_id = require("external_id", &dto.external_id)?.to_string();
        let source_id = parse_id::<SourceId>("source_id", require("source_id", &dto.source_id)?)?;
        let username = require("username", &dto.username)?.to_string();

        Ok(Self::new_for_insert(
            external_id,
            source_id,
            username,
            dto.name.clone(),
            dto.email.clone(),
            dto.avatar_url.clone(),
        ))
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &ContributorDto) -> Result<(), FieldViolation> {
        self.external_id = require("external_id", &dto.external_id)?.to_string();
        self.source_id = parse_id::<SourceId>("source_id", require("source_id", &dto.source_id)?)?;
        self.username = require("username", &dto.username)?.to_string();
        self.name = dto.name.clone();
        self.email = dto.email.clone();
        self.avatar_url = dto.avatar_url.clone();
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

impl AggregateRoot for Contributor {
    type Id = ContributorId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "contributor"
    }

    fn element_name() -> &'static str {
        "Contributor"
    }

    fn list_name() -> &'static str {
        "Contributors"
    }

    fn field_metadata() -> &'static [FieldMetadata] {
        FIELDS
    }
}

impl FieldValues for Contributor {
    fn field_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "external_id" => Some(Cow::Borrowed(self.external_id.as_str())),
            "source_id" => Some(Cow::Owned(self.source_id.as_string())),
            "username" => Some(Cow::Borrowed(self.username.as_str())),
            "name" => self.name.as_deref().map(Cow::Borrowed),
            "email" => self.email.as_deref().map(Cow::Borrowed),
            "avatar_url" => self.avatar_url.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления участника
///
/// Все поля опциональны: отсутствие обязательного поля обнаруживается
/// валидацией схемы до записи.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContributorDto {
    pub id: Option<String>,
    #[serde(rename = "externalId")]
    pub external_id: Option<String>,
    #[serde(rename = "sourceId")]
    pub source_id: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

impl FieldValues for ContributorDto {
    fn field_value(&self, field: &str) -> Option<Cow<'_, str>> {
        let value = match field {
            "external_id" => self.external_id.as_deref(),
            "source_id" => self.source_id.as_deref(),
            "username" => self.username.as_deref(),
            "name" => self.name.as_deref(),
            "email" => self.email.as_deref(),
            "avatar_url" => self.avatar_url.as_deref(),
            _ => None,
        };
        value.map(Cow::Borrowed)
    }
}
