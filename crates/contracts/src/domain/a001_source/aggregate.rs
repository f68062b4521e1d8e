use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::metadata::{require, FieldMetadata, FieldValues, FieldViolation};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор источника
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for SourceId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SourceId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Источник участников (внешняя система контроля версий, например GitHub)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub url: String,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Поля таблицы a001_source в порядке колонок
pub const FIELDS: &[FieldMetadata] = &[
    FieldMetadata::key("id"),
    FieldMetadata::text("name"),
    FieldMetadata::text("url"),
    FieldMetadata::timestamp("created_at"),
    FieldMetadata::timestamp("updated_at"),
];

impl Source {
    /// Создать новый источник для вставки в БД
    pub fn new_for_insert(name: String, url: String) -> Self {
        Self {
            id: SourceId::new_v4(),
            name,
            url,
            metadata: EntityMetadata::new(),
        }
    }

    /// Собрать источник из DTO (обязательные поля должны присутствовать)
    pub fn from_dto(dto: &SourceDto) -> Result<Self, FieldViolation> {
        let name = require("name", &dto.name)?.to_string();
        let url = require("url", &dto.url)?.to_string();
        Ok(Self::new_for_insert(name, url))
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &SourceDto) -> Result<(), FieldViolation> {
        self.name = require("name", &dto.name)?.to_string();
        self.url = require("url", &dto.url)?.to_string();
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

impl AggregateRoot for Source {
    type Id = SourceId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "source"
    }

    fn element_name() -> &'static str {
        "Source"
    }

    fn list_name() -> &'static str {
        "Sources"
    }

    fn field_metadata() -> &'static [FieldMetadata] {
        FIELDS
    }
}

impl FieldValues for Source {
    fn field_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "url" => Some(Cow::Borrowed(self.url.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления источника
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

impl FieldValues for SourceDto {
    fn field_value(&self, field: &str) -> Option<Cow<'_, str>> {
        let value = match field {
            "name" => self.name.as_deref(),
            "url" => self.url.as_deref(),
            _ => None,
        };
        value.map(Cow::Borrowed)
    }
}
