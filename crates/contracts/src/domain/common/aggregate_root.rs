use super::{AggregateId, EntityMetadata};
use crate::shared::metadata::FieldMetadata;

/// Трейт для корня агрегата
///
/// Определяет обязательные методы и метаданные для всех агрегатов системы
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id: AggregateId;

    // ============================================================================
    // Методы экземпляра (данные конкретной записи)
    // ============================================================================

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    /// Получить метаданные жизненного цикла
    fn metadata(&self) -> &EntityMetadata;

    /// Получить изменяемые метаданные
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Метаданные класса агрегата (статические данные)
    // ============================================================================

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции для БД (например, "source")
    fn collection_name() -> &'static str;

    /// Имя элемента (единственное число, например, "Contributor")
    fn element_name() -> &'static str;

    /// Имя списка (множественное число, например, "Contributors")
    fn list_name() -> &'static str;

    /// Метаданные полей агрегата в порядке колонок таблицы
    ///
    /// Используется при регистрации схемы хранения и при валидации.
    fn field_metadata() -> &'static [FieldMetadata];

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Полное имя агрегата для системы (например, "a002_contributor")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }

    /// Имя таблицы в БД
    fn table_name() -> String {
        Self::full_name()
    }
}
