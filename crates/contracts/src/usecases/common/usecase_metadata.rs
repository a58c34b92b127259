/// Метаданные UseCase: идентификация в логах, CLI и документации
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u508")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "sync_catalog")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u508_sync_catalog"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }

    /// Строка-заголовок для вывода: "[u508] Синхронизация ..."
    fn banner() -> String {
        format!("[{}] {}", Self::usecase_index(), Self::display_name())
    }
}
