use serde::{Deserialize, Serialize};
use std::fmt;

use super::request::{ImportRow, RawNumeric};

/// Составной ключ сопоставления (артикул, прайс-лист)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchKey {
    pub article_id: String,
    pub price_list_id: String,
}

impl MatchKey {
    pub fn new(article_id: impl Into<String>, price_list_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            price_list_id: price_list_id.into(),
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.article_id, self.price_list_id)
    }
}

/// Изменение одного поля: было -> стало
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta<T> {
    pub from: T,
    pub to: T,
}

/// Изменения строки; присутствуют только реально изменившиеся поля
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<FieldDelta<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<FieldDelta<i64>>,
}

impl RowChanges {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.stock.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundItem {
    pub row_index: usize,
    pub key: MatchKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnchangedItem {
    pub row_index: usize,
    pub key: MatchKey,
    pub list_price: f64,
    pub stock: i64,
}

/// Строка, которую нужно применить к каталогу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    pub row_index: usize,
    pub key: MatchKey,
    /// Целевые (нормализованные) значения из выгрузки
    pub list_price: f64,
    pub stock: i64,
    pub changes: RowChanges,
}

impl UpdateItem {
    /// Строка для тела запроса создания задания импорта
    pub fn to_import_row(&self) -> ImportRow {
        ImportRow {
            article_id: self.key.article_id.clone(),
            price_list_id: self.key.price_list_id.clone(),
            list_price: Some(RawNumeric::Number(self.list_price)),
            stock: Some(RawNumeric::from(self.stock)),
        }
    }
}

/// Строка, отклонённая из-за некорректных данных
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedItem {
    pub row_index: usize,
    pub key: MatchKey,
    pub reason: String,
}

/// Итог классификации одной строки выгрузки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RowOutcome {
    NotFound(NotFoundItem),
    Unchanged(UnchangedItem),
    ToUpdate(UpdateItem),
    Rejected(RejectedItem),
}

impl RowOutcome {
    pub fn row_index(&self) -> usize {
        match self {
            RowOutcome::NotFound(item) => item.row_index,
            RowOutcome::Unchanged(item) => item.row_index,
            RowOutcome::ToUpdate(item) => item.row_index,
            RowOutcome::Rejected(item) => item.row_index,
        }
    }
}

/// Сводные счётчики анализа
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_items: usize,
    pub not_found: usize,
    pub unchanged: usize,
    pub to_update: usize,
    pub rejected: usize,
    /// Строк с изменением цены
    pub price_changes: usize,
    /// Строк с изменением остатка
    pub stock_changes: usize,
}

/// Результат сверки выгрузки с каталогом
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub to_update: Vec<UpdateItem>,
    pub unchanged: Vec<UnchangedItem>,
    pub not_found: Vec<NotFoundItem>,
    #[serde(default)]
    pub rejected: Vec<RejectedItem>,
}

impl AnalysisResult {
    /// Подмножество строк к обновлению, оставленное пользователем перед применением
    pub fn accepted_changes<F>(&self, keep: F) -> Vec<UpdateItem>
    where
        F: Fn(&UpdateItem) -> bool,
    {
        self.to_update.iter().filter(|item| keep(item)).cloned().collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.to_update.is_empty()
    }
}
