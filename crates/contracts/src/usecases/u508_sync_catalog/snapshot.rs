use serde::{Deserialize, Serialize};

use super::request::{de_identifier, RawNumeric};

/// Текущее состояние пары артикул/прайс-лист в каталоге на момент анализа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshotEntry {
    #[serde(default, deserialize_with = "de_identifier")]
    pub article_id: String,

    #[serde(default, deserialize_with = "de_identifier")]
    pub price_list_id: String,

    #[serde(default)]
    pub list_price: Option<RawNumeric>,

    #[serde(default)]
    pub stock: Option<RawNumeric>,
}

impl CatalogSnapshotEntry {
    pub fn new(
        article_id: impl Into<String>,
        price_list_id: impl Into<String>,
        list_price: impl Into<RawNumeric>,
        stock: impl Into<RawNumeric>,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            price_list_id: price_list_id.into(),
            list_price: Some(list_price.into()),
            stock: Some(stock.into()),
        }
    }
}

/// Ответ GET снимка каталога
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
    /// Обязательное поле: ответ без `data` - ошибка формата, а не пустой каталог
    pub data: Vec<CatalogSnapshotEntry>,
}
