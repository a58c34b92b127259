use serde::{Deserialize, Deserializer, Serialize};

/// Сырое числовое значение из загруженного файла.
///
/// Поставщик выгрузки может прислать `120`, `"120"` или `"5309,00"`;
/// приведение к числу выполняет нормализатор, а не десериализация,
/// чтобы одна испорченная ячейка не роняла разбор всей выгрузки.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumeric {
    Integer(i64),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawNumeric {
    fn from(value: f64) -> Self {
        RawNumeric::Number(value)
    }
}

impl From<i64> for RawNumeric {
    fn from(value: i64) -> Self {
        RawNumeric::Integer(value)
    }
}

impl From<&str> for RawNumeric {
    fn from(value: &str) -> Self {
        RawNumeric::Text(value.to_string())
    }
}

/// Строка загружаемой выгрузки цен/остатков
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    /// Артикул (сквозной идентификатор между системами)
    #[serde(default, deserialize_with = "de_identifier")]
    pub article_id: String,

    /// ID прайс-листа
    #[serde(default, deserialize_with = "de_identifier")]
    pub price_list_id: String,

    /// Цена по прайс-листу
    #[serde(default)]
    pub list_price: Option<RawNumeric>,

    /// Остаток
    #[serde(default)]
    pub stock: Option<RawNumeric>,
}

impl ImportRow {
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

/// Запрос на обработку одного пакета задания импорта
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessChunkRequest {
    pub job_id: String,
    /// Номер пакета, с нуля
    pub batch_number: u32,
}

/// Identifiers arrive as JSON strings or numbers; both become `String`.
pub(crate) fn de_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Identifier {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    let value = Option::<Identifier>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(Identifier::Text(s)) => s,
        Some(Identifier::Integer(n)) => n.to_string(),
        Some(Identifier::Float(f)) if f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(Identifier::Float(f)) => f.to_string(),
    })
}
