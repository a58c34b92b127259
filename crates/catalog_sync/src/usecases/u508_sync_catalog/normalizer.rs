//! Приведение сырых значений выгрузки к каноническим числам.
//!
//! Одни и те же правила применяются и к строке выгрузки, и к записи снимка
//! каталога, поэтому `"120"` и `120` сравниваются как равные.

use contracts::usecases::u508_sync_catalog::RawNumeric;
use thiserror::Error;

/// Поле не удалось привести к числу
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidNumericField {
    #[error("{field} is missing")]
    Missing { field: &'static str },

    #[error("{field} is not a number: '{raw}'")]
    NotNumeric { field: &'static str, raw: String },

    #[error("{field} is not finite")]
    NotFinite { field: &'static str },

    #[error("{field} must be an integer, got {value}")]
    NotInteger { field: &'static str, value: f64 },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

pub const PRICE_FIELD: &str = "listPrice";
pub const STOCK_FIELD: &str = "stock";

/// Нормализует цену (десятичное число)
pub fn normalize_price(raw: &Option<RawNumeric>) -> Result<f64, InvalidNumericField> {
    normalize_decimal(raw, PRICE_FIELD)
}

/// Нормализует остаток: допустимо только целое значение (`10`, `"10"`, `10.0`)
pub fn normalize_stock(raw: &Option<RawNumeric>) -> Result<i64, InvalidNumericField> {
    let field = STOCK_FIELD;
    match raw {
        Some(RawNumeric::Integer(n)) => return Ok(*n),
        // Целое из текста читается точно: через f64 значения больше 2^53 округляются
        Some(RawNumeric::Text(text)) => {
            if let Ok(n) = text.trim().parse::<i64>() {
                return Ok(n);
            }
        }
        _ => {}
    }

    let value = normalize_decimal(raw, field)?;
    if value.fract() != 0.0 {
        return Err(InvalidNumericField::NotInteger { field, value });
    }
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(InvalidNumericField::OutOfRange { field, value });
    }
    Ok(value as i64)
}

/// Нормализует произвольное числовое поле
pub fn normalize_decimal(
    raw: &Option<RawNumeric>,
    field: &'static str,
) -> Result<f64, InvalidNumericField> {
    let value = match raw {
        None => return Err(InvalidNumericField::Missing { field }),
        Some(RawNumeric::Integer(n)) => *n as f64,
        Some(RawNumeric::Number(n)) => *n,
        Some(RawNumeric::Text(text)) => parse_text(text, field)?,
        Some(RawNumeric::Other(serde_json::Value::Null)) => {
            return Err(InvalidNumericField::Missing { field })
        }
        Some(RawNumeric::Other(other)) => {
            return Err(InvalidNumericField::NotNumeric {
                field,
                raw: other.to_string(),
            })
        }
    };

    if !value.is_finite() {
        return Err(InvalidNumericField::NotFinite { field });
    }
    Ok(value)
}

fn parse_text(text: &str, field: &'static str) -> Result<f64, InvalidNumericField> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidNumericField::Missing { field });
    }

    // Excel с русской локалью отдаёт "5309,00"
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| InvalidNumericField::NotNumeric {
            field,
            raw: text.to_string(),
        })?;

    if !value.is_finite() {
        return Err(InvalidNumericField::NotFinite { field });
    }
    Ok(value)
}
