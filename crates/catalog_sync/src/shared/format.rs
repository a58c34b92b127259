use contracts::usecases::u508_sync_catalog::analysis::FieldDelta;

/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```
/// use catalog_sync::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Цена с двумя знаками после запятой
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_price_delta(delta: &FieldDelta<f64>) -> String {
    format!("{} -> {}", format_price(delta.from), format_price(delta.to))
}

pub fn format_stock_delta(delta: &FieldDelta<i64>) -> String {
    format!("{} -> {}", delta.from, delta.to)
}
