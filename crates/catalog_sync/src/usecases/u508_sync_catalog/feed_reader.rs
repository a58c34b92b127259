//! Чтение файла выгрузки: JSON-массив `ImportRow` или CSV с заголовком
//! `articleId,priceListId,listPrice,stock`.

use anyhow::{Context, Result};
use contracts::usecases::u508_sync_catalog::{ImportRow, RawNumeric};
use std::path::Path;

const CSV_COLUMNS: [&str; 4] = ["articleId", "priceListId", "listPrice", "stock"];

pub fn read_rows(path: &Path) -> Result<Vec<ImportRow>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "json" => parse_json_rows(&text),
        "csv" => parse_csv_rows(&text),
        other => anyhow::bail!(
            "Unsupported rows file extension '{}' ({}): expected .json or .csv",
            other,
            path.display()
        ),
    }
    .with_context(|| format!("Failed to parse rows file {}", path.display()))?;

    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn parse_json_rows(text: &str) -> Result<Vec<ImportRow>> {
    let text = text.trim_start_matches('\u{FEFF}');
    serde_json::from_str(text).context("Rows JSON must be an array of objects")
}

/// Значения CSV попадают в строку как текст; числа разбирает нормализатор.
pub fn parse_csv_rows(text: &str) -> Result<Vec<ImportRow>> {
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let mut positions = [0usize; 4];
    for (slot, column) in positions.iter_mut().zip(CSV_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column)
            .with_context(|| format!("CSV header has no '{}' column", column))?;
    }
    let [article_pos, price_list_pos, price_pos, stock_pos] = positions;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", index + 1))?;

        let get_field = |pos: usize| -> Option<String> {
            record
                .get(pos)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        rows.push(ImportRow {
            article_id: get_field(article_pos).unwrap_or_default(),
            price_list_id: get_field(price_list_pos).unwrap_or_default(),
            list_price: get_field(price_pos).map(RawNumeric::Text),
            stock: get_field(stock_pos).map(RawNumeric::Text),
        });
    }

    Ok(rows)
}
