//! Сверка выгрузки цен/остатков с текущим снимком каталога.
//!
//! Чистая функция над двумя входами: без сети, без БД, аргументы не меняются.
//! Каждая строка выгрузки попадает ровно в одну корзину результата.

use contracts::usecases::u508_sync_catalog::analysis::{
    AnalysisResult, AnalysisSummary, FieldDelta, MatchKey, NotFoundItem, RejectedItem,
    RowChanges, RowOutcome, UnchangedItem, UpdateItem,
};
use contracts::usecases::u508_sync_catalog::{CatalogSnapshotEntry, ImportRow};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::normalizer::{normalize_price, normalize_stock};

/// Параметры сверки
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Игнорировать регистр артикула при сопоставлении
    pub ignore_case: bool,
}

/// Индекс снимка по ключу сопоставления
pub type SnapshotIndex<'a> = HashMap<MatchKey, &'a CatalogSnapshotEntry>;

pub fn analyze(rows: &[ImportRow], snapshot: &[CatalogSnapshotEntry]) -> AnalysisResult {
    analyze_with(rows, snapshot, &AnalyzeOptions::default())
}

pub fn analyze_with(
    rows: &[ImportRow],
    snapshot: &[CatalogSnapshotEntry],
    options: &AnalyzeOptions,
) -> AnalysisResult {
    let started_at = std::time::Instant::now();
    let index = build_snapshot_index(snapshot, options);

    let mut builder = AnalysisBuilder::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        builder.push(classify_row(row_index, row, &index, options));
    }
    let result = builder.finish();

    tracing::info!(
        "Catalog analysis finished: total={}, to_update={}, unchanged={}, not_found={}, rejected={}, elapsed_ms={}",
        result.summary.total_items,
        result.summary.to_update,
        result.summary.unchanged,
        result.summary.not_found,
        result.summary.rejected,
        started_at.elapsed().as_millis()
    );

    result
}

/// Строит индекс снимка. При повторе ключа выигрывает первая запись.
pub fn build_snapshot_index<'a>(
    snapshot: &'a [CatalogSnapshotEntry],
    options: &AnalyzeOptions,
) -> SnapshotIndex<'a> {
    let mut index: SnapshotIndex<'a> = HashMap::with_capacity(snapshot.len());
    let mut duplicates = 0usize;

    for entry in snapshot {
        let key = lookup_key(&entry.article_id, &entry.price_list_id, options);
        match index.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }

    if duplicates > 0 {
        tracing::debug!(
            "Snapshot contains {} duplicate keys, later entries ignored",
            duplicates
        );
    }

    index
}

/// Классифицирует одну строку выгрузки
pub fn classify_row(
    row_index: usize,
    row: &ImportRow,
    index: &SnapshotIndex<'_>,
    options: &AnalyzeOptions,
) -> RowOutcome {
    let key = MatchKey::new(row.article_id.trim(), row.price_list_id.trim());

    if key.article_id.is_empty() {
        return rejected(row_index, key, "articleId is missing".to_string());
    }
    if key.price_list_id.is_empty() {
        return rejected(row_index, key, "priceListId is missing".to_string());
    }

    let price = match normalize_price(&row.list_price) {
        Ok(value) => value,
        Err(e) => return rejected(row_index, key, e.to_string()),
    };
    let stock = match normalize_stock(&row.stock) {
        Ok(value) => value,
        Err(e) => return rejected(row_index, key, e.to_string()),
    };

    let Some(entry) = index.get(&lookup_key(&key.article_id, &key.price_list_id, options)) else {
        return RowOutcome::NotFound(NotFoundItem { row_index, key });
    };

    let current_price = match normalize_price(&entry.list_price) {
        Ok(value) => value,
        Err(e) => return rejected(row_index, key, format!("catalog entry: {}", e)),
    };
    let current_stock = match normalize_stock(&entry.stock) {
        Ok(value) => value,
        Err(e) => return rejected(row_index, key, format!("catalog entry: {}", e)),
    };

    // Exact comparison: prices are expected to be pre-rounded.
    let mut changes = RowChanges::default();
    if current_price != price {
        changes.price = Some(FieldDelta {
            from: current_price,
            to: price,
        });
    }
    if current_stock != stock {
        changes.stock = Some(FieldDelta {
            from: current_stock,
            to: stock,
        });
    }

    if changes.is_empty() {
        RowOutcome::Unchanged(UnchangedItem {
            row_index,
            key,
            list_price: price,
            stock,
        })
    } else {
        RowOutcome::ToUpdate(UpdateItem {
            row_index,
            key,
            list_price: price,
            stock,
            changes,
        })
    }
}

fn lookup_key(article_id: &str, price_list_id: &str, options: &AnalyzeOptions) -> MatchKey {
    let article_id = article_id.trim();
    let article_id = if options.ignore_case {
        article_id.to_lowercase()
    } else {
        article_id.to_string()
    };
    MatchKey::new(article_id, price_list_id.trim())
}

fn rejected(row_index: usize, key: MatchKey, reason: String) -> RowOutcome {
    RowOutcome::Rejected(RejectedItem {
        row_index,
        key,
        reason,
    })
}

/// Раскладывает исходы по корзинам и ведёт счётчики за один проход
struct AnalysisBuilder {
    result: AnalysisResult,
}

impl AnalysisBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            result: AnalysisResult {
                summary: AnalysisSummary::default(),
                to_update: Vec::with_capacity(capacity),
                unchanged: Vec::new(),
                not_found: Vec::new(),
                rejected: Vec::new(),
            },
        }
    }

    fn push(&mut self, outcome: RowOutcome) {
        let summary = &mut self.result.summary;
        summary.total_items += 1;

        match outcome {
            RowOutcome::NotFound(item) => {
                summary.not_found += 1;
                self.result.not_found.push(item);
            }
            RowOutcome::Unchanged(item) => {
                summary.unchanged += 1;
                self.result.unchanged.push(item);
            }
            RowOutcome::ToUpdate(item) => {
                summary.to_update += 1;
                if item.changes.price.is_some() {
                    summary.price_changes += 1;
                }
                if item.changes.stock.is_some() {
                    summary.stock_changes += 1;
                }
                self.result.to_update.push(item);
            }
            RowOutcome::Rejected(item) => {
                summary.rejected += 1;
                self.result.rejected.push(item);
            }
        }
    }

    fn finish(mut self) -> AnalysisResult {
        self.result.to_update.shrink_to_fit();
        self.result
    }
}
