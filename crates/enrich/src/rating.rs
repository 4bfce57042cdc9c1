use std::time::Duration;

use serde::Serialize;
use storelink_linkage::{RawTable, HEALTHY_FLAG_COLUMN};

use crate::error::ScoreError;
use crate::score::{RatingOutcome, RawScore, StorePayload, StoreRating};

pub const HEALTH_SCORE_COLUMN: &str = "AI_Health_Score";
pub const HEALTH_REASON_COLUMN: &str = "AI_Health_Reason";
pub const ECONOMY_SCORE_COLUMN: &str = "AI_Economy_Score";
pub const ECONOMY_REASON_COLUMN: &str = "AI_Economy_Reason";

/// Anything that can rate a store. Implemented by the HTTP client; tests
/// substitute canned scorers.
pub trait StoreScorer {
    fn score(&self, store: &StorePayload) -> Result<RawScore, ScoreError>;
}

#[derive(Debug, Clone)]
pub struct RatingOptions {
    /// Rate only the first `limit` rows. 0 = all rows.
    pub limit: usize,
    /// Pause after every issued call.
    pub delay: Duration,
    /// Added to the health score of rows flagged healthy.
    pub healthy_bonus: f64,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            delay: Duration::from_millis(150),
            healthy_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RatingSummary {
    pub considered: usize,
    pub skipped: usize,
    pub scored: usize,
    pub defaulted: usize,
    pub unavailable: usize,
}

struct RatingColumns {
    health_score: usize,
    health_reason: usize,
    economy_score: usize,
    economy_reason: usize,
}

impl RatingColumns {
    fn ensure(table: &mut RawTable) -> Self {
        Self {
            health_score: table.ensure_column(HEALTH_SCORE_COLUMN),
            health_reason: table.ensure_column(HEALTH_REASON_COLUMN),
            economy_score: table.ensure_column(ECONOMY_SCORE_COLUMN),
            economy_reason: table.ensure_column(ECONOMY_REASON_COLUMN),
        }
    }
}

/// Rate each unrated row in place.
///
/// Rows that already carry a health score are skipped without a call. A
/// failed call writes neutral defaults and the batch continues.
pub fn rate_table(
    table: &mut RawTable,
    scorer: &dyn StoreScorer,
    options: &RatingOptions,
) -> RatingSummary {
    let columns = RatingColumns::ensure(table);
    let considered = match options.limit {
        0 => table.len(),
        n => n.min(table.len()),
    };

    let mut summary = RatingSummary {
        considered,
        ..RatingSummary::default()
    };

    let healthy_col = table.column_index(HEALTHY_FLAG_COLUMN);

    for row in 0..considered {
        let Some(record) = table.record(row) else {
            continue;
        };
        if record.value(columns.health_score).is_some() {
            summary.skipped += 1;
            continue;
        }
        let is_healthy = parse_bool(healthy_col.and_then(|c| record.value(c)));
        let payload = payload_for(table, row);

        let rating = match scorer.score(&payload) {
            Ok(raw) => StoreRating::normalize(&raw, is_healthy, options.healthy_bonus),
            Err(e) => {
                log::warn!("row {}: {}: {}", row + 1, payload.name, e);
                StoreRating::unavailable()
            }
        };

        match rating.outcome {
            RatingOutcome::Scored => summary.scored += 1,
            RatingOutcome::Defaulted => summary.defaulted += 1,
            RatingOutcome::Unavailable => summary.unavailable += 1,
        }
        log::debug!(
            "row {}: {} health {} economy {}",
            row + 1,
            payload.name,
            rating.health_score,
            rating.economy_score
        );

        table.set(row, columns.health_score, rating.health_score.to_string());
        table.set(row, columns.health_reason, rating.health_reason);
        table.set(row, columns.economy_score, rating.economy_score.to_string());
        table.set(row, columns.economy_reason, rating.economy_reason);

        if !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }
    }

    log::info!(
        "rated {} rows: {} scored, {} defaulted, {} unavailable, {} already rated",
        summary.considered,
        summary.scored,
        summary.defaulted,
        summary.unavailable,
        summary.skipped
    );
    summary
}

fn payload_for(table: &RawTable, row: usize) -> StorePayload {
    let field = |header: &str| -> String {
        table
            .column_index(header)
            .and_then(|c| table.record(row).and_then(|r| r.value(c)))
            .unwrap_or_default()
            .to_string()
    };
    StorePayload {
        name: field("Store_Name"),
        address: field("Store_Street_Address"),
        city: field("City"),
        zip: field("Zip_Code"),
        county: field("County"),
        store_type: field("Store_Type"),
    }
}

/// Lenient flag parsing: `1`, `true`, `yes`, `y`, `t` (any case, trimmed).
pub fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "t"
        )
    })
}
