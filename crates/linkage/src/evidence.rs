use crate::boundary::BoundaryOutcome;
use crate::index::LinkIndex;
use crate::model::{AnnotatedStoreRecord, LinkSummary, MatchBasis};

/// Source sizes fed into the summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceCounts {
    pub registry_rows: usize,
    pub geography_zips: usize,
    pub reference_rows: usize,
}

/// Compute summary statistics for a finished run.
pub fn compute_summary(
    counts: SourceCounts,
    index: &LinkIndex,
    boundary: &BoundaryOutcome,
    records: &[AnnotatedStoreRecord],
) -> LinkSummary {
    let mut summary = LinkSummary {
        registry_rows: counts.registry_rows,
        geography_zips: counts.geography_zips,
        reference_rows: counts.reference_rows,
        reference_without_zip: index.skipped(),
        name_keys: index.name_keys(),
        address_keys: index.address_keys(),
        outside_boundary: boundary.outside_boundary,
        other_jurisdiction: boundary.other_jurisdiction,
        missing_identity: boundary.missing_identity,
        retained: records.len(),
        ..LinkSummary::default()
    };

    for r in records {
        match r.basis {
            MatchBasis::Name => summary.matched_by_name += 1,
            MatchBasis::Address => summary.matched_by_address += 1,
            MatchBasis::Both => summary.matched_by_both += 1,
            MatchBasis::None => {}
        }
        if r.is_healthy {
            summary.healthy += 1;
        }
    }

    summary
}
