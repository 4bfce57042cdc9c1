use serde::Serialize;

use crate::normalize::{normalize_text, to_zip5, Zip5};
use crate::table::{RawRecord, RawTable};

/// Name of the annotation column appended to the registry output.
pub const HEALTHY_FLAG_COLUMN: &str = "Is_Healthy_Store";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The three pre-loaded sources.
pub struct LinkInput {
    pub registry: RawTable,
    pub geography: RawTable,
    pub reference: RawTable,
}

/// Working keys derived from one row. Never written to output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    pub zip5: Option<Zip5>,
    pub name_key: String,
    pub address_key: String,
}

impl DerivedKeys {
    pub fn derive(record: &RawRecord<'_>, zip: usize, name: usize, address: usize) -> Self {
        Self {
            zip5: to_zip5(record.value(zip)),
            name_key: normalize_text(record.value(name)),
            address_key: normalize_text(record.value(address)),
        }
    }

    /// Both identity keys are non-empty.
    pub fn has_identity(&self) -> bool {
        !self.name_key.is_empty() && !self.address_key.is_empty()
    }
}

/// A registry row's derived keys plus its jurisdiction code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryKeys {
    /// Position in the registry table.
    pub row: usize,
    pub keys: DerivedKeys,
    /// Uppercased, trimmed state code.
    pub jurisdiction: String,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Which index lookup(s) produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    Name,
    Address,
    Both,
    None,
}

impl MatchBasis {
    pub fn from_hits(by_name: bool, by_address: bool) -> Self {
        match (by_name, by_address) {
            (true, true) => Self::Both,
            (true, false) => Self::Name,
            (false, true) => Self::Address,
            (false, false) => Self::None,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A boundary-filtered registry row with its healthy-store flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedStoreRecord {
    /// Original cells in registry column order.
    pub cells: Vec<String>,
    pub is_healthy: bool,
    pub basis: MatchBasis,
}

/// Registry columns plus the annotation, ready for writing.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedTable {
    /// Registry headers (normalized), in source order.
    pub headers: Vec<String>,
    pub records: Vec<AnnotatedStoreRecord>,
}

impl AnnotatedTable {
    /// Registry columns that pass through to output. A pre-existing
    /// annotation column is dropped so the fresh flag replaces it.
    fn passthrough(&self) -> impl Iterator<Item = (usize, &String)> + '_ {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_str() != HEALTHY_FLAG_COLUMN)
    }

    pub fn output_headers(&self) -> Vec<String> {
        self.passthrough()
            .map(|(_, h)| h.clone())
            .chain(std::iter::once(HEALTHY_FLAG_COLUMN.to_string()))
            .collect()
    }

    /// Output rows; the flag renders as `True` / `False`.
    pub fn output_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let keep: Vec<usize> = self.passthrough().map(|(i, _)| i).collect();
        self.records.iter().map(move |rec| {
            keep.iter()
                .map(|&i| rec.cells.get(i).cloned().unwrap_or_default())
                .chain(std::iter::once(
                    if rec.is_healthy { "True" } else { "False" }.to_string(),
                ))
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    pub registry_rows: usize,
    pub geography_zips: usize,
    pub reference_rows: usize,
    /// Reference rows dropped for lacking a valid ZIP.
    pub reference_without_zip: usize,
    pub name_keys: usize,
    pub address_keys: usize,
    pub outside_boundary: usize,
    pub other_jurisdiction: usize,
    pub missing_identity: usize,
    pub retained: usize,
    pub healthy: usize,
    pub matched_by_name: usize,
    pub matched_by_address: usize,
    pub matched_by_both: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkMeta {
    pub config_name: String,
    pub jurisdiction: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    pub meta: LinkMeta,
    pub summary: LinkSummary,
    #[serde(skip)]
    pub table: AnnotatedTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str], healthy: bool) -> AnnotatedStoreRecord {
        AnnotatedStoreRecord {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            is_healthy: healthy,
            basis: if healthy { MatchBasis::Name } else { MatchBasis::None },
        }
    }

    #[test]
    fn output_appends_flag_column() {
        let t = AnnotatedTable {
            headers: vec!["Store_Name".into(), "Zip_Code".into()],
            records: vec![record(&["Fresh Mart", "10001"], true), record(&["Deli", "10002"], false)],
        };
        assert_eq!(t.output_headers(), vec!["Store_Name", "Zip_Code", "Is_Healthy_Store"]);
        let rows: Vec<_> = t.output_rows().collect();
        assert_eq!(rows[0], vec!["Fresh Mart", "10001", "True"]);
        assert_eq!(rows[1], vec!["Deli", "10002", "False"]);
    }

    #[test]
    fn existing_flag_column_is_replaced() {
        let t = AnnotatedTable {
            headers: vec!["Is_Healthy_Store".into(), "Store_Name".into()],
            records: vec![record(&["False", "Fresh Mart"], true)],
        };
        assert_eq!(t.output_headers(), vec!["Store_Name", "Is_Healthy_Store"]);
        let rows: Vec<_> = t.output_rows().collect();
        assert_eq!(rows[0], vec!["Fresh Mart", "True"]);
    }

    #[test]
    fn match_basis_from_hits() {
        assert_eq!(MatchBasis::from_hits(true, true), MatchBasis::Both);
        assert_eq!(MatchBasis::from_hits(false, true), MatchBasis::Address);
        assert!(!MatchBasis::from_hits(false, false).is_match());
    }
}
