//! Boundary filter: keep registry rows inside the target geography.

use std::collections::HashSet;

use crate::error::LinkError;
use crate::model::{DerivedKeys, RegistryKeys};
use crate::normalize::{to_zip5, Zip5};
use crate::schema::{LogicalField, ResolvedSchema};
use crate::table::RawTable;

/// Why a registry row was left out. Checks run in declaration order and the
/// first failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    OutsideBoundary,
    OtherJurisdiction,
    MissingIdentity,
}

#[derive(Debug, Default)]
pub struct BoundaryOutcome {
    /// Surviving rows, in registry order.
    pub retained: Vec<RegistryKeys>,
    pub outside_boundary: usize,
    pub other_jurisdiction: usize,
    pub missing_identity: usize,
}

/// Every valid ZIP in the geography source.
pub fn geography_zips(table: &RawTable, schema: &ResolvedSchema) -> Result<HashSet<Zip5>, LinkError> {
    let zip = schema.index(LogicalField::ZipCode)?;
    Ok(table.records().filter_map(|r| to_zip5(r.value(zip))).collect())
}

/// Uppercased, trimmed jurisdiction code.
pub fn jurisdiction_code(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_uppercase()
}

/// Derive working keys for every registry row.
pub fn registry_keys(table: &RawTable, schema: &ResolvedSchema) -> Result<Vec<RegistryKeys>, LinkError> {
    let state = schema.index(LogicalField::State)?;
    let zip = schema.index(LogicalField::ZipCode)?;
    let name = schema.index(LogicalField::StoreName)?;
    let address = schema.index(LogicalField::StreetAddress)?;

    Ok(table
        .records()
        .enumerate()
        .map(|(row, record)| RegistryKeys {
            row,
            keys: DerivedKeys::derive(&record, zip, name, address),
            jurisdiction: jurisdiction_code(record.value(state)),
        })
        .collect())
}

pub fn check(row: &RegistryKeys, geography: &HashSet<Zip5>, target: &str) -> Result<(), Exclusion> {
    let in_boundary = row.keys.zip5.as_ref().is_some_and(|z| geography.contains(z));
    if !in_boundary {
        return Err(Exclusion::OutsideBoundary);
    }
    if row.jurisdiction != target {
        return Err(Exclusion::OtherJurisdiction);
    }
    if !row.keys.has_identity() {
        return Err(Exclusion::MissingIdentity);
    }
    Ok(())
}

/// Apply the boundary checks. `jurisdiction` is normalized the same way as
/// the registry's state column before comparison.
pub fn filter(rows: Vec<RegistryKeys>, geography: &HashSet<Zip5>, jurisdiction: &str) -> BoundaryOutcome {
    let target = jurisdiction_code(Some(jurisdiction));
    let mut outcome = BoundaryOutcome::default();

    for row in rows {
        match check(&row, geography, &target) {
            Ok(()) => outcome.retained.push(row),
            Err(reason) => {
                log::debug!("registry row {}: excluded ({reason:?})", row.row);
                match reason {
                    Exclusion::OutsideBoundary => outcome.outside_boundary += 1,
                    Exclusion::OtherJurisdiction => outcome.other_jurisdiction += 1,
                    Exclusion::MissingIdentity => outcome.missing_identity += 1,
                }
            }
        }
    }

    outcome
}
