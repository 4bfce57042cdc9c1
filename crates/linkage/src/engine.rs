use serde::Serialize;

use crate::boundary::{self, geography_zips, registry_keys};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::evidence::{compute_summary, SourceCounts};
use crate::index::LinkIndex;
use crate::matcher::match_row;
use crate::model::{AnnotatedStoreRecord, AnnotatedTable, LinkInput, LinkMeta, LinkResult};
use crate::schema::{
    resolve, ResolvedSchema, GEOGRAPHY_SCHEMA, REFERENCE_SCHEMA, REGISTRY_SCHEMA,
};

/// Resolved column mappings for all three sources.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSchemas {
    pub geography: ResolvedSchema,
    pub registry: ResolvedSchema,
    pub reference: ResolvedSchema,
}

/// Resolve every source's columns. Runs before any row is processed so a
/// shape problem in any file aborts the run up front.
pub fn resolve_sources(input: &LinkInput) -> Result<SourceSchemas, LinkError> {
    Ok(SourceSchemas {
        geography: resolve(&GEOGRAPHY_SCHEMA, input.geography.headers())?,
        registry: resolve(&REGISTRY_SCHEMA, input.registry.headers())?,
        reference: resolve(&REFERENCE_SCHEMA, input.reference.headers())?,
    })
}

/// Run linkage per config. Returns the annotated registry subset + summary.
pub fn run(config: &LinkConfig, input: &LinkInput) -> Result<LinkResult, LinkError> {
    let schemas = resolve_sources(input)?;

    let geography = geography_zips(&input.geography, &schemas.geography)?;
    log::info!("geography: {} distinct ZIPs", geography.len());

    let index = LinkIndex::from_reference(&input.reference, &schemas.reference)?;
    log::info!(
        "reference: {} rows, {} name keys, {} address keys, {} rows without ZIP",
        input.reference.len(),
        index.name_keys(),
        index.address_keys(),
        index.skipped()
    );

    let keys = registry_keys(&input.registry, &schemas.registry)?;
    let outcome = boundary::filter(keys, &geography, &config.jurisdiction);
    log::info!(
        "registry: {} rows, {} inside boundary ({} outside, {} other jurisdiction, {} missing name/address)",
        input.registry.len(),
        outcome.retained.len(),
        outcome.outside_boundary,
        outcome.other_jurisdiction,
        outcome.missing_identity
    );

    let records: Vec<AnnotatedStoreRecord> = outcome
        .retained
        .iter()
        .map(|row| {
            let basis = match_row(&row.keys, &index);
            AnnotatedStoreRecord {
                cells: input
                    .registry
                    .row_cells(row.row)
                    .map(|c| c.to_vec())
                    .unwrap_or_default(),
                is_healthy: basis.is_match(),
                basis,
            }
        })
        .collect();

    let counts = SourceCounts {
        registry_rows: input.registry.len(),
        geography_zips: geography.len(),
        reference_rows: input.reference.len(),
    };
    let summary = compute_summary(counts, &index, &outcome, &records);
    log::info!("matched {} of {} stores", summary.healthy, summary.retained);

    Ok(LinkResult {
        meta: LinkMeta {
            config_name: config.name.clone(),
            jurisdiction: boundary::jurisdiction_code(Some(&config.jurisdiction)),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        table: AnnotatedTable {
            headers: input.registry.headers().to_vec(),
            records,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn config() -> LinkConfig {
        LinkConfig::from_toml(
            r#"
name = "test"
[sources]
registry = "r.csv"
geography = "g.csv"
reference = "h.csv"
[output]
csv = "out.csv"
"#,
        )
        .unwrap()
    }

    fn registry() -> RawTable {
        table(
            &["Record_ID", "State", "Zip_Code", "Store_Name", "Store_Street_Address"],
            &[&["1", "NY", "10001", "Fresh Mart", "1 Main St"]],
        )
    }

    fn reference() -> RawTable {
        table(
            &["Store Name", "Street Address", "Zip Code"],
            &[&["FRESH MART", "1 Main St", "10001"]],
        )
    }

    #[test]
    fn fresh_mart_is_flagged_healthy() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[&["10001"]]),
            reference: reference(),
        };
        let result = run(&config(), &input).unwrap();
        assert_eq!(result.table.len(), 1);
        assert!(result.table.records[0].is_healthy);
        assert_eq!(result.summary.healthy, 1);
        assert_eq!(result.meta.jurisdiction, "NY");
    }

    #[test]
    fn outside_geography_drops_row() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[&["11201"]]),
            reference: reference(),
        };
        let result = run(&config(), &input).unwrap();
        assert!(result.table.is_empty());
        assert_eq!(result.summary.outside_boundary, 1);
    }

    #[test]
    fn output_columns_are_registry_plus_flag() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[&["10001"]]),
            reference: reference(),
        };
        let result = run(&config(), &input).unwrap();
        let mut expected: Vec<String> = input.registry.headers().to_vec();
        expected.push("Is_Healthy_Store".into());
        assert_eq!(result.table.output_headers(), expected);
        let rows: Vec<_> = result.table.output_rows().collect();
        assert_eq!(rows[0], vec!["1", "NY", "10001", "Fresh Mart", "1 Main St", "True"]);
    }

    #[test]
    fn missing_reference_columns_abort_before_rows() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[&["10001"]]),
            reference: table(&["Store", "Where"], &[&["FRESH MART", "1 Main St"]]),
        };
        let err = run(&config(), &input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reference CSV is missing required columns: store name, street address, zip code"
        );
    }

    #[test]
    fn resolve_sources_reports_optional_borough() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[]),
            reference: table(&["Store Name", "Street Address", "Borough", "Zip Code"], &[]),
        };
        let schemas = resolve_sources(&input).unwrap();
        assert!(schemas
            .reference
            .get(crate::schema::LogicalField::Borough)
            .is_some());
    }

    #[test]
    fn result_serializes_without_table() {
        let input = LinkInput {
            registry: registry(),
            geography: table(&["ZipCode"], &[&["10001"]]),
            reference: reference(),
        };
        let result = run(&config(), &input).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["meta"]["config_name"], "test");
        assert_eq!(json["summary"]["retained"], 1);
        assert!(json.get("table").is_none());
    }
}
