use storelink_linkage::model::MatchBasis;
use storelink_linkage::{run, LinkConfig, LinkError, LinkInput, LinkResult, RawTable};

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn config(jurisdiction: &str) -> LinkConfig {
    LinkConfig::from_toml(&format!(
        r#"
name = "Integration"
jurisdiction = "{jurisdiction}"

[sources]
registry  = "registry.csv"
geography = "zips.csv"
reference = "healthy.csv"

[output]
csv = "out.csv"
"#
    ))
    .unwrap()
}

/// Registry with messy headers, mixed states, ZIP formats and spellings.
fn registry() -> RawTable {
    table(
        &["Record_ID", "Store_Name", "Store_Street_Address", "City", "State", "Zip_Code", "County"],
        &[
            &["1", "Fresh Mart", "1 Main St", "New York", "NY", "10001", "NEW YORK"],
            &["2", "Corner Deli", "22 W 34th St.", "New York", "NY", "10001-2201", "NEW YORK"],
            &["3", "Harbor Foods", "9 River Rd", "Hoboken", "NJ", "10001", "HUDSON"],
            &["4", "Bodega 7", "7 Ave A", "New York", "ny", "10009", "NEW YORK"],
            &["5", "Green Grocer", "", "Brooklyn", "NY", "11201", "KINGS"],
            &["6", "Albany Market", "1 State St", "Albany", "NY", "12207", "ALBANY"],
            &["7", "Holtsville Cafe", "1 Rte 1", "Holtsville", "NY", "501", "SUFFOLK"],
            &["8", "Nameless Address Co", "44 Court St", "Brooklyn", "NY", "", "KINGS"],
            &["9", "A&P Foods, Inc.", "100 Fulton St", "Brooklyn", "NY", "11201", "KINGS"],
        ],
    )
}

fn geography() -> RawTable {
    table(
        &["Borough", "Neighborhood", "ZIP Codes"],
        &[
            &["Manhattan", "Chelsea", "10001"],
            &["Manhattan", "East Village", "10009"],
            &["Brooklyn", "Brooklyn Heights", "11201"],
            &["Suffolk", "Holtsville", "00501"],
            &["", "", ""],
        ],
    )
}

fn reference() -> RawTable {
    table(
        &["Store\nName", "Street\r\nAddress", "Borough", "Zip Code"],
        &[
            // Name match, address spelled differently.
            &["FRESH MART", "1 Main Street", "Manhattan", "10001"],
            // Address match, name spelled differently.
            &["Corner Deli & Grill", "22 W 34th St", "Manhattan", "10001"],
            // Would match Harbor Foods, but that row is NJ.
            &["Harbor Foods", "9 River Rd", "Manhattan", "10001"],
            // Right name, wrong ZIP.
            &["Bodega 7", "99 Ave B", "Manhattan", "10002"],
            // No ZIP: never indexed.
            &["A&P Foods Inc", "100 Fulton St", "Brooklyn", ""],
            // Short ZIP padded on both sides.
            &["HOLTSVILLE CAFE", "PO Box 1", "Suffolk", "501"],
        ],
    )
}

fn run_with(jurisdiction: &str) -> LinkResult {
    let input = LinkInput {
        registry: registry(),
        geography: geography(),
        reference: reference(),
    };
    run(&config(jurisdiction), &input).unwrap()
}

fn ids_and_flags(result: &LinkResult) -> Vec<(String, bool)> {
    result
        .table
        .records
        .iter()
        .map(|r| (r.cells[0].clone(), r.is_healthy))
        .collect()
}

#[test]
fn end_to_end_flags_and_order() {
    let result = run_with("NY");
    assert_eq!(
        ids_and_flags(&result),
        vec![
            ("1".to_string(), true),
            ("2".to_string(), true),
            ("4".to_string(), false),
            ("7".to_string(), true),
            ("9".to_string(), false),
        ]
    );
}

#[test]
fn end_to_end_summary() {
    let s = run_with("NY").summary;
    assert_eq!(s.registry_rows, 9);
    assert_eq!(s.geography_zips, 4);
    assert_eq!(s.reference_rows, 6);
    assert_eq!(s.reference_without_zip, 1);
    // 6 (Albany, 12207) and 8 (no ZIP) are outside; 3 is NJ; 5 has no address.
    assert_eq!(s.outside_boundary, 2);
    assert_eq!(s.other_jurisdiction, 1);
    assert_eq!(s.missing_identity, 1);
    assert_eq!(s.retained, 5);
    assert_eq!(s.healthy, 3);
    assert_eq!(s.matched_by_name, 2);
    assert_eq!(s.matched_by_address, 1);
    assert_eq!(s.matched_by_both, 0);
}

#[test]
fn match_basis_per_row() {
    let result = run_with("NY");
    let bases: Vec<MatchBasis> = result.table.records.iter().map(|r| r.basis).collect();
    assert_eq!(
        bases,
        vec![
            MatchBasis::Name,
            MatchBasis::Address,
            MatchBasis::None,
            MatchBasis::Name,
            MatchBasis::None,
        ]
    );
}

#[test]
fn jurisdiction_is_configurable() {
    let result = run_with("nj");
    assert_eq!(ids_and_flags(&result), vec![("3".to_string(), true)]);
    assert_eq!(result.meta.jurisdiction, "NJ");
}

#[test]
fn output_is_registry_columns_plus_flag() {
    let result = run_with("NY");
    let headers = result.table.output_headers();
    assert_eq!(
        headers,
        vec![
            "Record_ID",
            "Store_Name",
            "Store_Street_Address",
            "City",
            "State",
            "Zip_Code",
            "County",
            "Is_Healthy_Store"
        ]
    );
    for row in result.table.output_rows() {
        assert_eq!(row.len(), headers.len());
    }
    // Cells pass through untouched: the short ZIP is not rewritten.
    let holtsville: Vec<String> = result.table.output_rows().nth(3).unwrap();
    assert_eq!(holtsville[5], "501");
    assert_eq!(holtsville[7], "True");
}

#[test]
fn registry_without_address_column_fails_fast() {
    let input = LinkInput {
        registry: table(&["State", "ZIP", "Name"], &[&["NY", "10001", "Fresh Mart"]]),
        geography: geography(),
        reference: reference(),
    };
    match run(&config("NY"), &input) {
        Err(LinkError::MissingColumns { fields, .. }) => assert_eq!(fields, vec!["street address"]),
        other => panic!("expected missing columns, got {other:?}"),
    }
}
