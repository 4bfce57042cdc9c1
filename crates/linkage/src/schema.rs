//! Column resolution: map each source's headers onto logical fields.
//!
//! Every source declares a fixed, ordered list of [`FieldSpec`]s. A field
//! resolves to the first alias present verbatim among the (normalized)
//! headers; failing that, to the first header containing the field's keyword
//! case-insensitively, when one is declared. Unresolved required fields are
//! reported together in a single [`LinkError::MissingColumns`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::LinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Registry,
    Geography,
    Reference,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Registry => "registry CSV",
            Self::Geography => "geography CSV",
            Self::Reference => "reference CSV",
        }
    }
}

impl SourceKind {
    /// The column schema this source is resolved against.
    pub fn schema(&self) -> &'static SourceSchema {
        match self {
            Self::Registry => &REGISTRY_SCHEMA,
            Self::Geography => &GEOGRAPHY_SCHEMA,
            Self::Reference => &REFERENCE_SCHEMA,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry => write!(f, "registry"),
            Self::Geography => write!(f, "geography"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    State,
    ZipCode,
    StoreName,
    StreetAddress,
    Borough,
}

impl std::fmt::Display for LogicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::ZipCode => write!(f, "zip_code"),
            Self::StoreName => write!(f, "store_name"),
            Self::StreetAddress => write!(f, "street_address"),
            Self::Borough => write!(f, "borough"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: LogicalField,
    /// Human name used in error messages.
    pub label: &'static str,
    pub aliases: &'static [&'static str],
    /// Case-insensitive substring tried when no alias matches.
    pub keyword: Option<&'static str>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceSchema {
    pub source: SourceKind,
    pub fields: &'static [FieldSpec],
}

impl SourceSchema {
    pub fn label(&self, field: LogicalField) -> Option<&'static str> {
        self.fields.iter().find(|spec| spec.field == field).map(|spec| spec.label)
    }
}

pub const REGISTRY_SCHEMA: SourceSchema = SourceSchema {
    source: SourceKind::Registry,
    fields: &[
        FieldSpec {
            field: LogicalField::State,
            label: "state",
            aliases: &["State"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::ZipCode,
            label: "zip",
            aliases: &["Zip_Code", "Zip Code", "ZIP", "Zip"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::StoreName,
            label: "store name",
            aliases: &["Store_Name", "Store Name", "Name"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::StreetAddress,
            label: "street address",
            aliases: &["Store_Street_Address", "Store Street Address", "Street Address", "Address"],
            keyword: None,
            required: true,
        },
    ],
};

pub const GEOGRAPHY_SCHEMA: SourceSchema = SourceSchema {
    source: SourceKind::Geography,
    fields: &[FieldSpec {
        field: LogicalField::ZipCode,
        label: "zip code",
        aliases: &["ZipCode", "Zip Code", "ZIP", "Zip"],
        keyword: Some("zip"),
        required: true,
    }],
};

pub const REFERENCE_SCHEMA: SourceSchema = SourceSchema {
    source: SourceKind::Reference,
    fields: &[
        FieldSpec {
            field: LogicalField::StoreName,
            label: "store name",
            aliases: &["Store Name", "Store_Name", "Name"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::StreetAddress,
            label: "street address",
            aliases: &["Street Address", "Address", "Store Street Address"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::ZipCode,
            label: "zip code",
            aliases: &["Zip Code", "ZipCode", "Zip", "ZIP"],
            keyword: None,
            required: true,
        },
        FieldSpec {
            field: LogicalField::Borough,
            label: "borough",
            aliases: &["Borough"],
            keyword: None,
            required: false,
        },
    ],
};

/// A resolved column: the header it matched and its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub header: String,
    pub index: usize,
}

/// Logical-field → column mapping for one source.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSchema {
    pub source: SourceKind,
    pub columns: BTreeMap<LogicalField, ResolvedColumn>,
}

impl ResolvedSchema {
    pub fn get(&self, field: LogicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    /// Column index of a required field. Resolution guarantees presence, so a
    /// miss here is reported as the same error resolution would have raised.
    pub fn index(&self, field: LogicalField) -> Result<usize, LinkError> {
        self.columns.get(&field).map(|c| c.index).ok_or_else(|| {
            let label = match self.source.schema().label(field) {
                Some(label) => label.to_string(),
                None => field.to_string(),
            };
            LinkError::MissingColumns {
                source: self.source,
                fields: vec![label],
            }
        })
    }
}

fn resolve_field(spec: &FieldSpec, headers: &[String]) -> Option<ResolvedColumn> {
    let by_alias = spec
        .aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias));

    let by_keyword = || {
        let keyword = spec.keyword?.to_lowercase();
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(&keyword))
    };

    by_alias.or_else(by_keyword).map(|index| ResolvedColumn {
        header: headers[index].clone(),
        index,
    })
}

/// Resolve every field of `schema` against normalized `headers`.
pub fn resolve(schema: &SourceSchema, headers: &[String]) -> Result<ResolvedSchema, LinkError> {
    let mut columns = BTreeMap::new();
    let mut missing = Vec::new();

    for spec in schema.fields {
        match resolve_field(spec, headers) {
            Some(col) => {
                log::debug!(
                    "{}: {} -> column {} ({:?})",
                    schema.source,
                    spec.field,
                    col.index,
                    col.header
                );
                columns.insert(spec.field, col);
            }
            None if spec.required => missing.push(spec.label.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(LinkError::MissingColumns {
            source: schema.source,
            fields: missing,
        });
    }

    Ok(ResolvedSchema {
        source: schema.source,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(hs: &[&str]) -> Vec<String> {
        hs.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn registry_resolves_underscore_headers() {
        let h = headers(&["Record_ID", "Store_Name", "Store_Street_Address", "City", "State", "Zip_Code"]);
        let r = resolve(&REGISTRY_SCHEMA, &h).unwrap();
        assert_eq!(r.get(LogicalField::StoreName).unwrap().index, 1);
        assert_eq!(r.get(LogicalField::StreetAddress).unwrap().index, 2);
        assert_eq!(r.get(LogicalField::State).unwrap().index, 4);
        assert_eq!(r.get(LogicalField::ZipCode).unwrap().header, "Zip_Code");
    }

    #[test]
    fn first_alias_in_declared_order_wins() {
        // "Address" appears first in the header list, but "Street Address"
        // is declared earlier for the registry.
        let h = headers(&["State", "Zip", "Name", "Address", "Street Address"]);
        let r = resolve(&REGISTRY_SCHEMA, &h).unwrap();
        assert_eq!(r.get(LogicalField::StreetAddress).unwrap().header, "Street Address");
    }

    #[test]
    fn aliases_are_case_sensitive() {
        let h = headers(&["state", "zip", "name", "address"]);
        let err = resolve(&REGISTRY_SCHEMA, &h).unwrap_err();
        match err {
            LinkError::MissingColumns { source, fields } => {
                assert_eq!(source, SourceKind::Registry);
                assert_eq!(fields, vec!["state", "zip", "store name", "street address"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let h = headers(&["State", "Zip_Code"]);
        let err = resolve(&REGISTRY_SCHEMA, &h).unwrap_err();
        assert_eq!(
            err.to_string(),
            "registry CSV is missing required columns: store name, street address"
        );
    }

    #[test]
    fn geography_falls_back_to_keyword() {
        let h = headers(&["Borough", "Neighborhood", "NYC ZIP codes"]);
        let r = resolve(&GEOGRAPHY_SCHEMA, &h).unwrap();
        assert_eq!(r.get(LogicalField::ZipCode).unwrap().index, 2);
    }

    #[test]
    fn geography_prefers_alias_over_keyword() {
        let h = headers(&["zip_area", "ZipCode"]);
        let r = resolve(&GEOGRAPHY_SCHEMA, &h).unwrap();
        assert_eq!(r.get(LogicalField::ZipCode).unwrap().header, "ZipCode");
    }

    #[test]
    fn geography_without_zip_column_fails() {
        let h = headers(&["Borough", "Neighborhood"]);
        let err = resolve(&GEOGRAPHY_SCHEMA, &h).unwrap_err();
        assert!(err.to_string().contains("zip code"));
    }

    #[test]
    fn registry_has_no_keyword_fallback() {
        let h = headers(&["State", "Postal zip", "Store_Name", "Address"]);
        let err = resolve(&REGISTRY_SCHEMA, &h).unwrap_err();
        assert!(err.to_string().ends_with("columns: zip"));
    }

    #[test]
    fn reference_borough_is_optional() {
        let h = headers(&["Store Name", "Street Address", "Zip Code"]);
        let r = resolve(&REFERENCE_SCHEMA, &h).unwrap();
        assert!(r.get(LogicalField::Borough).is_none());

        let h = headers(&["Store Name", "Street Address", "Borough", "Zip Code"]);
        let r = resolve(&REFERENCE_SCHEMA, &h).unwrap();
        assert_eq!(r.get(LogicalField::Borough).unwrap().index, 2);
        assert_eq!(r.index(LogicalField::ZipCode).unwrap(), 3);
    }

    #[test]
    fn index_miss_uses_resolution_wording() {
        let empty = ResolvedSchema {
            source: SourceKind::Geography,
            columns: BTreeMap::new(),
        };
        let from_index = empty.index(LogicalField::ZipCode).unwrap_err().to_string();
        let from_resolve = resolve(&GEOGRAPHY_SCHEMA, &headers(&["Borough"]))
            .unwrap_err()
            .to_string();
        assert_eq!(from_index, from_resolve);
        assert!(from_index.ends_with("columns: zip code"), "{from_index}");

        let empty = ResolvedSchema {
            source: SourceKind::Reference,
            columns: BTreeMap::new(),
        };
        let err = empty.index(LogicalField::StreetAddress).unwrap_err();
        assert!(err.to_string().ends_with("columns: street address"), "{err}");
    }
}
