use std::collections::HashSet;

use crate::error::LinkError;
use crate::model::DerivedKeys;
use crate::normalize::Zip5;
use crate::schema::{LogicalField, ResolvedSchema};
use crate::table::RawTable;

/// (ZIP, normalized text) membership key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub zip5: Zip5,
    pub text: String,
}

impl MatchKey {
    pub fn new(zip5: &Zip5, text: &str) -> Self {
        Self {
            zip5: zip5.clone(),
            text: text.to_string(),
        }
    }
}

/// Lookup sets built from the reference source.
#[derive(Debug, Default)]
pub struct LinkIndex {
    by_name: HashSet<MatchKey>,
    by_address: HashSet<MatchKey>,
    /// Reference rows skipped for lacking a valid ZIP.
    skipped: usize,
}

impl LinkIndex {
    /// Index pre-derived reference keys. Rows without a ZIP contribute nothing.
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a DerivedKeys>) -> Self {
        let mut index = Self::default();
        for keys in rows {
            let Some(zip5) = &keys.zip5 else {
                index.skipped += 1;
                continue;
            };
            index.by_name.insert(MatchKey::new(zip5, &keys.name_key));
            index.by_address.insert(MatchKey::new(zip5, &keys.address_key));
        }
        index
    }

    /// Derive keys from the reference table and index them.
    pub fn from_reference(table: &RawTable, schema: &ResolvedSchema) -> Result<Self, LinkError> {
        let zip = schema.index(LogicalField::ZipCode)?;
        let name = schema.index(LogicalField::StoreName)?;
        let address = schema.index(LogicalField::StreetAddress)?;

        let keys: Vec<DerivedKeys> = table
            .records()
            .map(|r| DerivedKeys::derive(&r, zip, name, address))
            .collect();
        Ok(Self::build(&keys))
    }

    pub fn contains_name(&self, zip5: &Zip5, name_key: &str) -> bool {
        self.by_name.contains(&MatchKey::new(zip5, name_key))
    }

    pub fn contains_address(&self, zip5: &Zip5, address_key: &str) -> bool {
        self.by_address.contains(&MatchKey::new(zip5, address_key))
    }

    pub fn name_keys(&self) -> usize {
        self.by_name.len()
    }

    pub fn address_keys(&self) -> usize {
        self.by_address.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
