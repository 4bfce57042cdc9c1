use crate::index::LinkIndex;
use crate::model::{DerivedKeys, MatchBasis};

/// Decide reference membership for one row.
///
/// A row matches when its (ZIP, name) pair is in the name index OR its
/// (ZIP, address) pair is in the address index. Rows without a valid ZIP
/// never match.
pub fn match_row(keys: &DerivedKeys, index: &LinkIndex) -> MatchBasis {
    let Some(zip5) = &keys.zip5 else {
        return MatchBasis::None;
    };
    if zip5.as_str().len() != 5 {
        return MatchBasis::None;
    }

    MatchBasis::from_hits(
        index.contains_name(zip5, &keys.name_key),
        index.contains_address(zip5, &keys.address_key),
    )
}

pub fn is_healthy_store(keys: &DerivedKeys, index: &LinkIndex) -> bool {
    match_row(keys, index).is_match()
}
