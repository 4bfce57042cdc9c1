//! Key derivation: headers, free text and ZIP codes.

use std::fmt;

use serde::Serialize;

/// Collapse every whitespace run (newlines included) to one space and trim.
///
/// Spreadsheet exports routinely wrap long headers onto several lines
/// (`"Store\nName"`), so resolution always works on this form.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical comparison key for names and addresses.
///
/// Uppercases, turns every run of characters outside `A-Z0-9` into a single
/// space, and trims. Missing input yields the empty key, which never matches
/// anything downstream.
pub fn normalize_text(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let upper = value.to_uppercase();
    let mut out = String::with_capacity(upper.len());
    let mut pending_space = false;

    for c in upper.chars() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// A five-digit ZIP code. The only constructor is [`to_zip5`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Zip5(String);

impl Zip5 {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zip5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a [`Zip5`] from a raw ZIP value.
///
/// Non-digits are stripped, the first five digits kept, and shorter values
/// left-padded with zeros (`"501"` becomes `"00501"`, which restores ZIPs that
/// lost their leading zeros in a numeric round trip). Returns `None` when no
/// digit is present.
pub fn to_zip5(value: Option<&str>) -> Option<Zip5> {
    let digits: String = value?
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(5)
        .collect();

    if digits.is_empty() {
        return None;
    }

    Some(Zip5(format!("{digits:0>5}")))
}
