//! Flat string property maps handed to checks by the host.

use std::collections::BTreeMap;

/// Check parameters: key to raw string value.
///
/// Built by the host for one invocation and read-only to the check.
pub type PropertyMap = BTreeMap<String, String>;

/// Splits `value` on `delim`, keeping empty fields.
///
/// No trimming is applied: `"a, b"` yields `"a"` and `" b"`, so allow-list
/// entries must match the system strings byte for byte.
#[must_use]
pub fn split_list<'a>(value: &'a str, delim: &str) -> Vec<&'a str> {
    value.split(delim).collect()
}
