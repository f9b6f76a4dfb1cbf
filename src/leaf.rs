//! Leaf key modifiers.
//!
//! A leaf key carries more than its name: a `+` marks the value as numeric
//! and a `?` separates the name from a default value. `retries+?3` is the
//! numeric leaf `retries` defaulting to `3`.

const NUMBER_MARKER: char = '+';
const DEFAULT_SEPARATOR: char = '?';

/// A leaf key with its modifiers split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafKey {
    /// Name used in the persisted tree and for the environment variable.
    pub name: String,
    pub is_number: bool,
    pub default_value: Option<String>,
}

impl LeafKey {
    /// Parse a raw declaration key.
    ///
    /// The number marker is checked first and only its first occurrence is
    /// removed. The remainder is split into at most two parts on the first
    /// `?`, so `a?b?c` defaults to `b?c`. An empty default counts as none.
    pub fn parse(raw: &str) -> Self {
        let is_number = raw.contains(NUMBER_MARKER);
        let stripped = if is_number {
            raw.replacen(NUMBER_MARKER, "", 1)
        } else {
            raw.to_string()
        };

        match stripped.split_once(DEFAULT_SEPARATOR) {
            Some((name, default)) => Self {
                name: name.to_string(),
                is_number,
                default_value: (!default.is_empty()).then(|| default.to_string()),
            },
            None => Self {
                name: stripped,
                is_number,
                default_value: None,
            },
        }
    }
}
