//! CURIE parsing and ID-format validation (spec §4.4).
//!
//! Validation always runs before any network call: an invalid id is
//! reported as `invalid_id`, never as `not_found` (spec §8 invariant 7).

use std::sync::LazyLock;

use regex::Regex;

static CURIE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*):(.+)$").expect("static regex is valid"));

/// A parsed `PREFIX:LOCAL` compact URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Curie {
    pub prefix: String,
    pub local: String,
}

impl Curie {
    /// Parse `PREFIX:LOCAL`. Does not validate the local part's shape; use
    /// [`Self::validate`] for that.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = CURIE_SHAPE.captures(s)?;
        Some(Self {
            prefix: caps[1].to_string(),
            local: caps[2].to_string(),
        })
    }

    /// CHEBI-specific validation (spec §4.4, §8 invariant 7): the local part
    /// must be numeric and in `[1, 9_999_999]`. Seven digits is flagged
    /// suspicious (not in itself invalid); eight or more digits is rejected
    /// outright. Non-CHEBI prefixes are only checked for well-formedness.
    pub fn validate(&self) -> CurieValidity {
        if self.prefix.eq_ignore_ascii_case("CHEBI") {
            if !self.local.chars().all(|c| c.is_ascii_digit()) {
                return CurieValidity::Invalid;
            }
            if self.local.len() >= 8 {
                return CurieValidity::Invalid;
            }
            let Ok(n) = self.local.parse::<u64>() else {
                return CurieValidity::Invalid;
            };
            if n == 0 || n > 9_999_999 {
                return CurieValidity::Invalid;
            }
            if self.local.len() >= 7 {
                return CurieValidity::Suspicious;
            }
            return CurieValidity::Valid;
        }
        if self.local.is_empty() {
            return CurieValidity::Invalid;
        }
        CurieValidity::Valid
    }

    pub fn to_string_curie(&self) -> String {
        format!("{}:{}", self.prefix, self.local)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CurieValidity {
    Valid,
    /// Well-formed but unusually large; not rejected outright (spec §4.4).
    Suspicious,
    Invalid,
}

impl CurieValidity {
    pub const fn is_valid_for_network(self) -> bool {
        matches!(self, Self::Valid | Self::Suspicious)
    }
}
