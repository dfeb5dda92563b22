mod fold;
mod grammar;
mod street_type;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub use fold::fold_accents;
pub(crate) use fold::canonical_form;
pub use street_type::StreetType;

/// A raw street name split into its canonical core and its street-type token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedName {
    /// Uppercase, accent-folded, trimmed core; `None` when the input had no name.
    pub canonical_name: Option<String>,
    pub street_type: StreetType,
}

impl NormalizedName {
    /// Result for a missing or non-text name.
    pub fn missing() -> Self {
        Self { canonical_name: None, street_type: StreetType::Unknown }
    }

    /// A name no grammar rule matched; the whole string is the canonical name.
    pub(crate) fn untyped(name: &str) -> Self {
        Self { canonical_name: Some(name.to_string()), street_type: StreetType::Unknown }
    }

    #[inline] pub fn canonical_name(&self) -> Option<&str> { self.canonical_name.as_deref() }

    /// Usable as a grouping key: present and non-empty after trimming.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.canonical_name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }
}

/// Grammar used to split street names. Fixed for a whole pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Locale {
    /// Prefix grammar: `RUE DE LA PAIX` -> (`PAIX`, `RUE`).
    #[default]
    Fr,
    /// Suffix grammar: `HAUPTSTRASSE` -> (`HAUPT`, `STRASSE`).
    De,
}

impl Locale {
    pub fn to_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }

    /// Street-type tokens recognized by this locale's grammar.
    pub fn street_types(&self) -> &'static [StreetType] {
        match self {
            Locale::Fr => &StreetType::FR,
            Locale::De => &StreetType::DE,
        }
    }

    /// Parse a raw street name into (canonical name, street type).
    pub fn normalize(&self, raw: Option<&str>) -> NormalizedName {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else { return NormalizedName::missing() };

        let name = canonical_form(raw);
        match self {
            Locale::Fr => grammar::parse_fr(&name),
            Locale::De => grammar::parse_de(&name),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Locale {
    type Err = PipelineError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "de" => Ok(Locale::De),
            _ => Err(PipelineError::UnsupportedLocale(selector.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = PipelineError;

    fn try_from(selector: String) -> Result<Self, Self::Error> { selector.parse() }
}
