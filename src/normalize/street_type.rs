use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Road-designation token extracted from a street name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreetType {
    // fr prefixes
    Rue,
    Avenue,
    Boulevard,
    Bd,
    Impasse,
    Allee,      // Shared by fr (prefix) and de (suffix)
    Place,
    Chemin,
    Route,
    // de suffixes
    Strasse,
    #[serde(rename = "STR.")]
    Str,
    Weg,
    Platz,
    Gasse,
    Unknown,
}

impl StreetType {
    pub fn to_str(&self) -> &'static str {
        match self {
            StreetType::Rue => "RUE",
            StreetType::Avenue => "AVENUE",
            StreetType::Boulevard => "BOULEVARD",
            StreetType::Bd => "BD",
            StreetType::Impasse => "IMPASSE",
            StreetType::Allee => "ALLEE",
            StreetType::Place => "PLACE",
            StreetType::Chemin => "CHEMIN",
            StreetType::Route => "ROUTE",
            StreetType::Strasse => "STRASSE",
            StreetType::Str => "STR.",
            StreetType::Weg => "WEG",
            StreetType::Platz => "PLATZ",
            StreetType::Gasse => "GASSE",
            StreetType::Unknown => "UNKNOWN",
        }
    }

    /// Prefix tokens of the `fr` grammar, in match order.
    pub const FR: [StreetType; 9] = [
        StreetType::Rue,
        StreetType::Avenue,
        StreetType::Boulevard,
        StreetType::Bd,
        StreetType::Impasse,
        StreetType::Allee,
        StreetType::Place,
        StreetType::Chemin,
        StreetType::Route,
    ];

    /// Suffix tokens of the `de` grammar, in match order.
    pub const DE: [StreetType; 6] = [
        StreetType::Strasse,
        StreetType::Str,
        StreetType::Weg,
        StreetType::Platz,
        StreetType::Allee,
        StreetType::Gasse,
    ];

    #[inline] pub fn is_unknown(&self) -> bool { *self == StreetType::Unknown }
}

impl fmt::Display for StreetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for StreetType {
    type Err = ();

    /// Parse an uppercase token as produced by the grammars; anything else is `Unknown`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(StreetType::FR.iter()
            .chain(StreetType::DE.iter())
            .find(|ty| ty.to_str() == token)
            .copied()
            .unwrap_or(StreetType::Unknown))
    }
}
