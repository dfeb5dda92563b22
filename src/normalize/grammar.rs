use std::sync::LazyLock;

use regex::Regex;

use super::{NormalizedName, StreetType};

/// `[TYPE] [LINK]? [CORE]`, anchored at the start.
static FR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(RUE|AVENUE|BOULEVARD|BD|IMPASSE|ALLEE|PLACE|CHEMIN|ROUTE)\s+(?:D['’]|DE\s+LA\s+|DU\s+|DES\s+|DE\s+)?")
        .expect("fr street grammar is a valid regex")
});

/// `[CORE][TYPE]`, anchored at the end; the type may be glued to the core.
static DE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(STRASSE|STR\.|WEG|PLATZ|ALLEE|GASSE)$")
        .expect("de street grammar is a valid regex")
});

/// Parse an already canonicalized (uppercase, folded, trimmed) name with the `fr` grammar.
pub(super) fn parse_fr(name: &str) -> NormalizedName {
    let Some(caps) = FR_PREFIX.captures(name) else { return NormalizedName::untyped(name) };

    let (Some(prefix), Some(token)) = (caps.get(0), caps.get(1)) else {
        return NormalizedName::untyped(name)
    };

    NormalizedName {
        canonical_name: Some(name[prefix.end()..].trim().to_string()),
        street_type: token.as_str().parse().unwrap_or(StreetType::Unknown),
    }
}

/// Parse an already canonicalized (uppercase, folded, trimmed) name with the `de` grammar.
pub(super) fn parse_de(name: &str) -> NormalizedName {
    let Some(caps) = DE_SUFFIX.captures(name) else { return NormalizedName::untyped(name) };

    let (Some(core), Some(token)) = (caps.get(1), caps.get(2)) else {
        return NormalizedName::untyped(name)
    };

    NormalizedName {
        canonical_name: Some(core.as_str().trim().to_string()),
        street_type: token.as_str().parse().unwrap_or(StreetType::Unknown),
    }
}
