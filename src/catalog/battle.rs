use serde::Serialize;

use crate::normalize::canonical_form;

use super::RegionCatalog;

/// One contender of a battle, with its aggregated metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleEntry {
    pub rank: usize, // 1-based
    pub name: String, // As given by the caller
    pub matched: usize, // Number of catalog records matched
    pub length_km: f64,
    pub segments: usize,
    pub score: f64, // length_km * segments
}

impl RegionCatalog<'_> {
    /// Compare candidate names within this region.
    ///
    /// Each name matches every record whose canonical name contains it as a substring,
    /// ignoring case and accents. Matched lengths and segment counts are summed and
    /// scored as `length_km * segments`. Rows are ranked by score descending; ties keep
    /// input order. Names without matches score zero and are still ranked.
    pub fn battle<S: AsRef<str>>(&self, names: &[S]) -> Vec<BattleEntry> {
        let mut entries = names.iter()
            .map(|name| self.contender(name.as_ref()))
            .collect::<Vec<_>>();

        // Stable sort: equal scores stay in input order.
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        entries
    }

    /// Unranked metrics for a single candidate name.
    fn contender(&self, name: &str) -> BattleEntry {
        let needle = canonical_form(name);

        let (matched, length_m, segments) = if needle.is_empty() {
            (0, 0.0, 0)
        } else {
            self.streets.iter()
                .filter(|street| street.canonical_name().contains(needle.as_str()))
                .fold((0, 0.0, 0), |(matched, length_m, segments), street| {
                    (matched + 1, length_m + street.length_m(), segments + street.segment_count())
                })
        };

        let length_km = length_m / 1000.0;
        BattleEntry {
            rank: 0,
            name: name.to_string(),
            matched,
            length_km,
            segments,
            score: length_km * segments as f64,
        }
    }
}
