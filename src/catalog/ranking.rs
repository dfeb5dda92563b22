use std::collections::BTreeMap;

use serde::Serialize;

use crate::{merge::AggregatedStreet, normalize::StreetType};

use super::RegionCatalog;

/// One row of the length ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedStreet<'a> {
    pub rank: usize, // 1-based
    pub street: &'a AggregatedStreet,
}

impl RankedStreet<'_> {
    #[inline] pub fn name(&self) -> &str { self.street.canonical_name() }

    #[inline] pub fn length_km(&self) -> f64 { self.street.length_km() }

    #[inline] pub fn segment_count(&self) -> usize { self.street.segment_count() }
}

/// One row of the occurrence ranking: raw features per canonical name, across street types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceEntry {
    pub rank: usize, // 1-based
    pub name: String,
    pub occurrences: usize,
    pub street_types: Vec<StreetType>, // Distinct, sorted by token
}

impl<'a> RegionCatalog<'a> {
    /// The `n` longest streets: length descending, then canonical name, then street type.
    /// Returns fewer than `n` rows when the region has fewer records.
    pub fn top_n(&self, n: usize) -> Vec<RankedStreet<'a>> {
        let mut streets = self.streets.iter().collect::<Vec<_>>();
        streets.sort_by(|a, b| {
            b.length_m().total_cmp(&a.length_m())
                .then_with(|| a.canonical_name().cmp(b.canonical_name()))
                .then_with(|| a.street_type().to_str().cmp(b.street_type().to_str()))
        });

        streets.into_iter()
            .take(n)
            .enumerate()
            .map(|(i, street)| RankedStreet { rank: i + 1, street })
            .collect()
    }

    /// Number of raw features that carried this exact canonical name, over all street types.
    pub fn occurrence_count(&self, canonical_name: &str) -> usize {
        self.streets.iter()
            .filter(|street| street.canonical_name() == canonical_name)
            .map(|street| street.segment_count())
            .sum()
    }

    /// The `n` most frequent canonical names: occurrences descending, then name ascending.
    pub fn occurrence_ranking(&self, n: usize) -> Vec<OccurrenceEntry> {
        let mut by_name: BTreeMap<&str, (usize, Vec<StreetType>)> = BTreeMap::new();
        for street in self.streets {
            let (occurrences, types) = by_name.entry(street.canonical_name()).or_default();
            *occurrences += street.segment_count();
            if !types.contains(&street.street_type()) { types.push(street.street_type()) }
        }

        let mut entries = by_name.into_iter().collect::<Vec<_>>();
        entries.sort_by(|(a_name, (a, _)), (b_name, (b, _))| b.cmp(a).then_with(|| a_name.cmp(b_name)));

        entries.into_iter()
            .take(n)
            .enumerate()
            .map(|(i, (name, (occurrences, mut street_types)))| {
                street_types.sort_by_key(|ty| ty.to_str());
                OccurrenceEntry { rank: i + 1, name: name.to_string(), occurrences, street_types }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{tests::street, StreetCatalog};
    use crate::normalize::StreetType;

    #[test]
    fn top_n_breaks_length_ties_alphabetically() {
        let catalog = StreetCatalog::new(vec![
            street("R", "C", StreetType::Rue, 300.0, 1),
            street("R", "D", StreetType::Rue, 100.0, 1),
            street("R", "B", StreetType::Rue, 300.0, 1),
            street("R", "A", StreetType::Rue, 500.0, 1),
        ]);

        let top = catalog.region("R").top_n(3);
        let names = top.iter().map(|row| row.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(top.iter().map(|row| row.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn top_n_returns_fewer_rows_when_sparse() {
        let catalog = StreetCatalog::new(vec![street("R", "A", StreetType::Rue, 500.0, 1)]);

        assert_eq!(catalog.region("R").top_n(10).len(), 1);
        assert!(catalog.region("Elsewhere").top_n(10).is_empty());
        assert!(catalog.region("R").top_n(0).is_empty());
    }

    #[test]
    fn top_n_is_scoped_to_region() {
        let catalog = StreetCatalog::new(vec![
            street("North", "LONG", StreetType::Rue, 9000.0, 1),
            street("South", "SHORT", StreetType::Rue, 10.0, 1),
        ]);

        let top = catalog.region("South").top_n(5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name(), "SHORT");
        assert!((top[0].length_km() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn occurrence_count_sums_segments_over_street_types() {
        let catalog = StreetCatalog::new(vec![
            street("R", "GARE", StreetType::Rue, 100.0, 4),
            street("R", "GARE", StreetType::Avenue, 100.0, 1),
            street("R", "GARENNE", StreetType::Rue, 100.0, 7),
        ]);

        let region = catalog.region("R");
        assert_eq!(region.occurrence_count("GARE"), 5);
        assert_eq!(region.occurrence_count("GARENNE"), 7);
        assert_eq!(region.occurrence_count("PAIX"), 0);
    }

    #[test]
    fn occurrence_ranking_orders_by_count_then_name() {
        let catalog = StreetCatalog::new(vec![
            street("R", "PAIX", StreetType::Rue, 100.0, 2),
            street("R", "GARE", StreetType::Rue, 100.0, 2),
            street("R", "GARE", StreetType::Avenue, 100.0, 1),
            street("R", "EGLISE", StreetType::Place, 100.0, 2),
            street("R", "MOULIN", StreetType::Chemin, 100.0, 1),
        ]);

        let ranking = catalog.region("R").occurrence_ranking(3);
        let rows = ranking.iter()
            .map(|row| (row.rank, row.name.as_str(), row.occurrences))
            .collect::<Vec<_>>();
        assert_eq!(rows, vec![(1, "GARE", 3), (2, "EGLISE", 2), (3, "PAIX", 2)]);
        assert_eq!(ranking[0].street_types, vec![StreetType::Avenue, StreetType::Rue]);
    }
}
