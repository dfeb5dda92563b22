use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// One source line feature (an OSM way, a shapefile road record, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    name: Option<String>,
    highway_class: String,
    geometry: LineString<f64>, // (lon, lat) in decimal degrees
    source_id: Option<i64>,
    region: Option<String>, // Pre-assigned region label, if the source provides one
}

impl RawFeature {
    /// Create a feature from an optional name, a highway class and a (lon, lat) coordinate sequence.
    pub fn new<I>(name: Option<&str>, highway_class: &str, coords: I) -> Self
    where I: IntoIterator<Item = (f64, f64)> {
        Self {
            name: name.map(str::to_string),
            highway_class: highway_class.to_string(),
            geometry: coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
            source_id: None,
            region: None,
        }
    }

    /// Attach the identifier of the source record (e.g. the OSM way id).
    pub fn with_source_id(mut self, id: i64) -> Self {
        self.source_id = Some(id);
        self
    }

    /// Attach a region label, for batches whose regions are resolved upstream.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    #[inline] pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    #[inline] pub fn highway_class(&self) -> &str { &self.highway_class }

    #[inline] pub fn geometry(&self) -> &LineString<f64> { &self.geometry }

    #[inline] pub fn source_id(&self) -> Option<i64> { self.source_id }

    #[inline] pub fn region(&self) -> Option<&str> { self.region.as_deref() }

    /// A usable polyline needs at least two coordinates.
    #[inline] pub fn has_line_geometry(&self) -> bool { self.geometry.0.len() >= 2 }
}

/// A named administrative boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    name: String,
    boundary: MultiPolygon<f64>,
}

impl Region {
    pub fn new(name: &str, boundary: impl Into<MultiPolygon<f64>>) -> Self {
        Self { name: name.to_string(), boundary: boundary.into() }
    }

    /// Build a single-ring region from a (lon, lat) ring; the ring is closed if needed.
    pub fn from_ring<I>(name: &str, ring: I) -> Self
    where I: IntoIterator<Item = (f64, f64)> {
        let exterior: LineString<f64> = ring.into_iter().map(|(x, y)| Coord { x, y }).collect();
        // Polygon::new closes the exterior ring.
        Self::new(name, Polygon::new(exterior, vec![]))
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn boundary(&self) -> &MultiPolygon<f64> { &self.boundary }
}
