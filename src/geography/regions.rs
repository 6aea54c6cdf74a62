//! Coordinate -> region resolution over a fixed bounding-box table
//!
//! Boxes are checked in table order and the first containing box wins, so
//! smaller regions are listed ahead of the larger neighbours that overlap them.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuoteError, Result};

/// Region returned when no bounding box contains the point
pub const DEFAULT_REGION: &str = "Unresolved";

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Within [-90, 90] x [-180, 180] and finite
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Inclusive bounding box for one named region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub region: String,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl RegionBounds {
    pub fn contains(&self, point: &Coordinates) -> bool {
        point.latitude >= self.south
            && point.latitude <= self.north
            && point.longitude >= self.west
            && point.longitude <= self.east
    }
}

/// Outcome of a region lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegion<'a> {
    pub name: &'a str,
    /// True when no box matched and [`DEFAULT_REGION`] was returned
    pub is_fallback: bool,
}

// (region, north, south, east, west), smallest boxes first
const US_STATE_BOUNDS: &[(&str, f64, f64, f64, f64)] = &[
    ("District of Columbia", 38.995, 38.792, -76.909, -77.120),
    ("Rhode Island", 42.019, 41.146, -71.120, -71.862),
    ("Delaware", 39.839, 38.451, -75.049, -75.789),
    ("Connecticut", 42.051, 40.950, -71.787, -73.728),
    ("New Jersey", 41.357, 38.929, -73.894, -75.560),
    ("Hawaii", 22.236, 18.910, -154.807, -160.247),
    ("Massachusetts", 42.887, 41.187, -69.929, -73.508),
    ("New Hampshire", 45.305, 42.697, -70.610, -72.557),
    ("Vermont", 45.017, 42.727, -71.465, -73.438),
    ("Maryland", 39.723, 37.912, -75.049, -79.488),
    ("West Virginia", 40.638, 37.202, -77.719, -82.644),
    ("South Carolina", 35.215, 32.035, -78.542, -83.354),
    ("Indiana", 41.761, 37.772, -84.785, -88.098),
    ("Maine", 47.460, 42.977, -66.950, -71.084),
    ("Tennessee", 36.678, 34.983, -81.647, -90.310),
    ("Ohio", 41.978, 38.403, -80.519, -84.820),
    ("Pennsylvania", 42.270, 39.720, -74.690, -80.520),
    ("Kentucky", 39.147, 36.497, -81.965, -89.571),
    ("Mississippi", 34.996, 30.174, -88.098, -91.655),
    ("Virginia", 39.466, 36.541, -75.242, -83.675),
    ("Alabama", 35.008, 30.144, -84.889, -88.473),
    ("Louisiana", 33.019, 28.928, -88.817, -94.043),
    ("Arkansas", 36.500, 33.004, -89.644, -94.618),
    ("Iowa", 43.501, 40.375, -90.140, -96.640),
    ("North Carolina", 36.588, 33.842, -75.460, -84.322),
    ("Illinois", 42.508, 36.970, -87.495, -91.513),
    ("New York", 45.016, 40.496, -71.856, -79.762),
    ("Georgia", 35.001, 30.358, -80.840, -85.605),
    ("Wisconsin", 47.080, 42.492, -86.805, -92.889),
    ("Missouri", 40.613, 35.996, -89.099, -95.774),
    ("North Dakota", 49.001, 45.935, -96.554, -104.049),
    ("Florida", 31.001, 24.523, -80.031, -87.635),
    ("South Dakota", 45.945, 42.480, -96.436, -104.058),
    ("Nebraska", 43.002, 39.999, -95.308, -104.053),
    ("Kansas", 40.003, 36.993, -94.588, -102.052),
    ("Oklahoma", 37.002, 33.616, -94.431, -103.002),
    ("Washington", 49.002, 45.544, -116.916, -124.763),
    ("Colorado", 41.003, 36.993, -102.042, -109.060),
    ("Utah", 42.002, 36.998, -109.041, -114.053),
    ("Wyoming", 45.006, 40.995, -104.052, -111.057),
    ("Michigan", 48.306, 41.696, -82.413, -90.418),
    ("Oregon", 46.292, 41.992, -116.464, -124.566),
    ("Minnesota", 49.384, 43.499, -89.492, -97.239),
    ("New Mexico", 37.000, 31.332, -103.002, -109.050),
    ("Arizona", 37.004, 31.332, -109.045, -114.818),
    ("Idaho", 49.001, 41.988, -111.044, -117.243),
    ("Nevada", 42.002, 35.002, -114.040, -120.006),
    ("Montana", 49.001, 44.358, -104.040, -116.050),
    ("California", 42.009, 32.534, -114.131, -124.410),
    ("Texas", 36.501, 25.837, -93.508, -106.646),
    ("Alaska", 71.538, 51.214, -129.979, -179.149),
];

/// Ordered, immutable table of region bounding boxes
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<RegionBounds>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::us_states()
    }
}

impl RegionTable {
    /// Built-in table of US state (and DC) bounding boxes
    pub fn us_states() -> Self {
        let regions = US_STATE_BOUNDS
            .iter()
            .map(|&(region, north, south, east, west)| RegionBounds {
                region: region.to_string(),
                north,
                south,
                east,
                west,
            })
            .collect();
        Self { regions }
    }

    /// Build a table from boxes in the order they should be checked
    pub fn from_bounds(regions: Vec<RegionBounds>) -> Result<Self> {
        for b in &regions {
            let finite = [b.north, b.south, b.east, b.west].iter().all(|v| v.is_finite());
            if !finite || b.south > b.north || b.west > b.east {
                return Err(QuoteError::Table {
                    table: "region_bounds".to_string(),
                    reason: format!("degenerate bounding box for {}", b.region),
                });
            }
        }
        Ok(Self { regions })
    }

    /// Load `region,north,south,east,west` rows, preserving file order
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);
        let mut regions = Vec::new();
        for row in reader.deserialize() {
            let bounds: RegionBounds = row?;
            regions.push(bounds);
        }
        Self::from_bounds(regions)
    }

    /// First box containing the point, in table order
    pub fn lookup(&self, point: &Coordinates) -> Option<&RegionBounds> {
        self.regions.iter().find(|b| b.contains(point))
    }

    /// Region name for a point; never fails, falls back to [`DEFAULT_REGION`]
    pub fn resolve(&self, point: &Coordinates) -> ResolvedRegion<'_> {
        match self.lookup(point) {
            Some(bounds) => ResolvedRegion {
                name: &bounds.region,
                is_fallback: false,
            },
            None => ResolvedRegion {
                name: DEFAULT_REGION,
                is_fallback: true,
            },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionBounds> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
