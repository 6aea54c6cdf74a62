//! Geography lookups: coordinates to region, region to escalator rate

mod escalator;
mod regions;

pub use escalator::{normalize_region, EscalatorTable};
pub use regions::{Coordinates, RegionBounds, RegionTable, ResolvedRegion, DEFAULT_REGION};
