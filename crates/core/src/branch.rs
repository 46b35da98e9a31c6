//! Outlets: own branches, third-party listings and ranked nearby options

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Shift by a degree offset
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self::new(self.lat + dlat, self.lon + dlon)
    }
}

fn default_active() -> bool {
    true
}

/// An own service outlet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub phone: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Where a third-party listing sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingPosition {
    Fixed { lat: f64, lon: f64 },
    /// Degrees relative to the searched point
    Offset { dlat: f64, dlon: f64 },
}

impl ListingPosition {
    pub fn resolve(&self, origin: GeoPoint) -> GeoPoint {
        match *self {
            ListingPosition::Fixed { lat, lon } => GeoPoint::new(lat, lon),
            ListingPosition::Offset { dlat, dlon } => origin.offset(dlat, dlon),
        }
    }
}

/// A restaurant we do not operate, shown for information only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyListing {
    pub name: String,
    pub cuisine: String,
    pub address: String,
    pub phone: String,
    pub position: ListingPosition,
}

/// Tag on a ranked nearby option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutletKind {
    OwnBranch,
    ThirdParty,
}

/// One entry of a distance-ranked outlet list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyOption {
    pub kind: OutletKind,
    /// Set for own branches
    pub branch_id: Option<u32>,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Set for third-party listings
    pub cuisine: Option<String>,
    pub location: GeoPoint,
    pub distance_km: f64,
}

impl NearbyOption {
    pub fn is_own_branch(&self) -> bool {
        self.kind == OutletKind::OwnBranch
    }
}
