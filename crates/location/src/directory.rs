//! Own branches and third-party listings, ranked by distance

use order_engine_config::BranchesConfig;
use order_engine_core::{Branch, GeoPoint, NearbyOption, OutletKind, ThirdPartyListing};

use crate::distance::{haversine_km, round_km};

/// Outlets known to the engine
#[derive(Debug, Clone, Default)]
pub struct BranchDirectory {
    branches: Vec<Branch>,
    third_party: Vec<ThirdPartyListing>,
}

impl BranchDirectory {
    pub fn new(branches: Vec<Branch>, third_party: Vec<ThirdPartyListing>) -> Self {
        Self {
            branches,
            third_party,
        }
    }

    pub fn from_config(config: &BranchesConfig) -> Self {
        Self::new(config.branches.clone(), config.third_party.clone())
    }

    pub fn active_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(|b| b.active)
    }

    pub fn get(&self, id: u32) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Active branches and listings within `radius_km`, nearest first.
    ///
    /// Distances are rounded to 2 decimals before sorting; equal distances
    /// keep branches ahead of listings.
    pub fn rank_nearby(&self, origin: GeoPoint, radius_km: f64, limit: usize) -> Vec<NearbyOption> {
        let branches = self.active_branches().map(|b| NearbyOption {
            kind: OutletKind::OwnBranch,
            branch_id: Some(b.id),
            name: b.name.clone(),
            address: b.address.clone(),
            phone: b.phone.clone(),
            cuisine: None,
            location: b.location,
            distance_km: round_km(haversine_km(origin, b.location)),
        });

        let listings = self.third_party.iter().map(|t| {
            let location = t.position.resolve(origin);
            NearbyOption {
                kind: OutletKind::ThirdParty,
                branch_id: None,
                name: t.name.clone(),
                address: t.address.clone(),
                phone: t.phone.clone(),
                cuisine: Some(t.cuisine.clone()),
                location,
                distance_km: round_km(haversine_km(origin, location)),
            }
        });

        let mut options: Vec<NearbyOption> = branches
            .chain(listings)
            .filter(|o| o.distance_km <= radius_km)
            .collect();
        options.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        options.truncate(limit);
        options
    }

    /// Nearest active branch no farther than `max_km`, with its distance
    pub fn nearest_branch(&self, origin: GeoPoint, max_km: f64) -> Option<(&Branch, f64)> {
        self.active_branches()
            .map(|b| (b, haversine_km(origin, b.location)))
            .filter(|(_, d)| *d <= max_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_engine_core::ListingPosition;

    fn branch(id: u32, lat: f64, lon: f64, active: bool) -> Branch {
        Branch {
            id,
            name: format!("Branch {}", id),
            address: format!("Street {}", id),
            location: GeoPoint::new(lat, lon),
            phone: "+920000000".to_string(),
            active,
        }
    }

    fn listing(name: &str, dlat: f64, dlon: f64) -> ThirdPartyListing {
        ThirdPartyListing {
            name: name.to_string(),
            cuisine: "Pizza".to_string(),
            address: "Nearby Restaurant".to_string(),
            phone: "+92 300".to_string(),
            position: ListingPosition::Offset { dlat, dlon },
        }
    }

    fn directory() -> BranchDirectory {
        BranchDirectory::new(
            vec![
                branch(1, 24.8607, 67.0011, true),
                branch(2, 31.5204, 74.3587, true),
                branch(3, 24.87, 67.01, false),
            ],
            vec![listing("Near", 0.01, 0.01), listing("Far", 0.2, 0.2)],
        )
    }

    #[test]
    fn test_rank_nearby() {
        let origin = GeoPoint::new(24.8607, 67.0011);
        let options = directory().rank_nearby(origin, 10.0, 8);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].branch_id, Some(1));
        assert_eq!(options[0].distance_km, 0.0);
        assert!(options[0].is_own_branch());
        assert_eq!(options[1].name, "Near");
        assert_eq!(options[1].kind, OutletKind::ThirdParty);
    }

    #[test]
    fn test_rank_limit_and_radius() {
        let origin = GeoPoint::new(24.8607, 67.0011);
        assert_eq!(directory().rank_nearby(origin, 10.0, 1).len(), 1);
        assert_eq!(directory().rank_nearby(origin, 100.0, 8).len(), 3);

        let nowhere = GeoPoint::new(0.0, 0.0);
        let options = directory().rank_nearby(nowhere, 10.0, 8);
        assert!(options.iter().all(|o| !o.is_own_branch()));
    }

    #[test]
    fn test_nearest_branch_skips_inactive() {
        let dir = directory();
        let (b, d) = dir.nearest_branch(GeoPoint::new(24.87, 67.01), 50.0).unwrap();
        assert_eq!(b.id, 1);
        assert!(d > 0.0);
        assert!(dir.nearest_branch(GeoPoint::new(0.0, 0.0), 50.0).is_none());
    }
}
