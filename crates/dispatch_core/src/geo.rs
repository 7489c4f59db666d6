//! Coordinates, Haversine distance and the geolocation collaborator seam.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    6371.0 * c
}

/// Supplies the requester's current position. When no position is available
/// the tracker falls back to the distance-based ETA formula and percent-based
/// synthetic progress.
pub trait GeolocationProvider: Send + Sync {
    fn current_position(&self) -> Option<Coordinates>;
}

#[derive(bevy_ecs::prelude::Resource)]
pub struct GeolocationResource(pub Box<dyn GeolocationProvider>);

/// Always reports the same position.
pub struct FixedGeolocation(pub Coordinates);

impl GeolocationProvider for FixedGeolocation {
    fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}

/// Geolocation denied or unavailable.
pub struct NoGeolocation;

impl GeolocationProvider for NoGeolocation {
    fn current_position(&self) -> Option<Coordinates> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = Coordinates::new(52.52, 13.405);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn haversine_one_degree_longitude_at_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        let d = haversine_km(a, b);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = Coordinates::new(52.52, 13.405);
        let b = Coordinates::new(52.50, 13.37);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn providers_report_presence() {
        let fixed = FixedGeolocation(Coordinates::new(1.0, 2.0));
        assert_eq!(fixed.current_position(), Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(NoGeolocation.current_position(), None);
    }
}
