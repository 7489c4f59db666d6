//! Pluggable routing providers: trait abstraction for ETA backends.
//!
//! The provider is stored as a `Box<dyn RoutingProvider>` ECS resource,
//! constructed from [`RoutingProviderKind`] at scenario build time. When the
//! provider is absent or fails, the tracker substitutes the distance-based
//! fallback formula below; provider failure is never fatal to the session.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::session::TrafficLevel;

/// Result of a route query between two coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEstimate {
    /// Travel time in minutes, with live traffic where the backend has it.
    pub eta_minutes: f64,
    /// Lat/lng waypoints along the road (two endpoints for synthetic routes).
    pub path: Vec<Coordinates>,
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can be stored as a shared ECS resource.
pub trait RoutingProvider: Send + Sync {
    /// Compute a route. Returns `None` if the backend is unavailable or has
    /// no route; the caller falls back to the distance formula.
    fn route(&self, from: Coordinates, to: Coordinates) -> Option<RouteEstimate>;
}

#[derive(Resource)]
pub struct RoutingProviderResource(pub Box<dyn RoutingProvider>);

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RoutingProviderKind {
    /// No provider wired in; every query fails over to the fallback formula.
    #[default]
    None,
    /// Constant ETA regardless of endpoints. Useful in tests and demos.
    Fixed { eta_minutes: f64 },
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Provider that is never available.
pub struct UnroutedProvider;

impl RoutingProvider for UnroutedProvider {
    fn route(&self, _from: Coordinates, _to: Coordinates) -> Option<RouteEstimate> {
        None
    }
}

/// Constant-ETA provider with a straight two-point path.
pub struct FixedRouteProvider {
    pub eta_minutes: f64,
}

impl RoutingProvider for FixedRouteProvider {
    fn route(&self, from: Coordinates, to: Coordinates) -> Option<RouteEstimate> {
        Some(RouteEstimate {
            eta_minutes: self.eta_minutes,
            path: vec![from, to],
        })
    }
}

#[cfg(feature = "osrm")]
pub mod osrm {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Routes via an OSRM HTTP endpoint.
    pub struct OsrmRoutingProvider {
        client: Client,
        endpoint: String,
    }

    impl OsrmRoutingProvider {
        pub fn new(endpoint: &str) -> Self {
            let client = Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            }
        }
    }

    /// Minimal OSRM JSON response structures.
    #[derive(Deserialize)]
    struct OsrmResponse {
        code: String,
        routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    struct OsrmRoute {
        duration: f64, // seconds
        geometry: OsrmGeometry,
    }

    #[derive(Deserialize)]
    struct OsrmGeometry {
        coordinates: Vec<Vec<f64>>, // [lng, lat]
    }

    impl RoutingProvider for OsrmRoutingProvider {
        fn route(&self, from: Coordinates, to: Coordinates) -> Option<RouteEstimate> {
            let url = format!(
                "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
                self.endpoint, from.lng, from.lat, to.lng, to.lat,
            );

            let resp: OsrmResponse = match self.client.get(&url).send() {
                Ok(r) => match r.json() {
                    Ok(j) => j,
                    Err(_) => return None,
                },
                Err(_) => return None,
            };

            if resp.code != "Ok" {
                return None;
            }

            let route = resp.routes?.into_iter().next()?;
            let path: Vec<Coordinates> = route
                .geometry
                .coordinates
                .iter()
                .filter(|c| c.len() >= 2)
                .map(|c| Coordinates::new(c[1], c[0])) // OSRM returns [lng, lat]
                .collect();

            Some(RouteEstimate {
                eta_minutes: route.duration / 60.0,
                path,
            })
        }
    }
}

/// Construct a boxed [`RoutingProvider`] from a [`RoutingProviderKind`].
pub fn build_routing_provider(kind: &RoutingProviderKind) -> Box<dyn RoutingProvider> {
    match kind {
        RoutingProviderKind::None => Box::new(UnroutedProvider),
        RoutingProviderKind::Fixed { eta_minutes } => Box::new(FixedRouteProvider {
            eta_minutes: *eta_minutes,
        }),
        #[cfg(feature = "osrm")]
        RoutingProviderKind::Osrm { endpoint } => {
            Box::new(osrm::OsrmRoutingProvider::new(endpoint))
        }
    }
}

/// Ambulance ground speed assumed by the fallback formula: 0.5 km per minute.
pub const FALLBACK_KM_PER_MINUTE: f64 = 0.5;

/// Distance-based ETA used when no routing provider result is available:
/// `ceil(distance_km / 0.5) * traffic_multiplier`.
pub fn fallback_eta_minutes(distance_km: f64, traffic: TrafficLevel) -> f64 {
    (distance_km / FALLBACK_KM_PER_MINUTE).ceil() * traffic.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_formula_scales_with_traffic() {
        assert_eq!(fallback_eta_minutes(2.0, TrafficLevel::Light), 4.0);
        assert_eq!(fallback_eta_minutes(2.1, TrafficLevel::Light), 5.0);
        assert!((fallback_eta_minutes(2.0, TrafficLevel::Moderate) - 5.2).abs() < 1e-9);
        assert!((fallback_eta_minutes(2.0, TrafficLevel::Heavy) - 7.2).abs() < 1e-9);
    }

    #[test]
    fn unrouted_provider_always_fails_over() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 1.0);
        assert!(UnroutedProvider.route(a, b).is_none());
    }

    #[test]
    fn fixed_provider_returns_constant_eta() {
        let a = Coordinates::new(52.52, 13.40);
        let b = Coordinates::new(52.53, 13.38);
        let estimate = FixedRouteProvider { eta_minutes: 6.5 }
            .route(a, b)
            .expect("route");
        assert_eq!(estimate.eta_minutes, 6.5);
        assert_eq!(estimate.path, vec![a, b]);
    }

    #[test]
    fn factory_builds_requested_kind() {
        let provider = build_routing_provider(&RoutingProviderKind::Fixed { eta_minutes: 3.0 });
        let estimate = provider
            .route(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 0.1))
            .expect("route");
        assert_eq!(estimate.eta_minutes, 3.0);

        let provider = build_routing_provider(&RoutingProviderKind::None);
        assert!(provider
            .route(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 0.1))
            .is_none());
    }
}
