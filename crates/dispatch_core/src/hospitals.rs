//! Hospital data and the directory collaborator seam.
//!
//! The directory supplies a distance-ordered list of candidate hospitals,
//! either from a live nearby-search or the static fallback below. Dispatch
//! always targets the first entry; an empty list is fatal to the session.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    pub position: Coordinates,
    pub distance_km: f64,
    pub category: String,
    pub phone: Option<String>,
}

pub trait HospitalDirectory: Send + Sync {
    /// Candidate hospitals ordered by distance, nearest first.
    fn nearby(&self) -> Vec<Hospital>;
}

#[derive(Resource)]
pub struct HospitalDirectoryResource(pub Box<dyn HospitalDirectory>);

/// Static fallback directory used when no live nearby-search is wired in.
pub struct StaticHospitalDirectory {
    hospitals: Vec<Hospital>,
}

impl StaticHospitalDirectory {
    pub fn new(mut hospitals: Vec<Hospital>) -> Self {
        hospitals.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { hospitals }
    }

    pub fn empty() -> Self {
        Self {
            hospitals: Vec::new(),
        }
    }

    /// Default Berlin list, nearest first.
    pub fn berlin_defaults() -> Self {
        Self::new(vec![
            Hospital {
                name: "Charite Campus Mitte".to_string(),
                address: "Charitepl. 1, 10117 Berlin".to_string(),
                position: Coordinates::new(52.5273, 13.3790),
                distance_km: 2.1,
                category: "university hospital".to_string(),
                phone: Some("+49 30 450 50".to_string()),
            },
            Hospital {
                name: "Vivantes Klinikum Am Urban".to_string(),
                address: "Dieffenbachstr. 1, 10967 Berlin".to_string(),
                position: Coordinates::new(52.4906, 13.4060),
                distance_km: 3.4,
                category: "general hospital".to_string(),
                phone: Some("+49 30 130 210".to_string()),
            },
            Hospital {
                name: "St. Hedwig-Krankenhaus".to_string(),
                address: "Grosse Hamburger Str. 5, 10115 Berlin".to_string(),
                position: Coordinates::new(52.5253, 13.3986),
                distance_km: 4.2,
                category: "general hospital".to_string(),
                phone: None,
            },
        ])
    }
}

impl HospitalDirectory for StaticHospitalDirectory {
    fn nearby(&self) -> Vec<Hospital> {
        self.hospitals.clone()
    }
}
