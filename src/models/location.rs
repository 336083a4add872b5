use serde::{Deserialize, Serialize};

use crate::models::worker::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceName {
    pub city: String,
    pub area: String,
    pub country: String,
}

impl PlaceName {
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            area: "Unknown".to_string(),
            country: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub area: String,
    pub country: String,
}

impl UserLocation {
    pub fn new(point: GeoPoint, place: PlaceName) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            city: place.city,
            area: place.area,
            country: place.country,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}
