use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::haversine_km;
use crate::models::location::PlaceName;
use crate::models::worker::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Resolves coordinates to address components. `Ok(None)` means the provider
/// answered but had no usable result; `Err` means the call itself failed.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    fn name(&self) -> &'static str;
    async fn reverse(&self, point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError>;
}

/// Device geolocation collaborator: permission dialog plus GPS fix.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn request_permission(&self) -> Result<bool, PositionError>;
    async fn current_position(&self) -> Result<GeoPoint, PositionError>;
}

/// Network tier: OpenStreetMap Nominatim reverse endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("worker-discovery/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn reverse(&self, point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", point.lat.to_string()),
                ("lon", point.lng.to_string()),
            ])
            .send()
            .await
            .map_err(|err| GeocodeError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Request(format!(
                "nominatim returned {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|err| GeocodeError::Request(err.to_string()))?;

        let Some(address) = body.address else {
            return Ok(None);
        };

        let city = address.city.or(address.town).or(address.village);
        let Some(city) = city else {
            return Ok(None);
        };

        Ok(Some(PlaceName {
            city,
            area: address
                .suburb
                .or(address.neighbourhood)
                .or(address.state)
                .unwrap_or_default(),
            country: address.country.unwrap_or_default(),
        }))
    }
}

struct GazetteerEntry {
    city: &'static str,
    area: &'static str,
    country: &'static str,
    lat: f64,
    lng: f64,
}

const GAZETTEER: &[GazetteerEntry] = &[
    GazetteerEntry { city: "Mumbai", area: "Maharashtra", country: "India", lat: 19.0760, lng: 72.8777 },
    GazetteerEntry { city: "Delhi", area: "Delhi", country: "India", lat: 28.7041, lng: 77.1025 },
    GazetteerEntry { city: "Bengaluru", area: "Karnataka", country: "India", lat: 12.9716, lng: 77.5946 },
    GazetteerEntry { city: "Hyderabad", area: "Telangana", country: "India", lat: 17.3850, lng: 78.4867 },
    GazetteerEntry { city: "Chennai", area: "Tamil Nadu", country: "India", lat: 13.0827, lng: 80.2707 },
    GazetteerEntry { city: "Kolkata", area: "West Bengal", country: "India", lat: 22.5726, lng: 88.3639 },
    GazetteerEntry { city: "Pune", area: "Maharashtra", country: "India", lat: 18.5204, lng: 73.8567 },
    GazetteerEntry { city: "Ahmedabad", area: "Gujarat", country: "India", lat: 23.0225, lng: 72.5714 },
    GazetteerEntry { city: "Jaipur", area: "Rajasthan", country: "India", lat: 26.9124, lng: 75.7873 },
    GazetteerEntry { city: "Lucknow", area: "Uttar Pradesh", country: "India", lat: 26.8467, lng: 80.9462 },
    GazetteerEntry { city: "London", area: "England", country: "United Kingdom", lat: 51.5074, lng: -0.1278 },
    GazetteerEntry { city: "New York", area: "New York", country: "United States", lat: 40.7128, lng: -74.0060 },
    GazetteerEntry { city: "Singapore", area: "Singapore", country: "Singapore", lat: 1.3521, lng: 103.8198 },
    GazetteerEntry { city: "Dubai", area: "Dubai", country: "United Arab Emirates", lat: 25.2048, lng: 55.2708 },
];

/// On-device tier: nearest entry of a built-in city table. Coarser than the
/// network tier but never fails.
pub struct GazetteerGeocoder;

#[async_trait]
impl ReverseGeocoder for GazetteerGeocoder {
    fn name(&self) -> &'static str {
        "gazetteer"
    }

    async fn reverse(&self, point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError> {
        let nearest = GAZETTEER.iter().min_by(|a, b| {
            let da = haversine_km(point, &GeoPoint { lat: a.lat, lng: a.lng });
            let db = haversine_km(point, &GeoPoint { lat: b.lat, lng: b.lng });
            da.total_cmp(&db)
        });

        Ok(nearest.map(|entry| PlaceName {
            city: entry.city.to_string(),
            area: entry.area.to_string(),
            country: entry.country.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{GazetteerGeocoder, ReverseGeocoder};
    use crate::models::worker::GeoPoint;

    #[tokio::test]
    async fn gazetteer_picks_nearest_city() {
        let geocoder = GazetteerGeocoder;

        // A point in south Mumbai, well inside Maharashtra.
        let place = geocoder
            .reverse(&GeoPoint { lat: 18.93, lng: 72.83 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(place.city, "Mumbai");
        assert_eq!(place.country, "India");

        let place = geocoder
            .reverse(&GeoPoint { lat: 51.50, lng: -0.12 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(place.city, "London");
    }
}
