pub mod providers;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::location::{PlaceName, UserLocation};
use crate::models::worker::GeoPoint;
use crate::store::{KeyValueStore, LAST_LOCATION_KEY};

use providers::{PositionProvider, ReverseGeocoder};

/// Reference city applied when nothing can be resolved at all.
pub fn default_location() -> UserLocation {
    UserLocation {
        lat: 19.0760,
        lng: 72.8777,
        city: "Mumbai".to_string(),
        area: "Maharashtra".to_string(),
        country: "India".to_string(),
    }
}

pub struct Resolved {
    pub location: UserLocation,
    /// Name of the geocoder tier that answered; `None` when every tier failed
    /// and the place fell back to "Unknown".
    pub source: Option<&'static str>,
}

/// Ordered reverse-geocoding strategies, tried in sequence. The first tier
/// always settles before the next is attempted; the first usable result wins.
pub struct PlaceResolver {
    tiers: Vec<Arc<dyn ReverseGeocoder>>,
}

impl PlaceResolver {
    pub fn new(tiers: Vec<Arc<dyn ReverseGeocoder>>) -> Self {
        Self { tiers }
    }

    pub async fn resolve(&self, point: &GeoPoint) -> Resolved {
        for tier in &self.tiers {
            match tier.reverse(point).await {
                Ok(Some(place)) => {
                    debug!(tier = tier.name(), city = %place.city, "place resolved");
                    return Resolved {
                        location: UserLocation::new(*point, place),
                        source: Some(tier.name()),
                    };
                }
                Ok(None) => {
                    debug!(tier = tier.name(), "geocoder returned no result");
                }
                Err(err) => {
                    warn!(tier = tier.name(), error = %err, "geocoder tier failed");
                }
            }
        }

        // Coordinates still flow through so distance features keep working.
        Resolved {
            location: UserLocation::new(*point, PlaceName::unknown()),
            source: None,
        }
    }
}

/// Device-side location flow: permission, GPS fix, place resolution, and a
/// persisted last-known copy.
pub struct LocationService {
    position: Arc<dyn PositionProvider>,
    resolver: PlaceResolver,
    store: Arc<dyn KeyValueStore>,
}

impl LocationService {
    pub fn new(
        position: Arc<dyn PositionProvider>,
        resolver: PlaceResolver,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            position,
            resolver,
            store,
        }
    }

    /// Denials and provider errors both collapse to `false`.
    pub async fn request_permission(&self) -> bool {
        match self.position.request_permission().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "permission request failed");
                false
            }
        }
    }

    /// `None` when permission is denied or no fix can be obtained. Callers
    /// substitute `default_location()`.
    pub async fn current_location(&self) -> Option<UserLocation> {
        if !self.request_permission().await {
            return None;
        }

        let point = match self.position.current_position().await {
            Ok(point) => point,
            Err(err) => {
                warn!(error = %err, "could not obtain position");
                return None;
            }
        };

        let resolved = self.resolver.resolve(&point).await;

        if let Ok(json) = serde_json::to_string(&resolved.location) {
            if let Err(err) = self.store.set(LAST_LOCATION_KEY, &json).await {
                warn!(error = %err, "failed to persist last location");
            }
        }

        Some(resolved.location)
    }

    pub async fn last_known(&self) -> Option<UserLocation> {
        let raw = self.store.get(LAST_LOCATION_KEY).await.ok()??;
        serde_json::from_str(&raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::providers::{
        GeocodeError, PositionError, PositionProvider, ReverseGeocoder,
    };
    use super::{LocationService, PlaceResolver};
    use crate::models::location::PlaceName;
    use crate::models::worker::GeoPoint;
    use crate::store::{KeyValueStore, MemoryStore};

    struct FailingGeocoder {
        calls: AtomicUsize,
    }

    impl FailingGeocoder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn reverse(&self, _point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GeocodeError::Request("connection refused".to_string()))
        }
    }

    struct EmptyGeocoder;

    #[async_trait]
    impl ReverseGeocoder for EmptyGeocoder {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn reverse(&self, _point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError> {
            Ok(None)
        }
    }

    struct FixedGeocoder {
        city: &'static str,
        calls: AtomicUsize,
    }

    impl FixedGeocoder {
        fn new(city: &'static str) -> Arc<Self> {
            Arc::new(Self {
                city,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn reverse(&self, _point: &GeoPoint) -> Result<Option<PlaceName>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(PlaceName {
                city: self.city.to_string(),
                area: "Test Area".to_string(),
                country: "Testland".to_string(),
            }))
        }
    }

    struct StubPosition {
        granted: bool,
        fix: Option<GeoPoint>,
    }

    #[async_trait]
    impl PositionProvider for StubPosition {
        async fn request_permission(&self) -> Result<bool, PositionError> {
            Ok(self.granted)
        }

        async fn current_position(&self) -> Result<GeoPoint, PositionError> {
            self.fix
                .ok_or_else(|| PositionError::Unavailable("no gps fix".to_string()))
        }
    }

    fn point() -> GeoPoint {
        GeoPoint {
            lat: 19.0760,
            lng: 72.8777,
        }
    }

    #[tokio::test]
    async fn primary_tier_short_circuits_fallback() {
        let primary = FixedGeocoder::new("Mumbai");
        let fallback = FixedGeocoder::new("Pune");
        let resolver = PlaceResolver::new(vec![
            primary.clone() as Arc<dyn ReverseGeocoder>,
            fallback.clone(),
        ]);

        let resolved = resolver.resolve(&point()).await;
        assert_eq!(resolved.location.city, "Mumbai");
        assert_eq!(resolved.source, Some("fixed"));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_primary_falls_back() {
        let primary = FailingGeocoder::new();
        let fallback = FixedGeocoder::new("Pune");
        let resolver = PlaceResolver::new(vec![
            primary.clone() as Arc<dyn ReverseGeocoder>,
            fallback,
        ]);

        let resolved = resolver.resolve(&point()).await;
        assert_eq!(resolved.location.city, "Pune");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_primary_falls_back() {
        let resolver = PlaceResolver::new(vec![
            Arc::new(EmptyGeocoder) as Arc<dyn ReverseGeocoder>,
            FixedGeocoder::new("Delhi"),
        ]);

        let resolved = resolver.resolve(&point()).await;
        assert_eq!(resolved.location.city, "Delhi");
    }

    #[tokio::test]
    async fn all_tiers_failing_yields_unknown_with_coordinates() {
        let resolver = PlaceResolver::new(vec![
            FailingGeocoder::new() as Arc<dyn ReverseGeocoder>,
            Arc::new(EmptyGeocoder),
        ]);

        let resolved = resolver.resolve(&point()).await;
        assert_eq!(resolved.location.city, "Unknown");
        assert_eq!(resolved.location.lat, 19.0760);
        assert_eq!(resolved.location.lng, 72.8777);
        assert!(resolved.source.is_none());
    }

    #[tokio::test]
    async fn permission_denied_yields_none() {
        let service = LocationService::new(
            Arc::new(StubPosition {
                granted: false,
                fix: Some(point()),
            }),
            PlaceResolver::new(vec![FixedGeocoder::new("Mumbai") as Arc<dyn ReverseGeocoder>]),
            Arc::new(MemoryStore::new()),
        );

        assert!(!service.request_permission().await);
        assert!(service.current_location().await.is_none());
    }

    #[tokio::test]
    async fn missing_fix_yields_none() {
        let service = LocationService::new(
            Arc::new(StubPosition {
                granted: true,
                fix: None,
            }),
            PlaceResolver::new(vec![FixedGeocoder::new("Mumbai") as Arc<dyn ReverseGeocoder>]),
            Arc::new(MemoryStore::new()),
        );

        assert!(service.current_location().await.is_none());
    }

    #[tokio::test]
    async fn resolved_location_is_persisted_and_replayable() {
        let store = Arc::new(MemoryStore::new());
        let service = LocationService::new(
            Arc::new(StubPosition {
                granted: true,
                fix: Some(point()),
            }),
            PlaceResolver::new(vec![FixedGeocoder::new("Mumbai") as Arc<dyn ReverseGeocoder>]),
            store.clone(),
        );

        let location = service.current_location().await.unwrap();
        assert_eq!(location.city, "Mumbai");

        let replayed = service.last_known().await.unwrap();
        assert_eq!(replayed, location);
    }
}
