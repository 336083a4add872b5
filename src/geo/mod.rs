use serde::Serialize;

use crate::models::worker::{GeoPoint, Worker};

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub trait Locatable {
    fn position(&self) -> GeoPoint;
}

impl Locatable for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

impl Locatable for Worker {
    fn position(&self) -> GeoPoint {
        self.location
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WithDistance<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_km: f64,
    pub distance_label: String,
}

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Great-circle distance rounded to the nearest 0.1 km. This is the distance
/// contract every search result and radius check is expressed in.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (haversine_km(a, b) * 10.0).round() / 10.0
}

pub fn annotate<T: Locatable>(items: Vec<T>, origin: &GeoPoint) -> Vec<WithDistance<T>> {
    items
        .into_iter()
        .map(|item| {
            let distance = distance_km(origin, &item.position());
            WithDistance {
                item,
                distance_km: distance,
                distance_label: format_distance(distance),
            }
        })
        .collect()
}

pub fn sort_by_distance<T: Locatable>(items: Vec<T>, origin: &GeoPoint) -> Vec<WithDistance<T>> {
    let mut annotated = annotate(items, origin);
    // Vec::sort_by is stable: equal distances keep their input order.
    annotated.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    annotated
}

pub fn filter_by_radius<T: Locatable>(
    items: Vec<T>,
    origin: &GeoPoint,
    radius_km: f64,
) -> Vec<WithDistance<T>> {
    // Inclusive boundary, input order preserved: annotate-then-filter.
    annotate(items, origin)
        .into_iter()
        .filter(|entry| entry.distance_km <= radius_km)
        .collect()
}

pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m away", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1} km away")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        distance_km, filter_by_radius, format_distance, haversine_km, Locatable, sort_by_distance,
    };
    use crate::models::worker::GeoPoint;

    impl Locatable for (&'static str, GeoPoint) {
        fn position(&self) -> GeoPoint {
            self.1
        }
    }

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = point(19.0760, 72.8777);
        assert!(haversine_km(&p, &p) < 1e-9);
        assert_eq!(distance_km(&p, &p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let mumbai = point(19.0760, 72.8777);
        let pune = point(18.5204, 73.8567);
        assert_eq!(distance_km(&mumbai, &pune), distance_km(&pune, &mumbai));
    }

    #[test]
    fn mumbai_to_delhi_is_around_1150_km() {
        let mumbai = point(19.0760, 72.8777);
        let delhi = point(28.7041, 77.1025);
        let distance = distance_km(&mumbai, &delhi);
        assert!((1150.0..=1160.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn sort_is_ascending_and_stable_for_ties() {
        let origin = point(0.0, 0.0);
        // Offsets chosen so the rounded distances come out [5.6, 2.2, 7.8, 2.2].
        let items = vec![
            ("a", point(0.0, 0.05)),
            ("b", point(0.0, 0.02)),
            ("c", point(0.0, 0.07)),
            ("d", point(0.02, 0.0)),
        ];

        let sorted = sort_by_distance(items, &origin);
        let order: Vec<&str> = sorted.iter().map(|e| e.item.0).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);

        let distances: Vec<f64> = sorted.iter().map(|e| e.distance_km).collect();
        assert_eq!(distances[0], distances[1]);
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let origin = point(0.0, 0.0);
        let near = point(0.0, 0.02);
        let far = point(0.0, 0.04);

        let boundary = distance_km(&origin, &near);
        let kept = filter_by_radius(vec![near, far], &origin, boundary);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].distance_km, boundary);

        let excluded = filter_by_radius(vec![far], &origin, boundary);
        assert!(excluded.is_empty());
    }

    #[test]
    fn radius_filter_preserves_input_order() {
        let origin = point(0.0, 0.0);
        let items = vec![
            ("far", point(0.0, 0.05)),
            ("near", point(0.0, 0.01)),
            ("mid", point(0.0, 0.03)),
        ];

        let kept = filter_by_radius(items, &origin, 10.0);
        let order: Vec<&str> = kept.iter().map(|e| e.item.0).collect();
        assert_eq!(order, vec!["far", "near", "mid"]);
    }

    #[test]
    fn format_distance_switches_units_at_one_km() {
        assert_eq!(format_distance(0.999), "999 m away");
        assert_eq!(format_distance(1.0), "1.0 km away");
        assert_eq!(format_distance(0.4), "400 m away");
        assert_eq!(format_distance(12.35), "12.3 km away");
    }
}
