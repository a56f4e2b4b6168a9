use crate::types::Point;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates via the haversine formula,
/// in kilometres.
#[must_use]
pub fn distance_km(a: Point, b: Point) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = Point { lat: 45.0, lon: 9.0 };
        assert!(distance_km(p, p).abs() < f64::EPSILON);
    }

    #[test]
    fn milan_to_rome_is_plausible() {
        let milan = Point { lat: 45.4642, lon: 9.19 };
        let rome = Point { lat: 41.9028, lon: 12.4964 };
        let d = distance_km(milan, rome);
        // Road distance is ~570 km; great-circle is a bit under 480 km.
        assert!(d > 450.0 && d < 500.0);
    }

    #[test]
    fn one_millidegree_of_latitude_is_about_111_metres() {
        let a = Point { lat: 45.0, lon: 9.0 };
        let b = Point { lat: 45.001, lon: 9.0 };
        let metres = distance_km(a, b) * 1000.0;
        assert!((metres - 111.2).abs() < 0.5);
    }

    #[test]
    fn symmetric_in_its_arguments() {
        let a = Point { lat: 45.0, lon: 9.0 };
        let b = Point { lat: 45.1, lon: 9.1 };
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-12);
    }
}
