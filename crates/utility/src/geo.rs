pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Approximate box of `radius_km` around a point, returned as
/// `((min_lat, min_lon), (max_lat, max_lon))` in degrees.
pub fn calculate_bounding_box(
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> ((f64, f64), (f64, f64)) {
    let lat_rad = to_radians(lat);
    let lon_rad = to_radians(lon);

    // Latitude bounds
    let min_lat = lat_rad - radius_km / EARTH_RADIUS_KM;
    let max_lat = lat_rad + radius_km / EARTH_RADIUS_KM;

    // Longitude bounds shrink with the cosine of the latitude
    let lon_delta = radius_km / (EARTH_RADIUS_KM * lat_rad.cos());
    let min_lon = lon_rad - lon_delta;
    let max_lon = lon_rad + lon_delta;

    (
        (to_degrees(min_lat), to_degrees(min_lon)),
        (to_degrees(max_lat), to_degrees(max_lon)),
    )
}

/// Great-circle distance in kilometers between two points given in degrees.
///
/// Plain haversine on a sphere of radius [`EARTH_RADIUS_KM`]. There is no
/// input validation: NaN in, NaN out.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lat2_rad = to_radians(latitude_2);

    let dlat = to_radians(latitude_2 - latitude_1);
    let dlon = to_radians(longitude_2 - longitude_1);

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURIER: (f64, f64) = (41.2855, 36.3333);
    const ADDRESS: (f64, f64) = (41.2867, 36.3309);

    #[test]
    fn distance_to_itself_is_zero() {
        for (lat, lon) in [COURIER, ADDRESS, (0.0, 0.0), (-90.0, 180.0)] {
            assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (COURIER, ADDRESS),
            ((52.52, 13.405), (48.8566, 2.3522)),
            ((-33.8688, 151.2093), (40.7128, -74.006)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let there = haversine_distance(lat1, lon1, lat2, lon2);
            let back = haversine_distance(lat2, lon2, lat1, lon1);
            assert!((there - back).abs() < 1e-9, "{there} != {back}");
        }
    }

    #[test]
    fn short_hop_in_samsun() {
        let distance = haversine_distance(COURIER.0, COURIER.1, ADDRESS.0, ADDRESS.1);
        assert!((distance - 0.24).abs() <= 0.05, "got {distance}");
    }

    #[test]
    fn berlin_to_paris() {
        let distance = haversine_distance(52.52, 13.405, 48.8566, 2.3522);
        assert!((distance - 877.5).abs() < 2.0, "got {distance}");
    }

    #[test]
    fn quarter_meridian() {
        let distance = haversine_distance(0.0, 0.0, 90.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((distance - expected).abs() < 1e-6);
    }

    #[test]
    fn nan_propagates() {
        assert!(haversine_distance(f64::NAN, 0.0, 1.0, 1.0).is_nan());
    }

    #[test]
    fn bounding_box_contains_center() {
        let ((min_lat, min_lon), (max_lat, max_lon)) =
            calculate_bounding_box(COURIER.0, COURIER.1, 5.0);
        assert!(min_lat < COURIER.0 && COURIER.0 < max_lat);
        assert!(min_lon < COURIER.1 && COURIER.1 < max_lon);

        // edges sit roughly `radius` away from the center
        let north = haversine_distance(COURIER.0, COURIER.1, max_lat, COURIER.1);
        assert!((north - 5.0).abs() < 0.01, "got {north}");
        let east = haversine_distance(COURIER.0, COURIER.1, COURIER.0, max_lon);
        assert!((east - 5.0).abs() < 0.05, "got {east}");
    }
}
