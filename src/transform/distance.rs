use crate::domain::model::StationRecord;
use crate::extract::numeric::round2;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (latitude, longitude) points in degrees.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Sets `distance_km` on every record with parsed coordinates; returns how many.
pub fn apply_distances(records: &mut [StationRecord], reference: (f64, f64)) -> usize {
    let mut computed = 0;
    for record in records.iter_mut() {
        let position = record.coordinates.as_ref().and_then(|c| c.lat_lon());
        record.distance_km = position.map(|p| round2(haversine_km(reference, p)));
        if record.distance_km.is_some() {
            computed += 1;
        } else {
            tracing::debug!("{} ({}): no coordinates for distance", record.station_code, record.year);
        }
    }
    computed
}
