use crate::errors::{AppError, AppResult};
use serde::Serialize;

/// A WGS 84 coordinate pair. Stored in the DB as two REAL columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> AppResult<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::InvalidCoordinates(format!(
                "latitude {} out of range [-90, 90]",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::InvalidCoordinates(format!(
                "longitude {} out of range [-180, 180]",
                lon
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a "lat,lon" pair as passed on the command line.
    pub fn from_arg(s: &str) -> AppResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(AppError::InvalidCoordinates(format!(
                "expected \"lat,lon\", got {:?}",
                s
            )));
        }
        let lat: f64 = parts[0]
            .parse()
            .map_err(|_| AppError::InvalidCoordinates(format!("bad latitude {:?}", parts[0])))?;
        let lon: f64 = parts[1]
            .parse()
            .map_err(|_| AppError::InvalidCoordinates(format!("bad longitude {:?}", parts[1])))?;
        Self::new(lat, lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}
