//! "Near location" search.
//!
//! Distances are planar, in degrees: `sqrt(dlat^2 + dlon^2)`. This is only
//! accurate for small radii away from the poles, which is all the map views
//! ask for. The database narrows candidates to a bounding box; the exact
//! radius check runs here.

use sea_orm::{ColumnTrait, Condition};

use crate::entities::properties;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct NearQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in degrees
    pub radius: f64,
}

impl NearQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ApiError::Validation("latitude must be within -90..90".into()));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ApiError::Validation("longitude must be within -180..180".into()));
        }
        if !(self.radius > 0.0) {
            return Err(ApiError::Validation("radius must be positive".into()));
        }
        Ok(())
    }

    /// Bounding-box prefilter on the property coordinates.
    pub fn bounding_box(&self) -> Condition {
        Condition::all()
            .add(properties::Column::Latitude.is_not_null())
            .add(properties::Column::Longitude.is_not_null())
            .add(properties::Column::Latitude.between(self.latitude - self.radius, self.latitude + self.radius))
            .add(properties::Column::Longitude.between(self.longitude - self.radius, self.longitude + self.radius))
    }

    pub fn contains(&self, latitude: Option<f64>, longitude: Option<f64>) -> bool {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => planar_distance(self.latitude, self.longitude, lat, lon) <= self.radius,
            _ => false,
        }
    }
}

pub fn planar_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    ((lat1 - lat2).powi(2) + (lon1 - lon2).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance() {
        assert!((planar_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_of_box_is_outside_radius() {
        let near = NearQuery { latitude: 40.0, longitude: -74.0, radius: 1.0 };
        assert!(near.contains(Some(40.5), Some(-74.5)));
        assert!(!near.contains(Some(40.9), Some(-74.9)));
        assert!(!near.contains(None, Some(-74.0)));
    }

    #[test]
    fn test_validation() {
        let mut near = NearQuery { latitude: 10.0, longitude: 10.0, radius: 0.0 };
        assert!(near.validate().is_err());
        near.radius = 0.5;
        assert!(near.validate().is_ok());
        near.latitude = 91.0;
        assert!(near.validate().is_err());
    }
}
