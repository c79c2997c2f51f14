use serde::{Deserialize, Serialize};
pub use serde_with;

pub mod coordinate;
pub mod delivery;
pub mod route;

pub use coordinate::{Coordinate, CoordinateError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithDistance<T> {
    pub distance_km: f64,
    #[serde(flatten)]
    pub content: T,
}

impl<T> WithDistance<T> {
    pub fn new(distance_km: f64, content: T) -> Self {
        Self {
            distance_km,
            content,
        }
    }
}
