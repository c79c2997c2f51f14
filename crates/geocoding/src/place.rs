use model::Coordinate;
use serde::Deserialize;
use utility::serde::number_or_string;

use crate::{GeocodeResult, ResolvedAddress};

/// One entry of a Nominatim `format=json` search result. Only the fields
/// we read are listed.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub place_id: Option<u64>,
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub lon: f64,
    pub display_name: Option<String>,
}

impl Place {
    pub fn resolved(self) -> GeocodeResult<ResolvedAddress> {
        Ok(ResolvedAddress {
            coordinate: Coordinate::new(self.lat, self.lon)?,
            display_name: self.display_name,
        })
    }
}
