use geocoding::GeocoderConfig;
use model::{
    delivery::{DeliveryPoint, DeliverySet},
    Coordinate,
};
use utility::{
    config::{self, ConfigError, Lookup, ProcessEnv},
    id::Id,
};

pub const DEFAULT_COURIER_POSITION: Coordinate = Coordinate {
    latitude: 41.2855,
    longitude: 36.3333,
};

/// The point the planner starts with unless `COURIER_DEMO_SEED=false`.
pub const DEMO_DELIVERY: (&str, Coordinate) = (
    "Adres 1",
    Coordinate {
        latitude: 41.2867,
        longitude: 36.3309,
    },
);

#[derive(Debug, Clone, PartialEq)]
pub struct CourierConfig {
    pub courier: Coordinate,
    pub demo_seed: bool,
    pub geocoder: GeocoderConfig,
}

impl CourierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }

    pub fn from_lookup<L: Lookup + ?Sized>(lookup: &L) -> Result<Self, ConfigError> {
        let latitude = config::or_default(
            lookup,
            "COURIER_LATITUDE",
            DEFAULT_COURIER_POSITION.latitude,
        )?;
        let longitude = config::or_default(
            lookup,
            "COURIER_LONGITUDE",
            DEFAULT_COURIER_POSITION.longitude,
        )?;
        let courier =
            Coordinate::new(latitude, longitude).map_err(|why| ConfigError::Invalid {
                variable: "COURIER_LATITUDE/COURIER_LONGITUDE".to_owned(),
                value: format!("{latitude}, {longitude}"),
                reason: why.to_string(),
            })?;

        Ok(Self {
            courier,
            demo_seed: config::or_default(lookup, "COURIER_DEMO_SEED", true)?,
            geocoder: GeocoderConfig::from_lookup(lookup, courier)?,
        })
    }

    pub fn initial_deliveries(&self) -> DeliverySet {
        if self.demo_seed {
            let (label, position) = DEMO_DELIVERY;
            DeliverySet::from_points(
                self.courier,
                [DeliveryPoint::new(Id::new(1), label, position)],
            )
        } else {
            DeliverySet::new(self.courier)
        }
    }
}
