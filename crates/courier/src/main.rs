use std::error::Error;

use courier::{run, CourierConfig};
use dispatch::{planner::Planner, Session};
use geocoding::NominatimClient;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // configuration
    let config = CourierConfig::from_env()?;
    log::info!(
        "courier at {}, geocoding via {}",
        config.courier,
        config.geocoder.base_url
    );

    // planner owns the delivery points from here on
    let planner = Planner::new(config.initial_deliveries()).spawn();
    let geocoder = NominatimClient::new(config.geocoder)?;

    run(
        Session::new(geocoder, planner),
        BufReader::new(stdin()),
        stdout(),
    )
    .await?;

    Ok(())
}
