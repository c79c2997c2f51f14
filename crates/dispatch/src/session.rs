use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use geocoding::{GeocodeError, Geocoder};
use model::delivery::Placement;

use crate::{client::PlannerClient, DispatchError, DispatchResult};

/// The submit pipeline: resolve an address, then hand the point to the
/// planner.
///
/// Submissions are independent of each other. Nothing is cancelled or
/// de-duplicated, so a slow lookup may land after a later one; the planner
/// re-sorts on every insert and the final order is the same either way.
pub struct Session<G: Geocoder> {
    geocoder: Arc<G>,
    planner: PlannerClient,
    tickets: Arc<AtomicU64>,
}

impl<G: Geocoder> Clone for Session<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: self.geocoder.clone(),
            planner: self.planner.clone(),
            tickets: self.tickets.clone(),
        }
    }
}

impl<G: Geocoder> Session<G> {
    pub fn new(geocoder: G, planner: PlannerClient) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            planner,
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn planner(&self) -> &PlannerClient {
        &self.planner
    }

    /// Resolves `address` and inserts it. Blank input is rejected without
    /// asking the geocoder. Failed lookups are not retried.
    pub async fn submit(&self, address: &str) -> DispatchResult<Placement> {
        let address = address.trim();
        if address.is_empty() {
            return Err(DispatchError::EmptyAddress);
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("[#{ticket}] resolving '{address}'...");

        let resolved = self.geocoder.resolve(address).await.map_err(|why| {
            match &why {
                GeocodeError::NotFound { .. } => {
                    log::info!("[#{ticket}] no match for '{address}'")
                }
                other => log::error!("[#{ticket}] resolving '{address}' failed: {other:?}"),
            }
            DispatchError::from(why)
        })?;

        let placement = self.planner.insert(address, resolved).await?;
        log::info!(
            "[#{ticket}] '{address}' is stop #{} ({:.2} km)",
            placement.position,
            placement.distance_km
        );
        Ok(placement)
    }
}
