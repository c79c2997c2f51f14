use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use model::{delivery::DeliverySet, route::MapView, WithDistance};
use tokio::sync::mpsc;

use crate::{client::PlannerClient, Request};

const MAILBOX_SIZE: usize = 32;

/// Sole owner of the delivery set. Requests are handled one at a time, so
/// an insertion is atomic with respect to every read.
pub struct Planner {
    deliveries: DeliverySet,
}

impl Planner {
    pub fn new(deliveries: DeliverySet) -> Self {
        Self { deliveries }
    }

    /// Moves the planner onto its own task. The task ends once every
    /// client is dropped.
    pub fn spawn(self) -> PlannerClient {
        let (tx, mut rx) = mpsc::channel(MAILBOX_SIZE);
        let mut planner = self;

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let result =
                    panic::catch_unwind(AssertUnwindSafe(|| planner.handle(request)));
                if let Err(why) = result {
                    // the responder was dropped with the request, the caller
                    // sees the planner as unavailable for this one
                    log::error!("planner panicked: {}", panic_message(why.as_ref()));
                }
            }
            log::debug!("planner stopped");
        });

        PlannerClient::new(tx)
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Insert {
                label,
                resolved,
                responder,
            } => {
                let result = self.deliveries.insert_new(
                    label,
                    resolved.coordinate,
                    resolved.display_name,
                );
                match &result {
                    Ok(placement) => log::debug!(
                        "inserted {} at position {} of {}",
                        placement.point.id,
                        placement.position,
                        self.deliveries.len()
                    ),
                    Err(why) => log::warn!("insert rejected: {why}"),
                }
                respond(responder, result);
            }
            Request::CurrentOrder { responder } => {
                let order = self
                    .deliveries
                    .with_distances()
                    .map(|entry| WithDistance::new(entry.distance_km, entry.content.clone()))
                    .collect();
                respond(responder, order);
            }
            Request::MapView { responder } => {
                respond(responder, MapView::of(&self.deliveries));
            }
        }
    }
}

fn respond<T>(responder: tokio::sync::oneshot::Sender<T>, value: T) {
    responder
        .send(value)
        .unwrap_or_else(|_| log::warn!("requester went away before the answer"));
}

/// Text of a caught panic. `panic!` payloads are a `&str` or a `String`.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use geocoding::ResolvedAddress;
    use model::{
        delivery::{DeliveryError, DeliveryPoint, DeliverySet},
        Coordinate,
    };
    use utility::id::Id;

    use super::*;
    use crate::DispatchError;

    fn courier() -> Coordinate {
        Coordinate::new(41.2855, 36.3333).unwrap()
    }

    #[test]
    fn panic_text_is_recovered_from_the_payload() {
        let literal: Box<dyn Any + Send> = Box::new("index out of bounds");
        assert_eq!(panic_message(literal.as_ref()), "index out of bounds");

        let formatted: Box<dyn Any + Send> = Box::new(format!("bad id {}", 7));
        assert_eq!(panic_message(formatted.as_ref()), "bad id 7");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[test]
    fn caught_panics_carry_their_message() {
        let caught = panic::catch_unwind(|| panic!("planner state {}", "corrupt")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "planner state corrupt");
    }

    #[tokio::test]
    async fn exhausted_ids_are_reported_and_the_planner_keeps_going() {
        let last = DeliveryPoint::new(Id::new(u64::MAX), "last", courier());
        let client = Planner::new(DeliverySet::from_points(courier(), vec![last])).spawn();
        let resolved = ResolvedAddress {
            coordinate: Coordinate::new(41.30, 36.3333).unwrap(),
            display_name: None,
        };

        let error = client.insert("one too many", resolved).await.unwrap_err();

        assert!(matches!(
            error,
            DispatchError::Rejected(DeliveryError::IdsExhausted)
        ));
        assert_eq!(error.user_message(), "The delivery point could not be added.");
        let order = client.current_order().await.unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].content.label, "last");
    }
}
