use std::{error, fmt};

use geocoding::{GeocodeError, ResolvedAddress};
use model::{
    delivery::{DeliveryError, DeliveryPoint, Placement},
    route::MapView,
    WithDistance,
};
use tokio::sync::{mpsc, oneshot};

pub mod client;
pub mod planner;
pub mod session;

pub use client::PlannerClient;
pub use session::Session;

#[derive(Debug)]
pub enum DispatchError {
    /// Nothing but whitespace was submitted.
    EmptyAddress,
    /// The geocoder answered, but had no match.
    NotFound { address: String },
    /// The geocoder could not be asked or gave an unusable answer.
    ServiceError(GeocodeError),
    /// The planner refused to store the point.
    Rejected(DeliveryError),
    /// The planner task is gone.
    PlannerUnavailable(String),
}

impl DispatchError {
    /// What the user gets to see. Details only go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyAddress => "Please enter an address.",
            Self::NotFound { .. } => "Address not found.",
            Self::ServiceError(_) => "Could not resolve the address, please try again.",
            Self::Rejected(_) => "The delivery point could not be added.",
            Self::PlannerUnavailable(_) => "The delivery list is not available.",
        }
    }
}

impl error::Error for DispatchError {}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "empty address"),
            Self::NotFound { address } => write!(f, "address not found: {address}"),
            Self::ServiceError(why) => write!(f, "geocoding failed: {why}"),
            Self::Rejected(why) => write!(f, "insert rejected: {why}"),
            Self::PlannerUnavailable(why) => write!(f, "planner unavailable: {why}"),
        }
    }
}

impl From<GeocodeError> for DispatchError {
    fn from(value: GeocodeError) -> Self {
        match value {
            GeocodeError::NotFound { address } => Self::NotFound { address },
            other => Self::ServiceError(other),
        }
    }
}

impl From<DeliveryError> for DispatchError {
    fn from(why: DeliveryError) -> Self {
        Self::Rejected(why)
    }
}

impl From<mpsc::error::SendError<Request>> for DispatchError {
    fn from(why: mpsc::error::SendError<Request>) -> Self {
        Self::PlannerUnavailable(why.to_string())
    }
}

impl From<oneshot::error::RecvError> for DispatchError {
    fn from(why: oneshot::error::RecvError) -> Self {
        Self::PlannerUnavailable(why.to_string())
    }
}

pub type DispatchResult<O> = Result<O, DispatchError>;

/// Messages understood by the planner task.
#[derive(Debug)]
pub enum Request {
    Insert {
        label: String,
        resolved: ResolvedAddress,
        responder: oneshot::Sender<Result<Placement, DeliveryError>>,
    },
    CurrentOrder {
        responder: oneshot::Sender<Vec<WithDistance<DeliveryPoint>>>,
    },
    MapView {
        responder: oneshot::Sender<MapView>,
    },
}
