use std::{error, fmt};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id, IdSequence};

use crate::{Coordinate, WithDistance};

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPoint {
    pub id: Id<DeliveryPoint>,
    /// Text the user typed.
    pub label: String,
    pub position: Coordinate,
    /// Name the geocoder reported for the match, if any.
    pub resolved_name: Option<String>,
    pub created_at: DateTime<Local>,
}

impl HasId for DeliveryPoint {
    type IdType = u64;
}

impl DeliveryPoint {
    pub fn new(id: Id<DeliveryPoint>, label: impl Into<String>, position: Coordinate) -> Self {
        Self {
            id,
            label: label.into(),
            position,
            resolved_name: None,
            created_at: Local::now(),
        }
    }

    pub fn with_resolved_name(mut self, resolved_name: Option<String>) -> Self {
        self.resolved_name = resolved_name;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryError {
    DuplicateId(Id<DeliveryPoint>),
    /// Every id up to `u64::MAX` is taken.
    IdsExhausted,
}

impl error::Error for DeliveryError {}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "delivery point {id} already exists"),
            Self::IdsExhausted => write!(f, "no delivery point ids left"),
        }
    }
}

/// Where an inserted point ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// 1-based position in the current order.
    pub position: usize,
    pub distance_km: f64,
    pub point: DeliveryPoint,
}

/// Delivery points ordered by ascending distance from a fixed reference
/// point (the courier).
///
/// Every insertion re-sorts the whole set. The sort is stable, so points
/// with exactly the same distance keep their insertion order.
#[derive(Debug, Clone)]
pub struct DeliverySet {
    reference: Coordinate,
    points: Vec<DeliveryPoint>,
    ids: IdSequence<DeliveryPoint>,
}

impl DeliverySet {
    pub fn new(reference: Coordinate) -> Self {
        Self {
            reference,
            points: Vec::new(),
            ids: IdSequence::new(),
        }
    }

    /// Builds a set from points in one go. Later duplicates of an id are
    /// dropped.
    pub fn from_points(
        reference: Coordinate,
        points: impl IntoIterator<Item = DeliveryPoint>,
    ) -> Self {
        let mut set = Self::new(reference);
        for point in points {
            if set.contains(&point.id) {
                continue;
            }
            set.ids.advance_past(&point.id);
            set.points.push(point);
        }
        set.sort();
        set
    }

    pub fn reference(&self) -> Coordinate {
        self.reference
    }

    pub fn points(&self) -> &[DeliveryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, id: &Id<DeliveryPoint>) -> bool {
        self.points.iter().any(|point| &point.id == id)
    }

    pub fn distance_of(&self, point: &DeliveryPoint) -> f64 {
        self.reference.distance_to(&point.position)
    }

    pub fn with_distances(&self) -> impl Iterator<Item = WithDistance<&DeliveryPoint>> {
        self.points
            .iter()
            .map(|point| WithDistance::new(self.distance_of(point), point))
    }

    /// 1-based position of a point in the current order.
    pub fn position_of(&self, id: &Id<DeliveryPoint>) -> Option<usize> {
        self.points
            .iter()
            .position(|point| &point.id == id)
            .map(|index| index + 1)
    }

    /// Adds a point and restores the distance order.
    pub fn insert(&mut self, point: DeliveryPoint) -> Result<Placement, DeliveryError> {
        if self.contains(&point.id) {
            return Err(DeliveryError::DuplicateId(point.id));
        }
        self.ids.advance_past(&point.id);
        Ok(self.push_sorted(point))
    }

    /// Creates a point with the next free id and inserts it.
    pub fn insert_new(
        &mut self,
        label: impl Into<String>,
        position: Coordinate,
        resolved_name: Option<String>,
    ) -> Result<Placement, DeliveryError> {
        let id = self.ids.next_id().ok_or(DeliveryError::IdsExhausted)?;
        let point = DeliveryPoint::new(id, label, position).with_resolved_name(resolved_name);
        Ok(self.push_sorted(point))
    }

    fn push_sorted(&mut self, point: DeliveryPoint) -> Placement {
        let id = point.id;
        self.points.push(point);
        self.sort();

        let index = self
            .points
            .iter()
            .position(|point| point.id == id)
            .unwrap_or(self.points.len() - 1);
        let point = self.points[index].clone();
        Placement {
            position: index + 1,
            distance_km: self.distance_of(&point),
            point,
        }
    }

    fn sort(&mut self) {
        let reference = self.reference;
        // NaN distances end up last
        self.points.sort_by(|a, b| {
            reference
                .distance_to(&a.position)
                .total_cmp(&reference.distance_to(&b.position))
        });
    }
}
