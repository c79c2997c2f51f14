use itertools::Itertools;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{delivery::DeliverySet, Coordinate};

/// One hop of the route, straight line from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance_km: f64,
}

/// The courier position followed by every delivery point in the current
/// order. Always derived from a [`DeliverySet`], never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub positions: Vec<Coordinate>,
}

impl Route {
    pub fn of(set: &DeliverySet) -> Self {
        let positions = std::iter::once(set.reference())
            .chain(set.points().iter().map(|point| point.position))
            .collect();
        Self { positions }
    }

    pub fn legs(&self) -> Vec<Leg> {
        self.positions
            .iter()
            .tuple_windows()
            .map(|(from, to)| Leg {
                from: *from,
                to: *to,
                distance_km: from.distance_to(to),
            })
            .collect()
    }

    pub fn length_km(&self) -> f64 {
        // a plain `sum` starts from -0.0, which renders as "-0.00"
        self.legs()
            .iter()
            .fold(0.0, |total, leg| total + leg.distance_km)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub dash_array: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "red".to_owned(),
            weight: 4,
            dash_array: Some("4".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Courier,
    Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinate,
    /// 1-based stop number, only for deliveries.
    pub number: Option<usize>,
    pub label: String,
    pub distance_km: f64,
}

/// Everything a map needs to draw the current plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub courier: Marker,
    pub deliveries: Vec<Marker>,
    pub route: Route,
    pub route_style: LineStyle,
}

pub const DEFAULT_ZOOM: u8 = 13;

impl MapView {
    pub fn of(set: &DeliverySet) -> Self {
        let courier = Marker {
            kind: MarkerKind::Courier,
            position: set.reference(),
            number: None,
            label: "Courier position".to_owned(),
            distance_km: 0.0,
        };
        let deliveries = set
            .with_distances()
            .enumerate()
            .map(|(index, entry)| Marker {
                kind: MarkerKind::Delivery,
                position: entry.content.position,
                number: Some(index + 1),
                label: format!("#{} - {}", index + 1, entry.content.label),
                distance_km: entry.distance_km,
            })
            .collect();

        Self {
            center: set.reference(),
            zoom: DEFAULT_ZOOM,
            courier,
            deliveries,
            route: Route::of(set),
            route_style: LineStyle::default(),
        }
    }

    /// GeoJSON `FeatureCollection`: one point feature per marker plus a
    /// `LineString` for the route.
    pub fn to_geojson(&self) -> Value {
        let markers = std::iter::once(&self.courier)
            .chain(self.deliveries.iter())
            .map(|marker| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": marker.position.lon_lat(),
                    },
                    "properties": {
                        "kind": marker.kind,
                        "number": marker.number,
                        "label": marker.label,
                        "distanceKm": marker.distance_km,
                    },
                })
            });

        let route = json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": self
                    .route
                    .positions
                    .iter()
                    .map(Coordinate::lon_lat)
                    .collect::<Vec<_>>(),
            },
            "properties": {
                "kind": "route",
                "color": self.route_style.color,
                "weight": self.route_style.weight,
                "dashArray": self.route_style.dash_array,
                "lengthKm": self.route.length_km(),
            },
        });

        json!({
            "type": "FeatureCollection",
            "features": markers.chain(std::iter::once(route)).collect::<Vec<_>>(),
        })
    }
}
