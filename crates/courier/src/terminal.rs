use dispatch::DispatchResult;
use model::{delivery::Placement, route::MapView};

pub const HELP: &str = "\
Type an address and press enter to add a delivery point.
  :list     show the delivery points, nearest first
  :route    show the route leg by leg
  :geojson  print the map as GeoJSON
  :help     show this help
  :quit     finish pending lookups and exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Submit(String),
    List,
    Route,
    GeoJson,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        match line.strip_prefix(':') {
            Some(command) => match command.trim().to_lowercase().as_str() {
                "list" | "l" => Self::List,
                "route" | "r" => Self::Route,
                "geojson" => Self::GeoJson,
                "help" | "h" | "?" => Self::Help,
                "quit" | "q" | "exit" => Self::Quit,
                _ => Self::Unknown(line.to_owned()),
            },
            None => Self::Submit(line.to_owned()),
        }
    }
}

pub fn render_list(view: &MapView) -> String {
    let mut out = format!("Courier at {}\n", view.courier.position);
    if view.deliveries.is_empty() {
        out.push_str("  no delivery points yet\n");
    }
    for marker in &view.deliveries {
        out.push_str(&format!(
            "  {:<40} {:>8.2} km  ({})\n",
            marker.label, marker.distance_km, marker.position
        ));
    }
    let stops = view.deliveries.len();
    out.push_str(&format!(
        "Route: {} stop{}, {:.2} km\n",
        stops,
        if stops == 1 { "" } else { "s" },
        view.route.length_km()
    ));
    out
}

pub fn render_route(view: &MapView) -> String {
    let mut out = format!("Route ({:.2} km):\n", view.route.length_km());
    let names = std::iter::once("courier".to_owned())
        .chain(
            view.deliveries
                .iter()
                .filter_map(|marker| marker.number)
                .map(|number| format!("#{number}")),
        )
        .collect::<Vec<_>>();
    for (index, leg) in view.route.legs().iter().enumerate() {
        out.push_str(&format!(
            "  {:>7} -> {:<7} {:>8.2} km\n",
            names[index],
            names[index + 1],
            leg.distance_km
        ));
    }
    out
}

pub fn render_outcome(address: &str, outcome: &DispatchResult<Placement>) -> String {
    match outcome {
        Ok(placement) => format!(
            "Added '{}' as stop #{} ({:.2} km from the courier).\n",
            placement.point.label, placement.position, placement.distance_km
        ),
        Err(why) => format!("'{}': {}\n", address.trim(), why.user_message()),
    }
}
