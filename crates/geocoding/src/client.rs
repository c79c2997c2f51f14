use std::time::Duration;

use async_trait::async_trait;
use model::Coordinate;
use utility::{
    config::{self, ConfigError, Lookup, ProcessEnv},
    geo,
};

use crate::{place::Place, GeocodeError, GeocodeResult, Geocoder, ResolvedAddress};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Area search results are biased towards, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewbox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Viewbox {
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let ((min_lat, min_lon), (max_lat, max_lon)) =
            geo::calculate_bounding_box(center.latitude, center.longitude, radius_km);
        Self {
            min: Coordinate {
                latitude: min_lat.max(-90.0),
                longitude: min_lon.max(-180.0),
            },
            max: Coordinate {
                latitude: max_lat.min(90.0),
                longitude: max_lon.min(180.0),
            },
        }
    }

    /// Nominatim wants `<x1>,<y1>,<x2>,<y2>`, longitude first.
    fn query_value(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min.longitude, self.min.latitude, self.max.longitude, self.max.latitude
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub language: Option<String>,
    pub viewbox: Option<Viewbox>,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_SEARCH_URL.to_owned(),
            user_agent: format!("courier-route-planner/{}", env!("CARGO_PKG_VERSION")),
            language: None,
            viewbox: None,
            timeout: None,
            proxy: None,
        }
    }
}

impl GeocoderConfig {
    /// Reads `GEOCODER_*` variables. `near` is the center used when a
    /// viewbox radius is configured.
    pub fn from_env(near: Coordinate) -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv, near)
    }

    pub fn from_lookup<L: Lookup + ?Sized>(
        lookup: &L,
        near: Coordinate,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let viewbox_km: Option<f64> = config::optional(lookup, "GEOCODER_VIEWBOX_KM")?;
        let timeout_secs: Option<u64> = config::optional(lookup, "GEOCODER_TIMEOUT_SECS")?;

        Ok(Self {
            base_url: config::or_default(lookup, "GEOCODER_URL", defaults.base_url)?,
            user_agent: config::or_default(
                lookup,
                "GEOCODER_USER_AGENT",
                defaults.user_agent,
            )?,
            language: config::optional(lookup, "GEOCODER_LANGUAGE")?,
            viewbox: viewbox_km
                .filter(|radius| *radius > 0.0)
                .map(|radius| Viewbox::around(near, radius)),
            // 0 means no timeout, not an instantly failing request
            timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            proxy: config::optional(lookup, "GEOCODER_PROXY")?,
        })
    }
}

/// Client for the Nominatim search endpoint.
pub struct NominatimClient {
    config: GeocoderConfig,
    http: reqwest::Client,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> GeocodeResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        builder = match &config.proxy {
            Some(proxy_url) => builder.proxy(reqwest::Proxy::all(proxy_url)?),
            None => builder.no_proxy(),
        };
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    fn query(&self, address: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("format", "json".to_owned()),
            ("limit", "1".to_owned()),
            ("q", address.to_owned()),
        ];
        if let Some(language) = &self.config.language {
            query.push(("accept-language", language.clone()));
        }
        if let Some(viewbox) = &self.config.viewbox {
            query.push(("viewbox", viewbox.query_value()));
        }
        query
    }

    /// Every match for `address`, best first.
    pub async fn search(&self, address: &str) -> GeocodeResult<Vec<Place>> {
        let url = &self.config.base_url;
        log::debug!("Requesting '{url}' for '{address}'.");

        let response = self
            .http
            .get(url)
            .query(&self.query(address))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(GeocodeError::InvalidResponse {
                status_code: status,
                url: url.clone(),
                response: response.text().await.ok(),
            })
        }
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, address: &str) -> GeocodeResult<ResolvedAddress> {
        let place = self
            .search(address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound {
                address: address.to_owned(),
            })?;
        log::debug!("'{address}' resolved to {}, {}.", place.lat, place.lon);
        place.resolved()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    use super::*;

    fn samsun() -> Coordinate {
        Coordinate::new(41.2855, 36.3333).unwrap()
    }

    /// Answers exactly one HTTP request with a canned response and hands
    /// back the raw request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/search", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            loop {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
                if request.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (url, rx)
    }

    fn client(base_url: String) -> NominatimClient {
        NominatimClient::new(GeocoderConfig {
            base_url,
            user_agent: "test-agent/1.0".to_owned(),
            ..GeocoderConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn first_match_wins() {
        let (url, request) = serve_once(
            "200 OK",
            r#"[{"lat": "41.3597", "lon": "36.2311", "display_name": "Atakum"},
                {"lat": "40.0", "lon": "30.0"}]"#,
        )
        .await;

        let resolved = client(url).resolve("Atakum Samsun").await.unwrap();

        assert_eq!(resolved.coordinate, Coordinate::new(41.3597, 36.2311).unwrap());
        assert_eq!(resolved.display_name.as_deref(), Some("Atakum"));

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /search?"), "{request}");
        assert!(request.contains("format=json"), "{request}");
        assert!(request.contains("q=atakum+samsun"), "{request}");
        assert!(request.contains("user-agent: test-agent/1.0"), "{request}");
    }

    #[tokio::test]
    async fn empty_list_is_not_found() {
        let (url, _request) = serve_once("200 OK", "[]").await;

        let error = client(url).resolve("nowhere at all").await.unwrap_err();

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn server_error_is_a_service_error() {
        let (url, _request) = serve_once("503 Service Unavailable", "busy").await;

        let error = client(url).resolve("Atakum").await.unwrap_err();

        assert!(!error.is_not_found());
        match error {
            GeocodeError::InvalidResponse {
                status_code,
                response,
                ..
            } => {
                assert_eq!(status_code, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(response.as_deref(), Some("busy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_service_error() {
        let (url, _request) = serve_once("200 OK", r#"{"error": "oops"}"#).await;

        let error = client(url).resolve("Atakum").await.unwrap_err();

        assert!(matches!(error, GeocodeError::JsonError(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_service_error() {
        // bind and drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/search", listener.local_addr().unwrap());
        drop(listener);

        let error = client(url).resolve("Atakum").await.unwrap_err();

        assert!(matches!(error, GeocodeError::RequestError(_)));
    }

    #[test]
    fn optional_parameters_end_up_in_the_query() {
        let client = NominatimClient::new(GeocoderConfig {
            language: Some("tr".to_owned()),
            viewbox: Some(Viewbox::around(samsun(), 10.0)),
            ..GeocoderConfig::default()
        })
        .unwrap();

        let query = client.query("Atakum");
        let keys = query.iter().map(|(key, _)| *key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["format", "limit", "q", "accept-language", "viewbox"]);

        let viewbox = &query[4].1;
        let parts = viewbox
            .split(',')
            .map(|part| part.parse::<f64>().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(parts.len(), 4);
        assert!(parts[0] < samsun().longitude && samsun().longitude < parts[2]);
        assert!(parts[1] < samsun().latitude && samsun().latitude < parts[3]);
    }

    #[test]
    fn config_from_variables() {
        let vars = HashMap::from([
            ("GEOCODER_URL", "http://localhost:8088/search"),
            ("GEOCODER_VIEWBOX_KM", "15"),
            ("GEOCODER_TIMEOUT_SECS", "5"),
        ]);
        let lookup = |name: &str| vars.get(name).map(|value| value.to_string());

        let config = GeocoderConfig::from_lookup(&lookup, samsun()).unwrap();

        assert_eq!(config.base_url, "http://localhost:8088/search");
        assert!(config.user_agent.starts_with("courier-route-planner/"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.viewbox, Some(Viewbox::around(samsun(), 15.0)));
        assert_eq!(config.language, None);
    }

    #[test]
    fn zero_timeout_means_none() {
        let lookup = |name: &str| (name == "GEOCODER_TIMEOUT_SECS").then(|| "0".to_owned());

        let config = GeocoderConfig::from_lookup(&lookup, samsun()).unwrap();

        assert_eq!(config.timeout, None);
    }

    #[test]
    fn config_rejects_garbage() {
        let lookup = |name: &str| {
            (name == "GEOCODER_TIMEOUT_SECS").then(|| "soon".to_owned())
        };
        assert!(GeocoderConfig::from_lookup(&lookup, samsun()).is_err());
    }
}
