//! HTTP tracking client.
//!
//! Resolves which endpoint to talk to (explicit override, direct La
//! Poste API when an API key is available, else the public relay),
//! performs the GET requests, and classifies the response into a
//! [`TrackingBatch`]. Direct mode joins all identifiers into one
//! comma-separated request; relay mode issues one request per
//! identifier, concurrently.
//!
//! The upstream API has a documented quirk: an unrecognized tracking
//! number yields an HTML 404 instead of JSON. The client synthesizes a
//! uniform per-identifier "unknown number" failure body (code 400) for
//! that case, while keeping the exact raw bytes for `--raw`.

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::FacteurError;
use crate::model::{self, TrackingFailure, TrackingResult};

/// Direct La Poste "suivi" API. Requires an `X-Okapi-Key`.
pub const DIRECT_ENDPOINT: &str = "https://api.laposte.fr/suivi/v2/idships";

/// Public relay holding an API key on behalf of anonymous callers.
pub const PUBLIC_RELAY_ENDPOINT: &str = "https://suivi-poste-proxy.rigwild.dev";

/// Fixed message for the upstream non-JSON 404 quirk.
pub const UNKNOWN_NUMBER_MESSAGE: &str =
    "Votre numéro est inconnu. Veuillez le ressaisir en respectant le format.";

/// Fixed message for a per-identifier transport failure in relay mode.
pub const NETWORK_ERROR_MESSAGE: &str = "Erreur réseau lors de la requête.";

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<Bytes>>;

/// Explicit client configuration, built once at process start. No
/// global environment reads happen past this point.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Selects direct mode when present; sent as `X-Okapi-Key`.
    pub api_key: Option<String>,

    /// Overrides the resolved endpoint (self-hosted relay, tests).
    pub endpoint: Option<String>,

    /// Appends the relay attribution to the `User-Agent`. Set by the
    /// relay server so upstream can tell relayed calls apart.
    pub relay_attribution: bool,
}

/// One resolved lookup: effective status, body bytes, and classified
/// per-identifier results. The single-vs-array upstream shape is
/// resolved here, exactly once.
#[derive(Debug, Clone)]
pub struct TrackingBatch {
    /// Upstream HTTP status, or 400 when the unknown-number quirk body
    /// was synthesized.
    pub status: u16,

    /// Exact upstream body bytes, never re-serialized. Relay mode with
    /// several identifiers joins the bodies with a newline.
    pub raw: Bytes,

    /// Forwardable JSON body: equals `raw` when upstream sent JSON,
    /// else the synthesized quirk body.
    pub body: Bytes,

    /// Upstream returned a bare object rather than an array.
    pub single: bool,

    pub results: Vec<TrackingResult>,
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls
    // cannot auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .build(https)
}

pub struct TrackingClient {
    http: HttpClient,
    config: ClientConfig,
}

impl TrackingClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: build_http_client(),
            config,
        }
    }

    fn direct_mode(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Resolved upstream address: explicit override first, else the
    /// direct API when a key is held, else the public relay.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        let default = if self.direct_mode() {
            DIRECT_ENDPOINT
        } else {
            PUBLIC_RELAY_ENDPOINT
        };
        self.config
            .endpoint
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }

    fn user_agent(&self) -> String {
        let mut ua = format!("facteur/{}", env!("CARGO_PKG_VERSION"));
        if self.config.relay_attribution {
            ua.push_str(" - call through a facteur relay server");
        }
        ua
    }

    /// Look up one or more tracking numbers. A single attempt per
    /// request, no retries; timeouts are the transport's defaults.
    pub async fn fetch(&self, ids: &[String]) -> Result<TrackingBatch, FacteurError> {
        if self.direct_mode() {
            self.fetch_direct(ids).await
        } else {
            self.fetch_via_relay(ids).await
        }
    }

    /// Direct mode: one comma-joined request against the La Poste API.
    /// Transport failure here is fatal — there is no structured body to
    /// attribute per identifier.
    async fn fetch_direct(&self, ids: &[String]) -> Result<TrackingBatch, FacteurError> {
        let url = format!("{}/{}?lang=fr_FR", self.endpoint(), ids.join(","));
        let (status, content_type, raw) = self.get(&url).await?;

        tracing::debug!(status = %status, ids = ids.len(), "upstream response");

        if !content_type.starts_with("application/json") {
            // Unknown-number quirk: HTML 404 instead of JSON.
            let body = synthesized_unknown_body(ids);
            let results = ids
                .iter()
                .map(|id| TrackingResult::Failure(unknown_failure(id)))
                .collect();
            return Ok(TrackingBatch {
                status: 400,
                raw,
                body,
                single: ids.len() == 1,
                results,
            });
        }

        let (single, results) = model::resolve_batch(&raw)?;
        Ok(TrackingBatch {
            status: status.as_u16(),
            body: raw.clone(),
            raw,
            single,
            results,
        })
    }

    /// Relay mode: one request per identifier, issued concurrently and
    /// awaited together in input order. A transport failure on one
    /// identifier becomes a synthesized failure so the others still
    /// render.
    async fn fetch_via_relay(&self, ids: &[String]) -> Result<TrackingBatch, FacteurError> {
        let endpoint = self.endpoint();
        let urls: Vec<String> = ids.iter().map(|id| format!("{endpoint}/{id}")).collect();
        let responses = futures::future::join_all(urls.iter().map(|url| self.get(url))).await;

        let mut status: u16 = 200;
        let mut raw_parts: Vec<Bytes> = Vec::with_capacity(ids.len());
        let mut results: Vec<TrackingResult> = Vec::with_capacity(ids.len());

        for (id, response) in ids.iter().zip(responses) {
            match response {
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "relay request failed");
                    results.push(TrackingResult::Failure(TrackingFailure {
                        id_ship: id.clone(),
                        return_code: None,
                        return_message: Some(NETWORK_ERROR_MESSAGE.to_string()),
                    }));
                }
                Ok((part_status, _content_type, bytes)) => {
                    if status == 200 {
                        status = part_status.as_u16();
                    }
                    if serde_json::from_slice::<serde_json::Value>(&bytes).is_err() {
                        // Quirk passed through a bare endpoint.
                        if status == 200 {
                            status = 400;
                        }
                        results.push(TrackingResult::Failure(unknown_failure(id)));
                    } else {
                        let (_, items) = model::resolve_batch(&bytes)?;
                        results.extend(items);
                    }
                    raw_parts.push(bytes);
                }
            }
        }

        let raw = join_bodies(&raw_parts);
        Ok(TrackingBatch {
            status,
            body: raw.clone(),
            raw,
            single: ids.len() == 1,
            results,
        })
    }

    async fn get(&self, url: &str) -> Result<(hyper::StatusCode, String, Bytes), FacteurError> {
        let uri: hyper::Uri =
            url.parse()
                .map_err(|e: hyper::http::uri::InvalidUri| FacteurError::UriParse {
                    source: Box::new(e),
                })?;

        let mut builder = hyper::Request::builder()
            .uri(uri)
            .header(hyper::header::ACCEPT, "application/json")
            .header(hyper::header::USER_AGENT, self.user_agent());
        if let Some(ref key) = self.config.api_key {
            builder = builder.header("X-Okapi-Key", key);
        }
        let req = builder
            .body(http_body_util::Full::new(Bytes::new()))
            .map_err(|e| FacteurError::HttpRequest {
                source: Box::new(e),
            })?;

        let response = self
            .http
            .request(req)
            .await
            .map_err(|e| FacteurError::HttpRequest {
                source: Box::new(e),
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(hyper::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FacteurError::HttpRequest {
                source: Box::new(e),
            })?
            .to_bytes();

        Ok((status, content_type, body))
    }
}

fn unknown_failure(id: &str) -> TrackingFailure {
    TrackingFailure {
        id_ship: id.to_string(),
        return_code: Some(400),
        return_message: Some(UNKNOWN_NUMBER_MESSAGE.to_string()),
    }
}

/// Build the synthesized quirk body: a bare object for one identifier,
/// an array for several, mirroring the upstream's own shape-shifting.
fn synthesized_unknown_body(ids: &[String]) -> Bytes {
    let mut items: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "returnCode": 400,
                "returnMessage": UNKNOWN_NUMBER_MESSAGE,
                "lang": "fr_FR",
                "scope": "open",
                "idShip": id,
            })
        })
        .collect();

    let value = if items.len() == 1 {
        items.remove(0)
    } else {
        serde_json::Value::Array(items)
    };
    Bytes::from(value.to_string())
}

fn join_bodies(parts: &[Bytes]) -> Bytes {
    if parts.len() == 1 {
        return parts[0].clone();
    }
    let mut joined = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            joined.push(b'\n');
        }
        joined.extend_from_slice(part);
    }
    Bytes::from(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_override_wins() {
        let client = TrackingClient::new(ClientConfig {
            api_key: Some("key".into()),
            endpoint: Some("http://localhost:4000/".into()),
            relay_attribution: false,
        });
        assert_eq!(client.endpoint(), "http://localhost:4000");
    }

    #[test]
    fn api_key_selects_direct_endpoint() {
        let client = TrackingClient::new(ClientConfig {
            api_key: Some("key".into()),
            ..ClientConfig::default()
        });
        assert_eq!(client.endpoint(), DIRECT_ENDPOINT);
    }

    #[test]
    fn no_key_selects_public_relay() {
        let client = TrackingClient::new(ClientConfig::default());
        assert_eq!(client.endpoint(), PUBLIC_RELAY_ENDPOINT);
    }

    #[test]
    fn relay_attribution_lands_in_user_agent() {
        let client = TrackingClient::new(ClientConfig {
            relay_attribution: true,
            ..ClientConfig::default()
        });
        assert!(client.user_agent().contains("relay"));

        let plain = TrackingClient::new(ClientConfig::default());
        assert!(!plain.user_agent().contains("relay"));
    }

    #[test]
    fn synthesized_body_is_object_for_one_id() {
        let body = synthesized_unknown_body(&["AB1".to_string()]);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value.is_object());
        assert_eq!(value["idShip"], "AB1");
        assert_eq!(value["returnCode"], 400);
    }

    #[test]
    fn synthesized_body_is_array_for_several_ids() {
        let ids: Vec<String> = ["AB1", "CD2"].iter().map(ToString::to_string).collect();
        let body = synthesized_unknown_body(&ids);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["idShip"], "CD2");
    }
}
