//! Tracking client behavior against a local mock upstream: direct and
//! relay request modes, the non-JSON quirk, and raw byte retention.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::Response;
use facteur::client::{
    ClientConfig, TrackingClient, NETWORK_ERROR_MESSAGE, UNKNOWN_NUMBER_MESSAGE,
};
use facteur::error::FacteurError;
use facteur::model::TrackingResult;

type Responder = Arc<dyn Fn(&str) -> (StatusCode, String, String) + Send + Sync>;

/// Canned upstream: answers every path through `responder`.
async fn start_upstream(responder: Responder) -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = axum::Router::new().fallback(move |uri: Uri| {
        let responder = Arc::clone(&responder);
        async move {
            let (status, content_type, body) = responder(uri.path());
            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap()
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (format!("http://{addr}"), shutdown_tx)
}

/// Upstream recording each request's path and headers.
async fn start_recording_upstream(
    body: &'static str,
) -> (
    String,
    Arc<Mutex<Vec<(String, Option<String>, Option<String>)>>>,
    tokio::sync::oneshot::Sender<()>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    let app = axum::Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
        let log = Arc::clone(&log);
        async move {
            let okapi = headers
                .get("x-okapi-key")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let agent = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let path_and_query = uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string);
            log.lock().unwrap().push((path_and_query, okapi, agent));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (format!("http://{addr}"), seen, shutdown_tx)
}

fn direct_client(endpoint: &str) -> TrackingClient {
    TrackingClient::new(ClientConfig {
        api_key: Some("test-key".into()),
        endpoint: Some(endpoint.into()),
        relay_attribution: false,
    })
}

fn relay_client(endpoint: &str) -> TrackingClient {
    TrackingClient::new(ClientConfig {
        api_key: None,
        endpoint: Some(endpoint.into()),
        relay_attribution: false,
    })
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

/// An address nothing listens on.
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn direct_success_keeps_raw_bytes_verbatim() {
    let upstream_body = r#"{"returnCode":200,"shipment":{"idShip":"AB1","isFinal":true,"event":[{"code":"DI1","date":"2021-01-01T10:00:00Z"}]}}"#;
    let body = upstream_body.to_string();
    let (endpoint, shutdown) = start_upstream(Arc::new(move |_: &str| {
        (StatusCode::OK, "application/json".into(), body.clone())
    }))
    .await;

    let batch = direct_client(&endpoint).fetch(&ids(&["AB1"])).await.unwrap();

    assert_eq!(batch.status, 200);
    assert!(batch.single);
    assert_eq!(&batch.raw[..], upstream_body.as_bytes());
    assert_eq!(&batch.body[..], upstream_body.as_bytes());
    assert_eq!(batch.results.len(), 1);
    assert!(matches!(batch.results[0], TrackingResult::Success(_)));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn direct_mode_joins_ids_and_sends_api_key() {
    let (endpoint, seen, shutdown) = start_recording_upstream(
        r#"[{"returnCode":200,"shipment":{"idShip":"AB1"}},{"returnCode":200,"shipment":{"idShip":"CD2"}}]"#,
    )
    .await;

    let batch = direct_client(&endpoint)
        .fetch(&ids(&["AB1", "CD2"]))
        .await
        .unwrap();

    assert!(!batch.single);
    assert_eq!(batch.results.len(), 2);

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1, "direct mode issues a single request");
    let (path, okapi, agent) = &requests[0];
    assert_eq!(path, "/AB1,CD2?lang=fr_FR");
    assert_eq!(okapi.as_deref(), Some("test-key"));
    assert!(agent.as_deref().unwrap().starts_with("facteur/"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn non_json_response_synthesizes_unknown_number_failures() {
    let html = "<html><body>404 Not Found</body></html>";
    let (endpoint, shutdown) = start_upstream(Arc::new(move |_: &str| {
        (
            StatusCode::NOT_FOUND,
            "text/html".into(),
            html.to_string(),
        )
    }))
    .await;

    let batch = direct_client(&endpoint)
        .fetch(&ids(&["BADCODE"]))
        .await
        .unwrap();

    assert_eq!(batch.status, 400);
    // Raw keeps the exact upstream bytes for --raw.
    assert_eq!(&batch.raw[..], html.as_bytes());
    // The forwardable body is the synthesized JSON object.
    let value: serde_json::Value = serde_json::from_slice(&batch.body).unwrap();
    assert_eq!(value["idShip"], "BADCODE");
    assert_eq!(value["returnCode"], 400);

    let TrackingResult::Failure(ref failure) = batch.results[0] else {
        panic!("expected failure");
    };
    assert_eq!(failure.return_message.as_deref(), Some(UNKNOWN_NUMBER_MESSAGE));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn quirk_body_is_an_array_for_several_ids() {
    let (endpoint, shutdown) = start_upstream(Arc::new(|_: &str| {
        (StatusCode::NOT_FOUND, "text/html".into(), "nope".into())
    }))
    .await;

    let batch = direct_client(&endpoint)
        .fetch(&ids(&["BAD1", "BAD2"]))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&batch.body).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(batch.results.len(), 2);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn structured_upstream_error_surfaces_per_identifier() {
    let body = r#"{"returnCode":500,"returnMessage":"Erreur interne","idShip":"AB1"}"#;
    let (endpoint, shutdown) = start_upstream(Arc::new(move |_: &str| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "application/json".into(),
            body.to_string(),
        )
    }))
    .await;

    let batch = direct_client(&endpoint).fetch(&ids(&["AB1"])).await.unwrap();

    assert_eq!(batch.status, 500);
    let TrackingResult::Failure(ref failure) = batch.results[0] else {
        panic!("expected failure");
    };
    assert_eq!(failure.return_code, Some(500));
    assert_eq!(failure.return_message.as_deref(), Some("Erreur interne"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn relay_mode_issues_one_request_per_id() {
    let (endpoint, shutdown) = start_upstream(Arc::new(|path: &str| {
        let id = path.trim_start_matches('/');
        (
            StatusCode::OK,
            "application/json".into(),
            format!(r#"{{"returnCode":200,"shipment":{{"idShip":"{id}"}}}}"#),
        )
    }))
    .await;

    let batch = relay_client(&endpoint)
        .fetch(&ids(&["BB2", "AA1"]))
        .await
        .unwrap();

    assert_eq!(batch.status, 200);
    assert_eq!(batch.results.len(), 2);
    // join_all preserves input order.
    assert_eq!(batch.results[0].id_ship(), "BB2");
    assert_eq!(batch.results[1].id_ship(), "AA1");
    // Raw joins both bodies with a newline.
    assert_eq!(batch.raw.iter().filter(|&&b| b == b'\n').count(), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn relay_mode_transport_failure_is_not_fatal() {
    let endpoint = dead_endpoint().await;

    let batch = relay_client(&endpoint).fetch(&ids(&["AB1"])).await.unwrap();

    let TrackingResult::Failure(ref failure) = batch.results[0] else {
        panic!("expected synthesized failure");
    };
    assert_eq!(failure.id_ship, "AB1");
    assert_eq!(failure.return_message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
}

#[tokio::test]
async fn direct_mode_transport_failure_is_fatal() {
    let endpoint = dead_endpoint().await;

    let err = direct_client(&endpoint)
        .fetch(&ids(&["AB1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, FacteurError::HttpRequest { .. }));
}

#[tokio::test]
async fn json_without_shipment_or_error_is_malformed() {
    let (endpoint, shutdown) = start_upstream(Arc::new(|_: &str| {
        (
            StatusCode::OK,
            "application/json".into(),
            r#"{"lang":"fr_FR"}"#.into(),
        )
    }))
    .await;

    let err = direct_client(&endpoint)
        .fetch(&ids(&["AB1"]))
        .await
        .unwrap_err();
    let FacteurError::MalformedResponse { body } = err else {
        panic!("expected malformed response");
    };
    assert!(body.contains("fr_FR"));

    let _ = shutdown.send(());
}
