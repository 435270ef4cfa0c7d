use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info, warn};

use crate::reconcile::Reconciler;

pub const UPDATE_PATH: &str = "/nic/update";

pub struct AppState {
    pub reconciler: Reconciler,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct UpdateQuery {
    hostname: Option<String>,
    myip: Option<String>,
}

impl UpdateQuery {
    /// The first occurrence of a repeated parameter wins; unknown ones are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "hostname" => &mut query.hostname,
                "myip" => &mut query.myip,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// DynDNS answer of a completed update, attached to the response for the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Good,
    NoChange,
}

impl UpdateOutcome {
    fn as_str(self) -> &'static str {
        match self {
            UpdateOutcome::Good => "good",
            UpdateOutcome::NoChange => "nochg",
        }
    }
}

pub fn create_router(reconciler: Reconciler) -> Router {
    let state = Arc::new(AppState { reconciler });

    Router::new()
        .route(UPDATE_PATH, get(nic_update).fallback(not_found))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let uri = request.uri();
    let path = match uri.query() {
        Some(q) => format!("{}?{}", uri.path(), q),
        None => uri.path().to_string(),
    };
    let user_agent = header_str(request.headers(), "user-agent").unwrap_or("-").to_string();
    let ip = client_ip(request.headers());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let length = header_str(response.headers(), "content-length").unwrap_or("-");
    let outcome = response
        .extensions()
        .get::<UpdateOutcome>()
        .map_or("-", |o| o.as_str());

    // method path "user-agent" ip status length outcome duration
    info!(
        target: "access",
        "{} {} \"{}\" {} {} {} {} {:.3}ms",
        method,
        path,
        user_agent,
        ip,
        status,
        length,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn client_ip(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|s| s.split(',').next())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "-".to_string())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/txt")], body).into_response()
}

fn reply(outcome: UpdateOutcome, myip: &str) -> Response {
    let mut response = plain_text(StatusCode::OK, format!("{} {}", outcome.as_str(), myip));
    response.extensions_mut().insert(outcome);
    response
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// DynDNS `nic/update`.
///
/// A failed create or update is only logged, the client still gets `good`.
///
/// Unlike plain DynDNS servers, a `myip` that is not an IPv4 address is
/// refused with `400` before the provider is asked, since only A records
/// are managed.
async fn nic_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let params = query
        .ok()
        .map(|Query(pairs)| UpdateQuery::from_pairs(pairs))
        .and_then(|q| Some((non_empty(q.hostname)?, non_empty(q.myip)?)));
    let Some((hostname, myip)) = params else {
        warn!("Rejected update: hostname or myip missing");
        return StatusCode::NOT_FOUND.into_response();
    };

    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| !v.is_empty());
    if !authorized {
        warn!("Rejected update for {}: no Authorization header", hostname);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let hostname = hostname.trim();

    if myip.parse::<Ipv4Addr>().is_err() {
        warn!("Rejected update for {}: invalid IP {}", hostname, myip);
        return plain_text(StatusCode::BAD_REQUEST, format!("invalid IP address: {}", myip));
    }

    let reconciliation = match state.reconciler.reconcile(hostname, &myip).await {
        Ok(reconciliation) => reconciliation,
        Err(e) => {
            warn!("Reconcile for {} failed: {}", hostname, e);
            return plain_text(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if !reconciliation.changed {
        info!("Record {} already has IP {}, no update needed", hostname, myip);
        return reply(UpdateOutcome::NoChange, &myip);
    }

    match state.reconciler.apply(reconciliation, &myip).await {
        Ok(_) => info!("DNS update successful: {} -> {}", hostname, myip),
        Err(e) => error!("DNS update for {} failed: {}", hostname, e),
    }

    reply(UpdateOutcome::Good, &myip)
}
