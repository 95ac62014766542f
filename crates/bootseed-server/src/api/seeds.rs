//! Seed Registry Endpoints
//!
//! Join and lookup handlers for cluster seed lists, plus the remote-address
//! echo a joining node uses to learn its own externally visible IP.

use super::state::AppState;
use crate::observability::metrics as obs;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bootseed_registry::{JoinStatus, RegistryError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;

/// Seed list responses must never be cached by intermediaries: a stale
/// list would send joining nodes to the wrong seeds.
const NO_CACHE: &str = "max-age=0, s-maxage=0";

/// Request body for POST /v1/clusters/{cluster}/seeds
#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    /// Address to register. Defaults to the caller's remote address.
    pub node_ip: Option<String>,
    /// Capacity applied for this call. Defaults to the configured value.
    pub max_seeds: Option<usize>,
}

/// Response for a join call
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub cluster: String,
    pub status: JoinStatus,
    pub seeds: Vec<String>,
}

/// Response for a seed list read
#[derive(Debug, Serialize)]
pub struct SeedsResponse {
    pub cluster: String,
    pub seeds: Vec<String>,
}

/// GET / - service banner
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, NO_CACHE)],
        Json(serde_json::json!({
            "service": "bootseed-server",
            "version": crate::version::full_version(),
            "node_id": state.node_id,
        })),
    )
}

/// POST /v1/clusters/{cluster}/seeds - Register a node as a seed
///
/// Returns the cluster's seed list after the call, with a status telling
/// the caller whether it bootstrapped the cluster, was appended, was
/// already a member, or was turned away at capacity.
#[tracing::instrument(skip(state, body))]
pub async fn join_cluster(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    body: Option<Json<JoinRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let node_ip = req
        .node_ip
        .unwrap_or_else(|| remote.ip().to_string());
    let max_seeds = req.max_seeds.unwrap_or(state.default_max_seeds);

    let started = Instant::now();
    let result = state.registry.join(&cluster, &node_ip, max_seeds).await;
    obs::record_join_duration(started.elapsed());

    match result {
        Ok(outcome) => {
            obs::record_join(outcome.status.as_str());
            obs::set_seed_list_size(&cluster, outcome.seeds.len());
            Ok((
                StatusCode::OK,
                [(header::CACHE_CONTROL, NO_CACHE)],
                Json(JoinResponse {
                    cluster,
                    status: outcome.status,
                    seeds: outcome.seeds,
                }),
            ))
        }
        Err(e) => {
            obs::record_join(error_outcome(&e));
            tracing::warn!(cluster = %cluster, node_ip = %node_ip, error = %e, "Join failed");
            Err(into_http_error(e))
        }
    }
}

/// GET /v1/clusters/{cluster}/seeds - Read the current seed list
///
/// Returns an empty list for an unknown cluster; never registers anything.
#[tracing::instrument(skip(state))]
pub async fn list_seeds(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.registry.list(&cluster).await {
        Ok(seeds) => {
            obs::record_list();
            Ok((
                StatusCode::OK,
                [(header::CACHE_CONTROL, NO_CACHE)],
                Json(SeedsResponse { cluster, seeds }),
            ))
        }
        Err(e) => {
            tracing::warn!(cluster = %cluster, error = %e, "Seed list read failed");
            Err(into_http_error(e))
        }
    }
}

/// GET /v1/rpc-address - Echo the caller's remote IP
///
/// A joining node calls this to learn the address the registry will see it
/// under, before registering that address as a seed.
pub async fn rpc_address(ConnectInfo(remote): ConnectInfo<SocketAddr>) -> impl IntoResponse {
    (StatusCode::OK, remote.ip().to_string())
}

fn into_http_error(err: RegistryError) -> (StatusCode, String) {
    let status = match &err {
        RegistryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        RegistryError::Conflict { .. } => StatusCode::CONFLICT,
        RegistryError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, err.to_string())
}

fn error_outcome(err: &RegistryError) -> &'static str {
    match err {
        RegistryError::InvalidArgument(_) => "invalid_argument",
        RegistryError::Conflict { .. } => "conflict",
        RegistryError::Store(_) => "store_unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootseed_registry::StoreError;

    #[test]
    fn error_mapping_keeps_failures_distinguishable() {
        let (status, _) =
            into_http_error(RegistryError::InvalidArgument("bad".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = into_http_error(RegistryError::Conflict {
            cluster: "clusterX".to_string(),
            attempts: 8,
        });
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = into_http_error(RegistryError::Store(StoreError::Unavailable(
            "down".to_string(),
        )));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn join_request_fields_are_optional() {
        let req: JoinRequest = serde_json::from_str("{}").unwrap();
        assert!(req.node_ip.is_none());
        assert!(req.max_seeds.is_none());

        let req: JoinRequest =
            serde_json::from_str(r#"{"node_ip": "10.0.0.1", "max_seeds": 3}"#).unwrap();
        assert_eq!(req.node_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(req.max_seeds, Some(3));
    }

    #[test]
    fn join_status_serializes_snake_case() {
        let json = serde_json::to_string(&JoinStatus::AlreadyMember).unwrap();
        assert_eq!(json, r#""already_member""#);
    }
}
