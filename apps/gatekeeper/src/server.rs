use crate::{
    error::GateError,
    gate::{BountyPermissions, EventManagementPermissions, TokenGate},
    requirements::has_access,
    rpc::MulticallClient,
    snapshot::EntitlementSnapshot,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub struct ApiError(GateError);

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "Rejecting request");
        let status = match self.0 {
            GateError::MissingAddress | GateError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            GateError::RetriesExhausted { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub bounty: BountyPermissions,
    pub event_management: EventManagementPermissions,
    pub can_manage_market: bool,
    pub held_tokens: Vec<&'static str>,
}

impl From<&EntitlementSnapshot> for PermissionsResponse {
    fn from(snapshot: &EntitlementSnapshot) -> Self {
        Self {
            bounty: BountyPermissions::from(snapshot),
            event_management: EventManagementPermissions::from(snapshot),
            can_manage_market: snapshot.can_manage_market(),
            held_tokens: snapshot.held_tokens(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub required_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub has_access: bool,
}

pub fn router<C>(gate: Arc<TokenGate<C>>) -> Router
where
    C: MulticallClient + 'static,
{
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/entitlements/{address}", get(entitlements::<C>))
        .route("/permissions/{address}", get(permissions::<C>))
        .route("/access/{address}", get(access::<C>))
        .with_state(gate)
}

async fn entitlements<C: MulticallClient + 'static>(
    State(gate): State<Arc<TokenGate<C>>>,
    Path(address): Path<String>,
) -> Result<Json<EntitlementSnapshot>, ApiError> {
    let snapshot = gate.fetch_token_balances_for(&address).await?;
    Ok(Json(snapshot))
}

async fn permissions<C: MulticallClient + 'static>(
    State(gate): State<Arc<TokenGate<C>>>,
    Path(address): Path<String>,
) -> Result<Json<PermissionsResponse>, ApiError> {
    let snapshot = gate.fetch_token_balances_for(&address).await?;
    Ok(Json(PermissionsResponse::from(&snapshot)))
}

async fn access<C: MulticallClient + 'static>(
    State(gate): State<Arc<TokenGate<C>>>,
    Path(address): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, ApiError> {
    let snapshot = gate.fetch_token_balances_for(&address).await?;
    let granted = has_access(query.required_token.as_deref(), gate.config(), &snapshot);
    Ok(Json(AccessResponse { has_access: granted }))
}
