// REST API - request schemas, handlers and routing.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{Error, Result};
use crate::ledger::{AchievementLedger, AchievementRecord};
use crate::merkle::Hash;
use crate::service::EligibilityService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EligibilityService>,
    pub ledger: Arc<AchievementLedger>,
    /// Campaign id used when a request names none.
    pub default_campaign: String,
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/submit/addresses", post(submit_addresses))
        .route("/api/check/eligibility", post(check_eligibility))
        .route("/api/root/:campaign_id", get(campaign_root))
        .route("/api/claim", post(generate_claim))
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/achievements", post(record_achievement))
        .route("/api/achievements/:player", get(player_achievements))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn hex32(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

fn hex_proof(proof: &[Hash]) -> Vec<String> {
    proof.iter().map(hex32).collect()
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    campaign_id: Option<String>,
    addresses: Vec<String>,
    amounts: Option<Vec<u128>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    success: bool,
    count: usize,
    root: String,
}

async fn submit_addresses(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let campaign_id = req.campaign_id.unwrap_or_else(|| state.default_campaign.clone());
    let receipt =
        state
            .service
            .submit_addresses(&campaign_id, &req.addresses, req.amounts.as_deref())?;

    Ok(Json(SubmitResponse {
        success: true,
        count: receipt.member_count,
        root: hex32(&receipt.root),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest {
    campaign_id: Option<String>,
    address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
}

async fn check_eligibility(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>> {
    let campaign_id = req.campaign_id.unwrap_or_else(|| state.default_campaign.clone());
    let membership = state.service.check_eligibility(&campaign_id, &req.address)?;

    Ok(Json(match membership {
        Some(m) => CheckResponse {
            eligible: true,
            proof: Some(hex_proof(&m.proof)),
            root: Some(hex32(&m.root)),
        },
        None => CheckResponse {
            eligible: false,
            proof: None,
            root: None,
        },
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootResponse {
    root: String,
}

async fn campaign_root(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<RootResponse>> {
    let root = state.service.campaign_root(&campaign_id)?;
    Ok(Json(RootResponse { root: hex32(&root) }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRequest {
    campaign_id: Option<String>,
    address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResponse {
    eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
}

async fn generate_claim(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>> {
    let campaign_id = req.campaign_id.unwrap_or_else(|| state.default_campaign.clone());
    let claim = state.service.generate_claim(&campaign_id, &req.address)?;

    Ok(Json(match claim {
        Some(c) => ClaimResponse {
            eligible: true,
            address: Some(c.address),
            amount: Some(c.amount),
            proof: Some(hex_proof(&c.proof)),
            root: Some(hex32(&c.root)),
        },
        None => ClaimResponse {
            eligible: false,
            address: None,
            amount: None,
            proof: None,
            root: None,
        },
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignSummaryResponse {
    id: String,
    member_count: usize,
    root: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignsResponse {
    campaigns: Vec<CampaignSummaryResponse>,
}

async fn list_campaigns(State(state): State<AppState>) -> Json<CampaignsResponse> {
    let campaigns = state
        .service
        .list_campaigns()
        .into_iter()
        .map(|s| CampaignSummaryResponse {
            id: s.id,
            member_count: s.member_count,
            root: hex32(&s.root),
            created_at: s.created_at,
        })
        .collect();
    Json(CampaignsResponse { campaigns })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AchievementRequest {
    player: String,
    achievement_id: String,
}

async fn record_achievement(
    State(state): State<AppState>,
    Json(req): Json<AchievementRequest>,
) -> Result<Json<AchievementRecord>> {
    if req.player.is_empty() {
        return Err(Error::InvalidInput("player must not be empty".into()));
    }
    if req.achievement_id.is_empty() {
        return Err(Error::InvalidInput("achievementId must not be empty".into()));
    }
    Ok(Json(state.ledger.record(&req.player, &req.achievement_id)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerAchievementsResponse {
    player: String,
    records: Vec<AchievementRecord>,
}

async fn player_achievements(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Json<PlayerAchievementsResponse> {
    let records = state.ledger.for_player(&player);
    Json(PlayerAchievementsResponse { player, records })
}
