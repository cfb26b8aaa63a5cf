//! Referral endpoints.
//!
//! `GET /api/referrals` — newest-first listing
//! `POST /api/referrals` — submit a referral (always starts pending)
//! `PUT /api/referrals/:id/status` — move along the status graph

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::AuthContext;
use crate::models::enums::ReferralStatus;
use crate::models::{Referral, ReferralInput};
use crate::referral;

/// `GET /api/referrals` — all referrals, sorted descending by creation time.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_caller): Extension<AuthContext>,
) -> Result<Json<Vec<Referral>>, ApiError> {
    let referrals = referral::list(&ctx.store)?;
    Ok(Json(referrals))
}

/// `POST /api/referrals` — submit a new referral as the authenticated user.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
    Json(input): Json<ReferralInput>,
) -> Result<(StatusCode, Json<Referral>), ApiError> {
    let created = referral::submit(&ctx.store, input, &caller.username, ctx.eta.as_ref())?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Body of a status update. Carried as a raw string so an out-of-enum value
/// surfaces as a 400 with a message, not a body-decode rejection.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

/// `PUT /api/referrals/:id/status` — transition a referral.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(_caller): Extension<AuthContext>,
    Path(id): Path<u64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Referral>, ApiError> {
    let status: ReferralStatus = update
        .status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", update.status)))?;

    let updated = referral::transition(&ctx.store, id, status)?;
    Ok(Json(updated))
}
