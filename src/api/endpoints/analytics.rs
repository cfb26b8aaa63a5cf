//! Analytics endpoint.

use axum::extract::State;
use axum::{Extension, Json};

use crate::analytics::{self, AnalyticsSnapshot};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::AuthContext;

/// `GET /api/analytics` — point-in-time snapshot over the current
/// referral and hospital collections.
pub async fn snapshot(
    State(ctx): State<ApiContext>,
    Extension(_caller): Extension<AuthContext>,
) -> Result<Json<AnalyticsSnapshot>, ApiError> {
    let referrals = ctx.store.load_referrals()?;
    let hospitals = ctx.store.load_hospitals()?;
    Ok(Json(analytics::compute(&referrals, &hospitals)))
}
