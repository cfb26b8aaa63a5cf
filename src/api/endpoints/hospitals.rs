//! Hospital management endpoints.
//!
//! Listing is open to any authenticated user; create/update/delete are
//! administrative. The bed invariant (0 ≤ available ≤ total) is enforced at
//! this boundary on every write.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::types::{require_admin, ApiContext};
use crate::auth::AuthContext;
use crate::models::enums::HospitalStatus;
use crate::models::{Hospital, HospitalInput, HospitalUpdate};
use crate::store;

/// `GET /api/hospitals` — all facilities.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_caller): Extension<AuthContext>,
) -> Result<Json<Vec<Hospital>>, ApiError> {
    let hospitals = ctx.store.load_hospitals()?;
    Ok(Json(hospitals))
}

/// `POST /api/hospitals` — create a facility (admin only).
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
    Json(input): Json<HospitalInput>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    require_admin(&caller)?;

    if input.name.trim().is_empty() || input.address.trim().is_empty() {
        return Err(ApiError::BadRequest("Required fields missing".into()));
    }
    if input.total_beds == 0 {
        return Err(ApiError::BadRequest(
            "Total beds must be at least 1".into(),
        ));
    }

    let _guard = ctx.store.lock_hospitals()?;
    let mut hospitals = ctx.store.load_hospitals()?;

    let hospital = Hospital {
        id: store::next_id(hospitals.iter().map(|h| h.id)),
        name: input.name.trim().to_string(),
        total_beds: input.total_beds,
        available_beds: input.available_beds.min(input.total_beds),
        status: HospitalStatus::Active,
        address: input.address.trim().to_string(),
        contact_number: input.contact_number.trim().to_string(),
        created_at: Utc::now(),
    };

    hospitals.push(hospital.clone());
    ctx.store.save_hospitals(&hospitals)?;

    tracing::info!(id = hospital.id, name = %hospital.name, "Hospital created");
    Ok((StatusCode::CREATED, Json(hospital)))
}

/// `PUT /api/hospitals/:id` — partial update (admin only).
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<u64>,
    Json(update): Json<HospitalUpdate>,
) -> Result<Json<Hospital>, ApiError> {
    require_admin(&caller)?;

    let _guard = ctx.store.lock_hospitals()?;
    let mut hospitals = ctx.store.load_hospitals()?;

    let hospital = hospitals
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("Hospital {id} not found")))?;

    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".into()));
        }
        hospital.name = name.trim().to_string();
    }
    if let Some(total) = update.total_beds {
        if total == 0 {
            return Err(ApiError::BadRequest(
                "Total beds must be at least 1".into(),
            ));
        }
        hospital.total_beds = total;
    }
    if let Some(available) = update.available_beds {
        hospital.available_beds = available;
    }
    if let Some(status) = update.status {
        hospital.status = status;
    }
    if let Some(address) = update.address {
        hospital.address = address.trim().to_string();
    }
    if let Some(contact) = update.contact_number {
        hospital.contact_number = contact.trim().to_string();
    }
    // Re-establish the bed invariant whichever field moved.
    hospital.available_beds = hospital.available_beds.min(hospital.total_beds);

    let updated = hospital.clone();
    ctx.store.save_hospitals(&hospitals)?;

    tracing::info!(id, "Hospital updated");
    Ok(Json(updated))
}

/// `DELETE /api/hospitals/:id` — remove a facility (admin only).
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    require_admin(&caller)?;

    let _guard = ctx.store.lock_hospitals()?;
    let mut hospitals = ctx.store.load_hospitals()?;

    let before = hospitals.len();
    hospitals.retain(|h| h.id != id);
    if hospitals.len() == before {
        return Err(ApiError::NotFound(format!("Hospital {id} not found")));
    }

    ctx.store.save_hospitals(&hospitals)?;
    tracing::info!(id, "Hospital deleted");
    Ok(StatusCode::NO_CONTENT)
}
