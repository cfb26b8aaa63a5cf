use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::HospitalStatus;

/// A receiving facility with bed capacity, as persisted in `hospitals.json`.
///
/// Invariant: `available_beds <= total_beds` (enforced on create and update).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: u64,
    pub name: String,
    pub total_beds: u32,
    pub available_beds: u32,
    pub status: HospitalStatus,
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    pub created_at: DateTime<Utc>,
}

/// Body for creating a hospital (admin only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_beds: u32,
    #[serde(default)]
    pub available_beds: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
}

/// Partial update for an existing hospital; absent fields are left as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalUpdate {
    pub name: Option<String>,
    pub total_beds: Option<u32>,
    pub available_beds: Option<u32>,
    pub status: Option<HospitalStatus>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}
