use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ReferralStatus, Urgency};

/// One patient referral request, as persisted in `referrals.json`.
///
/// `created_at` is immutable after creation; `status` and `updated_at` are the
/// only fields that change afterwards, and only via a status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: u64,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub medical_history: String,
    pub reason: String,
    pub urgency: Urgency,
    pub specialty: String,
    #[serde(default)]
    pub maa_yojana: bool,
    /// `None` means no facility chosen yet (auto-assign later).
    #[serde(default)]
    pub hospital_id: Option<u64>,
    pub status: ReferralStatus,
    pub referred_by: String,
    /// Estimated arrival in minutes, assigned once at submission.
    pub eta: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission body for a new referral.
///
/// `urgency` is carried as a raw string so a bad value surfaces as a 400
/// validation failure rather than a body-decode rejection. A caller-supplied
/// `status` field is ignored entirely; every submission starts as pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInput {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub maa_yojana: bool,
    #[serde(default)]
    pub hospital_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_serializes_camel_case() {
        let referral = Referral {
            id: 7,
            patient_name: "John Doe".into(),
            age: 45,
            gender: "male".into(),
            contact_number: "+91-9876543212".into(),
            medical_history: String::new(),
            reason: "Chest pain".into(),
            urgency: Urgency::Emergency,
            specialty: "cardiology".into(),
            maa_yojana: false,
            hospital_id: Some(1),
            status: ReferralStatus::Pending,
            referred_by: "doctor1".into(),
            eta: 25,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&referral).unwrap();
        assert_eq!(json["patientName"], "John Doe");
        assert_eq!(json["maaYojana"], false);
        assert_eq!(json["hospitalId"], 1);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["referredBy"], "doctor1");
    }

    #[test]
    fn input_ignores_caller_supplied_status() {
        // Unknown fields (including "status") are dropped at the boundary.
        let input: ReferralInput = serde_json::from_str(
            r#"{"patientName":"A","age":30,"gender":"male","reason":"fever",
                "urgency":"routine","specialty":"general","status":"admitted"}"#,
        )
        .unwrap();
        assert_eq!(input.patient_name, "A");
        assert_eq!(input.urgency, "routine");
    }

    #[test]
    fn input_defaults_optional_fields() {
        let input: ReferralInput = serde_json::from_str("{}").unwrap();
        assert!(input.patient_name.is_empty());
        assert_eq!(input.age, 0);
        assert!(input.hospital_id.is_none());
        assert!(!input.maa_yojana);
    }
}
