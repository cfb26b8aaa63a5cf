//! Analytics aggregator.
//!
//! [`compute`] is a pure point-in-time read over the referral and hospital
//! collections: no I/O, no state between calls, recomputed from scratch every
//! time. "Today" is the server's local calendar day.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::models::enums::{HospitalStatus, ReferralStatus, Urgency};
use crate::models::{Hospital, Referral};

/// Referral count per status. All five keys are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub arrived: usize,
    pub admitted: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.confirmed + self.arrived + self.admitted + self.cancelled
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_referrals: usize,
    pub today_referrals: usize,
    pub emergency_count: usize,
    pub urgent_count: usize,
    pub routine_count: usize,
    pub maa_yojana_count: usize,
    pub status_counts: StatusCounts,
    pub total_hospitals: usize,
    pub active_hospitals: usize,
    pub total_beds: u64,
    pub available_beds: u64,
}

/// Derive the snapshot as of now.
pub fn compute(referrals: &[Referral], hospitals: &[Hospital]) -> AnalyticsSnapshot {
    compute_on(referrals, hospitals, Local::now().date_naive())
}

/// Derive the snapshot with an explicit "today" boundary.
pub fn compute_on(
    referrals: &[Referral],
    hospitals: &[Hospital],
    today: NaiveDate,
) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot {
        total_referrals: referrals.len(),
        total_hospitals: hospitals.len(),
        ..Default::default()
    };

    for referral in referrals {
        if referral.created_at.with_timezone(&Local).date_naive() == today {
            snapshot.today_referrals += 1;
        }
        match referral.urgency {
            Urgency::Emergency => snapshot.emergency_count += 1,
            Urgency::Urgent => snapshot.urgent_count += 1,
            Urgency::Routine => snapshot.routine_count += 1,
        }
        if referral.maa_yojana {
            snapshot.maa_yojana_count += 1;
        }
        match referral.status {
            ReferralStatus::Pending => snapshot.status_counts.pending += 1,
            ReferralStatus::Confirmed => snapshot.status_counts.confirmed += 1,
            ReferralStatus::Arrived => snapshot.status_counts.arrived += 1,
            ReferralStatus::Admitted => snapshot.status_counts.admitted += 1,
            ReferralStatus::Cancelled => snapshot.status_counts.cancelled += 1,
        }
    }

    for hospital in hospitals {
        if hospital.status == HospitalStatus::Active {
            snapshot.active_hospitals += 1;
        }
        snapshot.total_beds += u64::from(hospital.total_beds);
        snapshot.available_beds += u64::from(hospital.available_beds);
    }

    snapshot
}
