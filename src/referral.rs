//! Referral lifecycle engine.
//!
//! Owns the status state machine, field defaults at submission, and the
//! ordering contract for listing. Every operation re-reads the authoritative
//! collection under the collection lock, mutates it, and writes it back whole;
//! nothing is cached across calls.
//!
//! Status graph (self-loops forbidden, no re-entry to a prior state):
//!
//! ```text
//! pending ──▶ confirmed ──▶ arrived ──▶ admitted
//!    │            │
//!    └────────────┴──▶ cancelled
//! ```

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::models::enums::{ReferralStatus, Urgency};
use crate::models::{Referral, ReferralInput};
use crate::store::{self, Store, StoreError};

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("{0}")]
    Validation(String),

    #[error("Referral {0} not found")]
    NotFound(u64),

    #[error("Cannot move referral from {from} to {to}")]
    InvalidTransition {
        from: ReferralStatus,
        to: ReferralStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReferralStatus {
    /// Legal successor statuses. Terminal statuses have none.
    pub fn successors(self) -> &'static [ReferralStatus] {
        use ReferralStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Arrived, Cancelled],
            Arrived => &[Admitted],
            Admitted | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: ReferralStatus) -> bool {
        self.successors().contains(&next)
    }
}

/// Arrival-time estimate assigned once at submission.
///
/// The random estimate is a placeholder; keeping it behind this trait lets a
/// distance- or traffic-based estimator replace it without touching the
/// state machine.
pub trait EtaPolicy: Send + Sync {
    /// Estimated minutes until arrival.
    fn estimate(&self, input: &ReferralInput) -> u32;
}

/// Uniform random estimate in [15, 60) minutes.
pub struct RandomEta;

impl EtaPolicy for RandomEta {
    fn estimate(&self, _input: &ReferralInput) -> u32 {
        rand::thread_rng().gen_range(15..60)
    }
}

/// Submit a new referral.
///
/// Validates required fields, assigns a fresh id, forces status to pending
/// regardless of anything the caller sent, stamps both timestamps, and
/// prepends the record so the collection stays most-recent-first.
pub fn submit(
    store: &Store,
    input: ReferralInput,
    referred_by: &str,
    eta_policy: &dyn EtaPolicy,
) -> Result<Referral, ReferralError> {
    let urgency = validate(store, &input)?;

    let _guard = store.lock_referrals()?;
    let mut referrals = store.load_referrals()?;

    let now = Utc::now();
    let referral = Referral {
        id: store::next_id(referrals.iter().map(|r| r.id)),
        patient_name: input.patient_name.trim().to_string(),
        age: input.age,
        gender: input.gender.trim().to_string(),
        contact_number: input.contact_number.trim().to_string(),
        medical_history: input.medical_history.trim().to_string(),
        reason: input.reason.trim().to_string(),
        urgency,
        specialty: input.specialty.trim().to_string(),
        maa_yojana: input.maa_yojana,
        hospital_id: input.hospital_id,
        status: ReferralStatus::Pending,
        referred_by: referred_by.to_string(),
        eta: eta_policy.estimate(&input),
        created_at: now,
        updated_at: now,
    };

    referrals.insert(0, referral.clone());
    store.save_referrals(&referrals)?;

    tracing::info!(
        id = referral.id,
        urgency = %referral.urgency,
        referred_by,
        "Referral submitted"
    );
    Ok(referral)
}

/// Move a referral to `new_status` if the edge exists in the status graph.
/// Refreshes `updated_at`; `created_at` is never touched.
pub fn transition(
    store: &Store,
    id: u64,
    new_status: ReferralStatus,
) -> Result<Referral, ReferralError> {
    let _guard = store.lock_referrals()?;
    let mut referrals = store.load_referrals()?;

    let referral = referrals
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(ReferralError::NotFound(id))?;

    if !referral.status.can_transition_to(new_status) {
        return Err(ReferralError::InvalidTransition {
            from: referral.status,
            to: new_status,
        });
    }

    referral.status = new_status;
    referral.updated_at = Utc::now();
    let updated = referral.clone();
    store.save_referrals(&referrals)?;

    tracing::info!(id, status = %new_status, "Referral status updated");
    Ok(updated)
}

/// All referrals, newest first (stable on ties, preserving insertion order).
pub fn list(store: &Store) -> Result<Vec<Referral>, ReferralError> {
    let mut referrals = store.load_referrals()?;
    referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(referrals)
}

fn validate(store: &Store, input: &ReferralInput) -> Result<Urgency, ReferralError> {
    if input.patient_name.trim().is_empty() {
        return Err(ReferralError::Validation("Patient name is required".into()));
    }
    if input.age == 0 {
        return Err(ReferralError::Validation(
            "Age must be a positive integer".into(),
        ));
    }
    if input.gender.trim().is_empty() {
        return Err(ReferralError::Validation("Gender is required".into()));
    }
    if input.reason.trim().is_empty() {
        return Err(ReferralError::Validation("Reason is required".into()));
    }
    if input.specialty.trim().is_empty() {
        return Err(ReferralError::Validation("Specialty is required".into()));
    }
    let urgency: Urgency = input.urgency.parse().map_err(|_| {
        ReferralError::Validation(format!("Unknown urgency: {}", input.urgency))
    })?;

    if let Some(hospital_id) = input.hospital_id {
        let hospitals = store.load_hospitals()?;
        if !hospitals.iter().any(|h| h.id == hospital_id) {
            return Err(ReferralError::Validation(format!(
                "Unknown hospital: {hospital_id}"
            )));
        }
    }

    Ok(urgency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::HospitalStatus;
    use crate::models::Hospital;
    use crate::store::Store;
    use std::thread::sleep;
    use std::time::Duration;

    /// Deterministic policy for assertions on the stored value.
    struct FixedEta(u32);

    impl EtaPolicy for FixedEta {
        fn estimate(&self, _input: &ReferralInput) -> u32 {
            self.0
        }
    }

    fn test_store() -> (Store, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open_empty(tmp.path()).unwrap();
        (store, tmp)
    }

    fn valid_input() -> ReferralInput {
        ReferralInput {
            patient_name: "A".into(),
            age: 30,
            gender: "male".into(),
            reason: "fever".into(),
            urgency: "routine".into(),
            specialty: "general".into(),
            ..Default::default()
        }
    }

    #[test]
    fn submit_forces_status_to_pending() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        assert_eq!(referral.status, ReferralStatus::Pending);
        assert_eq!(referral.referred_by, "doctor1");
        assert_eq!(referral.eta, 20);
        assert_eq!(referral.created_at, referral.updated_at);
    }

    #[test]
    fn submit_assigns_monotonic_ids() {
        let (store, _tmp) = test_store();
        let a = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        let b = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn submit_prepends_to_the_collection() {
        let (store, _tmp) = test_store();
        submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        let stored = store.load_referrals().unwrap();
        assert_eq!(stored[0].id, 2);
        assert_eq!(stored[1].id, 1);
    }

    #[test]
    fn submit_rejects_missing_required_fields() {
        let (store, _tmp) = test_store();
        for (mutate, expect) in [
            (
                Box::new(|i: &mut ReferralInput| i.patient_name.clear())
                    as Box<dyn Fn(&mut ReferralInput)>,
                "Patient name",
            ),
            (Box::new(|i: &mut ReferralInput| i.age = 0), "Age"),
            (Box::new(|i: &mut ReferralInput| i.gender = "  ".into()), "Gender"),
            (Box::new(|i: &mut ReferralInput| i.reason.clear()), "Reason"),
            (Box::new(|i: &mut ReferralInput| i.specialty.clear()), "Specialty"),
            (Box::new(|i: &mut ReferralInput| i.urgency = "whenever".into()), "urgency"),
        ] {
            let mut input = valid_input();
            mutate(&mut input);
            let err = submit(&store, input, "doctor1", &FixedEta(20)).unwrap_err();
            match err {
                ReferralError::Validation(msg) => {
                    assert!(msg.contains(expect), "{msg:?} should mention {expect}")
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(store.load_referrals().unwrap().is_empty());
    }

    #[test]
    fn submit_rejects_unknown_hospital_reference() {
        let (store, _tmp) = test_store();
        let mut input = valid_input();
        input.hospital_id = Some(99);
        let err = submit(&store, input, "doctor1", &FixedEta(20)).unwrap_err();
        assert!(matches!(err, ReferralError::Validation(_)));
    }

    #[test]
    fn submit_accepts_known_hospital_reference() {
        let (store, _tmp) = test_store();
        store
            .save_hospitals(&[Hospital {
                id: 4,
                name: "CHC B".into(),
                total_beds: 20,
                available_beds: 5,
                status: HospitalStatus::Active,
                address: "Block B".into(),
                contact_number: String::new(),
                created_at: Utc::now(),
            }])
            .unwrap();
        let mut input = valid_input();
        input.hospital_id = Some(4);
        let referral = submit(&store, input, "doctor1", &FixedEta(20)).unwrap();
        assert_eq!(referral.hospital_id, Some(4));
    }

    #[test]
    fn random_eta_stays_in_range() {
        let input = valid_input();
        for _ in 0..200 {
            let eta = RandomEta.estimate(&input);
            assert!((15..60).contains(&eta), "eta {eta} outside [15, 60)");
        }
    }

    #[test]
    fn happy_path_chain_succeeds_with_increasing_updated_at() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        let created_at = referral.created_at;

        let mut last = referral.updated_at;
        for status in [
            ReferralStatus::Confirmed,
            ReferralStatus::Arrived,
            ReferralStatus::Admitted,
        ] {
            sleep(Duration::from_millis(2));
            let updated = transition(&store, referral.id, status).unwrap();
            assert_eq!(updated.status, status);
            assert_eq!(updated.created_at, created_at);
            assert!(updated.updated_at > last, "updated_at must strictly increase");
            last = updated.updated_at;
        }
    }

    #[test]
    fn eta_is_never_recomputed_on_transition() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(33)).unwrap();
        let updated = transition(&store, referral.id, ReferralStatus::Confirmed).unwrap();
        assert_eq!(updated.eta, 33);
    }

    #[test]
    fn illegal_jumps_are_rejected() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();

        // pending → admitted skips the graph entirely
        let err = transition(&store, referral.id, ReferralStatus::Admitted).unwrap_err();
        assert!(matches!(
            err,
            ReferralError::InvalidTransition {
                from: ReferralStatus::Pending,
                to: ReferralStatus::Admitted,
            }
        ));

        // confirmed → admitted skips arrived
        transition(&store, referral.id, ReferralStatus::Confirmed).unwrap();
        let err = transition(&store, referral.id, ReferralStatus::Admitted).unwrap_err();
        assert!(matches!(err, ReferralError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        transition(&store, referral.id, ReferralStatus::Cancelled).unwrap();

        for status in [
            ReferralStatus::Pending,
            ReferralStatus::Confirmed,
            ReferralStatus::Arrived,
            ReferralStatus::Admitted,
            ReferralStatus::Cancelled,
        ] {
            assert!(
                transition(&store, referral.id, status).is_err(),
                "cancelled must not move to {status}"
            );
        }
    }

    #[test]
    fn self_transitions_are_forbidden() {
        for status in [
            ReferralStatus::Pending,
            ReferralStatus::Confirmed,
            ReferralStatus::Arrived,
            ReferralStatus::Admitted,
            ReferralStatus::Cancelled,
        ] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn transition_graph_matches_the_design() {
        use ReferralStatus::*;
        let legal = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Arrived),
            (Confirmed, Cancelled),
            (Arrived, Admitted),
        ];
        for from in [Pending, Confirmed, Arrived, Admitted, Cancelled] {
            for to in [Pending, Confirmed, Arrived, Admitted, Cancelled] {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "edge {from} → {to}"
                );
            }
        }
    }

    #[test]
    fn failed_transition_does_not_persist_anything() {
        let (store, _tmp) = test_store();
        let referral = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        let before = store.load_referrals().unwrap();

        transition(&store, referral.id, ReferralStatus::Admitted).unwrap_err();

        let after = store.load_referrals().unwrap();
        assert_eq!(after[0].status, before[0].status);
        assert_eq!(after[0].updated_at, before[0].updated_at);
    }

    #[test]
    fn transition_unknown_id_is_not_found() {
        let (store, _tmp) = test_store();
        let err = transition(&store, 42, ReferralStatus::Confirmed).unwrap_err();
        assert!(matches!(err, ReferralError::NotFound(42)));
    }

    #[test]
    fn list_orders_newest_first() {
        let (store, _tmp) = test_store();
        for _ in 0..3 {
            submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
            sleep(Duration::from_millis(2));
        }

        let listed = list(&store).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed[0].created_at > listed[1].created_at);
        assert!(listed[1].created_at > listed[2].created_at);
        assert_eq!(listed[0].id, 3);
        assert_eq!(listed[2].id, 1);
    }

    #[test]
    fn list_is_stable_on_equal_timestamps() {
        let (store, _tmp) = test_store();
        let now = Utc::now();
        let mut referrals = Vec::new();
        for id in [3, 2, 1] {
            let mut r = submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
            r.id = id;
            r.created_at = now;
            r.updated_at = now;
            referrals.push(r);
        }
        store.save_referrals(&referrals).unwrap();

        let listed = list(&store).unwrap();
        // Insertion order preserved on ties.
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn list_does_not_mutate_the_document() {
        let (store, _tmp) = test_store();
        submit(&store, valid_input(), "doctor1", &FixedEta(20)).unwrap();
        let before = serde_json::to_string(&store.load_referrals().unwrap()).unwrap();
        list(&store).unwrap();
        let after = serde_json::to_string(&store.load_referrals().unwrap()).unwrap();
        assert_eq!(before, after);
    }
}
