//! Flat-file document store.
//!
//! Each collection (users, hospitals, referrals) is one JSON document holding
//! an array of records. Reads parse the whole file; writes replace the whole
//! file atomically (temp file in the same directory, then rename), so a write
//! either fully replaces the document or the prior document is retained.
//!
//! Callers that read-modify-write must hold the matching collection lock for
//! the whole sequence; a lost update is otherwise possible (last writer wins).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::auth;
use crate::models::enums::{HospitalStatus, ReferralStatus, Role, Urgency};
use crate::models::{Hospital, Referral, User};

const USERS_FILE: &str = "users.json";
const HOSPITALS_FILE: &str = "hospitals.json";
const REFERRALS_FILE: &str = "referrals.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Collection lock poisoned")]
    LockPoisoned,
}

/// Handle to the data directory. One lock per collection serializes
/// read-modify-write sequences within this process.
pub struct Store {
    dir: PathBuf,
    users: Mutex<()>,
    hospitals: Mutex<()>,
    referrals: Mutex<()>,
}

impl Store {
    /// Open the store at `dir`, creating the directory and seeding any
    /// missing collection with the default records.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let store = Self::open_empty(dir)?;
        store.seed_missing()?;
        Ok(store)
    }

    /// Open the store at `dir` without seeding. Missing collections read as
    /// empty. Used by tests that build their own fixtures.
    pub fn open_empty(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            users: Mutex::new(()),
            hospitals: Mutex::new(()),
            referrals: Mutex::new(()),
        })
    }

    pub fn lock_users(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.users.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn lock_hospitals(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.hospitals.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn lock_referrals(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.referrals.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn load_users(&self) -> Result<Vec<User>, StoreError> {
        self.read_collection(USERS_FILE)
    }

    pub fn load_hospitals(&self) -> Result<Vec<Hospital>, StoreError> {
        self.read_collection(HOSPITALS_FILE)
    }

    pub fn load_referrals(&self) -> Result<Vec<Referral>, StoreError> {
        self.read_collection(REFERRALS_FILE)
    }

    pub fn save_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.write_collection(USERS_FILE, users)
    }

    pub fn save_hospitals(&self, hospitals: &[Hospital]) -> Result<(), StoreError> {
        self.write_collection(HOSPITALS_FILE, hospitals)
    }

    pub fn save_referrals(&self, referrals: &[Referral]) -> Result<(), StoreError> {
        self.write_collection(REFERRALS_FILE, referrals)
    }

    fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        match fs::read(&path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_collection<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        // Temp file must live in the same directory so the rename is atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, items)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn seed_missing(&self) -> Result<(), StoreError> {
        if !self.dir.join(USERS_FILE).exists() {
            tracing::info!("Seeding default users");
            self.save_users(&default_users())?;
        }
        if !self.dir.join(HOSPITALS_FILE).exists() {
            tracing::info!("Seeding default hospitals");
            self.save_hospitals(&default_hospitals())?;
        }
        if !self.dir.join(REFERRALS_FILE).exists() {
            tracing::info!("Seeding sample referral");
            self.save_referrals(&default_referrals())?;
        }
        Ok(())
    }
}

/// Next identifier for a collection: one past the largest assigned, never
/// reused even after the top record is removed within this document's life.
pub fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

fn default_users() -> Vec<User> {
    let now = Utc::now();
    let admin = auth::hash_password("admin123");
    let doctor = auth::hash_password("doctor123");
    vec![
        User {
            id: 1,
            username: "admin".into(),
            password_hash: admin.hash,
            salt: admin.salt,
            name: "System Administrator".into(),
            email: "admin@setu.gov.in".into(),
            role: Role::Admin,
            created_at: now,
        },
        User {
            id: 2,
            username: "doctor1".into(),
            password_hash: doctor.hash,
            salt: doctor.salt,
            name: "Dr. Rajesh Kumar".into(),
            email: "rajesh@setu.gov.in".into(),
            role: Role::Doctor,
            created_at: now,
        },
    ]
}

fn default_hospitals() -> Vec<Hospital> {
    let now = Utc::now();
    vec![
        Hospital {
            id: 1,
            name: "Government Medical College Hospital".into(),
            total_beds: 150,
            available_beds: 45,
            status: HospitalStatus::Active,
            address: "Medical College Road, District HQ".into(),
            contact_number: "+91-9876543210".into(),
            created_at: now,
        },
        Hospital {
            id: 2,
            name: "District Civil Hospital".into(),
            total_beds: 100,
            available_beds: 25,
            status: HospitalStatus::Active,
            address: "Civil Lines, District HQ".into(),
            contact_number: "+91-9876543211".into(),
            created_at: now,
        },
        Hospital {
            id: 3,
            name: "Community Health Centre A".into(),
            total_beds: 50,
            available_beds: 15,
            status: HospitalStatus::Active,
            address: "Block A, Rural Area".into(),
            contact_number: "+91-9876543212".into(),
            created_at: now,
        },
    ]
}

fn default_referrals() -> Vec<Referral> {
    let now = Utc::now();
    vec![Referral {
        id: 1,
        patient_name: "John Doe".into(),
        age: 45,
        gender: "male".into(),
        contact_number: "+91-9876543212".into(),
        medical_history: "Hypertension, Diabetes".into(),
        reason: "Chest pain, shortness of breath".into(),
        urgency: Urgency::Emergency,
        specialty: "cardiology".into(),
        maa_yojana: false,
        hospital_id: Some(1),
        status: ReferralStatus::Confirmed,
        referred_by: "Dr. Smith".into(),
        eta: 15,
        created_at: now,
        updated_at: now,
    }]
}
