pub mod enums;
pub mod hospital;
pub mod referral;
pub mod user;

pub use hospital::{Hospital, HospitalInput, HospitalUpdate};
pub use referral::{Referral, ReferralInput};
pub use user::{User, UserSummary};
