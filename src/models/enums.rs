use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + Display + std::str::FromStr pattern.
/// The serialized form is the lowercase wire string used in the stored documents.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Urgency {
    Emergency => "emergency",
    Urgent => "urgent",
    Routine => "routine",
});

str_enum!(ReferralStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Arrived => "arrived",
    Admitted => "admitted",
    Cancelled => "cancelled",
});

str_enum!(HospitalStatus {
    Active => "active",
    Inactive => "inactive",
});

str_enum!(Role {
    Admin => "admin",
    Doctor => "doctor",
});
