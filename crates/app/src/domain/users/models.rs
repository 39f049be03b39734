//! User Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use martina::uuids::TypedUuid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Address UUID
pub type AddressUuid = TypedUuid<Address>;

/// Role a user acts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "ADMIN")]
    Admin,

    #[serde(rename = "VENDOR")]
    Vendor,

    #[serde(rename = "DELIVERER")]
    Deliverer,

    #[serde(rename = "AFFILIATE PARTNER")]
    AffiliatePartner,

    #[default]
    #[serde(rename = "CUSTOMER")]
    Customer,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Vendor => "VENDOR",
            Self::Deliverer => "DELIVERER",
            Self::AffiliatePartner => "AFFILIATE PARTNER",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct UnknownUserRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownUserRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "VENDOR" => Ok(Self::Vendor),
            "DELIVERER" => Ok(Self::Deliverer),
            "AFFILIATE PARTNER" => Ok(Self::AffiliatePartner),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(UnknownUserRole(other.to_string())),
        }
    }
}

/// User Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uuid: UserUuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: Timestamp,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// New User Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub token_hash: String,
}

/// A way of reaching a user, used for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Email(String),
    Phone(String),
}

/// Address Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub uuid: AddressUuid,
    pub user: UserUuid,
    pub lines: Vec<String>,
    pub created_at: Timestamp,
}

/// New Address Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub lines: Vec<String>,
}
