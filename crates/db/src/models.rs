//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models: they carry no behaviour beyond the
//! display strings the pages show for them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// auth_user
// ---------------------------------------------------------------------------

/// An account row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// lettings_address
// ---------------------------------------------------------------------------

/// A postal address row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AddressRow {
    pub id: i64,
    /// Street number, at most 9999.
    pub number: i64,
    pub street: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// At most five digits.
    pub zip_code: i64,
    /// Three-letter ISO country code.
    pub country_iso_code: String,
}

impl fmt::Display for AddressRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.street)
    }
}

/// Column values for a new address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    pub number: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: i64,
    pub country_iso_code: String,
}

// ---------------------------------------------------------------------------
// lettings_letting
// ---------------------------------------------------------------------------

/// A letting row. Each letting owns exactly one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LettingRow {
    pub id: i64,
    pub title: String,
    pub address_id: i64,
}

impl fmt::Display for LettingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A letting together with its address, as shown on the detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LettingDetail {
    pub letting: LettingRow,
    pub address: AddressRow,
}

// ---------------------------------------------------------------------------
// profiles_profile
// ---------------------------------------------------------------------------

/// A profile row. Each profile belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub favorite_city: String,
    pub user_id: i64,
}

/// One entry of the profile index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProfileListing {
    pub id: i64,
    pub username: String,
}

/// A profile together with its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDetail {
    pub profile: ProfileRow,
    pub user: UserRow,
}

impl fmt::Display for ProfileDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user.username)
    }
}
