//! User records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, UserStatus};

/// A shop user.
///
/// The password hash is never read by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique.
    pub username: String,
    /// Mobile number, unique when present.
    pub phone: Option<String>,
    /// Email address, unique when present.
    pub email: Option<String>,
    /// Display name.
    pub nickname: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Whether the account is active.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
