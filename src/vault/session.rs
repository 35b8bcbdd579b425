//! In-memory session state and the UI-facing read models.
//!
//! A `UserSession` exists only between a successful authentication and
//! the vault being closed; it is never persisted.  `UserInfo` is the
//! roster view handed to the front-end: usernames, roles, and
//! enrollment flags, but no key material.

use serde::Serialize;

use crate::vault::slot::{KeySlot, UserRole};

/// Current authenticated user for an open vault.
#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    /// Authenticated username.
    pub username: String,

    /// Role used for permission checks.
    pub role: UserRole,

    /// All vault operations should be blocked by the front-end until
    /// the user replaces their temporary password.
    pub must_change_password: bool,

    /// Policy requires a second factor the user has not enrolled yet.
    pub requires_second_factor_enrollment: bool,

    /// Session creation time (Unix epoch seconds).
    pub started_at: i64,
}

impl UserSession {
    /// Whether this user may manage the roster.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }

    /// Whether the user may access vault content at all (no pending
    /// password change or second-factor enrollment).
    pub fn can_access_vault(&self) -> bool {
        !self.must_change_password && !self.requires_second_factor_enrollment
    }

    /// Whether this session may view a record carrying these flags.
    pub fn can_view_record(&self, flags: RecordFlags) -> bool {
        !flags.admin_only_view || self.is_admin()
    }

    /// Whether this session may delete a record carrying these flags.
    pub fn can_delete_record(&self, flags: RecordFlags) -> bool {
        !flags.admin_only_delete || self.is_admin()
    }
}

/// Visibility flags stored on each account record by the (external)
/// record layer; the engine only evaluates them against the session.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RecordFlags {
    pub admin_only_view: bool,
    pub admin_only_delete: bool,
}

/// Roster entry returned by `VaultManager::list_users`.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub username: String,
    pub role: UserRole,
    pub must_change_password: bool,
    pub second_factor_enrolled: bool,
    /// Unix epoch seconds; 0 marks a temporary password.
    pub password_changed_at: i64,
    /// Unix epoch seconds; 0 if the user never logged in.
    pub last_login_at: i64,
}

impl From<&KeySlot> for UserInfo {
    fn from(slot: &KeySlot) -> Self {
        Self {
            username: slot.username.clone(),
            role: slot.role,
            must_change_password: slot.must_change_password,
            second_factor_enrolled: slot.second_factor_enrolled,
            password_changed_at: slot.password_changed_at,
            last_login_at: slot.last_login_at,
        }
    }
}
