use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in MultiVault.
///
/// Authentication failures are deliberately a single opaque kind: the
/// message never distinguishes an unknown username from a wrong password
/// or a wrong second factor.  Every other kind is specific and actionable,
/// because by the time user-management operations run the caller has
/// already authenticated.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Format errors ---
    #[error("Invalid vault format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported vault format version {0}")]
    UnsupportedVersion(u32),

    #[error("Legacy single-user vault — migrate it before opening")]
    LegacyVault,

    #[error("Declared header size {size} exceeds limit of {max} bytes")]
    HeaderTooLarge { size: u64, max: u64 },

    #[error("Vault header is corrupted beyond error-correction capacity")]
    FecUncorrectable,

    #[error("FEC redundancy {0}% is out of range")]
    InvalidRedundancy(u8),

    // --- Crypto errors ---
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Cryptographic operation failed: {0}")]
    CryptoFailure(String),

    #[error("Payload decryption failed — corrupted data")]
    DecryptionFailed,

    // --- Policy errors ---
    #[error("Password must be at least {min} characters")]
    WeakPassword { min: u32 },

    #[error("Invalid security policy: {0}")]
    WeakPolicy(String),

    #[error("Password was used previously — choose a new one")]
    PasswordReused,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("No vault is open")]
    VaultNotOpen,

    #[error("All key slots are in use")]
    MaxUsersReached,

    // --- Authorization errors ---
    #[error("Permission denied — administrator role required")]
    PermissionDenied,

    #[error("Cannot remove your own user")]
    SelfRemovalNotAllowed,

    #[error("Cannot remove the last administrator")]
    LastAdministrator,

    // --- Second factor errors ---
    #[error("Second-factor device not present")]
    SecondFactorUnavailable,

    #[error("Second-factor challenge-response failed")]
    SecondFactorFailed,

    #[error("A second factor is already enrolled for this user")]
    SecondFactorAlreadyEnrolled,

    // --- IO errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for MultiVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
