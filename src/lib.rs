//! MultiVault core: multi-user authentication and encrypted storage.
//!
//! A LUKS-style key-slot architecture lets up to 32 users unlock one
//! shared encrypted store with their own credentials.  Each user's
//! password (optionally combined with a hardware second factor) derives
//! a Key Encryption Key that wraps the vault's single Data Encryption
//! Key; no shared secret and no password-equivalent is ever written to
//! disk.  The vault header is protected with Reed-Solomon forward error
//! correction so bit rot cannot silently destroy the authentication
//! material of every user at once.
//!
//! Typical flow:
//!
//! ```no_run
//! use multivault::vault::{VaultManager, VaultSecurityPolicy, UserRole};
//!
//! # fn main() -> multivault::errors::Result<()> {
//! let path = std::path::Path::new("team.vault");
//!
//! // Create a vault with one administrator.
//! let mut vault = VaultManager::create(path, "admin", "Sup3rSecret!", VaultSecurityPolicy::default())?;
//! vault.add_user("bob", "Temp1234!Temp", UserRole::StandardUser)?;
//! vault.save(b"serialized account records")?;
//! vault.close();
//!
//! // Later: open and authenticate.
//! let mut vault = VaultManager::open(path)?;
//! let session = vault.authenticate("bob", "Temp1234!Temp", None)?;
//! assert!(session.must_change_password);
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod errors;
pub mod factor;
pub mod format;
pub mod io;
pub mod vault;
