//! Second-factor challenge-response seam.
//!
//! The engine never talks to hardware.  It hands a challenge to a
//! [`SecondFactorProvider`] supplied by the caller and XORs the
//! response into the user's KEK.  Device enumeration, touch prompts,
//! and timeouts all live behind this trait in the front-end.

use crate::crypto::FACTOR_RESPONSE_LEN;

/// Result of asking a second-factor device to answer a challenge.
pub enum FactorOutcome {
    /// The device answered; the response is combined into the KEK.
    Response([u8; FACTOR_RESPONSE_LEN]),
    /// No device is connected.
    NotPresent,
    /// A device is present but the challenge-response failed.
    Failed,
}

/// A hardware (or software) second factor.
///
/// Implementations must be deterministic per challenge: the same
/// challenge must always produce the same response bytes, otherwise
/// the wrapped DEK can never be unwrapped again.
pub trait SecondFactorProvider {
    /// Answer `challenge` with a fixed-size response.
    fn respond(&self, challenge: &[u8]) -> FactorOutcome;
}
