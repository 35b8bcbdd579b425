//! Reed-Solomon forward error correction for the vault header.
//!
//! The header is the only irreplaceable region of a vault file: the
//! payload can survive a few flipped bits failing loudly, but a damaged
//! header loses every user's authentication material.  So the header is
//! encoded as a sequence of GF(2^8) Reed-Solomon codewords of up to 255
//! bytes each.
//!
//! For a redundancy of `r` percent, each codeword carries
//! `ceil(255 * r / 100)` parity bytes, and up to half that many
//! corrupted bytes per codeword are guaranteed recoverable.  Input is
//! zero-padded to whole codewords; the caller stores the original
//! length and passes it back on decode.

use reed_solomon::{Decoder, Encoder};

use crate::errors::{Result, VaultError};

/// Size of one Reed-Solomon codeword (data + parity).
const CODEWORD_LEN: usize = 255;

/// Lowest accepted redundancy in percent.
pub const MIN_REDUNDANCY: u8 = 5;

/// Highest accepted redundancy in percent.
pub const MAX_REDUNDANCY: u8 = 50;

/// Floor applied to header encoding regardless of the stored
/// preference: header loss is catastrophic, so 20% is the minimum.
pub const MIN_HEADER_REDUNDANCY: u8 = 20;

/// Parity bytes per codeword for the given redundancy.
fn ecc_len(redundancy: u8) -> usize {
    (CODEWORD_LEN * redundancy as usize + 99) / 100
}

/// Data bytes per codeword for the given redundancy.
fn data_len(redundancy: u8) -> usize {
    CODEWORD_LEN - ecc_len(redundancy)
}

fn check_redundancy(redundancy: u8) -> Result<()> {
    if !(MIN_REDUNDANCY..=MAX_REDUNDANCY).contains(&redundancy) {
        return Err(VaultError::InvalidRedundancy(redundancy));
    }
    Ok(())
}

/// Number of corrupted bytes per codeword guaranteed recoverable.
pub fn correctable_per_codeword(redundancy: u8) -> usize {
    ecc_len(redundancy) / 2
}

/// Encoded size for `original_len` input bytes at `redundancy` percent.
pub fn encoded_len(original_len: usize, redundancy: u8) -> usize {
    let per_block = data_len(redundancy);
    original_len.div_ceil(per_block) * CODEWORD_LEN
}

/// Encode `data` into Reed-Solomon codewords.
pub fn encode(data: &[u8], redundancy: u8) -> Result<Vec<u8>> {
    check_redundancy(redundancy)?;
    if data.is_empty() {
        return Err(VaultError::InvalidFormat("cannot FEC-encode empty data".into()));
    }

    let per_block = data_len(redundancy);
    let encoder = Encoder::new(ecc_len(redundancy));

    // Zero-pad the tail so every codeword is full size.
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(per_block) * per_block, 0);

    let mut encoded = Vec::with_capacity(encoded_len(data.len(), redundancy));
    for chunk in padded.chunks(per_block) {
        let codeword = encoder.encode(chunk);
        encoded.extend_from_slice(&codeword);
    }

    Ok(encoded)
}

/// Decode (and where necessary repair) Reed-Solomon codewords back into
/// the original `original_len` bytes.
///
/// Returns [`VaultError::FecUncorrectable`] when any codeword holds
/// more errors than the parity can repair, and
/// [`VaultError::InvalidFormat`] when the input is not the expected
/// codeword sequence for `original_len`.
pub fn decode(encoded: &[u8], original_len: usize, redundancy: u8) -> Result<Vec<u8>> {
    check_redundancy(redundancy)?;
    if original_len == 0 {
        return Err(VaultError::InvalidFormat("FEC original size is zero".into()));
    }
    if encoded.len() != encoded_len(original_len, redundancy) {
        return Err(VaultError::InvalidFormat(format!(
            "FEC data is {} bytes, expected {}",
            encoded.len(),
            encoded_len(original_len, redundancy)
        )));
    }

    let decoder = Decoder::new(ecc_len(redundancy));

    let mut recovered = Vec::with_capacity(original_len);
    for codeword in encoded.chunks(CODEWORD_LEN) {
        let repaired = decoder
            .correct(codeword, None)
            .map_err(|_| VaultError::FecUncorrectable)?;
        recovered.extend_from_slice(repaired.data());
    }

    recovered.truncate(original_len);
    Ok(recovered)
}
