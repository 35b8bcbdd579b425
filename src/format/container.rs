//! Binary vault container: prefix layout, header encode/decode.
//!
//! A vault file has this layout (all integers little-endian):
//!
//! ```text
//! [MVLT: 4 bytes][version: 4 bytes][kdf_iterations: 4 bytes]
//! [header_size: 4 bytes][flags: 1 byte]
//! [FEC metadata: redundancy (1) + original_size (4), if FEC flag set]
//! [header payload (+ Reed-Solomon parity if FEC enabled)]
//! [bulk payload: salt (32) + IV (12) + ciphertext]
//! ```
//!
//! - **Magic** (`MVLT`): identifies the file as a MultiVault vault.
//! - **Version**: 1 is the legacy single-user format (detected but not
//!   parsed here), 2 is the multi-user key-slot format.
//! - **KDF iterations**: mirror of the policy work factor, readable
//!   without decoding the slots.
//! - **Header size**: flags byte + FEC metadata + header payload, so a
//!   reader can skip straight to the bulk payload.
//!
//! Header encoding always applies FEC at `max(20%, preference)`; the
//! raw preference is what gets stored, so lowering it later does not
//! silently weaken already-written vaults.

use tracing::{debug, warn};

use crate::errors::{Result, VaultError};
use crate::format::fec;
use crate::vault::VaultHeaderV2;

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"MVLT";

/// Legacy single-user format version.
pub const VERSION_V1: u32 = 1;

/// Multi-user key-slot format version.
pub const VERSION_V2: u32 = 2;

/// Flag bit: header payload is FEC-protected.
const FLAG_FEC_ENABLED: u8 = 0x01;

/// Fixed-size prefix: magic (4) + version (4) + iterations (4) + header_size (4).
const PREFIX_LEN: usize = 16;

/// FEC metadata: redundancy (1) + original size (4).
const FEC_META_LEN: usize = 5;

/// Upper bound on the declared header size.  Rejecting larger values
/// before allocation keeps a corrupted or hostile length field from
/// forcing a giant allocation.
pub const MAX_HEADER_SIZE: u32 = 1024 * 1024;

/// Inspect the magic and version fields without a full parse.
///
/// Returns the format version (1 or 2) so callers can route legacy
/// vaults to the external migration path.
pub fn detect_version(data: &[u8]) -> Result<u32> {
    if data.len() < 8 {
        return Err(VaultError::InvalidFormat(
            "file too small to hold a vault prefix".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(VaultError::InvalidFormat("missing MVLT magic bytes".into()));
    }

    let version = u32::from_le_bytes(
        data[4..8]
            .try_into()
            .map_err(|_| VaultError::InvalidFormat("bad version field".into()))?,
    );
    match version {
        VERSION_V1 | VERSION_V2 => Ok(version),
        other => Err(VaultError::UnsupportedVersion(other)),
    }
}

/// Serialize a header into the container layout.
///
/// `fec_redundancy_percent` is the caller's preference (0–50); encoding
/// uses `max(20, preference)` while the preference itself is stored.
pub fn write_header(header: &VaultHeaderV2, fec_redundancy_percent: u8) -> Result<Vec<u8>> {
    if fec_redundancy_percent > fec::MAX_REDUNDANCY {
        return Err(VaultError::InvalidRedundancy(fec_redundancy_percent));
    }

    let payload = header.serialize()?;

    // Header loss is catastrophic (every user's authentication material
    // lives here), so the 20% floor applies no matter the preference.
    let effective = fec_redundancy_percent.max(fec::MIN_HEADER_REDUNDANCY);
    let encoded = fec::encode(&payload, effective)?;
    debug!(
        original = payload.len(),
        encoded = encoded.len(),
        effective_redundancy = effective,
        stored_redundancy = fec_redundancy_percent,
        "header FEC applied"
    );

    let header_size = (1 + FEC_META_LEN + encoded.len()) as u32;
    if header_size > MAX_HEADER_SIZE {
        return Err(VaultError::HeaderTooLarge {
            size: u64::from(header_size),
            max: u64::from(MAX_HEADER_SIZE),
        });
    }

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_size as usize);
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&VERSION_V2.to_le_bytes());
    buf.extend_from_slice(&header.policy.kdf_iterations.to_le_bytes());
    buf.extend_from_slice(&header_size.to_le_bytes());
    buf.push(FLAG_FEC_ENABLED);
    buf.push(fec_redundancy_percent);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&encoded);

    Ok(buf)
}

/// Parse a header from the start of `data`, repairing corruption via
/// FEC where possible.
///
/// Returns the header and the offset of the first byte after it (the
/// start of the bulk payload).
pub fn read_header(data: &[u8]) -> Result<(VaultHeaderV2, usize)> {
    if data.len() < PREFIX_LEN + 1 {
        return Err(VaultError::InvalidFormat(
            "file too small to hold a vault header".into(),
        ));
    }

    match detect_version(data)? {
        VERSION_V2 => {}
        VERSION_V1 => return Err(VaultError::LegacyVault),
        other => return Err(VaultError::UnsupportedVersion(other)),
    }

    let header_size = u32::from_le_bytes(
        data[12..16]
            .try_into()
            .map_err(|_| VaultError::InvalidFormat("bad header size field".into()))?,
    );

    // Bound checks before any size-proportional work.
    if header_size > MAX_HEADER_SIZE {
        return Err(VaultError::HeaderTooLarge {
            size: u64::from(header_size),
            max: u64::from(MAX_HEADER_SIZE),
        });
    }
    let header_size = header_size as usize;
    if header_size == 0 || header_size > data.len() - PREFIX_LEN {
        return Err(VaultError::InvalidFormat(
            "declared header size exceeds file length".into(),
        ));
    }

    let flags = data[PREFIX_LEN];
    let body = &data[PREFIX_LEN + 1..PREFIX_LEN + header_size];

    let payload = if flags & FLAG_FEC_ENABLED != 0 {
        if body.len() < FEC_META_LEN {
            return Err(VaultError::InvalidFormat(
                "FEC metadata truncated".into(),
            ));
        }
        let stored_redundancy = body[0];
        let original_size = u32::from_le_bytes(
            body[1..5]
                .try_into()
                .map_err(|_| VaultError::InvalidFormat("bad FEC metadata".into()))?,
        );
        if original_size > MAX_HEADER_SIZE {
            return Err(VaultError::HeaderTooLarge {
                size: u64::from(original_size),
                max: u64::from(MAX_HEADER_SIZE),
            });
        }

        // Decode with the same effective redundancy used at write time.
        let effective = stored_redundancy.max(fec::MIN_HEADER_REDUNDANCY);
        let recovered = fec::decode(&body[FEC_META_LEN..], original_size as usize, effective)?;
        debug!(
            recovered = recovered.len(),
            effective_redundancy = effective,
            "header FEC decoded"
        );
        recovered
    } else {
        // FEC is always written by this crate; tolerate its absence for
        // forward compatibility with stripped-down writers.
        warn!("vault header carries no FEC protection");
        body.to_vec()
    };

    let header = VaultHeaderV2::deserialize(&payload)?;
    Ok((header, PREFIX_LEN + header_size))
}
