//! Error-corrected binary container for vault headers.
//!
//! This module provides:
//! - The container prefix and header encode/decode (`container`)
//! - Reed-Solomon forward error correction (`fec`)
//!
//! The container protects only the header; the bulk payload relies on
//! its AEAD tag and is allowed to fail loudly.

pub mod container;
pub mod fec;

pub use container::{
    detect_version, read_header, write_header, MAX_HEADER_SIZE, VERSION_V1, VERSION_V2,
};
pub use fec::{MAX_REDUNDANCY, MIN_HEADER_REDUNDANCY, MIN_REDUNDANCY};
