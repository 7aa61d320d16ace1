//! Pure, single-field checks. One file per field concern; the phone and
//! postcode modules also carry the canonical formatters. None of these
//! touch I/O or each other; the batch orchestrator composes them.

pub mod dob;
pub mod email;
pub mod identifier;
pub mod phone;
pub mod postcode;
