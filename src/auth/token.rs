//! Token payloads, their stored envelope, and the secrets they carry.

pub mod key;
pub mod record;
pub mod secret;
