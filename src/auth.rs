//! Auth-domain models: scope sets, token records, and redacted secrets.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{key::*, record::*, secret::*};
