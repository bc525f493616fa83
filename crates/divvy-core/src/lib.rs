//! # divvy-core
//! Foundation types and traits for the Divvy share token.

pub mod constants;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod wide;
