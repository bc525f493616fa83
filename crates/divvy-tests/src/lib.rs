//! Integration test suite for Divvy.
//!
//! `tests/e2e.rs` walks full token lifecycles; `tests/adversarial.rs` tries
//! to break the accounting invariants with replayed claims, forged
//! signatures, failing ledgers and randomized operation sequences.

pub mod helpers;
