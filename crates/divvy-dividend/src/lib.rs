//! # divvy-dividend: dividend accounting for a share ledger.
//!
//! All calculations use checked integer arithmetic for determinism.
//!
//! Components:
//! - **Correction ledger** ([`correction`]): a signed per-account offset that
//!   keeps accumulated entitlement unchanged when a balance moves.
//! - **Accounting engine** ([`accounting`]): the global per-share accumulator,
//!   per-account records and staged, all-or-nothing updates.
//! - **Distribution schedule** ([`schedule`]): payments decay by era after the
//!   claim deadline and stop reaching the pool at [`FINAL_ERA`](divvy_core::constants::FINAL_ERA).
//! - **Claims** ([`claim`]): one signature-gated allocation per account.
//! - **Withdrawals** ([`withdrawal`]): entitlement realized as new shares.
//!
//! [`DividendToken`] composes these over a [`ShareLedger`](divvy_core::traits::ShareLedger).

pub mod accounting;
pub mod claim;
pub mod config;
pub mod correction;
pub mod events;
pub mod schedule;
pub mod token;
pub mod withdrawal;

pub use accounting::{BookChanges, BookTxn, DividendAccount, DividendBook};
pub use config::TokenConfig;
pub use correction::BalanceDelta;
pub use events::DividendEvent;
pub use schedule::Distribution;
pub use token::{DividendToken, SharedToken};
