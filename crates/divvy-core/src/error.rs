//! Error types for the Divvy token.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("claim already made for this account")] AlreadyClaimed,
    #[error("claim window closed: now {now} >= deadline {deadline}")] Expired { now: u64, deadline: u64 },
    #[error("signature not produced by the claim authorizer")] Unauthorized,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DividendError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("division by zero: total supply is zero")] DivisionByZero,
    #[error("negative entitlement for {0}")] NegativeEntitlement(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u64, need: u64 },
    #[error("total supply overflow")] SupplyOverflow,
    #[error("balance overflow for {0}")] BalanceOverflow(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: expected 32 bytes, got {0}")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DivvyError {
    #[error(transparent)] Claim(#[from] ClaimError),
    #[error(transparent)] Dividend(#[from] DividendError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Crypto(#[from] CryptoError),
    #[error(transparent)] AccountId(#[from] AccountIdError),
}
