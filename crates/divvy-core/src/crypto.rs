//! Ed25519 cryptographic operations for Divvy claims.
//!
//! Provides key generation, claim signing, and claim verification.
//! Uses ed25519-dalek for the underlying Ed25519 implementation and BLAKE3
//! for account ids and claim message digests.
//!
//! # Claim message
//!
//! The authorizer signs a 32-byte digest committing to:
//! - The [`CLAIM_DOMAIN_TAG`]
//! - The 32-byte claimant account id
//!
//! Nothing else is signed: no nonce, no amount, no expiry. A signature is
//! therefore reusable by its account, and single use is enforced by the
//! token's claimed flag instead.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::CLAIM_DOMAIN_TAG;
use crate::error::CryptoError;
use crate::types::AccountId;

/// Ed25519 keypair held by the claim authorizer (or a holder).
///
/// Wraps [`ed25519_dalek::SigningKey`]. The secret key is zeroized on drop
/// by the underlying library.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Generate a random keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a keypair from 32-byte secret key material.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Get the raw secret key bytes (32 bytes). Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Account id owned by this keypair.
    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.public_key())
    }

    /// Sign a message, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_secret_bytes(self.secret_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key used to verify claim signatures.
#[derive(Clone)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Create a public key from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key: vk })
    }

    /// Parse a public key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidPublicKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(&arr)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(self)
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Digest the authorizer signs to approve a claim by `account`.
pub fn claim_message(account: &AccountId) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CLAIM_DOMAIN_TAG);
    hasher.update(account.as_bytes());
    hasher.finalize().into()
}

/// Produce the claim signature for `account` with the authorizer's key.
pub fn sign_claim(authorizer: &KeyPair, account: &AccountId) -> [u8; 64] {
    authorizer.sign(&claim_message(account))
}

/// Check that `signature` is the authorizer's approval of a claim by `account`.
pub fn verify_claim(
    authorizer: &PublicKey,
    account: &AccountId,
    signature: &[u8; 64],
) -> Result<(), CryptoError> {
    authorizer.verify(&claim_message(account), signature)
}

/// Parse a 128-character hex signature.
pub fn signature_from_hex(s: &str) -> Result<[u8; 64], CryptoError> {
    let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidSignature)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- KeyPair ---

    #[test]
    fn keypair_generate_unique() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn keypair_from_secret_deterministic() {
        let seed = [42u8; 32];
        let kp1 = KeyPair::from_secret_bytes(seed);
        let kp2 = KeyPair::from_secret_bytes(seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.account_id(), kp2.account_id());
    }

    #[test]
    fn keypair_debug_hides_secret() {
        let kp = KeyPair::generate();
        let debug = format!("{kp:?}");
        assert!(debug.contains("KeyPair"));
        let secret_hex = hex::encode(kp.secret_bytes());
        assert!(!debug.contains(&secret_hex));
    }

    #[test]
    fn keypair_clone_keeps_identity() {
        let kp = KeyPair::generate();
        assert_eq!(kp.clone().account_id(), kp.account_id());
    }

    // --- PublicKey ---

    #[test]
    fn pubkey_hex_roundtrip() {
        let pk = KeyPair::generate().public_key();
        let parsed = PublicKey::from_hex(&pk.to_string()).unwrap();
        assert_eq!(parsed, pk);
    }

    #[test]
    fn pubkey_from_hex_rejects_short_input() {
        assert_eq!(
            PublicKey::from_hex("abcd").unwrap_err(),
            CryptoError::InvalidPublicKey
        );
        assert_eq!(
            PublicKey::from_hex("not hex").unwrap_err(),
            CryptoError::InvalidPublicKey
        );
    }

    #[test]
    fn pubkey_serde_json_roundtrip() {
        let pk = KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        let pk2: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn pubkey_account_id_matches_keypair() {
        let kp = KeyPair::from_secret_bytes([9; 32]);
        assert_eq!(kp.public_key().account_id(), kp.account_id());
    }

    // --- Claim messages ---

    #[test]
    fn claim_message_deterministic_and_account_bound() {
        let a = AccountId([1; 32]);
        let b = AccountId([2; 32]);
        assert_eq!(claim_message(&a), claim_message(&a));
        assert_ne!(claim_message(&a), claim_message(&b));
    }

    #[test]
    fn claim_message_is_domain_separated() {
        let a = AccountId([1; 32]);
        let plain: [u8; 32] = blake3::hash(a.as_bytes()).into();
        assert_ne!(claim_message(&a), plain);
    }

    #[test]
    fn sign_verify_claim() {
        let authorizer = KeyPair::generate();
        let account = AccountId([5; 32]);
        let sig = sign_claim(&authorizer, &account);
        assert!(verify_claim(&authorizer.public_key(), &account, &sig).is_ok());
    }

    #[test]
    fn verify_claim_wrong_account_fails() {
        let authorizer = KeyPair::generate();
        let sig = sign_claim(&authorizer, &AccountId([5; 32]));
        let err = verify_claim(&authorizer.public_key(), &AccountId([6; 32]), &sig).unwrap_err();
        assert_eq!(err, CryptoError::VerificationFailed);
    }

    #[test]
    fn verify_claim_wrong_signer_fails() {
        let authorizer = KeyPair::generate();
        let impostor = KeyPair::generate();
        let account = AccountId([5; 32]);
        let sig = sign_claim(&impostor, &account);
        let err = verify_claim(&authorizer.public_key(), &account, &sig).unwrap_err();
        assert_eq!(err, CryptoError::VerificationFailed);
    }

    #[test]
    fn signature_hex_parsing() {
        let sig = KeyPair::generate().sign(b"divvy");
        assert_eq!(signature_from_hex(&hex::encode(sig)).unwrap(), sig);
        assert_eq!(
            signature_from_hex(&hex::encode([0u8; 63])).unwrap_err(),
            CryptoError::InvalidSignature
        );
    }
}
