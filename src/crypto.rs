//! Ed25519 signing and verification.
//!
//! Adapted from the teacher's `crypto.rs` `Keypair`/`verify` shape, swapping
//! the Dilithium post-quantum scheme for the Ed25519 scheme spec.md §3/§4.2
//! fixes (64-byte signature, 32-byte public key).

use crate::packet::{Packet, PUBKEY_LEN, SIGNATURE_LEN};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid public key")]
    InvalidPublicKey,
}

/// A node's signing identity.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign raw bytes (callers pass `packet.signing_bytes()`).
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign a packet in place: computes the signing bytes, signs them, and
    /// fills in `sig`/`pk`.
    pub fn sign_packet(&self, packet: &mut Packet) {
        packet.pk = self.public_key_bytes().to_vec();
        let signing = packet.signing_bytes();
        packet.sig = self.sign(&signing).to_vec();
    }
}

/// §4.2 of the spec: verify a decoded packet's signature against its
/// declared public key and canonical signing bytes.
///
/// Returns `false` (never an error) for anything that should result in a
/// silent drop: empty sig/pk, wrong lengths, or a signature that doesn't
/// verify. Malformed-length keys/signatures are logged by the caller.
pub fn verify_packet(packet: &Packet) -> bool {
    if packet.sig.is_empty() || packet.pk.is_empty() {
        return false;
    }
    if packet.pk.len() != PUBKEY_LEN || packet.sig.len() != SIGNATURE_LEN {
        return false;
    }

    let pk_bytes: [u8; PUBKEY_LEN] = match packet.pk.as_slice().try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let sig_bytes: [u8; SIGNATURE_LEN] = match packet.sig.as_slice().try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let verifying_key = match VerifyingKey::from_bytes(&pk_bytes) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(&sig_bytes);

    let signing_bytes = packet.signing_bytes();
    verifying_key.verify(&signing_bytes, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::TYPE_ASK;

    fn signed_packet(kp: &Keypair, src: &str, dst: &str) -> Packet {
        let mut p = Packet {
            sig: Vec::new(),
            pk: Vec::new(),
            typ: TYPE_ASK,
            id: "x1".into(),
            src: src.into(),
            dst: dst.into(),
            body: "hello".into(),
            fee: 0,
            ttl: 0,
            scar: Vec::new(),
        };
        kp.sign_packet(&mut p);
        p
    }

    #[test]
    fn valid_signature_verifies() {
        let kp = Keypair::generate();
        let p = signed_packet(&kp, "bot:a", "server");
        assert!(verify_packet(&p));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let kp = Keypair::generate();
        let mut p = signed_packet(&kp, "bot:a", "server");
        p.body = "tampered".into();
        assert!(!verify_packet(&p));
    }

    #[test]
    fn empty_sig_and_pk_is_unsigned() {
        let kp = Keypair::generate();
        let mut p = signed_packet(&kp, "bot:a", "server");
        p.sig.clear();
        p.pk.clear();
        assert!(!verify_packet(&p));
    }

    #[test]
    fn only_one_of_sig_pk_empty_fails() {
        let kp = Keypair::generate();
        let mut p = signed_packet(&kp, "bot:a", "server");
        p.pk.clear();
        assert!(!verify_packet(&p));

        let mut p2 = signed_packet(&kp, "bot:a", "server");
        p2.sig.clear();
        assert!(!verify_packet(&p2));
    }

    #[test]
    fn wrong_length_key_is_rejected() {
        let kp = Keypair::generate();
        let mut p = signed_packet(&kp, "bot:a", "server");
        p.pk.push(0);
        assert!(!verify_packet(&p));
    }

    #[test]
    fn signature_under_different_key_fails() {
        let kp_a = Keypair::generate();
        let kp_b = Keypair::generate();
        let mut p = signed_packet(&kp_a, "bot:a", "server");
        p.pk = kp_b.public_key_bytes().to_vec();
        assert!(!verify_packet(&p));
    }
}
