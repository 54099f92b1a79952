//! Ed25519 Signature Adapter
//!
//! Implements the `SignatureVerifier` port with `ed25519-dalek`, plus a
//! signer for producing sealed blocks (local simulation, fixtures).

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::domain::{Block, BlockDraft, BlockError, PublicKey, Signature};
use crate::ports::SignatureVerifier;

/// Ed25519 verifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, signer: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(signer.as_bytes()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        key.verify(message, &sig).is_ok()
    }
}

/// Ed25519 block signer.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Harvester public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign the canonical bytes of a draft.
    pub fn sign(&self, draft: &BlockDraft) -> Signature {
        Signature(self.signing_key.sign(&draft.canonical_bytes()).to_bytes())
    }

    /// Sign and seal a draft.
    pub fn seal(&self, draft: BlockDraft) -> Result<Block, BlockError> {
        let signature = self.sign(&draft);
        draft.seal(signature)
    }
}
