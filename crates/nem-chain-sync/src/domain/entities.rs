//! # Domain Entities
//!
//! The immutable [`Block`] value and the ways to obtain one.
//!
//! ```text
//! RawBlock ──try_from──▶ Block        (wire adapters, numeric tags)
//! BlockDraft ──seal────▶ Block        (signers, fixtures)
//! ```

use sha3::{Digest, Sha3_256};

use super::errors::{BlockError, Hash};
use super::invariants::NEMESIS_HEIGHT;
use super::value_objects::{BlockType, BlockVersion, PublicKey, Signature, Transaction};

/// Unsigned block contents.
///
/// Exists so the canonical bytes can be produced (and signed) before the
/// signature is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDraft {
    /// Nemesis or regular.
    pub block_type: BlockType,
    /// Network plus structure version.
    pub version: BlockVersion,
    /// Seconds since genesis.
    pub timestamp: u64,
    /// Harvester public key.
    pub signer: PublicKey,
    /// Hash of the predecessor (zero for the nemesis block).
    pub prev_block_hash: Hash,
    /// Block height, starting at 1.
    pub height: u64,
    /// Ordered transactions.
    pub transactions: Vec<Transaction>,
}

impl BlockDraft {
    /// Deterministic big-endian encoding used for hashing and signing.
    ///
    /// Layout: `type | version | timestamp | signer | prev_hash | height |
    /// tx_count | (tx_len | tx_bytes)*`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let tx_bytes: usize = self
            .transactions
            .iter()
            .map(|tx| 4 + tx.as_bytes().len())
            .sum();
        let mut out = Vec::with_capacity(4 + 4 + 8 + 32 + 32 + 8 + 4 + tx_bytes);

        out.extend_from_slice(&self.block_type.code().to_be_bytes());
        out.extend_from_slice(&self.version.to_u32().to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(self.signer.as_bytes());
        out.extend_from_slice(&self.prev_block_hash);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&(self.transactions.len() as u32).to_be_bytes());
        for tx in &self.transactions {
            out.extend_from_slice(&(tx.as_bytes().len() as u32).to_be_bytes());
            out.extend_from_slice(tx.as_bytes());
        }

        out
    }

    /// Attach the harvester signature, producing an immutable block.
    ///
    /// # Errors
    /// - `ZeroHeight` for height 0
    /// - `MisplacedNemesis` for a nemesis block above height 1
    pub fn seal(self, signature: Signature) -> Result<Block, BlockError> {
        if self.height == 0 {
            return Err(BlockError::ZeroHeight);
        }
        if self.block_type == BlockType::Nemesis && self.height != NEMESIS_HEIGHT {
            return Err(BlockError::MisplacedNemesis {
                height: self.height,
            });
        }

        let canonical = self.canonical_bytes();
        let mut hasher = Sha3_256::new();
        hasher.update(&canonical);
        hasher.update(signature.as_bytes());
        let hash: Hash = hasher.finalize().into();

        Ok(Block {
            draft: self,
            signature,
            hash,
        })
    }
}

/// Block as decoded from the wire, with numeric tags still unchecked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlock {
    /// Block type code (-1 nemesis, 1 regular).
    pub block_type: i32,
    /// Version word, `(network << 24) | structure`.
    pub version: u32,
    /// Seconds since genesis.
    pub timestamp: u64,
    /// Harvester public key.
    pub signer: [u8; 32],
    /// Predecessor hash.
    pub prev_block_hash: Hash,
    /// Block height.
    pub height: u64,
    /// Serialized transactions in block order.
    pub transactions: Vec<Vec<u8>>,
    /// Harvester signature.
    pub signature: [u8; 64],
}

impl TryFrom<RawBlock> for Block {
    type Error = BlockError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let draft = BlockDraft {
            block_type: BlockType::try_from(raw.block_type)?,
            version: BlockVersion::try_from(raw.version)?,
            timestamp: raw.timestamp,
            signer: PublicKey(raw.signer),
            prev_block_hash: raw.prev_block_hash,
            height: raw.height,
            transactions: raw.transactions.into_iter().map(Transaction::new).collect(),
        };
        draft.seal(Signature(raw.signature))
    }
}

/// Immutable block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    draft: BlockDraft,
    signature: Signature,
    hash: Hash,
}

impl Block {
    /// SHA3-256 over canonical bytes and signature.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Block height.
    pub fn height(&self) -> u64 {
        self.draft.height
    }

    /// Block type.
    pub fn block_type(&self) -> BlockType {
        self.draft.block_type
    }

    /// Block version.
    pub fn version(&self) -> BlockVersion {
        self.draft.version
    }

    /// Seconds since genesis.
    pub fn timestamp(&self) -> u64 {
        self.draft.timestamp
    }

    /// Predecessor hash.
    pub fn prev_block_hash(&self) -> &Hash {
        &self.draft.prev_block_hash
    }

    /// Harvester signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Harvester public key.
    pub fn signer(&self) -> &PublicKey {
        &self.draft.signer
    }

    /// Transactions in block order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.draft.transactions
    }

    /// Bytes covered by the signature.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.draft.canonical_bytes()
    }
}
