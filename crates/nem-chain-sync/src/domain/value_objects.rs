//! # Domain Value Objects
//!
//! Immutable value types shared by the block model and the synchronizer.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{BlockError, Hash};

/// Zero hash, used as the predecessor of the nemesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Network a block (and a remote node) belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// NEM main network (`0x68`).
    MainNet,
    /// NEM test network (`0x98`).
    TestNet,
}

impl Network {
    /// Network-identifying byte.
    pub const fn id_byte(self) -> u8 {
        match self {
            Network::MainNet => 0x68,
            Network::TestNet => 0x98,
        }
    }

    /// Parse a network-identifying byte.
    pub fn from_id_byte(byte: u8) -> Result<Self, BlockError> {
        match byte {
            0x68 => Ok(Network::MainNet),
            0x98 => Ok(Network::TestNet),
            other => Err(BlockError::UnknownNetwork(other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::MainNet => f.write_str("mainnet"),
            Network::TestNet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main_net" => Ok(Network::MainNet),
            "testnet" | "test_net" => Ok(Network::TestNet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Block version: network tag plus structure version.
///
/// Wire form is `(network_byte << 24) | structure`, e.g. `0x6800_0001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockVersion {
    network: Network,
    structure: u8,
}

impl BlockVersion {
    /// Version 1 blocks of the given network.
    pub const fn v1(network: Network) -> Self {
        Self {
            network,
            structure: 1,
        }
    }

    /// Network this block belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Structure version byte.
    pub fn structure(&self) -> u8 {
        self.structure
    }

    /// Wire encoding.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.network.id_byte()) << 24) | u32::from(self.structure)
    }
}

impl TryFrom<u32> for BlockVersion {
    type Error = BlockError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        let network = Network::from_id_byte((raw >> 24) as u8)?;
        // Only the low byte carries the structure version.
        if raw & 0x00FF_FF00 != 0 || raw & 0xFF == 0 {
            return Err(BlockError::UnsupportedVersion(raw));
        }
        Ok(Self {
            network,
            structure: (raw & 0xFF) as u8,
        })
    }
}

/// Block type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Genesis block, height 1 only.
    Nemesis,
    /// Any harvested block.
    Regular,
}

impl BlockType {
    /// Wire code.
    pub const fn code(self) -> i32 {
        match self {
            BlockType::Nemesis => -1,
            BlockType::Regular => 1,
        }
    }
}

impl TryFrom<i32> for BlockType {
    type Error = BlockError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(BlockType::Nemesis),
            1 => Ok(BlockType::Regular),
            other => Err(BlockError::UnknownBlockType(other)),
        }
    }
}

/// Harvester public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// Block signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

/// Opaque transaction record. Only its bytes and position matter here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transaction(Vec<u8>);

impl Transaction {
    /// Wrap serialized transaction bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Serialized bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Chain score. Opaque and totally ordered; higher wins.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChainScore(pub U256);

impl ChainScore {
    /// Score of a chain holding only the nemesis block.
    pub fn zero() -> Self {
        Self(U256::zero())
    }
}

impl From<u64> for ChainScore {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for ChainScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of the local chain published to other components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Tip height.
    pub height: u64,
    /// Score of the chain ending at the tip.
    pub score: ChainScore,
    /// Tip block hash.
    pub tip_hash: Hash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_bytes() {
        assert_eq!(Network::MainNet.id_byte(), 0x68);
        assert_eq!(Network::TestNet.id_byte(), 0x98);
        assert_eq!(Network::from_id_byte(0x98), Ok(Network::TestNet));
        assert_eq!(
            Network::from_id_byte(0x60),
            Err(BlockError::UnknownNetwork(0x60))
        );
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("MainNet".parse::<Network>(), Ok(Network::MainNet));
        assert_eq!("testnet".parse::<Network>(), Ok(Network::TestNet));
        assert!("mijin".parse::<Network>().is_err());
    }

    #[test]
    fn test_block_version_wire_form() {
        assert_eq!(BlockVersion::v1(Network::MainNet).to_u32(), 0x6800_0001);
        assert_eq!(BlockVersion::v1(Network::TestNet).to_u32(), 0x9800_0001);

        let parsed = BlockVersion::try_from(0x9800_0001).unwrap();
        assert_eq!(parsed.network(), Network::TestNet);
        assert_eq!(parsed.structure(), 1);
    }

    #[test]
    fn test_block_version_rejects_unknown() {
        assert_eq!(
            BlockVersion::try_from(0x1100_0001),
            Err(BlockError::UnknownNetwork(0x11))
        );
        assert_eq!(
            BlockVersion::try_from(0x6800_0000),
            Err(BlockError::UnsupportedVersion(0x6800_0000))
        );
        assert_eq!(
            BlockVersion::try_from(0x6800_0101),
            Err(BlockError::UnsupportedVersion(0x6800_0101))
        );
    }

    #[test]
    fn test_block_type_codes() {
        assert_eq!(BlockType::try_from(-1), Ok(BlockType::Nemesis));
        assert_eq!(BlockType::try_from(1), Ok(BlockType::Regular));
        assert_eq!(BlockType::try_from(2), Err(BlockError::UnknownBlockType(2)));
        assert_eq!(BlockType::Nemesis.code(), -1);
    }

    #[test]
    fn test_chain_score_ordering() {
        assert!(ChainScore::from(510) > ChainScore::from(500));
        assert_eq!(ChainScore::zero(), ChainScore::default());
        assert_eq!(ChainScore::from(42).to_string(), "42");
    }
}
