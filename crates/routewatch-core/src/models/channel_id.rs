use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IngestionError;

/// Short channel id: block height (24 bits), transaction index (24 bits),
/// output index (16 bits) packed into a `u64`.
///
/// Accepts both the packed decimal form (`"869059488115408896"`) and the
/// `BLOCKxTXxOUT` form (`"790400x1234x1"`) when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

const MAX_BLOCK: u64 = (1 << 24) - 1;
const MAX_TX_INDEX: u64 = (1 << 24) - 1;
const MAX_OUTPUT: u64 = (1 << 16) - 1;

impl ChannelId {
    /// Build from the three scid components.
    pub fn from_parts(block: u64, tx_index: u64, output: u64) -> Option<Self> {
        if block > MAX_BLOCK || tx_index > MAX_TX_INDEX || output > MAX_OUTPUT {
            return None;
        }
        Some(Self((block << 40) | (tx_index << 16) | output))
    }

    pub fn block_height(&self) -> u64 {
        self.0 >> 40
    }

    pub fn tx_index(&self) -> u64 {
        (self.0 >> 16) & MAX_TX_INDEX
    }

    pub fn output_index(&self) -> u64 {
        self.0 & MAX_OUTPUT
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}",
            self.block_height(),
            self.tx_index(),
            self.output_index()
        )
    }
}

impl FromStr for ChannelId {
    type Err = IngestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| IngestionError::InvalidChannelId {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }

        if trimmed.contains('x') {
            let parts: Vec<&str> = trimmed.split('x').collect();
            if parts.len() != 3 {
                return Err(invalid("expected BLOCKxTXxOUT"));
            }
            let mut nums = [0u64; 3];
            for (slot, part) in nums.iter_mut().zip(&parts) {
                *slot = part
                    .parse::<u64>()
                    .map_err(|_| invalid("non-numeric component"))?;
            }
            return ChannelId::from_parts(nums[0], nums[1], nums[2])
                .ok_or_else(|| invalid("component out of range"));
        }

        let raw = trimmed
            .parse::<u64>()
            .map_err(|_| invalid("not a decimal short channel id"))?;
        if raw == 0 {
            return Err(invalid("zero is not a valid short channel id"));
        }
        Ok(ChannelId(raw))
    }
}
