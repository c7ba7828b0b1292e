use serde::{Deserialize, Serialize};

use crate::constants::PPM_DENOMINATOR;

/// Fee parameters of a channel's forwarding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub base_fee_msat: u64,
    pub fee_rate_ppm: u32,
    /// Inbound discount (negative) or surcharge, applied on the incoming side.
    #[serde(default)]
    pub inbound_base_fee_msat: i32,
    #[serde(default)]
    pub inbound_fee_rate_ppm: i32,
}

impl FeePolicy {
    pub fn new(base_fee_msat: u64, fee_rate_ppm: u32) -> Self {
        Self {
            base_fee_msat,
            fee_rate_ppm,
            inbound_base_fee_msat: 0,
            inbound_fee_rate_ppm: 0,
        }
    }

    /// `amount × fee_rate_ppm / 1_000_000`, rounded down. Base fee is not included.
    pub fn proportional_fee_msat(&self, amount_msat: u64) -> u64 {
        let fee = amount_msat as u128 * self.fee_rate_ppm as u128 / PPM_DENOMINATOR as u128;
        fee.min(u64::MAX as u128) as u64
    }

    /// Copy of this policy with a different outbound rate.
    pub fn with_fee_rate_ppm(&self, fee_rate_ppm: u32) -> Self {
        Self {
            fee_rate_ppm,
            ..*self
        }
    }
}
