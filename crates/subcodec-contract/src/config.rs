//! Commitment contract configuration.

use serde::{Deserialize, Serialize};
use subcodec_core::UintWidth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Pallet hosting the commitment calls and storage
    #[serde(default = "default_pallet")]
    pub pallet: String,
    /// Bit-width of plasma block numbers on the wire
    #[serde(default = "default_block_number_width")]
    pub block_number_width: UintWidth,
}

fn default_pallet() -> String { "commitment".to_string() }
fn default_block_number_width() -> UintWidth { UintWidth::U64 }

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            pallet: default_pallet(),
            block_number_width: default_block_number_width(),
        }
    }
}
