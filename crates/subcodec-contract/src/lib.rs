//! # subcodec-contract
//!
//! Typed client for the runtime's commitment pallet: submit and read
//! per-block Merkle roots, and react to `BlockSubmitted` events.
//!
//! Transport and signing sit behind [`ChainClient`]; this crate only
//! builds SCALE payloads and storage keys and decodes the results.

pub mod client;
pub mod commitment;
pub mod config;
pub mod error;

pub use client::{Call, ChainClient, TxHash};
pub use commitment::{CommitmentContract, BLOCK_SUBMITTED};
pub use config::ContractConfig;
pub use error::ContractError;
