//! Priority-Auction Settlement Contracts
//!
//! This crate implements the settlement layer that lets a block proposer
//! execute a searcher's transaction under a dual-signed auction ticket and
//! unconditionally collect payment (bid + gas) from a pre-funded deposit,
//! regardless of whether the underlying call succeeds.
//!
//! # Modules
//! - `events`: Settlement events emitted by every state-changing operation
//! - `errors`: Component-specific error types
//! - `security`: Shared security primitives (owner gate, nonce registry)
//! - `ticket`: Auction tickets and the dual-signature protocol
//! - `deposit_vault`: Per-account escrow, timed withdrawal reservations, debits
//! - `fee_vault`: Bid aggregation, payback split, reward-address registry
//! - `entry_point`: Orchestration of verification, execution, and settlement

pub mod errors;
pub mod events;
pub mod security;
pub mod ticket;
pub mod deposit_vault;
pub mod fee_vault;
pub mod entry_point;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";

/// Maximum ticket calldata size in bytes (64 KiB).
///
/// Larger payloads are rejected before any verification or execution.
pub const MAX_DATA_SIZE: usize = 64 * 1024;
