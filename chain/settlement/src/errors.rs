//! Component-specific error types
//!
//! Every variant here is a hard, fully-reverting failure: the operation
//! returns `Err` and no state was mutated. Soft failures in the payment
//! path (insufficient balance at debit time, fee-forwarding failure) are
//! deliberately NOT errors; they are reported through
//! [`crate::deposit_vault::DebitOutcome`] so settlement is never blocked
//! by another party's funding shortfall.

use auction_types::ids::{Address, NodeId};
use thiserror::Error;

/// Ticket signature-layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature encoding")]
    InvalidSignature,

    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Entry point errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryPointError {
    #[error("Caller is not the current block proposer")]
    OnlyProposer,

    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Ticket data too large: {size} bytes (max {max})")]
    DataTooLarge { size: usize, max: usize },

    #[error("Searcher signature invalid: {0}")]
    InvalidSearcherSig(TicketError),

    #[error("Searcher signature signed by {recovered}, ticket names {expected}")]
    SearcherMismatch { recovered: Address, expected: Address },

    #[error("Auctioneer signature invalid: {0}")]
    InvalidAuctioneerSig(TicketError),

    #[error("Auctioneer signature signed by {recovered}, configured auctioneer is {expected}")]
    AuctioneerMismatch { recovered: Address, expected: Address },

    #[error("Ticket valid at block {ticket}, current block is {current}")]
    BlockNumberMismatch { ticket: u64, current: u64 },

    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("Bid {bid} below minimum {min}")]
    BidBelowMinimum { bid: u128, min: u128 },

    #[error("Insufficient deposit: have {have}, bid requires {want}")]
    InsufficientDeposit { have: u128, want: u128 },

    #[error("Deposit vault mismatch: configured {expected}, got {got}")]
    VaultMismatch { expected: Address, got: Address },

    #[error("Deposit vault error: {0}")]
    Vault(#[from] DepositError),
}

/// Deposit vault errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepositError {
    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Caller is not the configured entry point")]
    OnlyEntryPoint,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Deposit amount must be positive")]
    InvalidAmount,

    #[error("Deposit {amount} below minimum {min}")]
    BelowMinimum { amount: u128, min: u128 },

    #[error("Withdrawal reservation outstanding")]
    ReservationOutstanding,

    #[error("Nothing to reserve: balance is zero")]
    NothingToReserve,

    #[error("No withdrawal reservation")]
    NoReservation,

    #[error("Withdrawal locked until {ready_at}")]
    LocktimeNotElapsed { ready_at: i64 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Fee vault errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    #[error("Unauthorized: caller is neither owner nor staking admin")]
    Unauthorized,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Payback rate {rate} exceeds 10000")]
    RateTooHigh { rate: u16 },

    #[error("Unknown validator node: {node}")]
    UnknownValidator { node: NodeId },

    #[error("Array length mismatch: {nodes} nodes, {addrs} reward addresses")]
    LengthMismatch { nodes: usize, addrs: usize },

    #[error("Arithmetic overflow in fee calculation")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_error_display() {
        let err = EntryPointError::BlockNumberMismatch {
            ticket: 100,
            current: 101,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn test_deposit_error_display() {
        let err = DepositError::BelowMinimum {
            amount: 5,
            min: 10,
        };
        assert_eq!(err.to_string(), "Deposit 5 below minimum 10");
    }

    #[test]
    fn test_fee_error_display() {
        let err = FeeError::RateTooHigh { rate: 10_001 };
        assert!(err.to_string().contains("10001"));
    }

    #[test]
    fn test_entry_point_error_from_deposit() {
        let deposit_err = DepositError::OnlyEntryPoint;
        let entry_err: EntryPointError = deposit_err.into();
        assert!(matches!(entry_err, EntryPointError::Vault(_)));
    }

    #[test]
    fn test_ticket_error_wrapped_display() {
        let err = EntryPointError::InvalidSearcherSig(TicketError::VerificationFailed);
        assert!(err.to_string().contains("verification failed"));
    }
}
