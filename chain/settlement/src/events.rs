//! Settlement events
//!
//! Events are immutable records appended by every state-changing operation.
//! Components keep their own append-only log, exposed through `events()`
//! and `drain_events()`.

use auction_types::ids::{Address, NodeId};
use serde::{Deserialize, Serialize};

use crate::entry_point::GasParameters;

/// Auctioneer account replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeAuctioneer {
    pub old: Address,
    pub new: Address,
}

/// Deposit vault handle replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDepositVault {
    pub old: Address,
    pub new: Address,
}

/// Gas accounting parameters replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeGasParameters {
    pub old: GasParameters,
    pub new: GasParameters,
}

/// Minimum bid replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMinBid {
    pub old: u128,
    pub new: u128,
}

/// Ticket sub-call executed successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub sender: Address,
    pub nonce: u64,
}

/// Ticket sub-call reverted or ran out of gas (searcher still pays)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFailed {
    pub sender: Address,
    pub nonce: u64,
}

/// Nonce consumed for a sender; `next_nonce` is the post-increment value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseNonce {
    pub sender: Address,
    pub next_nonce: u64,
}

/// Escrow credited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDeposit {
    pub account: Address,
    pub amount: u128,
    pub balance: u128,
    pub reserved: bool,
}

/// Withdrawal reservation created over the entire current balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultReserveWithdraw {
    pub account: Address,
    pub amount: u128,
    pub ready_at: i64,
}

/// Reserved funds withdrawn; `reserved` reports the remaining reservation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultWithdraw {
    pub account: Address,
    pub amount: u128,
    pub reserved: bool,
}

/// Bid debited and forwarded to the fee vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenBid {
    pub account: Address,
    pub amount: u128,
}

/// Bid debit rolled back because fee forwarding failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenBidFailed {
    pub account: Address,
    pub amount: u128,
}

/// Gas cost debited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenGas {
    pub account: Address,
    pub amount: u128,
}

/// Debit skipped: balance below the requested amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientBalance {
    pub account: Address,
    pub have: u128,
    pub want: u128,
}

/// Fee vault handle replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeAuctionFeeVault {
    pub old: Address,
    pub new: Address,
}

/// Minimum deposit replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMinDepositAmount {
    pub old: u128,
    pub new: u128,
}

/// Withdrawal lock time replaced by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMinWithdrawLocktime {
    pub old: i64,
    pub new: i64,
}

/// Bid received by the fee vault and split into paybacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDeposit {
    pub validator: NodeId,
    pub total: u128,
    pub searcher_payback: u128,
    pub validator_payback: u128,
}

/// Full fee vault balance withdrawn by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeWithdrawal {
    pub amount: u128,
}

/// Enum wrapper for all settlement events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    ChangeAuctioneer(ChangeAuctioneer),
    ChangeDepositVault(ChangeDepositVault),
    ChangeGasParameters(ChangeGasParameters),
    ChangeMinBid(ChangeMinBid),
    Call(Call),
    CallFailed(CallFailed),
    UseNonce(UseNonce),
    VaultDeposit(VaultDeposit),
    VaultReserveWithdraw(VaultReserveWithdraw),
    VaultWithdraw(VaultWithdraw),
    TakenBid(TakenBid),
    TakenBidFailed(TakenBidFailed),
    TakenGas(TakenGas),
    InsufficientBalance(InsufficientBalance),
    ChangeAuctionFeeVault(ChangeAuctionFeeVault),
    ChangeMinDepositAmount(ChangeMinDepositAmount),
    ChangeMinWithdrawLocktime(ChangeMinWithdrawLocktime),
    FeeDeposit(FeeDeposit),
    FeeWithdrawal(FeeWithdrawal),
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::ids::ID_LEN;

    fn addr(n: u8) -> Address {
        Address::new([n; ID_LEN])
    }

    #[test]
    fn test_vault_deposit_serialization() {
        let event = VaultDeposit {
            account: addr(1),
            amount: 500,
            balance: 1500,
            reserved: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: VaultDeposit = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_fee_deposit_serialization() {
        let event = FeeDeposit {
            validator: NodeId::new([9; ID_LEN]),
            total: 1245,
            searcher_payback: 1120,
            validator_payback: 62,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: FeeDeposit = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_enum_variant() {
        let event = ContractEvent::UseNonce(UseNonce {
            sender: addr(2),
            next_nonce: 7,
        });
        assert!(matches!(event, ContractEvent::UseNonce(_)));
    }

    #[test]
    fn test_change_event_old_new_round_trip() {
        let event = ContractEvent::ChangeMinBid(ChangeMinBid { old: 0, new: 100 });
        let json = serde_json::to_string(&event).unwrap();
        let deser: ContractEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }
}
