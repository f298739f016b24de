//! Auction Entry Point: proposer-only ticket settlement
//!
//! The single choke point every winning ticket passes through. `call`
//! validates the full chain of authorization (proposer identity, dual
//! signatures, exact block, sequential nonce, minimum bid, funded deposit)
//! before consuming the nonce, running the sub-call, and collecting
//! payment. Payment is unconditional once validation passes: a reverting
//! or gas-starved sub-call still costs the searcher the bid plus gas.

use auction_types::ids::{Address, NodeId};
use serde::{Deserialize, Serialize};

use crate::deposit_vault::{DebitOutcome, DepositVault};
use crate::errors::EntryPointError;
use crate::events::{
    Call, CallFailed, ChangeAuctioneer, ChangeDepositVault, ChangeGasParameters, ChangeMinBid,
    ContractEvent, UseNonce,
};
use crate::fee_vault::FeeVault;
use crate::security::{NonceRegistry, Ownable};
use crate::ticket::{approval_digest, SubmittedTicket};

/// Owner-tunable gas accounting model.
///
/// Charges a per-byte calldata rate plus fixed overheads covering contract
/// execution and the unmeasured parts of settlement (validation,
/// bookkeeping, event emission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasParameters {
    /// Intrinsic per-byte calldata cost
    pub gas_per_byte_intrinsic: u64,
    /// Floor per-byte calldata cost
    pub gas_per_byte_floor: u64,
    /// Fixed contract execution overhead
    pub gas_contract_execution: u64,
    /// Buffer for estimation error
    pub gas_buffer_estimate: u64,
    /// Buffer for unmeasured settlement work
    pub gas_buffer_unmeasured: u64,
}

impl Default for GasParameters {
    fn default() -> Self {
        Self {
            gas_per_byte_intrinsic: 16,
            gas_per_byte_floor: 10,
            gas_contract_execution: 60_000,
            gas_buffer_estimate: 20_000,
            gas_buffer_unmeasured: 10_000,
        }
    }
}

impl GasParameters {
    /// Fixed overhead reserved out of the transaction gas budget before
    /// any gas is forwarded to the sub-call.
    pub fn reserved_overhead(&self) -> u64 {
        self.gas_contract_execution
            .saturating_add(self.gas_buffer_estimate)
            .saturating_add(self.gas_buffer_unmeasured)
    }

    /// Total billable gas for a settled ticket.
    pub fn transaction_gas(&self, data_len: usize, call_gas_used: u64) -> u64 {
        let per_byte = self
            .gas_per_byte_intrinsic
            .saturating_add(self.gas_per_byte_floor);
        self.reserved_overhead()
            .saturating_add(per_byte.saturating_mul(data_len as u64))
            .saturating_add(call_gas_used)
    }
}

/// Per-submission execution environment supplied by the proposer's node.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub block_number: u64,
    /// The current block proposer; the only account allowed to submit
    pub proposer: Address,
    /// Node identity of the proposer, for fee attribution
    pub proposer_node: NodeId,
    /// Price each billed gas unit is charged at
    pub effective_gas_price: u128,
    /// Gas left in the enclosing transaction
    pub gas_remaining: u64,
}

/// Result of a sub-call as reported by the execution layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub gas_used: u64,
}

/// Execution layer seam. Settlement never interprets the sub-call beyond
/// success and gas consumption.
pub trait TargetExecutor {
    fn execute(&mut self, to: &Address, data: &[u8], gas_limit: u64) -> CallOutcome;
}

/// What a successful `call` settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSummary {
    /// Sub-call success; payment is owed either way
    pub success: bool,
    /// The nonce this submission consumed
    pub nonce_used: u64,
    /// Billed gas cost in native units
    pub gas_cost: u128,
    pub bid_outcome: DebitOutcome,
    pub gas_outcome: DebitOutcome,
}

/// The settlement entry point.
#[derive(Debug)]
pub struct EntryPoint {
    /// This deployment's own address, the signature domain
    address: Address,
    ownable: Ownable,
    /// Account whose co-signature authorizes tickets
    auctioneer: Address,
    /// Configured deposit vault handle
    deposit_vault: Address,
    min_bid: u128,
    gas_params: GasParameters,
    nonces: NonceRegistry,
    events: Vec<ContractEvent>,
}

impl EntryPoint {
    pub fn new(
        address: Address,
        owner: Address,
        auctioneer: Address,
        deposit_vault: Address,
        min_bid: u128,
        gas_params: GasParameters,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            auctioneer,
            deposit_vault,
            min_bid,
            gas_params,
            nonces: NonceRegistry::new(),
            events: Vec::new(),
        }
    }

    /// This deployment's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    // ------------------------- Settlement -------------------------

    /// Settle one winning ticket.
    ///
    /// Validation is strictly ordered and fully reverting; the first
    /// failed check returns `Err` with nothing mutated. Past validation,
    /// the nonce is consumed and payment is collected no matter how the
    /// sub-call fares. Payment shortfalls surface in the returned
    /// [`CallSummary`], not as errors.
    pub fn call(
        &mut self,
        caller: &Address,
        submitted: &SubmittedTicket,
        ctx: &CallContext,
        executor: &mut dyn TargetExecutor,
        deposit_vault: &mut DepositVault,
        fee_vault: &mut FeeVault,
    ) -> Result<CallSummary, EntryPointError> {
        let ticket = &submitted.ticket;

        if *caller != ctx.proposer {
            return Err(EntryPointError::OnlyProposer);
        }
        if ticket.oversized() {
            return Err(EntryPointError::DataTooLarge {
                size: ticket.data.len(),
                max: crate::MAX_DATA_SIZE,
            });
        }

        let digest = ticket.signing_digest(&self.address);
        let searcher = submitted
            .searcher_sig
            .recover_signer(&digest)
            .map_err(EntryPointError::InvalidSearcherSig)?;
        if searcher != ticket.sender {
            return Err(EntryPointError::SearcherMismatch {
                recovered: searcher,
                expected: ticket.sender,
            });
        }

        let approval = approval_digest(&submitted.searcher_sig)
            .map_err(EntryPointError::InvalidAuctioneerSig)?;
        let approver = submitted
            .auctioneer_sig
            .recover_signer(&approval)
            .map_err(EntryPointError::InvalidAuctioneerSig)?;
        if approver != self.auctioneer {
            return Err(EntryPointError::AuctioneerMismatch {
                recovered: approver,
                expected: self.auctioneer,
            });
        }

        if ticket.block_number != ctx.block_number {
            return Err(EntryPointError::BlockNumberMismatch {
                ticket: ticket.block_number,
                current: ctx.block_number,
            });
        }
        let expected_nonce = self.nonces.current(&ticket.sender);
        if ticket.nonce != expected_nonce {
            return Err(EntryPointError::InvalidNonce {
                expected: expected_nonce,
                got: ticket.nonce,
            });
        }
        if ticket.bid < self.min_bid {
            return Err(EntryPointError::BidBelowMinimum {
                bid: ticket.bid,
                min: self.min_bid,
            });
        }
        if *deposit_vault.address() != self.deposit_vault {
            return Err(EntryPointError::VaultMismatch {
                expected: self.deposit_vault,
                got: *deposit_vault.address(),
            });
        }
        let have = deposit_vault.balance_of(&ticket.sender);
        if have < ticket.bid {
            return Err(EntryPointError::InsufficientDeposit {
                have,
                want: ticket.bid,
            });
        }

        // Validation passed: nonce burns now, before the sub-call.
        let nonce_used = self.nonces.advance(&ticket.sender);
        self.events.push(ContractEvent::UseNonce(UseNonce {
            sender: ticket.sender,
            next_nonce: nonce_used + 1,
        }));

        let budget = ticket
            .call_gas_limit
            .min(ctx.gas_remaining.saturating_sub(self.gas_params.reserved_overhead()));
        let outcome = executor.execute(&ticket.to, &ticket.data, budget);

        if outcome.success {
            self.events.push(ContractEvent::Call(Call {
                sender: ticket.sender,
                nonce: nonce_used,
            }));
        } else {
            self.events.push(ContractEvent::CallFailed(CallFailed {
                sender: ticket.sender,
                nonce: nonce_used,
            }));
        }

        let gas_cost = (self
            .gas_params
            .transaction_gas(ticket.data.len(), outcome.gas_used) as u128)
            .saturating_mul(ctx.effective_gas_price);

        let bid_outcome = deposit_vault.take_bid(
            &self.address,
            &ticket.sender,
            ticket.bid,
            fee_vault,
            ctx.proposer_node,
        )?;
        let gas_outcome = deposit_vault.take_gas(&self.address, &ticket.sender, gas_cost)?;

        Ok(CallSummary {
            success: outcome.success,
            nonce_used,
            gas_cost,
            bid_outcome,
            gas_outcome,
        })
    }

    // ------------------------- Configuration -------------------------

    /// Replace the auctioneer account. Owner-only, zero address rejected.
    pub fn change_auctioneer(
        &mut self,
        caller: &Address,
        new_auctioneer: Address,
    ) -> Result<(), EntryPointError> {
        if !self.ownable.is_owner(caller) {
            return Err(EntryPointError::Unauthorized);
        }
        if new_auctioneer.is_zero() {
            return Err(EntryPointError::ZeroAddress);
        }
        let old = self.auctioneer;
        self.auctioneer = new_auctioneer;
        self.events
            .push(ContractEvent::ChangeAuctioneer(ChangeAuctioneer {
                old,
                new: new_auctioneer,
            }));
        Ok(())
    }

    /// Replace the deposit vault handle. Owner-only, zero address rejected.
    pub fn change_deposit_vault(
        &mut self,
        caller: &Address,
        new_vault: Address,
    ) -> Result<(), EntryPointError> {
        if !self.ownable.is_owner(caller) {
            return Err(EntryPointError::Unauthorized);
        }
        if new_vault.is_zero() {
            return Err(EntryPointError::ZeroAddress);
        }
        let old = self.deposit_vault;
        self.deposit_vault = new_vault;
        self.events
            .push(ContractEvent::ChangeDepositVault(ChangeDepositVault {
                old,
                new: new_vault,
            }));
        Ok(())
    }

    /// Replace the gas accounting parameters. Owner-only.
    pub fn change_gas_parameters(
        &mut self,
        caller: &Address,
        new_params: GasParameters,
    ) -> Result<(), EntryPointError> {
        if !self.ownable.is_owner(caller) {
            return Err(EntryPointError::Unauthorized);
        }
        let old = self.gas_params;
        self.gas_params = new_params;
        self.events
            .push(ContractEvent::ChangeGasParameters(ChangeGasParameters {
                old,
                new: new_params,
            }));
        Ok(())
    }

    /// Replace the minimum bid. Owner-only.
    pub fn change_min_bid(
        &mut self,
        caller: &Address,
        new_min: u128,
    ) -> Result<(), EntryPointError> {
        if !self.ownable.is_owner(caller) {
            return Err(EntryPointError::Unauthorized);
        }
        let old = self.min_bid;
        self.min_bid = new_min;
        self.events
            .push(ContractEvent::ChangeMinBid(ChangeMinBid { old, new: new_min }));
        Ok(())
    }

    // ------------------------- Views -------------------------

    /// The next valid nonce for a sender.
    pub fn nonce_of(&self, sender: &Address) -> u64 {
        self.nonces.current(sender)
    }

    pub fn auctioneer(&self) -> &Address {
        &self.auctioneer
    }

    pub fn min_bid(&self) -> u128 {
        self.min_bid
    }

    pub fn gas_parameters(&self) -> GasParameters {
        self.gas_params
    }

    // ------------------------- Events -------------------------

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}
