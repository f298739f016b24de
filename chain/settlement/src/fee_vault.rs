//! Fee Vault: bid collection, payback splits, validator reward routing
//!
//! Receives every forwarded bid and splits it three ways: an immediate
//! searcher payback, a validator payback routed to the proposer node's
//! registered reward address, and a retained remainder the owner can
//! withdraw. Reward addresses are registered per validator node, gated by
//! the staking registry.

use auction_types::ids::{Address, NodeId};
use auction_types::rate::BasisPoints;
use std::collections::HashMap;

use crate::errors::FeeError;
use crate::events::{ContractEvent, FeeDeposit, FeeWithdrawal};
use crate::security::Ownable;

/// Lookup surface into the validator staking layer.
///
/// The fee vault only needs two facts about a node: whether it is a
/// registered validator, and which account administers its stake.
pub trait StakingRegistry {
    fn is_valid_node(&self, node: &NodeId) -> bool;
    fn staking_admin(&self, node: &NodeId) -> Option<Address>;
}

/// In-memory registry mapping nodes to their staking admins.
#[derive(Debug, Clone, Default)]
pub struct StaticStakingRegistry {
    admins: HashMap<NodeId, Address>,
}

impl StaticStakingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: NodeId, admin: Address) {
        self.admins.insert(node, admin);
    }
}

impl StakingRegistry for StaticStakingRegistry {
    fn is_valid_node(&self, node: &NodeId) -> bool {
        self.admins.contains_key(node)
    }

    fn staking_admin(&self, node: &NodeId) -> Option<Address> {
        self.admins.get(node).copied()
    }
}

/// Accumulator and splitter for auction bids.
#[derive(Debug)]
pub struct FeeVault {
    /// This deployment's own address
    address: Address,
    ownable: Ownable,
    /// Lifetime sum of every bid ever received, paybacks included
    accumulated_bids: u128,
    /// Retained remainder available to the owner
    balance: u128,
    reward_addrs: HashMap<NodeId, Address>,
    searcher_payback_rate: BasisPoints,
    validator_payback_rate: BasisPoints,
    /// Outbound transfers by recipient, observable by callers
    paid_out: HashMap<Address, u128>,
    events: Vec<ContractEvent>,
}

impl FeeVault {
    pub fn new(
        address: Address,
        owner: Address,
        searcher_payback_rate: BasisPoints,
        validator_payback_rate: BasisPoints,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            accumulated_bids: 0,
            balance: 0,
            reward_addrs: HashMap::new(),
            searcher_payback_rate,
            validator_payback_rate,
            paid_out: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// This deployment's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    // ------------------------- Bid intake -------------------------

    /// Receive a forwarded bid and split it.
    ///
    /// The searcher payback is always paid. The validator payback is paid
    /// only when the proposer node has a registered reward address; an
    /// unregistered node's share stays in the retained balance. All
    /// arithmetic is checked before any state is touched, so an `Err`
    /// leaves the vault unchanged and the caller rolls back its debit.
    pub fn take_bid(
        &mut self,
        validator: NodeId,
        searcher: Address,
        value: u128,
    ) -> Result<(), FeeError> {
        let searcher_payback = self.searcher_payback_rate.apply(value);
        let reward_addr = self.reward_addrs.get(&validator).copied();
        let validator_payback = if reward_addr.is_some() {
            self.validator_payback_rate.apply(value)
        } else {
            0
        };

        let accumulated = self
            .accumulated_bids
            .checked_add(value)
            .ok_or(FeeError::Overflow)?;
        let retained = value
            .checked_sub(searcher_payback)
            .and_then(|v| v.checked_sub(validator_payback))
            .ok_or(FeeError::Overflow)?;
        let balance = self
            .balance
            .checked_add(retained)
            .ok_or(FeeError::Overflow)?;

        self.accumulated_bids = accumulated;
        self.balance = balance;
        if searcher_payback > 0 {
            *self.paid_out.entry(searcher).or_insert(0) += searcher_payback;
        }
        if let Some(addr) = reward_addr {
            if validator_payback > 0 {
                *self.paid_out.entry(addr).or_insert(0) += validator_payback;
            }
        }

        self.events.push(ContractEvent::FeeDeposit(FeeDeposit {
            validator,
            total: value,
            searcher_payback,
            validator_payback,
        }));
        Ok(())
    }

    // ------------------------- Reward registration -------------------------

    /// Register a validator node's reward address.
    ///
    /// Allowed for the owner or the node's staking admin. The node must be
    /// known to the staking registry.
    pub fn register_reward_address(
        &mut self,
        caller: &Address,
        node: NodeId,
        reward_addr: Address,
        registry: &dyn StakingRegistry,
    ) -> Result<(), FeeError> {
        if !registry.is_valid_node(&node) {
            return Err(FeeError::UnknownValidator { node });
        }
        let is_admin = registry.staking_admin(&node) == Some(*caller);
        if !self.ownable.is_owner(caller) && !is_admin {
            return Err(FeeError::Unauthorized);
        }
        if reward_addr.is_zero() {
            return Err(FeeError::ZeroAddress);
        }
        self.reward_addrs.insert(node, reward_addr);
        Ok(())
    }

    /// Batch reward address registration. Owner-only, all-or-nothing:
    /// every pair is validated before any is applied.
    pub fn register_reward_addresses(
        &mut self,
        caller: &Address,
        nodes: &[NodeId],
        reward_addrs: &[Address],
        registry: &dyn StakingRegistry,
    ) -> Result<(), FeeError> {
        if !self.ownable.is_owner(caller) {
            return Err(FeeError::Unauthorized);
        }
        if nodes.len() != reward_addrs.len() {
            return Err(FeeError::LengthMismatch {
                nodes: nodes.len(),
                addrs: reward_addrs.len(),
            });
        }
        for (node, addr) in nodes.iter().zip(reward_addrs) {
            if !registry.is_valid_node(node) {
                return Err(FeeError::UnknownValidator { node: *node });
            }
            if addr.is_zero() {
                return Err(FeeError::ZeroAddress);
            }
        }
        for (node, addr) in nodes.iter().zip(reward_addrs) {
            self.reward_addrs.insert(*node, *addr);
        }
        Ok(())
    }

    // ------------------------- Configuration -------------------------

    /// Replace the searcher payback rate. Owner-only, capped at 10000 bps.
    pub fn set_searcher_payback_rate(
        &mut self,
        caller: &Address,
        rate: u16,
    ) -> Result<(), FeeError> {
        if !self.ownable.is_owner(caller) {
            return Err(FeeError::Unauthorized);
        }
        self.searcher_payback_rate =
            BasisPoints::new(rate).ok_or(FeeError::RateTooHigh { rate })?;
        Ok(())
    }

    /// Replace the validator payback rate. Owner-only, capped at 10000 bps.
    pub fn set_validator_payback_rate(
        &mut self,
        caller: &Address,
        rate: u16,
    ) -> Result<(), FeeError> {
        if !self.ownable.is_owner(caller) {
            return Err(FeeError::Unauthorized);
        }
        self.validator_payback_rate =
            BasisPoints::new(rate).ok_or(FeeError::RateTooHigh { rate })?;
        Ok(())
    }

    /// Withdraw the entire retained balance to `to`. Owner-only. Returns
    /// the amount transferred.
    pub fn withdraw(&mut self, caller: &Address, to: Address) -> Result<u128, FeeError> {
        if !self.ownable.is_owner(caller) {
            return Err(FeeError::Unauthorized);
        }
        if to.is_zero() {
            return Err(FeeError::ZeroAddress);
        }
        let amount = self.balance;
        self.balance = 0;
        if amount > 0 {
            *self.paid_out.entry(to).or_insert(0) += amount;
        }
        self.events
            .push(ContractEvent::FeeWithdrawal(FeeWithdrawal { amount }));
        Ok(amount)
    }

    // ------------------------- Views -------------------------

    /// Lifetime total of received bids.
    pub fn accumulated_bids(&self) -> u128 {
        self.accumulated_bids
    }

    /// Retained balance available to the owner.
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Registered reward address for a node, if any.
    pub fn reward_addr(&self, node: &NodeId) -> Option<Address> {
        self.reward_addrs.get(node).copied()
    }

    /// Total amount ever paid out to an address.
    pub fn paid_to(&self, addr: &Address) -> u128 {
        self.paid_out.get(addr).copied().unwrap_or(0)
    }

    pub fn searcher_payback_rate(&self) -> BasisPoints {
        self.searcher_payback_rate
    }

    pub fn validator_payback_rate(&self) -> BasisPoints {
        self.validator_payback_rate
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
