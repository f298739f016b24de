//! Deposit Vault: per-account escrow, timed withdrawal reservations, debits
//!
//! Holds the pre-funded collateral bids and gas are debited from:
//! - Deposit flow with minimum-amount enforcement
//! - Time-locked withdrawal reservations over the entire balance
//! - Entry-point-only debit operations (`take_bid`, `take_gas`) that report
//!   shortfalls instead of failing, so proposer settlement is never blocked
//! - Enumerable depositor set for minimum-deposit eligibility scans

use auction_types::ids::{Address, NodeId};
use std::collections::HashMap;

use crate::errors::DepositError;
use crate::events::{
    ChangeAuctionFeeVault, ChangeMinDepositAmount, ChangeMinWithdrawLocktime, ContractEvent,
    InsufficientBalance, TakenBid, TakenBidFailed, TakenGas, VaultDeposit, VaultReserveWithdraw,
    VaultWithdraw,
};
use crate::fee_vault::FeeVault;
use crate::security::Ownable;

/// A time-locked claim on an account's balance.
///
/// At most one per account. `amount` is frozen at reservation time; the
/// actual withdrawal pays no more than the live balance, since auction
/// debits may drain the account while the lock runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReservation {
    pub amount: u128,
    pub ready_at: i64,
}

/// Outcome of an entry-point debit.
///
/// Shortfalls and forwarding failures are reported, not raised: a single
/// underfunded searcher must not abort the proposer's settlement
/// transaction. The caller emits different events per outcome and
/// continues either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Debit executed (and, for bids, forwarded to the fee vault).
    Taken,
    /// Balance below the requested amount; nothing debited.
    InsufficientBalance { have: u128, want: u128 },
    /// Bid debit rolled back because the fee vault rejected the forward.
    ForwardingFailed,
}

/// Index-compacting enumerable address set.
///
/// Array plus reverse index map, O(1) insert and swap-remove. Removal does
/// not preserve order; consumers rely on membership and prefix ranges only.
#[derive(Debug, Clone, Default)]
struct AddressSet {
    addrs: Vec<Address>,
    index: HashMap<Address, usize>,
}

impl AddressSet {
    fn insert(&mut self, addr: Address) {
        if self.index.contains_key(&addr) {
            return;
        }
        self.index.insert(addr, self.addrs.len());
        self.addrs.push(addr);
    }

    fn remove(&mut self, addr: &Address) {
        let Some(pos) = self.index.remove(addr) else {
            return;
        };
        self.addrs.swap_remove(pos);
        if pos < self.addrs.len() {
            self.index.insert(self.addrs[pos], pos);
        }
    }

    fn contains(&self, addr: &Address) -> bool {
        self.index.contains_key(addr)
    }

    fn len(&self) -> usize {
        self.addrs.len()
    }

    fn range(&self, start: usize, end: usize) -> &[Address] {
        let end = end.min(self.addrs.len());
        if start >= end {
            return &[];
        }
        &self.addrs[start..end]
    }

    fn iter(&self) -> impl Iterator<Item = &Address> {
        self.addrs.iter()
    }
}

/// Escrow ledger for auction deposits.
#[derive(Debug)]
pub struct DepositVault {
    /// This deployment's own address
    address: Address,
    ownable: Ownable,
    /// The only caller allowed to debit
    entry_point: Address,
    /// Configured fee vault the bid debits forward to
    fee_vault: Address,
    min_deposit_amount: u128,
    /// Seconds between reservation and withdrawal
    min_withdraw_locktime: i64,
    balances: HashMap<Address, u128>,
    reservations: HashMap<Address, WithdrawReservation>,
    depositors: AddressSet,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl DepositVault {
    pub fn new(
        address: Address,
        owner: Address,
        entry_point: Address,
        fee_vault: Address,
        min_deposit_amount: u128,
        min_withdraw_locktime: i64,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            entry_point,
            fee_vault,
            min_deposit_amount,
            min_withdraw_locktime,
            balances: HashMap::new(),
            reservations: HashMap::new(),
            depositors: AddressSet::default(),
            events: Vec::new(),
        }
    }

    /// This deployment's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    // ------------------------- Deposit -------------------------

    /// Credit the caller's own escrow.
    pub fn deposit(&mut self, account: Address, amount: u128) -> Result<(), DepositError> {
        self.deposit_for(account, amount)
    }

    /// Credit a beneficiary's escrow.
    ///
    /// Rejects zero amounts, amounts below the minimum, and deposits while
    /// a withdrawal reservation is outstanding for the beneficiary.
    pub fn deposit_for(&mut self, beneficiary: Address, amount: u128) -> Result<(), DepositError> {
        if amount == 0 {
            return Err(DepositError::InvalidAmount);
        }
        if amount < self.min_deposit_amount {
            return Err(DepositError::BelowMinimum {
                amount,
                min: self.min_deposit_amount,
            });
        }
        if self.reservations.contains_key(&beneficiary) {
            return Err(DepositError::ReservationOutstanding);
        }

        let current = self.balances.entry(beneficiary).or_insert(0);
        let new_balance = current.checked_add(amount).ok_or(DepositError::Overflow)?;
        *current = new_balance;
        self.depositors.insert(beneficiary);

        self.events.push(ContractEvent::VaultDeposit(VaultDeposit {
            account: beneficiary,
            amount,
            balance: new_balance,
            reserved: false,
        }));
        Ok(())
    }

    // ------------------------- Withdrawal -------------------------

    /// Reserve the caller's entire current balance for withdrawal at
    /// `now + min_withdraw_locktime`.
    pub fn reserve_withdraw(&mut self, account: Address, now: i64) -> Result<(), DepositError> {
        if self.reservations.contains_key(&account) {
            return Err(DepositError::ReservationOutstanding);
        }
        let balance = self.balance_of(&account);
        if balance == 0 {
            return Err(DepositError::NothingToReserve);
        }

        let ready_at = now + self.min_withdraw_locktime;
        self.reservations.insert(
            account,
            WithdrawReservation {
                amount: balance,
                ready_at,
            },
        );

        self.events
            .push(ContractEvent::VaultReserveWithdraw(VaultReserveWithdraw {
                account,
                amount: balance,
                ready_at,
            }));
        Ok(())
    }

    /// Execute a matured reservation.
    ///
    /// Pays `min(live balance, reserved amount)`, never the stale reserved
    /// figure, since auction debits may have drained the account while the
    /// lock ran. Returns the amount transferred.
    pub fn withdraw(&mut self, account: Address, now: i64) -> Result<u128, DepositError> {
        let reservation = self
            .reservations
            .get(&account)
            .copied()
            .ok_or(DepositError::NoReservation)?;
        if now < reservation.ready_at {
            return Err(DepositError::LocktimeNotElapsed {
                ready_at: reservation.ready_at,
            });
        }

        let balance = self.balance_of(&account);
        let payable = balance.min(reservation.amount);
        self.balances.insert(account, balance - payable);
        self.reservations.remove(&account);
        if self.balance_of(&account) == 0 {
            self.depositors.remove(&account);
        }

        self.events.push(ContractEvent::VaultWithdraw(VaultWithdraw {
            account,
            amount: payable,
            reserved: false,
        }));
        Ok(payable)
    }

    // ------------------------- Entry-point debits -------------------------

    /// Debit a bid and forward it to the fee vault.
    ///
    /// Entry-point-only. A shortfall skips the debit; a forwarding failure
    /// (handle mismatch or fee vault arithmetic error) rolls it back. Both
    /// are reported through [`DebitOutcome`], never as `Err`.
    pub fn take_bid(
        &mut self,
        caller: &Address,
        from: &Address,
        amount: u128,
        fee_vault: &mut FeeVault,
        validator: NodeId,
    ) -> Result<DebitOutcome, DepositError> {
        if *caller != self.entry_point {
            return Err(DepositError::OnlyEntryPoint);
        }

        let have = self.balance_of(from);
        if have < amount {
            self.events
                .push(ContractEvent::InsufficientBalance(InsufficientBalance {
                    account: *from,
                    have,
                    want: amount,
                }));
            return Ok(DebitOutcome::InsufficientBalance { have, want: amount });
        }

        self.balances.insert(*from, have - amount);

        let forwarded = *fee_vault.address() == self.fee_vault
            && fee_vault.take_bid(validator, *from, amount).is_ok();
        if !forwarded {
            // Roll the debit back; the proposer settles without this bid.
            self.balances.insert(*from, have);
            self.events
                .push(ContractEvent::TakenBidFailed(TakenBidFailed {
                    account: *from,
                    amount,
                }));
            return Ok(DebitOutcome::ForwardingFailed);
        }

        if self.balance_of(from) == 0 {
            self.depositors.remove(from);
        }
        self.events.push(ContractEvent::TakenBid(TakenBid {
            account: *from,
            amount,
        }));
        Ok(DebitOutcome::Taken)
    }

    /// Debit a gas reimbursement. Entry-point-only; shortfall reported,
    /// not raised.
    pub fn take_gas(
        &mut self,
        caller: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<DebitOutcome, DepositError> {
        if *caller != self.entry_point {
            return Err(DepositError::OnlyEntryPoint);
        }

        let have = self.balance_of(from);
        if have < amount {
            self.events
                .push(ContractEvent::InsufficientBalance(InsufficientBalance {
                    account: *from,
                    have,
                    want: amount,
                }));
            return Ok(DebitOutcome::InsufficientBalance { have, want: amount });
        }

        self.balances.insert(*from, have - amount);
        if self.balance_of(from) == 0 {
            self.depositors.remove(from);
        }
        self.events.push(ContractEvent::TakenGas(TakenGas {
            account: *from,
            amount,
        }));
        Ok(DebitOutcome::Taken)
    }

    // ------------------------- Configuration -------------------------

    /// Replace the fee vault handle. Owner-only, zero address rejected.
    pub fn change_auction_fee_vault(
        &mut self,
        caller: &Address,
        new_vault: Address,
    ) -> Result<(), DepositError> {
        if !self.ownable.is_owner(caller) {
            return Err(DepositError::Unauthorized);
        }
        if new_vault.is_zero() {
            return Err(DepositError::ZeroAddress);
        }
        let old = self.fee_vault;
        self.fee_vault = new_vault;
        self.events
            .push(ContractEvent::ChangeAuctionFeeVault(ChangeAuctionFeeVault {
                old,
                new: new_vault,
            }));
        Ok(())
    }

    /// Replace the minimum deposit amount. Owner-only.
    pub fn change_min_deposit_amount(
        &mut self,
        caller: &Address,
        new_min: u128,
    ) -> Result<(), DepositError> {
        if !self.ownable.is_owner(caller) {
            return Err(DepositError::Unauthorized);
        }
        let old = self.min_deposit_amount;
        self.min_deposit_amount = new_min;
        self.events
            .push(ContractEvent::ChangeMinDepositAmount(ChangeMinDepositAmount {
                old,
                new: new_min,
            }));
        Ok(())
    }

    /// Replace the withdrawal lock time. Owner-only.
    pub fn change_min_withdraw_locktime(
        &mut self,
        caller: &Address,
        new_locktime: i64,
    ) -> Result<(), DepositError> {
        if !self.ownable.is_owner(caller) {
            return Err(DepositError::Unauthorized);
        }
        let old = self.min_withdraw_locktime;
        self.min_withdraw_locktime = new_locktime;
        self.events.push(ContractEvent::ChangeMinWithdrawLocktime(
            ChangeMinWithdrawLocktime {
                old,
                new: new_locktime,
            },
        ));
        Ok(())
    }

    // ------------------------- Views -------------------------

    /// Current escrow balance.
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Current reservation, if any.
    pub fn reservation_of(&self, account: &Address) -> Option<WithdrawReservation> {
        self.reservations.get(account).copied()
    }

    /// Number of accounts with a nonzero balance.
    pub fn deposit_addr_count(&self) -> usize {
        self.depositors.len()
    }

    /// Whether an account currently has a nonzero balance.
    pub fn is_depositor(&self, account: &Address) -> bool {
        self.depositors.contains(account)
    }

    /// Range view over the depositor set. `end` is clamped to the set
    /// length; `start >= end` yields an empty slice.
    pub fn get_deposit_addrs(&self, start: usize, end: usize) -> Vec<Address> {
        self.depositors.range(start, end).to_vec()
    }

    /// Whether the account's balance (ignoring any reservation) meets the
    /// minimum deposit.
    pub fn is_min_deposit_over(&self, account: &Address) -> bool {
        self.balance_of(account) >= self.min_deposit_amount
    }

    /// Parallel vectors of every qualifying address, its balance, and
    /// whether a reservation is outstanding.
    pub fn get_all_addrs_over_min_deposit(&self) -> (Vec<Address>, Vec<u128>, Vec<bool>) {
        let mut addrs = Vec::new();
        let mut balances = Vec::new();
        let mut reserved = Vec::new();
        for addr in self.depositors.iter() {
            let balance = self.balance_of(addr);
            if balance >= self.min_deposit_amount {
                addrs.push(*addr);
                balances.push(balance);
                reserved.push(self.reservations.contains_key(addr));
            }
        }
        (addrs, balances, reserved)
    }

    /// Configured minimum deposit.
    pub fn min_deposit_amount(&self) -> u128 {
        self.min_deposit_amount
    }

    /// Configured withdrawal lock time in seconds.
    pub fn min_withdraw_locktime(&self) -> i64 {
        self.min_withdraw_locktime
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
