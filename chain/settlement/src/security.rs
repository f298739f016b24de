//! Shared security primitives for the settlement contracts
//!
//! Provides the single-owner gate used by every configuration setter and
//! the sequential per-sender nonce registry backing replay protection.

use auction_types::ids::Address;
use std::collections::HashMap;

/// Single-owner access gate.
///
/// Configuration setters across all three components are restricted to one
/// owner account. Ownership can be transferred, never to the zero address.
#[derive(Debug, Clone)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Create with an initial owner.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Check if a caller is the owner.
    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// Transfer ownership. Returns `false` if the caller is not the owner
    /// or the new owner is the zero address.
    pub fn transfer(&mut self, caller: &Address, new_owner: Address) -> bool {
        if !self.is_owner(caller) || new_owner.is_zero() {
            return false;
        }
        self.owner = new_owner;
        true
    }

    /// Get the current owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

/// Strict sequential nonce registry.
///
/// Each sender's next valid nonce starts at 0. A ticket must carry exactly
/// the stored value; consumption advances it by one. Two tickets with the
/// same nonce can never both settle.
#[derive(Debug, Clone, Default)]
pub struct NonceRegistry {
    next: HashMap<Address, u64>,
}

impl NonceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The next valid nonce for a sender.
    pub fn current(&self, sender: &Address) -> u64 {
        self.next.get(sender).copied().unwrap_or(0)
    }

    /// Consume the sender's current nonce. Returns the consumed value.
    pub fn advance(&mut self, sender: &Address) -> u64 {
        let entry = self.next.entry(*sender).or_insert(0);
        let used = *entry;
        *entry += 1;
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::ids::ID_LEN;

    fn addr(n: u8) -> Address {
        Address::new([n; ID_LEN])
    }

    // --- Ownable tests ---

    #[test]
    fn test_ownable_initial_owner() {
        let gate = Ownable::new(addr(1));
        assert!(gate.is_owner(&addr(1)));
        assert!(!gate.is_owner(&addr(2)));
    }

    #[test]
    fn test_ownable_transfer() {
        let mut gate = Ownable::new(addr(1));
        assert!(gate.transfer(&addr(1), addr(2)));
        assert!(gate.is_owner(&addr(2)));
        assert!(!gate.is_owner(&addr(1)));
        assert_eq!(gate.owner(), &addr(2));
    }

    #[test]
    fn test_ownable_transfer_unauthorized() {
        let mut gate = Ownable::new(addr(1));
        assert!(!gate.transfer(&addr(3), addr(3)));
        assert!(gate.is_owner(&addr(1)));
    }

    #[test]
    fn test_ownable_transfer_to_zero_rejected() {
        let mut gate = Ownable::new(addr(1));
        assert!(!gate.transfer(&addr(1), Address::ZERO));
        assert!(gate.is_owner(&addr(1)));
    }

    // --- NonceRegistry tests ---

    #[test]
    fn test_nonce_starts_at_zero() {
        let registry = NonceRegistry::new();
        assert_eq!(registry.current(&addr(1)), 0);
    }

    #[test]
    fn test_nonce_advances_by_one() {
        let mut registry = NonceRegistry::new();
        assert_eq!(registry.advance(&addr(1)), 0);
        assert_eq!(registry.advance(&addr(1)), 1);
        assert_eq!(registry.current(&addr(1)), 2);
    }

    #[test]
    fn test_nonce_per_sender_isolation() {
        let mut registry = NonceRegistry::new();
        registry.advance(&addr(1));
        registry.advance(&addr(1));
        assert_eq!(registry.current(&addr(2)), 0);
    }
}
