//! Auction tickets and the dual-signature protocol
//!
//! A ticket is signed twice before submission. The searcher signs the
//! SHA-256 digest of the ticket's canonical bytes, domain-bound to the
//! entry point's own address so a ticket for one deployment can never be
//! replayed against another. The auctioneer then co-signs the digest of
//! the raw searcher signature bytes, authorizing that exact signature for
//! inclusion.
//!
//! Ed25519 has no public-key recovery, so "recovery" here is
//! verify-then-derive: a [`SignatureBundle`] carries the signer's public
//! key, verification checks the signature against it, and the signer's
//! [`Address`] is derived from the key. Callers compare the derived
//! address against the expected identity and treat a mismatch as a typed
//! validation error.

use auction_types::ids::Address;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::TicketError;
use crate::MAX_DATA_SIZE;

/// A priority-auction ticket, constructed off-chain and submitted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionTicket {
    /// Opaque correlator tying the ticket to an off-chain-agreed target
    /// transaction; covered by the signature but not independently verified.
    pub target_tx_hash: [u8; 32],
    /// The exact block height at which the ticket is valid.
    pub block_number: u64,
    /// The searcher account charged for the bid.
    pub sender: Address,
    /// Target contract for the sub-call.
    pub to: Address,
    /// Must equal the sender's stored nonce at execution time.
    pub nonce: u64,
    /// Amount paid for priority execution, separate from gas.
    pub bid: u128,
    /// Gas forwarded to the sub-call.
    pub call_gas_limit: u64,
    /// Calldata for the sub-call, bounded by [`MAX_DATA_SIZE`].
    pub data: Vec<u8>,
}

impl AuctionTicket {
    /// Canonical signing bytes, bound to the verifying entry point address.
    pub fn canonical_bytes(&self, entry_point: &Address) -> Vec<u8> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            verifying_contract: &'a Address,
            ticket: &'a AuctionTicket,
        }
        serde_json::to_vec(&Envelope {
            verifying_contract: entry_point,
            ticket: self,
        })
        .expect("ticket serialization must not fail")
    }

    /// SHA-256 digest of the canonical bytes, the payload the searcher signs.
    pub fn signing_digest(&self, entry_point: &Address) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes(entry_point));
        hasher.finalize().into()
    }

    /// Check the calldata size bound.
    pub fn oversized(&self) -> bool {
        self.data.len() > MAX_DATA_SIZE
    }
}

/// A detached Ed25519 signature with the signer's public key, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBundle {
    /// Ed25519 signature as hex string (64 bytes / 128 chars)
    pub signature: String,
    /// Signer's public key as hex string (32 bytes / 64 chars)
    pub public_key: String,
}

impl SignatureBundle {
    /// Sign a 32-byte digest.
    pub fn sign(digest: &[u8; 32], key: &SigningKey) -> Self {
        let signature = key.sign(digest);
        Self {
            signature: hex::encode(signature.to_bytes()),
            public_key: hex::encode(key.verifying_key().to_bytes()),
        }
    }

    /// Raw signature bytes, the payload the auctioneer co-signs.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, TicketError> {
        hex::decode(&self.signature).map_err(|_| TicketError::InvalidSignature)
    }

    /// Verify over `digest` and return the signer's derived address.
    ///
    /// Total over its inputs: every malformed encoding or failed
    /// verification maps to a typed error, nothing panics.
    pub fn recover_signer(&self, digest: &[u8; 32]) -> Result<Address, TicketError> {
        let pub_bytes = hex::decode(&self.public_key)
            .map_err(|_| TicketError::InvalidPublicKey)?;
        let sig_bytes = self.signature_bytes()?;

        let pub_key: [u8; 32] = pub_bytes
            .as_slice()
            .try_into()
            .map_err(|_| TicketError::InvalidPublicKey)?;
        let sig: [u8; 64] = sig_bytes
            .as_slice()
            .try_into()
            .map_err(|_| TicketError::InvalidSignature)?;

        let verifying_key = VerifyingKey::from_bytes(&pub_key)
            .map_err(|_| TicketError::InvalidPublicKey)?;
        let signature = Signature::from_bytes(&sig);

        verifying_key
            .verify(digest, &signature)
            .map_err(|_| TicketError::VerificationFailed)?;

        Ok(Address::from_public_key(&pub_key))
    }
}

/// Digest the auctioneer signs: SHA-256 over the raw searcher signature bytes.
pub fn approval_digest(searcher_sig: &SignatureBundle) -> Result<[u8; 32], TicketError> {
    let bytes = searcher_sig.signature_bytes()?;
    Ok(Sha256::digest(&bytes).into())
}

/// A fully signed ticket ready for submission by the proposer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTicket {
    pub ticket: AuctionTicket,
    pub searcher_sig: SignatureBundle,
    pub auctioneer_sig: SignatureBundle,
}

impl SubmittedTicket {
    /// Perform both signing steps over a ticket.
    pub fn sign(
        ticket: AuctionTicket,
        entry_point: &Address,
        searcher_key: &SigningKey,
        auctioneer_key: &SigningKey,
    ) -> Self {
        let digest = ticket.signing_digest(entry_point);
        let searcher_sig = SignatureBundle::sign(&digest, searcher_key);
        let approval = approval_digest(&searcher_sig)
            .expect("freshly produced signature is valid hex");
        let auctioneer_sig = SignatureBundle::sign(&approval, auctioneer_key);
        Self {
            ticket,
            searcher_sig,
            auctioneer_sig,
        }
    }
}

/// Derive the address controlled by a signing key.
pub fn address_of(key: &SigningKey) -> Address {
    Address::from_public_key(&key.verifying_key().to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::ids::ID_LEN;

    fn test_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn sample_ticket(sender: Address) -> AuctionTicket {
        AuctionTicket {
            target_tx_hash: [0x11; 32],
            block_number: 42,
            sender,
            to: Address::new([0x22; ID_LEN]),
            nonce: 0,
            bid: 10_000,
            call_gas_limit: 100_000,
            data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        }
    }

    #[test]
    fn test_signing_digest_deterministic() {
        let ep = Address::new([0xEE; ID_LEN]);
        let ticket = sample_ticket(Address::new([1; ID_LEN]));
        assert_eq!(ticket.signing_digest(&ep), ticket.signing_digest(&ep));
    }

    #[test]
    fn test_signing_digest_domain_bound() {
        let ticket = sample_ticket(Address::new([1; ID_LEN]));
        let d1 = ticket.signing_digest(&Address::new([0xEE; ID_LEN]));
        let d2 = ticket.signing_digest(&Address::new([0xEF; ID_LEN]));
        assert_ne!(d1, d2, "same ticket, different entry point, different digest");
    }

    #[test]
    fn test_signing_digest_covers_every_field() {
        let ep = Address::new([0xEE; ID_LEN]);
        let base = sample_ticket(Address::new([1; ID_LEN]));
        let baseline = base.signing_digest(&ep);

        let mut t = base.clone();
        t.target_tx_hash = [0x12; 32];
        assert_ne!(t.signing_digest(&ep), baseline);

        let mut t = base.clone();
        t.block_number += 1;
        assert_ne!(t.signing_digest(&ep), baseline);

        let mut t = base.clone();
        t.nonce += 1;
        assert_ne!(t.signing_digest(&ep), baseline);

        let mut t = base.clone();
        t.bid += 1;
        assert_ne!(t.signing_digest(&ep), baseline);

        let mut t = base.clone();
        t.call_gas_limit += 1;
        assert_ne!(t.signing_digest(&ep), baseline);

        let mut t = base;
        t.data.push(0x00);
        assert_ne!(t.signing_digest(&ep), baseline);
    }

    #[test]
    fn test_sign_and_recover() {
        let key = test_key(1);
        let ep = Address::new([0xEE; ID_LEN]);
        let ticket = sample_ticket(address_of(&key));
        let digest = ticket.signing_digest(&ep);

        let bundle = SignatureBundle::sign(&digest, &key);
        let recovered = bundle.recover_signer(&digest).unwrap();
        assert_eq!(recovered, address_of(&key));
    }

    #[test]
    fn test_recover_tampered_digest_fails() {
        let key = test_key(1);
        let bundle = SignatureBundle::sign(&[0xAA; 32], &key);
        assert_eq!(
            bundle.recover_signer(&[0xAB; 32]),
            Err(TicketError::VerificationFailed)
        );
    }

    #[test]
    fn test_recover_invalid_signature_hex() {
        let key = test_key(1);
        let mut bundle = SignatureBundle::sign(&[0xAA; 32], &key);
        bundle.signature = "not_hex".to_string();
        assert_eq!(
            bundle.recover_signer(&[0xAA; 32]),
            Err(TicketError::InvalidSignature)
        );
    }

    #[test]
    fn test_recover_invalid_public_key_hex() {
        let key = test_key(1);
        let mut bundle = SignatureBundle::sign(&[0xAA; 32], &key);
        bundle.public_key = "not_hex".to_string();
        assert_eq!(
            bundle.recover_signer(&[0xAA; 32]),
            Err(TicketError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_recover_truncated_signature() {
        let key = test_key(1);
        let mut bundle = SignatureBundle::sign(&[0xAA; 32], &key);
        bundle.signature.truncate(64);
        assert_eq!(
            bundle.recover_signer(&[0xAA; 32]),
            Err(TicketError::InvalidSignature)
        );
    }

    #[test]
    fn test_approval_digest_binds_searcher_signature() {
        let searcher = test_key(1);
        let s1 = SignatureBundle::sign(&[0x01; 32], &searcher);
        let s2 = SignatureBundle::sign(&[0x02; 32], &searcher);
        assert_ne!(
            approval_digest(&s1).unwrap(),
            approval_digest(&s2).unwrap()
        );
    }

    #[test]
    fn test_submitted_ticket_dual_signatures_verify() {
        let searcher = test_key(1);
        let auctioneer = test_key(2);
        let ep = Address::new([0xEE; ID_LEN]);
        let ticket = sample_ticket(address_of(&searcher));

        let submitted = SubmittedTicket::sign(ticket, &ep, &searcher, &auctioneer);

        let digest = submitted.ticket.signing_digest(&ep);
        assert_eq!(
            submitted.searcher_sig.recover_signer(&digest).unwrap(),
            address_of(&searcher)
        );

        let approval = approval_digest(&submitted.searcher_sig).unwrap();
        assert_eq!(
            submitted.auctioneer_sig.recover_signer(&approval).unwrap(),
            address_of(&auctioneer)
        );
    }

    #[test]
    fn test_oversized_data_detected() {
        let mut ticket = sample_ticket(Address::new([1; ID_LEN]));
        assert!(!ticket.oversized());
        ticket.data = vec![0; MAX_DATA_SIZE];
        assert!(!ticket.oversized());
        ticket.data.push(0);
        assert!(ticket.oversized());
    }

    #[test]
    fn test_submitted_ticket_serialization() {
        let searcher = test_key(1);
        let auctioneer = test_key(2);
        let ep = Address::new([0xEE; ID_LEN]);
        let ticket = sample_ticket(address_of(&searcher));
        let submitted = SubmittedTicket::sign(ticket, &ep, &searcher, &auctioneer);

        let json = serde_json::to_string(&submitted).unwrap();
        let restored: SubmittedTicket = serde_json::from_str(&json).unwrap();
        assert_eq!(submitted, restored);
    }
}
