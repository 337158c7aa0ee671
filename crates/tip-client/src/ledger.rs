//! Seams to the outside world: the ledger connection, the signing authority and time.

use std::fmt;
use std::time::{Duration, Instant};

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::hash::Hash;

use crate::transaction::{SignedTip, Signature, UnsignedTip};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError(pub String);

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NetworkError {}

/// Why a transaction failed on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Program returned a custom error code
    Custom(u32),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    Network(NetworkError),
    /// Preflight simulation rejected the transaction; nothing was sent
    Simulation(TxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Committed,
    Failed(TxError),
}

/// Read-mostly connection to the ledger. Shared by every submission, so
/// implementations take `&self` and keep any bookkeeping behind interior mutability.
pub trait Ledger {
    fn latest_blockhash(&self) -> Result<Hash, NetworkError>;

    /// Hand a signed transaction to the network. With `simulate` the ledger
    /// dry-runs it first and refuses to broadcast a failing transaction.
    fn send_transaction(&self, tx: &SignedTip, simulate: bool) -> Result<Signature, BroadcastError>;

    /// `None` while the transaction is not yet known to be included
    fn confirmation(&self, signature: &Signature) -> Result<Option<Confirmation>, NetworkError>;

    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, NetworkError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    Approved(SignedTip),
    Declined(String),
}

/// The wallet holding the sender's key. May block for as long as the holder takes.
pub trait Authority {
    fn authorize(&mut self, tx: UnsignedTip) -> Authorization;
}

pub trait TimeSource {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    start: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl TimeSource for WallClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
