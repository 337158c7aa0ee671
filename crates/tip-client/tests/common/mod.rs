//! In-memory ledger, wallet and clock for driving submissions end to end.
//! The ledger runs the program's own checks and commits all effects or none.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anchor_lang::prelude::{Pubkey, Rent};
use anchor_lang::solana_program::hash::Hash;
use anchor_lang::{system_program, AccountSerialize, AnchorDeserialize, Discriminator};
use tip_client::{
    Authority, Authorization, BroadcastError, Confirmation, Ledger, NetworkError, SignedTip, Signature,
    TimeSource, TxError, UnsignedTip,
};
use tip_protocol::errors::custom_code;
use tip_protocol::state::TipRecord;
use tip_protocol::utils::{
    ensure_funds, ensure_recipient_settled, ensure_vacant, is_rent_settled, storage_deposit, validate_tip_args,
    verify_tip_address,
};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Smallest transfer that leaves a fresh recipient rent exempt
pub fn rent_floor() -> u64 {
    Rent::default().minimum_balance(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAccount {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

impl Default for MockAccount {
    fn default() -> Self {
        Self {
            lamports: 0,
            owner: system_program::ID,
            data: Vec::new(),
        }
    }
}

#[derive(Default)]
struct State {
    accounts: HashMap<Pubkey, MockAccount>,
    statuses: HashMap<Signature, Confirmation>,
    broadcasts: usize,
    offline: bool,
    withhold_confirmations: bool,
    unix_timestamp: i64,
}

#[derive(Default)]
pub struct MockLedger {
    state: RefCell<State>,
}

impl MockLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.state.borrow_mut().unix_timestamp = 1_700_000_000;
        ledger
    }

    pub fn fund(&self, key: &Pubkey, lamports: u64) {
        self.state.borrow_mut().accounts.entry(*key).or_default().lamports += lamports;
    }

    pub fn balance(&self, key: &Pubkey) -> u64 {
        self.account(key).map(|a| a.lamports).unwrap_or(0)
    }

    pub fn account(&self, key: &Pubkey) -> Option<MockAccount> {
        self.state.borrow().accounts.get(key).cloned()
    }

    /// Transactions that actually reached the network
    pub fn broadcasts(&self) -> usize {
        self.state.borrow().broadcasts
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    pub fn set_withhold_confirmations(&self, withhold: bool) {
        self.state.borrow_mut().withhold_confirmations = withhold;
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.state.borrow().unix_timestamp
    }

    /// Apply one `send_tip` transaction atomically
    fn execute(state: &mut State, tx: &SignedTip) -> Result<(), TxError> {
        let message = &tx.message;
        let ix = message
            .instructions
            .first()
            .ok_or_else(|| TxError::Other("no instructions".into()))?;
        let key_at = |index: u8| message.account_keys.get(index as usize).copied();

        if key_at(ix.program_id_index) != Some(tip_protocol::ID) {
            return Err(TxError::Other("unknown program".into()));
        }
        let keys: Vec<Pubkey> = ix.accounts.iter().filter_map(|&i| key_at(i)).collect();
        let [sender, recipient, tip_record, _system_program] = keys[..] else {
            return Err(TxError::Other("wrong account count".into()));
        };

        let discriminator = tip_protocol::instruction::SendTip::DISCRIMINATOR;
        if !ix.data.starts_with(&discriminator[..]) {
            return Err(TxError::Other("unknown instruction".into()));
        }
        let args = tip_protocol::instruction::SendTip::try_from_slice(&ix.data[discriminator.len()..])
            .map_err(|e| TxError::Other(e.to_string()))?;

        let program = |err: anchor_lang::error::Error| TxError::Custom(custom_code(err).unwrap_or(0));

        let stored = validate_tip_args(args.amount, &args.message).map_err(program)?;
        let bump = verify_tip_address(&tip_protocol::ID, &sender, args.seed, &tip_record).map_err(program)?;
        let existing = state.accounts.get(&tip_record).cloned().unwrap_or_default();
        ensure_vacant(&existing.owner, existing.data.len()).map_err(program)?;

        let rent = Rent::default();
        let space = TipRecord::space(stored.len());
        let deposit = storage_deposit(&rent, space, existing.lamports);
        let payer = state.accounts.get(&sender).cloned().unwrap_or_default();
        ensure_funds(&rent, payer.lamports, payer.data.len(), args.amount, deposit).map_err(program)?;
        let payee = state.accounts.get(&recipient).cloned().unwrap_or_default();
        ensure_recipient_settled(&rent, payee.lamports, payee.data.len(), args.amount).map_err(program)?;

        let record = TipRecord {
            sender,
            recipient,
            amount: args.amount,
            message: stored,
            timestamp: state.unix_timestamp,
            bump,
        };
        let mut data = Vec::with_capacity(space);
        record
            .try_serialize(&mut data)
            .map_err(|e| TxError::Other(e.to_string()))?;

        // Every check passed; apply to a copy and commit only if rent state holds
        let mut next = state.accounts.clone();
        next.entry(sender).or_default().lamports -= args.amount + deposit;
        next.entry(recipient).or_default().lamports += args.amount;
        next.insert(
            tip_record,
            MockAccount {
                lamports: existing.lamports + deposit,
                owner: tip_protocol::ID,
                data,
            },
        );
        for key in [sender, recipient, tip_record] {
            let account = &next[&key];
            if !is_rent_settled(&rent, account.lamports, account.data.len()) {
                return Err(TxError::Other(format!("insufficient funds for rent: {}", key)));
            }
        }
        state.accounts = next;
        state.unix_timestamp += 1;
        Ok(())
    }
}

impl Ledger for MockLedger {
    fn latest_blockhash(&self) -> Result<Hash, NetworkError> {
        if self.state.borrow().offline {
            return Err(NetworkError("ledger unreachable".into()));
        }
        Ok(Hash::new_unique())
    }

    fn send_transaction(&self, tx: &SignedTip, simulate: bool) -> Result<Signature, BroadcastError> {
        let mut state = self.state.borrow_mut();
        if state.offline {
            return Err(BroadcastError::Network(NetworkError("ledger unreachable".into())));
        }
        let signature = tx
            .reference()
            .ok_or_else(|| BroadcastError::Simulation(TxError::Other("unsigned".into())))?;

        let status = match Self::execute(&mut state, tx) {
            Err(err) if simulate => return Err(BroadcastError::Simulation(err)),
            Err(err) => Confirmation::Failed(err),
            Ok(()) => Confirmation::Committed,
        };
        state.broadcasts += 1;
        state.statuses.insert(signature, status);
        Ok(signature)
    }

    fn confirmation(&self, signature: &Signature) -> Result<Option<Confirmation>, NetworkError> {
        let state = self.state.borrow();
        if state.offline {
            return Err(NetworkError("ledger unreachable".into()));
        }
        if state.withhold_confirmations {
            return Ok(None);
        }
        Ok(state.statuses.get(signature).cloned())
    }

    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, NetworkError> {
        let state = self.state.borrow();
        if state.offline {
            return Err(NetworkError("ledger unreachable".into()));
        }
        Ok(state.accounts.get(address).map(|a| a.data.clone()))
    }
}

/// Wallet that approves or declines every request
pub struct MockWallet {
    approve: bool,
    tag: u8,
    signed: u64,
    pub requests: usize,
}

impl MockWallet {
    pub fn approving(tag: u8) -> Self {
        Self { approve: true, tag, signed: 0, requests: 0 }
    }

    pub fn declining() -> Self {
        Self { approve: false, tag: 0, signed: 0, requests: 0 }
    }

    pub fn sign(&mut self, tx: UnsignedTip) -> SignedTip {
        self.signed += 1;
        let mut bytes = [self.tag; 64];
        bytes[..8].copy_from_slice(&self.signed.to_le_bytes());
        SignedTip {
            message: tx.message,
            signatures: vec![Signature(bytes)],
        }
    }
}

impl Authority for MockWallet {
    fn authorize(&mut self, tx: UnsignedTip) -> Authorization {
        self.requests += 1;
        if self.approve {
            Authorization::Approved(self.sign(tx))
        } else {
            Authorization::Declined("User rejected the request".into())
        }
    }
}

/// Clock that only moves when slept on
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn elapsed_ms(&self) -> u64 {
        self.now.get()
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

pub fn deposit_for(message: &str) -> u64 {
    Rent::default().minimum_balance(TipRecord::space(message.len()))
}
