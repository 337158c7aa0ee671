//! Tip requests and the transactions built from them.

use std::fmt;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::{hash::Hash, instruction::Instruction, message::Message};
use anchor_lang::{system_program, InstructionData, ToAccountMetas};

/// One tip as the caller asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRequest {
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub message: String,
    /// Caller-chosen disambiguator, typically a millisecond timestamp
    pub seed: u64,
}

impl TipRequest {
    pub fn new(
        sender: Pubkey,
        recipient: Pubkey,
        amount: u64,
        message: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self {
            sender,
            recipient,
            amount,
            message: message.into(),
            seed,
        }
    }

    /// The `send_tip` instruction targeting `tip_record`
    pub fn instruction(&self, tip_record: Pubkey) -> Instruction {
        Instruction {
            program_id: tip_protocol::ID,
            accounts: tip_protocol::accounts::SendTip {
                sender: self.sender,
                recipient: self.recipient,
                tip_record,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: tip_protocol::instruction::SendTip {
                amount: self.amount,
                message: self.message.clone(),
                seed: self.seed,
            }
            .data(),
        }
    }
}

/// Ed25519 transaction signature; the first one identifies the transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// A built transaction waiting for the sender's signature
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTip {
    pub message: Message,
    pub tip_record: Pubkey,
    pub bump: u8,
}

impl UnsignedTip {
    /// Single `send_tip` instruction, paid for by the sender
    pub fn build(request: &TipRequest, tip_record: Pubkey, bump: u8, recent_blockhash: Hash) -> Self {
        let instruction = request.instruction(tip_record);
        Self {
            message: Message::new_with_blockhash(&[instruction], Some(&request.sender), &recent_blockhash),
            tip_record,
            bump,
        }
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.message.account_keys.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedTip {
    pub message: Message,
    pub signatures: Vec<Signature>,
}

impl SignedTip {
    pub fn reference(&self) -> Option<Signature> {
        self.signatures.first().copied()
    }
}
