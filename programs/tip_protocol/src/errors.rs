use anchor_lang::error::{Error, ERROR_CODE_OFFSET};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_error::ProgramError;

#[error_code]
pub enum TipError {
    #[msg("Tip amount must be greater than 0")]
    InvalidAmount,

    #[msg("Message exceeds the maximum length")]
    MessageTooLong,

    #[msg("Message contains invalid characters")]
    InvalidCharacters,

    #[msg("Tip record does not match the derived address")]
    AddressMismatch,

    #[msg("Tip record already exists")]
    DuplicateRecord,

    #[msg("Insufficient balance for tip and storage deposit")]
    InsufficientFunds,

    #[msg("No valid bump found for tip address")]
    DerivationExhausted,

    #[msg("Tip would leave the recipient below the rent-exempt minimum")]
    RecipientNotRentExempt,
}

impl TipError {
    pub const ALL: [TipError; 8] = [
        TipError::InvalidAmount,
        TipError::MessageTooLong,
        TipError::InvalidCharacters,
        TipError::AddressMismatch,
        TipError::DuplicateRecord,
        TipError::InsufficientFunds,
        TipError::DerivationExhausted,
        TipError::RecipientNotRentExempt,
    ];

    /// Custom error code as it appears in a failed transaction
    pub fn code(self) -> u32 {
        self as u32 + ERROR_CODE_OFFSET
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

/// Extract the custom code carried by an Anchor error, if any
pub fn custom_code(err: Error) -> Option<u32> {
    match ProgramError::from(err) {
        ProgramError::Custom(code) => Some(code),
        _ => None,
    }
}
