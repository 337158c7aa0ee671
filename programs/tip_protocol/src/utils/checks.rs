use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::constants::MAX_MESSAGE_LEN;
use crate::errors::TipError;
use crate::utils::{derive_tip_address, sanitize_message};

/// Validate caller arguments, returning the message as it will be stored.
/// First violation wins: amount, then length, then characters.
/// The length bound applies to the raw message so the instruction size is capped before sanitising.
pub fn validate_tip_args(amount: u64, message: &str) -> Result<String> {
    require!(amount > 0, TipError::InvalidAmount);
    require!(message.len() <= MAX_MESSAGE_LEN, TipError::MessageTooLong);
    sanitize_message(message)
}

/// Check that `target` is the derived record address for (sender, seed).
/// Returns the canonical bump.
pub fn verify_tip_address(
    program_id: &Pubkey,
    sender: &Pubkey,
    seed: u64,
    target: &Pubkey,
) -> Result<u8> {
    let (expected, bump) = derive_tip_address(program_id, sender, seed)?;
    require_keys_eq!(expected, *target, TipError::AddressMismatch);
    Ok(bump)
}

/// A record slot is vacant while the system program owns it and it holds no data.
/// Lamports alone do not claim the slot.
pub fn ensure_vacant(owner: &Pubkey, data_len: usize) -> Result<()> {
    require!(
        *owner == system_program::ID && data_len == 0,
        TipError::DuplicateRecord
    );
    Ok(())
}

/// Lamports the sender must add so the record is rent exempt
pub fn storage_deposit(rent: &Rent, space: usize, existing_lamports: u64) -> u64 {
    rent.minimum_balance(space).saturating_sub(existing_lamports)
}

/// The ledger only commits a transaction that leaves each writable account
/// either empty or rent exempt.
pub fn is_rent_settled(rent: &Rent, lamports: u64, data_len: usize) -> bool {
    lamports == 0 || lamports >= rent.minimum_balance(data_len)
}

/// The sender pays the tip and the deposit, and must not be left holding dust
pub fn ensure_funds(
    rent: &Rent,
    balance: u64,
    data_len: usize,
    amount: u64,
    deposit: u64,
) -> Result<()> {
    let remaining = amount
        .checked_add(deposit)
        .and_then(|required| balance.checked_sub(required))
        .ok_or_else(|| error!(TipError::InsufficientFunds))?;
    require!(
        is_rent_settled(rent, remaining, data_len),
        TipError::InsufficientFunds
    );
    Ok(())
}

pub fn ensure_recipient_settled(
    rent: &Rent,
    balance: u64,
    data_len: usize,
    amount: u64,
) -> Result<()> {
    require!(
        is_rent_settled(rent, balance.saturating_add(amount), data_len),
        TipError::RecipientNotRentExempt
    );
    Ok(())
}
