use anchor_lang::prelude::*;

use crate::constants::TIP_SEED;
use crate::errors::TipError;

/// Derive the tip record address and canonical bump for (sender, seed).
///
/// Pure and reproducible by anyone: the seed set is
/// `["tip", sender, seed as u64 little endian]` under `program_id`.
pub fn derive_tip_address(program_id: &Pubkey, sender: &Pubkey, seed: u64) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(
        &[TIP_SEED, sender.as_ref(), &seed.to_le_bytes()],
        program_id,
    )
    .ok_or_else(|| error!(TipError::DerivationExhausted))
}
