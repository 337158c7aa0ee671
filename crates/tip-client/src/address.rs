use anchor_lang::prelude::Pubkey;
use tip_protocol::utils::derive_tip_address;

use crate::outcome::FailureKind;

/// Record address and bump for a (sender, seed) pair under the deployed program.
/// Lets a caller verify the target before submitting.
pub fn compute_tip_address(sender: &Pubkey, seed: u64) -> Result<(Pubkey, u8), FailureKind> {
    derive_tip_address(&tip_protocol::ID, sender, seed).map_err(FailureKind::from_program_error)
}
