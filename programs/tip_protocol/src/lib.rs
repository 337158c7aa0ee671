use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;

declare_id!("7sLJJYECWzm1iUE2zEPkD7XtdcUp9qHx3HQPoiUGaicY");

/// Tip Protocol Program
///
/// Moves lamports from a sender to a recipient and records the tip,
/// with its message, in a permanent account derived from (sender, seed)
#[program]
pub mod tip_protocol {
    use super::*;

    /// Transfer `amount` to the recipient and create the tip record
    pub fn send_tip(
        ctx: Context<SendTip>,
        amount: u64,
        message: String,
        seed: u64,
    ) -> Result<()> {
        instructions::send_tip::handler(ctx, amount, message, seed)
    }
}
