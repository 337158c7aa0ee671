use anchor_lang::prelude::*;

/// Event emitted when a tip is transferred and recorded
#[event]
pub struct TipSent {
    pub tip_record: Pubkey,
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub seed: u64,
    pub timestamp: i64,
}
