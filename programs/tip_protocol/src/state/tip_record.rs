use anchor_lang::prelude::*;

/// Permanent receipt of a single tip.
/// Created once by `send_tip`, never updated or closed.
/// Field order is the on-chain layout and must not change.
#[account]
#[derive(Debug, PartialEq)]
pub struct TipRecord {
    /// Paying party
    pub sender: Pubkey,

    /// Receiving party
    pub recipient: Pubkey,

    /// Lamports moved to the recipient
    pub amount: u64,

    /// Sanitised message text
    pub message: String,

    /// Ledger clock at creation
    pub timestamp: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl TipRecord {
    /// Bytes used by everything except the discriminator and the message body
    pub const FIXED_SIZE: usize = 32  // sender
        + 32                          // recipient
        + 8                           // amount
        + 4                           // message length prefix
        + 8                           // timestamp
        + 1;                          // bump

    /// Account space for a record holding a message of `message_len` bytes
    pub fn space(message_len: usize) -> usize {
        8 + Self::FIXED_SIZE + message_len
    }
}
