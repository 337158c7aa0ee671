/// Constants for the tip protocol
pub const TIP_SEED: &[u8] = b"tip";

/// Upper bound on a tip message, in UTF-8 bytes.
/// Records are sized to the actual message, this only caps the deposit.
pub const MAX_MESSAGE_LEN: usize = 280;
