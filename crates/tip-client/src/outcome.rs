//! Submission states and the outcome reported to the caller.

use std::fmt;

use anchor_lang::prelude::Pubkey;
use tip_protocol::errors::{custom_code, TipError};

use crate::transaction::Signature;

/// Where a single tip submission stands.
///
/// Transitions are strictly forward:
/// `Idle -> Building -> AwaitingAuthorization -> Broadcasting -> Confirming`,
/// with the terminal states reachable as listed in [`SubmissionState::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Building,
    AwaitingAuthorization,
    Broadcasting,
    Confirming,
    Succeeded,
    Rejected,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Rejected | Self::Failed)
    }

    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Idle, Building)
                | (Building, AwaitingAuthorization)
                | (Building, Failed)
                | (AwaitingAuthorization, Broadcasting)
                | (AwaitingAuthorization, Rejected)
                | (AwaitingAuthorization, Failed)
                | (Broadcasting, Confirming)
                | (Broadcasting, Failed)
                | (Confirming, Succeeded)
                | (Confirming, Failed)
        )
    }

    /// Nothing can have reached the ledger before a broadcast is attempted
    pub fn is_pre_broadcast(self) -> bool {
        matches!(self, Self::Idle | Self::Building | Self::AwaitingAuthorization)
    }
}

/// Why a submission failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidAmount,
    MessageTooLong,
    InvalidCharacters,
    AddressMismatch,
    DuplicateRecord,
    InsufficientFunds,
    DerivationExhausted,
    RecipientNotRentExempt,
    /// This client already submitted the (sender, seed) pair
    SeedReused,
    /// Broadcast or connectivity failure. Retry only after probing the record address.
    Network(String),
    /// The tip may or may not have landed; probe the record address
    ConfirmationTimeout,
    Unknown(String),
}

impl FailureKind {
    pub fn from_program_code(code: u32) -> Self {
        match TipError::from_code(code) {
            Some(TipError::InvalidAmount) => Self::InvalidAmount,
            Some(TipError::MessageTooLong) => Self::MessageTooLong,
            Some(TipError::InvalidCharacters) => Self::InvalidCharacters,
            Some(TipError::AddressMismatch) => Self::AddressMismatch,
            Some(TipError::DuplicateRecord) => Self::DuplicateRecord,
            Some(TipError::InsufficientFunds) => Self::InsufficientFunds,
            Some(TipError::DerivationExhausted) => Self::DerivationExhausted,
            Some(TipError::RecipientNotRentExempt) => Self::RecipientNotRentExempt,
            None => Self::Unknown(format!("custom program error {:#x}", code)),
        }
    }

    pub fn from_program_error(err: anchor_lang::error::Error) -> Self {
        let detail = err.to_string();
        match custom_code(err) {
            Some(code) => Self::from_program_code(code),
            None => Self::Unknown(detail),
        }
    }

    /// Deterministic rejections that will repeat unless the request changes
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount
                | Self::MessageTooLong
                | Self::InvalidCharacters
                | Self::AddressMismatch
                | Self::DuplicateRecord
                | Self::InsufficientFunds
                | Self::RecipientNotRentExempt
        )
    }

    /// The ledger may hold the record even though this failure was reported
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout | Self::Network(_))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount => write!(f, "tip amount must be greater than 0"),
            Self::MessageTooLong => write!(f, "message exceeds the maximum length"),
            Self::InvalidCharacters => write!(f, "message contains invalid characters"),
            Self::AddressMismatch => write!(f, "tip record does not match the derived address"),
            Self::DuplicateRecord => write!(f, "tip record already exists"),
            Self::InsufficientFunds => write!(f, "insufficient balance for tip and storage deposit"),
            Self::DerivationExhausted => write!(f, "no valid bump found for tip address"),
            Self::RecipientNotRentExempt => {
                write!(f, "tip would leave the recipient below the rent-exempt minimum")
            }
            Self::SeedReused => write!(f, "seed already used for this sender"),
            Self::Network(reason) => write!(f, "network error: {}", reason),
            Self::ConfirmationTimeout => write!(f, "confirmation timed out, outcome unknown"),
            Self::Unknown(detail) => write!(f, "unknown failure: {}", detail),
        }
    }
}

impl std::error::Error for FailureKind {}

/// Proof of a recorded tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipReceipt {
    pub signature: Signature,
    pub tip_record: Pubkey,
    pub bump: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(TipReceipt),
    /// The signing authority declined
    Rejected(String),
    Failed(FailureKind),
}

impl Outcome {
    pub fn state(&self) -> SubmissionState {
        match self {
            Self::Succeeded(_) => SubmissionState::Succeeded,
            Self::Rejected(_) => SubmissionState::Rejected,
            Self::Failed(_) => SubmissionState::Failed,
        }
    }
}
