//! Client side of the tip protocol.
//!
//! [`compute_tip_address`] derives the record address for a (sender, seed) pair.
//! [`Submission`] is the per-tip state machine; [`TipClient`] drives it
//! against a [`Ledger`] and a signing [`Authority`] and reconciles ambiguous
//! outcomes by probing the record address.

pub mod address;
pub mod client;
pub mod config;
pub mod ledger;
pub mod outcome;
pub mod submission;
pub mod transaction;

pub use address::compute_tip_address;
pub use client::{Resubmission, TipClient};
pub use config::ClientConfig;
pub use ledger::{
    Authority, Authorization, BroadcastError, Confirmation, Ledger, NetworkError, TimeSource, TxError,
    WallClock,
};
pub use outcome::{FailureKind, Outcome, SubmissionState, TipReceipt};
pub use submission::{Cancellation, Input, Step, Submission, SubmissionError};
pub use transaction::{SignedTip, Signature, TipRequest, UnsignedTip};
