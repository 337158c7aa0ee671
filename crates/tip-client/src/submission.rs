//! The submission state machine.
//!
//! A [`Submission`] performs no I/O. [`Submission::start`] and
//! [`Submission::resume`] return the next [`Step`] for the caller to carry
//! out; the caller feeds the result back as an [`Input`]. The two open-ended
//! waits, the signer's decision and ledger inclusion, are therefore plain
//! states, and any number of submissions can be interleaved on one thread.

use std::fmt;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::{hash::Hash, message::Message};
use tip_protocol::utils::validate_tip_args;

use crate::address::compute_tip_address;
use crate::config::ClientConfig;
use crate::ledger::{Authorization, BroadcastError, Confirmation, NetworkError, TxError};
use crate::outcome::{FailureKind, Outcome, SubmissionState, TipReceipt};
use crate::transaction::{SignedTip, Signature, TipRequest, UnsignedTip};

/// I/O the caller must perform next
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    FetchBlockhash,
    Authorize(UnsignedTip),
    Broadcast { tx: SignedTip, simulate: bool },
    PollConfirmation { signature: Signature, delay_ms: u64 },
    Finished(Outcome),
}

/// Result of the last [`Step`]
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Blockhash(Result<Hash, NetworkError>),
    Authorization(Authorization),
    Broadcast {
        result: Result<Signature, BroadcastError>,
        now_ms: u64,
    },
    Confirmation {
        status: Result<Option<Confirmation>, NetworkError>,
        now_ms: u64,
    },
}

impl Input {
    fn name(&self) -> &'static str {
        match self {
            Self::Blockhash(_) => "blockhash",
            Self::Authorization(_) => "authorization",
            Self::Broadcast { .. } => "broadcast",
            Self::Confirmation { .. } => "confirmation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    AlreadyStarted,
    AlreadyFinished,
    UnexpectedInput {
        state: SubmissionState,
        input: &'static str,
    },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "submission already started"),
            Self::AlreadyFinished => write!(f, "submission already finished"),
            Self::UnexpectedInput { state, input } => {
                write!(f, "unexpected {} input while {:?}", input, state)
            }
        }
    }
}

impl std::error::Error for SubmissionError {}

/// What abandoning a submission leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// Nothing reached the network
    NothingSent,
    /// A transaction may still land; only local tracking stops
    InFlight(Option<Signature>),
    Finished,
}

#[derive(Debug, Clone)]
pub struct Submission {
    request: TipRequest,
    preflight: bool,
    confirmation_timeout_ms: u64,
    poll_interval_ms: u64,
    state: SubmissionState,
    history: Vec<SubmissionState>,
    target: Option<(Pubkey, u8)>,
    built: Option<Message>,
    signature: Option<Signature>,
    deadline_ms: u64,
    outcome: Option<Outcome>,
}

impl Submission {
    pub fn new(request: TipRequest, config: &ClientConfig) -> Self {
        Self {
            request,
            preflight: config.preflight,
            confirmation_timeout_ms: config.confirmation_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
            state: SubmissionState::Idle,
            history: vec![SubmissionState::Idle],
            target: None,
            built: None,
            signature: None,
            deadline_ms: 0,
            outcome: None,
        }
    }

    pub fn request(&self) -> &TipRequest {
        &self.request
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[SubmissionState] {
        &self.history
    }

    pub fn tip_record(&self) -> Option<Pubkey> {
        self.target.map(|(address, _)| address)
    }

    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Validate locally, derive the record address and ask for a blockhash
    pub fn start(&mut self) -> Result<Step, SubmissionError> {
        if self.state != SubmissionState::Idle {
            return Err(SubmissionError::AlreadyStarted);
        }
        self.enter(SubmissionState::Building);

        if self.preflight {
            if let Err(err) = validate_tip_args(self.request.amount, &self.request.message) {
                return Ok(self.fail(FailureKind::from_program_error(err)));
            }
        }

        match compute_tip_address(&self.request.sender, self.request.seed) {
            Ok(target) => self.target = Some(target),
            Err(kind) => return Ok(self.fail(kind)),
        }
        Ok(Step::FetchBlockhash)
    }

    pub fn resume(&mut self, input: Input) -> Result<Step, SubmissionError> {
        use SubmissionState::*;

        if self.state.is_terminal() {
            return Err(SubmissionError::AlreadyFinished);
        }

        match (self.state, input) {
            (Building, Input::Blockhash(Ok(blockhash))) => {
                let Some((tip_record, bump)) = self.target else {
                    return Ok(self.fail(FailureKind::DerivationExhausted));
                };
                let tx = UnsignedTip::build(&self.request, tip_record, bump, blockhash);
                self.built = Some(tx.message.clone());
                self.enter(AwaitingAuthorization);
                Ok(Step::Authorize(tx))
            }
            (Building, Input::Blockhash(Err(err))) => Ok(self.fail(FailureKind::Network(err.0))),

            (AwaitingAuthorization, Input::Authorization(Authorization::Declined(reason))) => {
                Ok(self.finish(Outcome::Rejected(reason)))
            }
            (AwaitingAuthorization, Input::Authorization(Authorization::Approved(tx))) => {
                if self.built.as_ref() != Some(&tx.message) || tx.signatures.is_empty() {
                    return Ok(self.fail(FailureKind::Unknown(
                        "signed transaction does not match the built one".to_string(),
                    )));
                }
                self.enter(Broadcasting);
                Ok(Step::Broadcast {
                    tx,
                    simulate: self.preflight,
                })
            }

            (Broadcasting, Input::Broadcast { result, now_ms }) => match result {
                Ok(signature) => {
                    self.signature = Some(signature);
                    self.deadline_ms = now_ms.saturating_add(self.confirmation_timeout_ms);
                    self.enter(Confirming);
                    Ok(Step::PollConfirmation {
                        signature,
                        delay_ms: 0,
                    })
                }
                Err(BroadcastError::Network(err)) => Ok(self.fail(FailureKind::Network(err.0))),
                Err(BroadcastError::Simulation(err)) => Ok(self.fail(classify(err))),
            },

            (Confirming, Input::Confirmation { status, now_ms }) => {
                let Some(signature) = self.signature else {
                    return Err(SubmissionError::UnexpectedInput {
                        state: Confirming,
                        input: "confirmation",
                    });
                };
                match status {
                    Ok(Some(Confirmation::Committed)) => {
                        let (tip_record, bump) = self.target.unwrap_or_default();
                        Ok(self.finish(Outcome::Succeeded(TipReceipt {
                            signature,
                            tip_record,
                            bump,
                        })))
                    }
                    Ok(Some(Confirmation::Failed(err))) => Ok(self.fail(classify(err))),
                    // Not seen yet, or the poll itself failed: keep waiting until the deadline
                    Ok(None) | Err(_) if now_ms >= self.deadline_ms => {
                        Ok(self.fail(FailureKind::ConfirmationTimeout))
                    }
                    Ok(None) | Err(_) => Ok(Step::PollConfirmation {
                        signature,
                        delay_ms: self.poll_interval_ms.min(self.deadline_ms - now_ms),
                    }),
                }
            }

            (state, input) => Err(SubmissionError::UnexpectedInput {
                state,
                input: input.name(),
            }),
        }
    }

    /// Stop tracking. Safe at any point; after a broadcast the transaction may still land.
    pub fn cancel(self) -> Cancellation {
        match self.state {
            s if s.is_terminal() => Cancellation::Finished,
            s if s.is_pre_broadcast() => Cancellation::NothingSent,
            _ => Cancellation::InFlight(self.signature),
        }
    }

    fn enter(&mut self, next: SubmissionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, kind: FailureKind) -> Step {
        self.finish(Outcome::Failed(kind))
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        self.enter(outcome.state());
        self.outcome = Some(outcome.clone());
        Step::Finished(outcome)
    }
}

fn classify(err: TxError) -> FailureKind {
    match err {
        TxError::Custom(code) => FailureKind::from_program_code(code),
        TxError::Other(detail) => FailureKind::Unknown(detail),
    }
}
