//! Blocking driver for [`Submission`]s plus the probe-and-reconcile helpers.

use std::collections::HashSet;

use anchor_lang::prelude::Pubkey;
use anchor_lang::AccountDeserialize;
use tip_protocol::state::TipRecord;

use crate::address::compute_tip_address;
use crate::config::ClientConfig;
use crate::ledger::{Authority, Ledger, TimeSource, WallClock};
use crate::outcome::{FailureKind, Outcome};
use crate::submission::{Input, Step, Submission};
use crate::transaction::TipRequest;

/// Result of [`TipClient::resubmit`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resubmission {
    /// The earlier attempt landed after all
    Landed(TipRecord),
    Submitted(Outcome),
}

pub struct TipClient<L, T = WallClock> {
    ledger: L,
    time: T,
    config: ClientConfig,
    /// (sender, seed) pairs this client has handed to a submission.
    /// Grows by one entry per submitted tip until [`TipClient::release`] drops it.
    claimed: HashSet<(Pubkey, u64)>,
}

impl<L: Ledger> TipClient<L> {
    pub fn new(ledger: L, config: ClientConfig) -> Self {
        Self::with_time(ledger, WallClock::default(), config)
    }
}

impl<L: Ledger, T: TimeSource> TipClient<L, T> {
    pub fn with_time(ledger: L, time: T, config: ClientConfig) -> Self {
        Self {
            ledger,
            time,
            config,
            claimed: HashSet::new(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn compute_tip_address(&self, sender: &Pubkey, seed: u64) -> Result<(Pubkey, u8), FailureKind> {
        compute_tip_address(sender, seed)
    }

    /// Claim the request's seed and create its submission.
    /// A seed is never reused silently: a second claim fails with `SeedReused`.
    pub fn prepare(&mut self, request: TipRequest) -> Result<Submission, FailureKind> {
        if !self.claimed.insert((request.sender, request.seed)) {
            return Err(FailureKind::SeedReused);
        }
        Ok(Submission::new(request, &self.config))
    }

    /// Forget a claimed seed once its fate is settled, e.g. after its record
    /// has been read back with [`TipClient::probe`]. A later request with the
    /// same seed then reaches the program, which refuses it with `DuplicateRecord`.
    pub fn release(&mut self, sender: &Pubkey, seed: u64) -> bool {
        self.claimed.remove(&(*sender, seed))
    }

    /// Seeds currently guarded against reuse
    pub fn claimed_seeds(&self) -> usize {
        self.claimed.len()
    }

    pub fn submit_tip<A: Authority>(&mut self, authority: &mut A, request: TipRequest) -> Outcome {
        match self.prepare(request) {
            Ok(mut submission) => self.drive(authority, &mut submission),
            Err(kind) => Outcome::Failed(kind),
        }
    }

    /// Run a submission to a terminal state, blocking on the authority and the ledger
    pub fn drive<A: Authority>(&self, authority: &mut A, submission: &mut Submission) -> Outcome {
        let mut step = match submission.start() {
            Ok(step) => step,
            Err(err) => return Outcome::Failed(FailureKind::Unknown(err.to_string())),
        };

        loop {
            let input = match step {
                Step::Finished(outcome) => return outcome,
                Step::FetchBlockhash => Input::Blockhash(self.ledger.latest_blockhash()),
                Step::Authorize(tx) => Input::Authorization(authority.authorize(tx)),
                Step::Broadcast { tx, simulate } => {
                    let result = self.ledger.send_transaction(&tx, simulate);
                    Input::Broadcast {
                        result,
                        now_ms: self.time.now_ms(),
                    }
                }
                Step::PollConfirmation { signature, delay_ms } => {
                    if delay_ms > 0 {
                        self.time.sleep_ms(delay_ms);
                    }
                    Input::Confirmation {
                        status: self.ledger.confirmation(&signature),
                        now_ms: self.time.now_ms(),
                    }
                }
            };

            step = match submission.resume(input) {
                Ok(step) => step,
                Err(err) => return Outcome::Failed(FailureKind::Unknown(err.to_string())),
            };
        }
    }

    /// Read the tip record at the derived address, if one exists
    pub fn probe(&self, sender: &Pubkey, seed: u64) -> Result<Option<TipRecord>, FailureKind> {
        let (address, _) = compute_tip_address(sender, seed)?;
        let data = self
            .ledger
            .account_data(&address)
            .map_err(|err| FailureKind::Network(err.0))?;

        match data {
            // A funded but unallocated address is still vacant
            None => Ok(None),
            Some(data) if data.is_empty() => Ok(None),
            Some(data) => TipRecord::try_deserialize(&mut data.as_slice())
                .map(Some)
                .map_err(|err| FailureKind::Unknown(format!("undecodable tip record: {}", err))),
        }
    }

    /// Retry a request whose earlier attempt ended without a definite answer.
    /// The seed is only released when no record exists at its address.
    pub fn resubmit<A: Authority>(
        &mut self,
        authority: &mut A,
        request: TipRequest,
    ) -> Result<Resubmission, FailureKind> {
        if let Some(record) = self.probe(&request.sender, request.seed)? {
            return Ok(Resubmission::Landed(record));
        }
        self.release(&request.sender, request.seed);
        Ok(Resubmission::Submitted(self.submit_tip(authority, request)))
    }
}
