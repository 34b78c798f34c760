//! The multi-account runner.
//!
//! Every account gets its own Tokio task, running its cycles inside an
//! `account` span. Accounts share nothing but the read-only config, so
//! one account's pauses, errors or timeouts never hold up another.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::Instrument;

use arcade_pilot_pace::pause;

use crate::{Account, CycleReport, PilotConfig, PilotError};

/// Drives every configured account.
pub struct Pilot {
    config: Arc<PilotConfig>,
}

impl Pilot {
    pub fn new(config: PilotConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    /// Builds the accounts, logging and skipping unusable keys.
    pub fn accounts(&self) -> Vec<Account> {
        (0..self.config.accounts.len())
            .filter_map(|index| match Account::new(index, Arc::clone(&self.config)) {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::error!(account = index + 1, error = %e, "skipping account");
                    None
                }
            })
            .collect()
    }

    /// Runs cycles for every account until the process is stopped.
    ///
    /// # Errors
    /// - [`PilotError::Config`] — none of the configured keys is usable
    pub async fn run(self) -> Result<(), PilotError> {
        let accounts = self.accounts();
        if accounts.is_empty() {
            return Err(PilotError::Config("no usable accounts".to_string()));
        }
        tracing::info!(accounts = accounts.len(), "arcade pilot running");

        let handles: Vec<JoinHandle<()>> = accounts
            .into_iter()
            .map(|account| {
                let config = Arc::clone(&self.config);
                let span = account_span(&account);
                tokio::spawn(account_loop(account, config).instrument(span))
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "account worker stopped");
            }
        }
        Ok(())
    }

    /// Runs a single cycle for every account concurrently and returns
    /// each account's outcome, in config order.
    pub async fn run_once(&self) -> Vec<Result<CycleReport, PilotError>> {
        let handles: Vec<_> = self
            .accounts()
            .into_iter()
            .map(|account| {
                let config = Arc::clone(&self.config);
                let span = account_span(&account);
                tokio::spawn(async move { run_bounded(&account, &config).await }.instrument(span))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(PilotError::Worker(e.to_string())),
            });
        }
        outcomes
    }
}

fn account_span(account: &Account) -> tracing::Span {
    tracing::info_span!(
        "account",
        index = account.index() + 1,
        address = %account.address()
    )
}

async fn account_loop(account: Account, config: Arc<PilotConfig>) {
    loop {
        if let Ok(report) = run_bounded(&account, &config).await {
            tracing::info!(
                balance = %report.balance,
                today = report.points.map(|p| p.today),
                total = report.points.map(|p| p.total),
                "account cycle complete"
            );
        }
        pause(config.cycle_interval(), "Waiting for next cycle").await;
    }
}

/// One cycle under the configured deadline. Failures are logged here.
async fn run_bounded(account: &Account, config: &PilotConfig) -> Result<CycleReport, PilotError> {
    let outcome = with_deadline(config.cycle_deadline(), account.run_cycle()).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "account cycle failed");
    }
    outcome
}

/// Cancels `cycle` once `deadline` has passed.
async fn with_deadline<F, R>(deadline: Duration, cycle: F) -> Result<R, PilotError>
where
    F: Future<Output = Result<R, PilotError>>,
{
    time::timeout(deadline, cycle)
        .await
        .unwrap_or(Err(PilotError::Deadline(deadline)))
}
