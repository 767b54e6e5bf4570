use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

// Set to false to silence scheduler logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

use super::engine::AutomationEngine;

/// Scheduler settings for the recurring rule pass.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
        }
    }
}

/// Owns the recurring evaluation task.
///
/// `start` loads the persisted rules, runs one immediate pass, then fires
/// every period until `stop` cancels the loop and joins it.
pub struct AutomationController {
    engine: AutomationEngine,
    config: SchedulerConfig,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AutomationController {
    pub fn new(engine: AutomationEngine, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn engine(&self) -> &AutomationEngine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("automation already running");
        }

        self.engine
            .load_rules()
            .await
            .context("failed to load automation rules")?;

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        let handle = tokio::spawn(rule_loop(
            self.engine.clone(),
            self.config.period,
            token_clone,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("rule loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

/// The recurring pass. The first tick fires immediately.
///
/// Each pass is spawned as its own task so a slow pass never delays the next
/// tick; two passes may run concurrently. Callers wanting mutual exclusion
/// must widen the period instead.
async fn rule_loop(engine: AutomationEngine, period: Duration, cancel_token: CancellationToken) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let engine = engine.clone();
                tokio::spawn(async move {
                    if let Err(err) = engine.process_rules().await {
                        log_error!("automation pass failed: {err}");
                    }
                });
            }
            _ = cancel_token.cancelled() => {
                log_info!("automation loop shutting down");
                break;
            }
        }
    }
}
