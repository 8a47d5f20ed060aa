//! Generic runtime for application orchestration.
//!
//! The Runtime drives the event loop, coordinating between the
//! [`Reconciler`] state machine and a platform [`Driver`]: seed presence
//! once from a here-now snapshot, open the launch channel, then poll
//! events and execute the actions they produce.
//!
//! Failure semantics follow the service contract: publish, signal,
//! history, and here-now errors are transient — logged, never retried
//! locally, surfaced only as the absence of a state change. Only driver
//! poll/render errors end the loop.

use parlor_core::{Namespace, Pattern};

use crate::{Driver, Reconciler, ReconcilerAction, ReconcilerEvent};

/// Generic runtime that orchestrates the reconciler and a driver.
pub struct Runtime<D: Driver> {
    driver: D,
    reconciler: Reconciler,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime from a driver and a reconciler.
    pub fn new(driver: D, reconciler: Reconciler) -> Self {
        Self { driver, reconciler }
    }

    /// Run the main event loop until quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to poll or render.
    pub async fn run(mut self) -> Result<(), D::Error> {
        // Seed presence from a one-shot occupancy snapshot; later changes
        // arrive as presence events.
        match self.driver.here_now(&Pattern::Namespace(Namespace::Public)).await {
            Ok(users) => {
                let actions = self.reconciler.handle(ReconcilerEvent::OccupancySeed { users });
                let _ = self.execute(actions).await?;
            },
            Err(error) => tracing::warn!(%error, "presence seed failed"),
        }

        if let Some(channel) = self.reconciler.launch_channel() {
            let actions = self.reconciler.handle(ReconcilerEvent::SelectChannel(channel));
            let _ = self.execute(actions).await?;
        }
        self.driver.render(&self.reconciler.snapshot())?;

        loop {
            let Some(event) = self.driver.poll_event().await? else {
                continue;
            };
            let actions = self.reconciler.handle(event);
            if self.execute(actions).await? {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Execute reconciler actions. Returns `true` on quit.
    async fn execute(&mut self, actions: Vec<ReconcilerAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                ReconcilerAction::Render => {
                    self.driver.render(&self.reconciler.snapshot())?;
                },
                ReconcilerAction::Quit => return Ok(true),
                ReconcilerAction::Publish { channel, payload } => {
                    if let Err(error) = self.driver.publish(&channel, &payload).await {
                        tracing::warn!(%channel, %error, "publish failed");
                    }
                },
                ReconcilerAction::SendSignal { channel, payload } => {
                    if let Err(error) = self.driver.send_signal(&channel, &payload).await {
                        tracing::warn!(%channel, %error, "signal failed");
                    }
                },
                ReconcilerAction::FetchHistory { channel, limit } => {
                    if let Err(error) = self.driver.fetch_history(&channel, limit).await {
                        tracing::warn!(%channel, %error, "history fetch failed");
                    }
                },
            }
        }
        Ok(false)
    }

    /// The reconciler, for inspection.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
