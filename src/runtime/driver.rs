use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::api::{
    ControllerPhase, FetchRequest, IntervalStep, TimeWindowController, TimelineRequest,
    TimelineSnapshot,
};
use crate::core::{AvailabilityVector, TimeRange};
use crate::error::{ServiceError, TimelineError, TimelineResult};
use crate::interaction::{GestureOutcome, PointerEvent};

use super::{ArchiveAvailabilityClient, ServerClock};

const COMMAND_CAPACITY: usize = 64;

/// UI operations forwarded to the driver loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverCommand {
    SetVisibility(bool),
    SetVisible(TimeRange),
    SetZoom(usize),
    ZoomIn,
    ZoomOut,
    SelectTime(DateTime<Utc>),
    GoLive,
    Gesture(PointerEvent),
    StepInterval(IntervalStep),
    CenterOnReference,
    Retry,
    SetAxisLength(f64),
}

enum Envelope {
    Command(DriverCommand),
    Shutdown,
}

enum Completion {
    ServerTime(Result<DateTime<Utc>, ServiceError>),
    Availability(FetchRequest, Result<AvailabilityVector, ServiceError>),
}

/// Request behind a spawned collaborator task.
#[derive(Debug, Clone, Copy)]
enum Pending {
    ServerTime,
    Availability(FetchRequest),
}

/// Runs a [`TimeWindowController`] on a tokio task.
///
/// Every controller call happens on the driver task, so collaborator
/// results are applied strictly after any command received before them.
pub struct TimelineDriver {
    controller: TimeWindowController,
    clock: Arc<dyn ServerClock>,
    archive: Arc<dyn ArchiveAvailabilityClient>,
    commands: mpsc::Receiver<Envelope>,
    snapshots: watch::Sender<TimelineSnapshot>,
    tasks: JoinSet<Completion>,
    pending: HashMap<Id, Pending>,
    ticker: Option<Interval>,
}

impl TimelineDriver {
    /// Spawns the driver on the current tokio runtime.
    pub fn spawn(
        controller: TimeWindowController,
        clock: Arc<dyn ServerClock>,
        archive: Arc<dyn ArchiveAvailabilityClient>,
    ) -> TimelineHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let driver = Self {
            controller,
            clock,
            archive,
            commands: command_rx,
            snapshots: snapshot_tx,
            tasks: JoinSet::new(),
            pending: HashMap::new(),
            ticker: None,
        };
        let task = tokio::spawn(driver.run());
        TimelineHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        debug!("timeline driver started");
        loop {
            self.sync_ticker();
            self.dispatch_requests();
            self.publish();

            tokio::select! {
                envelope = self.commands.recv() => match envelope {
                    Some(Envelope::Command(command)) => self.apply(command),
                    Some(Envelope::Shutdown) | None => break,
                },
                () = next_tick(&mut self.ticker) => {
                    self.controller.poll_clock();
                }
                Some(joined) = self.tasks.join_next_with_id(), if !self.tasks.is_empty() => match joined {
                    Ok((id, completion)) => {
                        self.pending.remove(&id);
                        self.complete(completion);
                    }
                    Err(err) => self.fail(err),
                },
            }
        }

        self.tasks.abort_all();
        self.pending.clear();
        self.ticker = None;
        debug!("timeline driver stopped");
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::ServerTime(result) => self.controller.on_tick(result),
            Completion::Availability(request, result) => {
                let applied = self.controller.on_fetch_complete(request, result);
                trace!(sequence = request.ticket.sequence, ?applied, "fetch completed");
            }
        }
    }

    /// Reports a panicked task to the controller as a connection failure so
    /// the clock and fetch paths re-arm.
    fn fail(&mut self, err: JoinError) {
        let pending = self.pending.remove(&err.id());
        if err.is_cancelled() {
            return;
        }
        warn!(error = %err, ?pending, "collaborator task panicked");
        let failure = ServiceError::Connection(format!("collaborator task failed: {err}"));
        match pending {
            Some(Pending::ServerTime) => self.controller.on_tick(Err(failure)),
            Some(Pending::Availability(request)) => {
                self.controller.on_fetch_complete(request, Err(failure));
            }
            None => {}
        }
    }

    fn apply(&mut self, command: DriverCommand) {
        let controller = &mut self.controller;
        match command {
            DriverCommand::SetVisibility(visible) => controller.set_visibility(visible),
            DriverCommand::SetVisible(range) => controller.set_visible(range),
            DriverCommand::SetZoom(index) => controller.set_zoom(index),
            DriverCommand::ZoomIn => controller.zoom_in(),
            DriverCommand::ZoomOut => controller.zoom_out(),
            DriverCommand::SelectTime(at) => controller.select_time(at),
            DriverCommand::GoLive => controller.go_live(),
            DriverCommand::Gesture(event) => {
                let outcome = controller.on_gesture(event);
                if outcome != GestureOutcome::None {
                    trace!(?outcome, "gesture applied");
                }
            }
            DriverCommand::StepInterval(step) => controller.step_interval(step),
            DriverCommand::CenterOnReference => controller.center_on_reference(),
            DriverCommand::Retry => controller.retry(),
            DriverCommand::SetAxisLength(length_px) => {
                if let Err(err) = controller.set_axis_length(length_px) {
                    warn!(error = %err, "rejected axis length");
                }
            }
        }

        if !self.controller.is_visible() && !self.tasks.is_empty() {
            debug!(tasks = self.tasks.len(), "aborting collaborator calls for hidden timeline");
            self.tasks.abort_all();
        }
    }

    /// Arms the tick interval only while the clock is needed.
    fn sync_ticker(&mut self) {
        let wanted = self.controller.is_visible()
            && match self.controller.phase() {
                ControllerPhase::Uninitialized => false,
                ControllerPhase::Initializing => true,
                ControllerPhase::Ready => self.controller.mode().is_live(),
            };
        match (wanted, self.ticker.is_some()) {
            (true, false) => {
                let period =
                    Duration::from_millis(self.controller.config().live_sync.tick_interval_ms);
                let start = tokio::time::Instant::now() + period;
                let mut interval = tokio::time::interval_at(start, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ticker = Some(interval);
                trace!(period_ms = period.as_millis() as u64, "clock ticker armed");
            }
            (false, true) => {
                self.ticker = None;
                trace!("clock ticker disarmed");
            }
            _ => {}
        }
    }

    fn dispatch_requests(&mut self) {
        for request in self.controller.drain_requests() {
            match request {
                TimelineRequest::ServerTime => {
                    let clock = Arc::clone(&self.clock);
                    let handle = self
                        .tasks
                        .spawn(async move { Completion::ServerTime(clock.server_time().await) });
                    self.pending.insert(handle.id(), Pending::ServerTime);
                }
                TimelineRequest::Availability(fetch) => {
                    let archive = Arc::clone(&self.archive);
                    let handle = self.tasks.spawn(async move {
                        let result = archive
                            .fetch_availability(fetch.range, fetch.unit_length_secs, fetch.stream)
                            .await;
                        Completion::Availability(fetch, result)
                    });
                    self.pending.insert(handle.id(), Pending::Availability(fetch));
                }
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Host-side handle to a running [`TimelineDriver`].
///
/// Dropping the handle aborts the driver together with its timers and
/// in-flight collaborator calls.
pub struct TimelineHandle {
    commands: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<TimelineSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl TimelineHandle {
    pub async fn send(&self, command: DriverCommand) -> TimelineResult<()> {
        self.commands
            .send(Envelope::Command(command))
            .await
            .map_err(|_| TimelineError::DriverStopped)
    }

    pub async fn set_visibility(&self, visible: bool) -> TimelineResult<()> {
        self.send(DriverCommand::SetVisibility(visible)).await
    }

    pub async fn gesture(&self, event: PointerEvent) -> TimelineResult<()> {
        self.send(DriverCommand::Gesture(event)).await
    }

    pub async fn select_time(&self, at: DateTime<Utc>) -> TimelineResult<()> {
        self.send(DriverCommand::SelectTime(at)).await
    }

    pub async fn go_live(&self) -> TimelineResult<()> {
        self.send(DriverCommand::GoLive).await
    }

    pub async fn set_zoom(&self, index: usize) -> TimelineResult<()> {
        self.send(DriverCommand::SetZoom(index)).await
    }

    pub async fn retry(&self) -> TimelineResult<()> {
        self.send(DriverCommand::Retry).await
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TimelineSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimelineSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> TimelineResult<TimelineSnapshot>
    where
        F: FnMut(&TimelineSnapshot) -> bool,
    {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| TimelineError::DriverStopped)?;
        Ok(snapshot.clone())
    }

    /// Stops the driver and waits for it to release its resources.
    pub async fn shutdown(mut self) -> TimelineResult<()> {
        // A closed channel means the driver is already gone.
        let _ = self.commands.send(Envelope::Shutdown).await;
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| TimelineError::DriverStopped)?;
        }
        Ok(())
    }
}

impl Drop for TimelineHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
