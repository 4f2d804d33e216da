//! Task de la sesión: comandos, completions remotas y ticker de polling.
//!
//! Invariantes:
//! - Como máximo una consulta de progreso en vuelo; un tick que la encuentra
//!   pendiente se saltea (`MissedTickBehavior::Skip` evita ráfagas).
//! - El ticker existe sólo mientras hay un handle consultable; se descarta en
//!   el mismo ciclo en que la sesión llega a un terminal.
//! - Los resultados de assets llevan una generación: sólo se aplica el del
//!   último fetch pedido.
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

use super::config::SessionConfig;
use super::handle::SessionHandle;
use crate::errors::PipelineError;
use crate::event::{EventLog, InMemoryEventLog};
use crate::model::{AssetSnapshot, VenueId, WorkflowId};
use crate::ports::{AssetSource, CancelAck, WorkflowClient};
use crate::progress::ProgressSnapshot;
use crate::request::LaunchParams;
use crate::session::{PipelineSession, SessionView};
use crate::stage::Stage;

#[derive(Debug)]
pub(crate) enum Command {
    RequestStage { stage: Stage, params: Box<LaunchParams> },
    RequestCancel,
    RefreshAssets,
    Shutdown,
}

enum Completion {
    Assets { generation: u64, result: Result<AssetSnapshot, PipelineError> },
    Launched { stage: Stage, result: Result<WorkflowId, PipelineError> },
    Polled { workflow_id: WorkflowId, result: Result<ProgressSnapshot, PipelineError> },
    Cancelled { workflow_id: WorkflowId, result: Result<CancelAck, PipelineError> },
}

pub struct SessionDriver<E: EventLog> {
    session: PipelineSession<E>,
    workflows: Arc<dyn WorkflowClient>,
    assets: Arc<dyn AssetSource>,
    config: SessionConfig,
    commands: mpsc::Receiver<Command>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
    views: watch::Sender<SessionView>,
    ticker: Option<Interval>,
    poll_in_flight: bool,
    asset_generation: u64,
}

/// Lanza una sesión con un `InMemoryEventLog` propio.
pub fn spawn_session(
    venue_id: VenueId,
    workflows: Arc<dyn WorkflowClient>,
    assets: Arc<dyn AssetSource>,
    config: SessionConfig,
) -> SessionHandle {
    spawn_session_with_log(venue_id, workflows, assets, config, InMemoryEventLog::default())
}

pub fn spawn_session_with_log<E>(
    venue_id: VenueId,
    workflows: Arc<dyn WorkflowClient>,
    assets: Arc<dyn AssetSource>,
    config: SessionConfig,
    log: E,
) -> SessionHandle
where
    E: EventLog + Send + 'static,
{
    let session = PipelineSession::with_log(venue_id, log).with_max_poll_failures(config.max_consecutive_poll_failures);
    let (command_tx, commands) = mpsc::channel(config.command_buffer.max(1));
    let (views, view_rx) = watch::channel(session.view());
    let (done_tx, done_rx) = mpsc::unbounded_channel();
    let driver = SessionDriver {
        session,
        workflows,
        assets,
        config,
        commands,
        done_tx,
        done_rx,
        views,
        ticker: None,
        poll_in_flight: false,
        asset_generation: 0,
    };
    tokio::spawn(driver.run());
    SessionHandle::new(command_tx, view_rx)
}

async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

impl<E: EventLog> SessionDriver<E> {
    /// Corre hasta `Shutdown` o hasta que se suelten todos los handles.
    pub async fn run(mut self) {
        info!("session:start venue={} id={}", self.session.venue_id(), self.session.id());
        self.refresh_assets();
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(done) = self.done_rx.recv() => self.handle_completion(done),
                _ = next_tick(&mut self.ticker) => self.tick(),
            }
            self.sync_ticker();
            self.publish();
        }
        info!("session:stopped venue={} id={}", self.session.venue_id(), self.session.id());
    }

    fn publish(&self) {
        let view = self.session.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }

    fn sync_ticker(&mut self) {
        match (self.session.poll_target(), self.ticker.is_some()) {
            (Some(workflow_id), false) => {
                let period = self.config.poll_interval.max(Duration::from_millis(1));
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(interval);
                debug!("poller:start workflow={} period_ms={}", workflow_id, period.as_millis());
            }
            (None, true) => {
                self.ticker = None;
                debug!("poller:stop venue={}", self.session.venue_id());
            }
            _ => {}
        }
    }

    fn refresh_assets(&mut self) {
        self.asset_generation += 1;
        let generation = self.asset_generation;
        let source = Arc::clone(&self.assets);
        let venue_id = self.session.venue_id().clone();
        let tx = self.done_tx.clone();
        debug!("assets:fetch venue={} generation={}", venue_id, generation);
        tokio::spawn(async move {
            let result = source.get_asset_snapshot(&venue_id).await;
            let _ = tx.send(Completion::Assets { generation, result });
        });
    }

    fn tick(&mut self) {
        let Some(workflow_id) = self.session.poll_target().cloned() else { return };
        if self.poll_in_flight {
            debug!("poller:skip workflow={} (previous query still in flight)", workflow_id);
            return;
        }
        self.poll_in_flight = true;
        let client = Arc::clone(&self.workflows);
        let tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = client.get_progress(&workflow_id).await;
            let _ = tx.send(Completion::Polled { workflow_id, result });
        });
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::RequestStage { stage, params } => match self.session.begin_launch(stage, &params) {
                Ok(request) => {
                    let client = Arc::clone(&self.workflows);
                    let tx = self.done_tx.clone();
                    tokio::spawn(async move {
                        let result = client.start_pipeline(&request).await;
                        let _ = tx.send(Completion::Launched { stage, result });
                    });
                }
                Err(err) => debug!("launch:not_submitted stage={} err={}", stage, err),
            },
            Command::RequestCancel => {
                if let Some(workflow_id) = self.session.begin_cancel() {
                    let client = Arc::clone(&self.workflows);
                    let tx = self.done_tx.clone();
                    tokio::spawn(async move {
                        let result = client.cancel(&workflow_id).await;
                        let _ = tx.send(Completion::Cancelled { workflow_id, result });
                    });
                }
            }
            Command::RefreshAssets => self.refresh_assets(),
            Command::Shutdown => {}
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Assets { generation, result } => {
                if generation != self.asset_generation {
                    debug!("assets:stale generation={} current={}", generation, self.asset_generation);
                    return;
                }
                match result {
                    Ok(snapshot) => self.session.apply_assets(snapshot),
                    Err(err) => self.session.assets_unavailable(&err),
                }
            }
            Completion::Launched { stage, result } => match result {
                Ok(workflow_id) => {
                    self.session.launch_accepted(stage, workflow_id);
                }
                Err(err) => self.session.launch_failed(stage, &err),
            },
            Completion::Polled { workflow_id, result } => {
                self.poll_in_flight = false;
                match result {
                    Ok(snapshot) => {
                        if self.session.observe_progress(snapshot).needs_asset_refresh() {
                            self.refresh_assets();
                        }
                    }
                    Err(err) => {
                        self.session.observe_poll_failure(&workflow_id, &err);
                    }
                }
            }
            Completion::Cancelled { workflow_id, result } => match result {
                Ok(ack) => self.session.cancel_acknowledged(&ack.workflow_id, &ack.status),
                Err(err) => self.session.cancel_rejected(&workflow_id, &err),
            },
        }
    }
}
