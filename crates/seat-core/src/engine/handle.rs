//! `SessionHandle`: fachada cloneable sobre el task de la sesión.
use tokio::sync::{mpsc, watch};

use super::driver::Command;
use crate::errors::PipelineError;
use crate::request::LaunchParams;
use crate::session::SessionView;
use crate::stage::Stage;

#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, views: watch::Receiver<SessionView>) -> Self { Self { commands, views } }

    async fn send(&self, command: Command) -> Result<(), PipelineError> {
        self.commands.send(command).await.map_err(|_| PipelineError::Internal("session task has stopped".to_string()))
    }

    /// Pide lanzar `stage`. El resultado (aceptado, rechazado) se observa en
    /// la vista.
    pub async fn request_stage(&self, stage: Stage, params: LaunchParams) -> Result<(), PipelineError> {
        self.send(Command::RequestStage { stage, params: Box::new(params) }).await
    }

    pub async fn request_cancel(&self) -> Result<(), PipelineError> { self.send(Command::RequestCancel).await }

    /// Relee los assets. Sin run activo re-deriva el watermark.
    pub async fn refresh_assets(&self) -> Result<(), PipelineError> { self.send(Command::RefreshAssets).await }

    /// Detiene el task. El handle remoto (si lo hay) no se cancela.
    pub async fn shutdown(&self) -> Result<(), PipelineError> { self.send(Command::Shutdown).await }

    /// Última vista publicada.
    pub fn view(&self) -> SessionView { self.views.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> { self.views.clone() }

    /// Espera la primera vista (incluida la actual) que cumpla `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> Result<SessionView, PipelineError>
    where
        F: FnMut(&SessionView) -> bool,
    {
        let mut rx = self.views.clone();
        let view = rx
            .wait_for(predicate)
            .await
            .map_err(|_| PipelineError::Internal("session task has stopped".to_string()))?;
        Ok(view.clone())
    }
}
