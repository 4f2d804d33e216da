//! Contratos de los colaboradores remotos.
//!
//! `WorkflowClient` habla con el motor de workflows (lanzar, consultar,
//! cancelar); `AssetSource` lee lo persistido para un venue. El orquestador
//! sólo conoce estos traits: el cliente HTTP y los dobles en memoria los
//! implementan.
use async_trait::async_trait;

use crate::errors::PipelineError;
use crate::model::{AssetSnapshot, VenueId, WorkflowId};
use crate::progress::ProgressSnapshot;
use crate::request::PipelineRequest;

/// Respuesta del motor a una cancelación aceptada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAck {
    pub workflow_id: WorkflowId,
    pub status: String,
}

#[async_trait]
pub trait WorkflowClient: Send + Sync {
    /// Lanza una ejecución. Errores: `LaunchRejected`.
    async fn start_pipeline(&self, request: &PipelineRequest) -> Result<WorkflowId, PipelineError>;
    /// Consulta el progreso. Errores: `Poll`.
    async fn get_progress(&self, workflow_id: &WorkflowId) -> Result<ProgressSnapshot, PipelineError>;
    /// Pide cancelación. Errores: `CancelRejected`.
    async fn cancel(&self, workflow_id: &WorkflowId) -> Result<CancelAck, PipelineError>;
}

#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Errores: `Fetch`.
    async fn get_asset_snapshot(&self, venue_id: &VenueId) -> Result<AssetSnapshot, PipelineError>;
}
