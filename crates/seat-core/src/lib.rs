//! seat-core: orquestación del pipeline de vistas por asiento (modelo 3D →
//! depth maps → imágenes IA).
//!
//! El crate no ejecuta ningún stage: decide cuál puede correr, lo lanza contra
//! el motor remoto, observa su progreso por polling y reconcilia el estado con
//! los artifacts persistidos.
//!
//! Capas:
//! - `stage`, `model`, `progress`, `request`: tipos y funciones puras (gate,
//!   derivación del watermark, proyección de progreso, armado del payload).
//! - `session`: máquina de estados sin IO, dueña única del estado de una
//!   sesión de venue.
//! - `event`: bitácora append-only de transiciones de la sesión.
//! - `ports`: contratos async de los colaboradores remotos.
//! - `engine`: driver tokio (poller, launcher, cancelación) sobre `session`.
//! - `memory`: colaboradores en memoria para tests y demos.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod memory;
pub mod model;
pub mod ports;
pub mod progress;
pub mod request;
pub mod session;
pub mod stage;

pub use engine::{spawn_session, spawn_session_with_log, SessionConfig, SessionHandle};
pub use errors::{ErrorKind, PipelineError, SessionError};
pub use event::{event_codes, EventLog, InMemoryEventLog, SessionEvent, SessionEventKind, SharedEventLog};
pub use memory::{EngineScript, InMemoryAssetSource, InMemoryWorkflowEngine};
pub use model::{AiModel, AssetSnapshot, GenerationParams, InvariantViolation, SectionConfig, SectionMap, SurfaceType, VenueId, WorkflowId};
pub use ports::{AssetSource, CancelAck, WorkflowClient};
pub use progress::{project, ProgressSnapshot, Projection, RemoteStage};
pub use request::{LaunchParams, PipelineRequest, StageRequest};
pub use session::{PipelineSession, SessionView, TickOutcome};
pub use stage::{evaluate, CompletedStage, GateInput, GateResult, Stage};
