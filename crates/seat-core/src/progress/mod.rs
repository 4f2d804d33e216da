//! Progreso remoto: vocabulario del motor, snapshots observados y proyección
//! a un porcentaje global.
pub mod projector;
pub mod remote;
pub mod snapshot;

pub use projector::{project, Projection};
pub use remote::RemoteStage;
pub use snapshot::ProgressSnapshot;
