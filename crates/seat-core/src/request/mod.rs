//! Armado de la submission de un stage: unión etiquetada por stage y payload
//! de wire.
pub mod stage_request;
pub mod wire;

pub use stage_request::{LaunchParams, StageRequest};
pub use wire::PipelineRequest;
