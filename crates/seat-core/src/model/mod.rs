//! Tipos de dominio: identificadores, artifacts persistidos, secciones y
//! parámetros de generación.
pub mod assets;
pub mod generation;
pub mod ids;
pub mod sections;

pub use assets::{AssetSnapshot, InvariantViolation};
pub use generation::{AiModel, GenerationParams, SurfaceType};
pub use ids::{VenueId, WorkflowId};
pub use sections::{select_sections, SectionConfig, SectionMap};
