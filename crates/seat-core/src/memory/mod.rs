//! Colaboradores en memoria: motor de workflows simulado y fuente de assets.
//!
//! Útiles para tests de escenarios y para la demo sin backend. El motor
//! avanza un paso por cada consulta de progreso y, al completar, escribe los
//! artifacts en la `InMemoryAssetSource` enlazada.
pub mod assets;
pub mod engine;

pub use assets::InMemoryAssetSource;
pub use engine::{EngineScript, InMemoryWorkflowEngine};
