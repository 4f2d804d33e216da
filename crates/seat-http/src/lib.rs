//! seat-http: colaboradores concretos sobre la API HTTP del venue.
//!
//! - `HttpPipelineApi` implementa `WorkflowClient` (rutas `/pipelines`) y
//!   `AssetSource` (`/images/{venue}/assets`).
//! - `dto` contiene los cuerpos de wire y su mapeo a tipos del core.
//! - `ApiConfig` se carga desde variables de entorno (`.env` opcional).
pub mod client;
pub mod config;
pub mod dto;
pub mod error;

pub use client::HttpPipelineApi;
pub use config::{init_dotenv, ApiConfig};
pub use error::HttpError;
