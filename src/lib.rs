//! SeatFlow Rust Library
//!
//! Fachada del workspace:
//! - Reexporta `seat_core` (máquina de sesión, gates, progreso, puertos).
//! - Reexporta el adaptador HTTP de `seat_http`.
//! - Expone `config` y `errors` para los binarios.

pub mod config;
pub mod errors;

pub use config::AppConfig;
pub use errors::AppError;
pub use seat_core::*;
pub use seat_http::{ApiConfig, HttpError, HttpPipelineApi};
