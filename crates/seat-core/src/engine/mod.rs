//! Driver async de una sesión.
//!
//! Un task por sesión es dueño del `PipelineSession`. Recibe comandos por un
//! canal mpsc, ejecuta las llamadas remotas en tasks auxiliares (cuyos
//! resultados vuelven etiquetados por handle), maneja el ticker de polling y
//! publica cada `SessionView` por un canal watch.
mod config;
mod driver;
mod handle;

pub use config::SessionConfig;
pub use driver::{spawn_session, spawn_session_with_log, SessionDriver};
pub use handle::SessionHandle;
