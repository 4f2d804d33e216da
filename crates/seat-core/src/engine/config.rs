use std::time::Duration;

use crate::constants::{DEFAULT_MAX_CONSECUTIVE_POLL_FAILURES, DEFAULT_POLL_INTERVAL};

/// Parámetros de una sesión.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub max_consecutive_poll_failures: u32,
    /// Capacidad del canal de comandos.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_poll_failures: DEFAULT_MAX_CONSECUTIVE_POLL_FAILURES,
            command_buffer: 16,
        }
    }
}
