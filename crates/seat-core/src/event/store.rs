use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use super::{SessionEvent, SessionEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventLog {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, session_id: Uuid, kind: SessionEventKind) -> SessionEvent;
    /// Lista eventos de una sesión (orden ascendente por seq).
    fn list(&self, session_id: Uuid) -> Vec<SessionEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    inner: HashMap<Uuid, Vec<SessionEvent>>,
}

impl EventLog for InMemoryEventLog {
    fn append_kind(&mut self, session_id: Uuid, kind: SessionEventKind) -> SessionEvent {
        let events = self.inner.entry(session_id).or_default();
        let ev = SessionEvent { seq: events.len() as u64, session_id, kind, ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, session_id: Uuid) -> Vec<SessionEvent> { self.inner.get(&session_id).cloned().unwrap_or_default() }
}

/// `InMemoryEventLog` compartible entre el task de la sesión y quien lo
/// inspecciona (tests, demo).
#[derive(Debug, Clone, Default)]
pub struct SharedEventLog {
    inner: Arc<Mutex<InMemoryEventLog>>,
}

impl EventLog for SharedEventLog {
    fn append_kind(&mut self, session_id: Uuid, kind: SessionEventKind) -> SessionEvent {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).append_kind(session_id, kind)
    }

    fn list(&self, session_id: Uuid) -> Vec<SessionEvent> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).list(session_id)
    }
}
