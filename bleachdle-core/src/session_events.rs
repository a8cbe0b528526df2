use crate::{RowId, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SuggestionsShown {
        session_id: SessionId,
        query: String,
        count: usize,
    },
    GuessRecorded {
        session_id: SessionId,
        name: String,
    },
    RowRendered {
        session_id: SessionId,
        row: RowId,
        name: String,
        is_correct: bool,
    },
    GuessRejected {
        session_id: SessionId,
        name: String,
        message: String,
    },
    PuzzleSolved {
        session_id: SessionId,
        name: String,
        guesses: usize,
    },
    CountdownFinished {
        session_id: SessionId,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::SuggestionsShown { session_id, .. } => *session_id,
            SessionEvent::GuessRecorded { session_id, .. } => *session_id,
            SessionEvent::RowRendered { session_id, .. } => *session_id,
            SessionEvent::GuessRejected { session_id, .. } => *session_id,
            SessionEvent::PuzzleSolved { session_id, .. } => *session_id,
            SessionEvent::CountdownFinished { session_id } => *session_id,
        }
    }

    /// Text the player has to acknowledge, if any
    pub fn alert(&self) -> Option<&str> {
        match self {
            SessionEvent::GuessRejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Event handler trait for reacting to session changes
pub trait SessionEventHandler: Send {
    fn handle_event(&mut self, event: SessionEvent);
}

/// Simple event bus for distributing session events
pub struct SessionEventBus {
    handlers: Vec<Box<dyn SessionEventHandler>>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: SessionEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
