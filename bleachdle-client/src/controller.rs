use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, warn};

use bleachdle_core::{COUNTDOWN_INTERVAL, GameSession, GuessOutcome, PageView, SearchAction};
use bleachdle_types::GuessRequest;

use crate::backend::GameBackend;

const REVEAL_POLL: Duration = Duration::from_millis(10);

/// Drives one `GameSession` against a backend and runs its timers.
///
/// The session lock is never held across a network call, so a slow lookup
/// does not block guesses or reveals. Timer tasks live until they finish or
/// `shutdown` is called.
pub struct GameController<B> {
    session: Arc<Mutex<GameSession>>,
    backend: Arc<B>,
    tasks: Arc<std::sync::Mutex<Vec<AbortHandle>>>,
}

impl<B> Clone for GameController<B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            backend: self.backend.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<B: GameBackend + 'static> GameController<B> {
    pub fn new(session: GameSession, backend: Arc<B>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            backend,
            tasks: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn session(&self) -> Arc<Mutex<GameSession>> {
        self.session.clone()
    }

    pub async fn view(&self) -> PageView {
        self.session.lock().await.view().clone()
    }

    /// Search box input. Lookup failures keep the previous list.
    pub async fn type_query(&self, raw: &str) -> SearchAction {
        let action = self.session.lock().await.input_query(raw);

        if let SearchAction::Lookup(ticket) = &action {
            match self.backend.search_characters(&ticket.query).await {
                Ok(results) => {
                    self.session
                        .lock()
                        .await
                        .apply_search_results(ticket, results);
                }
                Err(e) => warn!("Search for {:?} failed: {}", ticket.query, e),
            }
        }

        action
    }

    /// Submit a guess. `None` when the session no longer accepts guesses or
    /// the name was already guessed.
    pub async fn pick(&self, name: &str) -> Option<GuessOutcome> {
        let (ticket, endpoint) = {
            let mut session = self.session.lock().await;
            let ticket = session.select(name)?;
            (ticket, session.variant().compare_endpoint.clone())
        };

        let request = GuessRequest::new(ticket.name.clone());
        let reply = self.backend.compare(&endpoint, &request).await;

        let outcome = {
            let mut session = self.session.lock().await;
            match reply {
                Ok(response) => session.apply_guess_response(&ticket, response),
                Err(e) => {
                    warn!("Guess {:?} could not be submitted: {}", ticket.name, e);
                    session.fail_guess(&ticket, format!("Unable to submit guess: {}", e))
                }
            }
        };

        if let GuessOutcome::Rendered { won, .. } = outcome {
            self.spawn_reveals();
            if won {
                self.spawn_countdown();
            }
        }

        Some(outcome)
    }

    /// Click on the n-th visible suggestion
    pub async fn pick_suggestion(&self, index: usize) -> Option<GuessOutcome> {
        let name = {
            let session = self.session.lock().await;
            let suggestions = &session.view().suggestions;
            if !suggestions.visible {
                return None;
            }
            suggestions.items.get(index)?.name.clone()
        };
        self.pick(&name).await
    }

    /// Work through the pending reveals, sleeping until each is due.
    pub fn spawn_reveals(&self) -> JoinHandle<()> {
        let session = self.session.clone();
        let handle = tokio::spawn(async move {
            loop {
                let wait = match session.lock().await.until_next_reveal() {
                    Some(wait) => wait,
                    None => break,
                };
                tokio::time::sleep(wait).await;
                session.lock().await.advance_reveals();
            }
        });
        self.track(&handle);
        handle
    }

    /// Resolves once every scheduled cell has been revealed
    pub async fn wait_for_reveals(&self) {
        loop {
            let wait = match self.session.lock().await.until_next_reveal() {
                Some(wait) => wait,
                None => return,
            };
            tokio::time::sleep(wait.max(REVEAL_POLL)).await;
        }
    }

    /// One-second countdown timer; stops itself at `00:00:00`.
    pub fn spawn_countdown(&self) -> JoinHandle<()> {
        let session = self.session.clone();
        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + COUNTDOWN_INTERVAL, COUNTDOWN_INTERVAL);
            loop {
                interval.tick().await;
                let tick = session.lock().await.tick_countdown();
                match tick {
                    Some(tick) if !tick.finished => continue,
                    _ => break,
                }
            }
            debug!("Countdown timer stopped");
        });
        self.track(&handle);
        handle
    }

    /// Timer tasks still running
    pub fn running_tasks(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Abort every timer task, e.g. when the page is swapped out.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        debug!("Aborting {} controller tasks", tasks.len());
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    fn track(&self, handle: &JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle.abort_handle());
    }
}
