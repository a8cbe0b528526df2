use bleachdle_types::{CharacterSummary, CompareOutcome, CompareResponse};
use indexmap::IndexSet;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Clock, Countdown, CountdownTick, DEFAULT_ASSET_HOST, DEFAULT_REVEAL_STAGGER, GameVariant,
    RevealSchedule, RevealScheduler, RevealTarget, RowId, RowView, SessionError, SessionEvent,
    SessionEventBus, SessionEventHandler, SuggestionItem, render_row, render_suggestions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to do with a response whose request is no longer the newest one of
/// its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Apply every response whenever it arrives
    ApplyAll,
    /// Only the most recently issued request may update the page
    LatestOnly,
}

impl FromStr for StalePolicy {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "apply_all" => Ok(StalePolicy::ApplyAll),
            "latest" | "latest_only" => Ok(StalePolicy::LatestOnly),
            _ => Err(SessionError::UnknownPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub asset_host: String,
    pub reveal_stagger: Duration,
    pub search_policy: StalePolicy,
    pub guess_policy: StalePolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            reveal_stagger: DEFAULT_REVEAL_STAGGER,
            search_policy: StalePolicy::LatestOnly,
            guess_policy: StalePolicy::ApplyAll,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Active,
    Won, // terminal
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessTicket {
    pub seq: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Issue a lookup for this query
    Lookup(SearchTicket),
    /// Empty query: list hidden, nothing to fetch
    Hide,
    /// Puzzle already solved
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Rendered { row: RowId, won: bool },
    /// Backend or transport error to show to the player; no row was added
    Rejected(String),
    /// Dropped by the stale response policy
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBox {
    pub value: String,
    pub enabled: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionList {
    pub items: Vec<SuggestionItem>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub id: RowId,
    pub view: RowView,
}

/// Everything a host needs to draw one game page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub search_box: SearchBox,
    pub suggestions: SuggestionList,
    pub attribute_titles_visible: bool,
    /// Newest guess first
    pub rows: Vec<RenderedRow>,
    pub congratulations_visible: bool,
    pub overlay_visible: bool,
    pub countdown_text: Option<String>,
}

impl PageView {
    fn new() -> Self {
        Self {
            search_box: SearchBox {
                value: String::new(),
                enabled: true,
                visible: true,
            },
            suggestions: SuggestionList::default(),
            attribute_titles_visible: false,
            rows: Vec::new(),
            congratulations_visible: false,
            overlay_visible: false,
            countdown_text: None,
        }
    }

    pub fn row(&self, id: RowId) -> Option<&RowView> {
        self.rows.iter().find(|r| r.id == id).map(|r| &r.view)
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.view.name.as_str()).collect()
    }
}

/// One page view of one game variant.
///
/// The session never performs I/O itself: it hands out tickets for the
/// requests to make and is fed their responses.
pub struct GameSession {
    id: SessionId,
    variant: GameVariant,
    options: SessionOptions,
    clock: Arc<dyn Clock>,
    state: SessionState,
    selected: IndexSet<String>,
    view: PageView,
    search_seq: u64,
    guess_seq: u64,
    next_row: u64,
    scheduler: RevealScheduler,
    countdown: Option<Countdown>,
    event_bus: SessionEventBus,
}

impl GameSession {
    pub fn new(variant: GameVariant, options: SessionOptions, clock: Arc<dyn Clock>) -> Self {
        let id = SessionId::new();
        debug!("Opening {} session {}", variant.kind.as_str(), id);
        Self {
            id,
            variant,
            options,
            clock,
            state: SessionState::Active,
            selected: IndexSet::new(),
            view: PageView::new(),
            search_seq: 0,
            guess_seq: 0,
            next_row: 0,
            scheduler: RevealScheduler::new(),
            countdown: None,
            event_bus: SessionEventBus::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> &GameVariant {
        &self.variant
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_won(&self) -> bool {
        self.state == SessionState::Won
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    /// Guessed names in guess order
    pub fn selected_characters(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn has_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.event_bus.add_handler(handler);
    }

    /// Text input changed.
    pub fn input_query(&mut self, raw: &str) -> SearchAction {
        if self.is_won() {
            return SearchAction::Ignored;
        }

        self.view.search_box.value = raw.to_string();
        let query = raw.trim();
        if query.is_empty() {
            self.view.suggestions.visible = false;
            return SearchAction::Hide;
        }

        self.search_seq += 1;
        SearchAction::Lookup(SearchTicket {
            seq: self.search_seq,
            query: query.to_string(),
        })
    }

    /// Show the lookup results minus everything already guessed. Returns
    /// whether the list was updated.
    pub fn apply_search_results(
        &mut self,
        ticket: &SearchTicket,
        results: Vec<CharacterSummary>,
    ) -> bool {
        if self.is_won() {
            debug!("Session {} ignoring search results after win", self.id);
            return false;
        }
        if self.options.search_policy == StalePolicy::LatestOnly && ticket.seq != self.search_seq {
            debug!(
                "Session {} dropping stale search #{} ({:?}), latest is #{}",
                self.id, ticket.seq, ticket.query, self.search_seq
            );
            return false;
        }

        let remaining: Vec<CharacterSummary> = results
            .into_iter()
            .filter(|summary| !self.selected.contains(&summary.name))
            .collect();

        self.view.suggestions = SuggestionList {
            items: render_suggestions(&remaining, &self.options.asset_host),
            visible: true,
        };

        self.event_bus.publish(SessionEvent::SuggestionsShown {
            session_id: self.id,
            query: ticket.query.clone(),
            count: remaining.len(),
        });
        true
    }

    /// A suggestion was clicked. The name is recorded before the comparison
    /// is known, so it stays filtered even if the guess fails. A name that
    /// was already guessed gets no ticket.
    pub fn select(&mut self, name: &str) -> Option<GuessTicket> {
        if self.is_won() {
            return None;
        }
        if !self.selected.insert(name.to_string()) {
            debug!("Session {} ignoring repeated guess {:?}", self.id, name);
            return None;
        }
        if self.selected.len() == 1 && self.variant.has_attribute_titles() {
            self.view.attribute_titles_visible = true;
        }

        self.view.search_box.value.clear();
        self.view.suggestions.visible = false;

        self.guess_seq += 1;
        self.event_bus.publish(SessionEvent::GuessRecorded {
            session_id: self.id,
            name: name.to_string(),
        });

        Some(GuessTicket {
            seq: self.guess_seq,
            name: name.to_string(),
        })
    }

    /// Feed the comparison reply for a guess.
    pub fn apply_guess_response(
        &mut self,
        ticket: &GuessTicket,
        response: CompareResponse,
    ) -> GuessOutcome {
        if self.options.guess_policy == StalePolicy::LatestOnly && ticket.seq != self.guess_seq {
            debug!(
                "Session {} dropping stale guess #{} ({}), latest is #{}",
                self.id, ticket.seq, ticket.name, self.guess_seq
            );
            return GuessOutcome::Stale;
        }

        let result = match response.into_outcome() {
            CompareOutcome::Rejected(message) => return self.reject(ticket, message),
            CompareOutcome::Accepted(result) => result,
        };

        let view = render_row(&self.variant, &result, &self.options.asset_host);
        let row = RowId(self.next_row);
        self.next_row += 1;

        let schedule = RevealSchedule::staggered(view.cells.len(), self.options.reveal_stagger);
        self.scheduler.schedule(row, self.clock.elapsed(), &schedule);

        let name = view.name.clone();
        self.view.rows.insert(0, RenderedRow { id: row, view });
        self.event_bus.publish(SessionEvent::RowRendered {
            session_id: self.id,
            row,
            name: name.clone(),
            is_correct: result.is_correct,
        });

        let won = result.is_correct && self.win(&name);

        GuessOutcome::Rendered { row, won }
    }

    /// The comparison request itself failed.
    pub fn fail_guess(&mut self, ticket: &GuessTicket, message: impl Into<String>) -> GuessOutcome {
        self.reject(ticket, message.into())
    }

    fn reject(&mut self, ticket: &GuessTicket, message: String) -> GuessOutcome {
        info!("Session {} guess {:?} rejected: {}", self.id, ticket.name, message);
        self.event_bus.publish(SessionEvent::GuessRejected {
            session_id: self.id,
            name: ticket.name.clone(),
            message: message.clone(),
        });
        GuessOutcome::Rejected(message)
    }

    /// ACTIVE to WON. Returns false when the puzzle was already solved.
    fn win(&mut self, name: &str) -> bool {
        if self.is_won() {
            return false;
        }
        self.state = SessionState::Won;

        self.view.search_box = SearchBox {
            value: String::new(),
            enabled: false,
            visible: false,
        };
        self.view.suggestions.visible = false;
        self.view.congratulations_visible = true;
        self.view.overlay_visible = true;

        let countdown = Countdown::until_next_midnight(self.clock.local_now());
        info!(
            "Session {} solved with {:?} after {} guesses, next puzzle at {}",
            self.id,
            name,
            self.selected.len(),
            countdown.target()
        );
        self.countdown = Some(countdown);

        self.event_bus.publish(SessionEvent::PuzzleSolved {
            session_id: self.id,
            name: name.to_string(),
            guesses: self.selected.len(),
        });
        true
    }

    /// Click outside the search box and list.
    pub fn dismiss_search(&mut self) {
        self.view.suggestions.visible = false;
        self.view.search_box.value.clear();
    }

    /// Close control of the congratulations panel. The game stays won.
    pub fn close_congratulations(&mut self) {
        self.view.congratulations_visible = false;
        self.view.overlay_visible = false;
    }

    /// Reveal every cell whose delay has elapsed.
    pub fn advance_reveals(&mut self) -> Vec<RevealTarget> {
        let due = self.scheduler.drain_due(self.clock.elapsed());
        for target in &due {
            if let Some(row) = self.view.rows.iter_mut().find(|r| r.id == target.row) {
                row.view.reveal(target.cell);
            }
        }
        due
    }

    /// Elapsed time at which the next reveal is due
    pub fn next_reveal_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Time left until the next reveal, zero if one is already overdue
    pub fn until_next_reveal(&self) -> Option<Duration> {
        self.scheduler
            .next_due()
            .map(|due| due.saturating_sub(self.clock.elapsed()))
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| !c.is_finished())
    }

    /// One firing of the one-second countdown timer.
    pub fn tick_countdown(&mut self) -> Option<CountdownTick> {
        let countdown = self.countdown.as_mut()?;
        let tick = countdown.tick(self.clock.local_now())?;

        self.view.countdown_text = Some(tick.display.clone());
        if tick.finished {
            self.event_bus.publish(SessionEvent::CountdownFinished {
                session_id: self.id,
            });
        }
        Some(tick)
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("variant", &self.variant.kind)
            .field("state", &self.state)
            .field("selected", &self.selected)
            .finish()
    }
}
