#![allow(dead_code)]

use bleachdle_core::{
    GameSession, GameVariant, GuessTicket, SearchAction, SearchTicket, SessionEvent,
    SessionEventHandler, SessionOptions, VirtualClock,
};
use bleachdle_types::{AttributeSet, AttributeVerdict, CharacterSummary, CompareResponse};
use chrono::{DateTime, FixedOffset, TimeZone};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Wall time the virtual clock starts at: 2024-06-01 23:59:55 UTC+1
pub fn start_time() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 23, 59, 55)
        .unwrap()
}

pub fn create_clock() -> VirtualClock {
    VirtualClock::starting_at(start_time())
}

/// Creates a session driven by the given virtual clock
pub fn create_session(variant: GameVariant, clock: &VirtualClock) -> GameSession {
    create_session_with_options(variant, clock, SessionOptions::default())
}

pub fn create_session_with_options(
    variant: GameVariant,
    clock: &VirtualClock,
    options: SessionOptions,
) -> GameSession {
    GameSession::new(variant, options, Arc::new(clock.clone()))
}

pub fn summaries(names: &[&str]) -> Vec<CharacterSummary> {
    names.iter().map(|n| CharacterSummary::new(*n)).collect()
}

pub fn expect_lookup(session: &mut GameSession, query: &str) -> SearchTicket {
    match session.input_query(query) {
        SearchAction::Lookup(ticket) => ticket,
        other => panic!("Expected a lookup for {:?}, got {:?}", query, other),
    }
}

pub fn expect_guess(session: &mut GameSession, name: &str) -> GuessTicket {
    session
        .select(name)
        .unwrap_or_else(|| panic!("Expected a guess ticket for {:?}", name))
}

pub fn suggestion_names(session: &GameSession) -> Vec<String> {
    session
        .view()
        .suggestions
        .items
        .iter()
        .map(|i| i.name.clone())
        .collect()
}

pub fn character(name: &str, height: i64, power: i64) -> AttributeSet {
    AttributeSet::new()
        .with("chr_name", name)
        .with("chr_gender", "Male")
        .with("chr_race", "Shinigami")
        .with("chr_location", "Soul Society")
        .with("chr_affiliation", "Gotei 13")
        .with("chr_division", "6th")
        .with("chr_height", height)
        .with("chr_arc", "Soul Society")
        .with("chr_power", power)
}

/// Character-variant reply comparing `guess` against `target`
pub fn character_reply(guess: AttributeSet, target: AttributeSet) -> CompareResponse {
    let comparison_result = guess
        .keys()
        .filter(|key| key.as_str() != "chr_name")
        .map(|key| {
            let verdict = AttributeVerdict {
                is_correct: guess.get(key) == target.get(key),
                value: guess.get(key).cloned(),
            };
            (key.clone(), verdict)
        })
        .collect();

    CompareResponse {
        error: None,
        character_data: Some(guess),
        todays_character: Some(target),
        comparison_result,
        is_correct: None,
    }
}

/// Name-only variant reply
pub fn name_only_reply(name: &str, is_correct: bool) -> CompareResponse {
    serde_json::from_value(json!({
        "character_data": { "chr_name": name, "chr_id": 1 },
        "is_correct": is_correct,
    }))
    .unwrap()
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.alert().map(str::to_string))
            .collect()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&SessionEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl SessionEventHandler for EventCollector {
    fn handle_event(&mut self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }
}
