//! Narrative event generation and the bounded event log.
//!
//! An event picks a category uniformly, a nation uniformly, and one of three
//! headline templates for that category. The log keeps the most recent
//! events first and silently drops the oldest once it is full.

use std::collections::VecDeque;

use geopolitics_types::{EventCategory, GameEvent, Nation};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Placeholder replaced by the nation's name in every template.
const NATION_PLACEHOLDER: &str = "{nation}";

const POLITICAL: [&str; 3] = [
    "{nation} announces snap elections amid coalition turmoil",
    "{nation} expels diplomats after espionage allegations",
    "Mass protests erupt in the capital of {nation}",
];

const ECONOMIC: [&str; 3] = [
    "{nation} central bank raises interest rates unexpectedly",
    "{nation} signs major infrastructure investment deal",
    "Stock market in {nation} plunges on trade fears",
];

const MILITARY: [&str; 3] = [
    "{nation} conducts large-scale military exercises",
    "{nation} unveils new hypersonic missile program",
    "{nation} increases defense budget by 10%",
];

const DISASTER: [&str; 3] = [
    "Earthquake strikes {nation}, causing widespread damage",
    "Severe flooding displaces thousands in {nation}",
    "Wildfires rage across {nation}",
];

/// Headline templates for a category.
pub const fn templates(category: EventCategory) -> &'static [&'static str; 3] {
    match category {
        EventCategory::Political => &POLITICAL,
        EventCategory::Economic => &ECONOMIC,
        EventCategory::Military => &MILITARY,
        EventCategory::Disaster => &DISASTER,
    }
}

/// Stateless narrative event generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventGenerator;

impl EventGenerator {
    /// Create a generator.
    pub const fn new() -> Self {
        Self
    }

    /// Produce one event dated `date` about a random nation.
    ///
    /// Returns `None` only when `nations` is empty.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        date: &str,
        nations: &[Nation],
        rng: &mut R,
    ) -> Option<GameEvent> {
        let category = *EventCategory::ALL.choose(rng)?;
        let nation = nations.choose(rng)?;
        let template = templates(category).choose(rng)?;

        Some(GameEvent {
            date: date.to_owned(),
            category,
            text: template.replace(NATION_PLACEHOLDER, &nation.name),
        })
    }
}

/// Most-recent-first event log holding at most `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<GameEvent>,
    capacity: usize,
}

impl EventLog {
    /// Create an empty log. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a log from events already ordered most recent first,
    /// keeping only the newest `capacity`.
    pub fn from_recent(events: Vec<GameEvent>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.entries.extend(events.into_iter().take(log.capacity));
        log
    }

    /// Insert at the head, dropping the oldest entry on overflow.
    pub fn push(&mut self, event: GameEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.capacity);
    }

    /// The most recent event.
    pub fn latest(&self) -> Option<&GameEvent> {
        self.entries.front()
    }

    /// Number of events held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of events held.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.entries.iter()
    }

    /// Owned copy of the events, most recent first.
    pub fn to_vec(&self) -> Vec<GameEvent> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geopolitics_types::NationId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn nation(id: u32, name: &str) -> Nation {
        Nation {
            id: NationId(id),
            name: name.to_owned(),
            gdp: 100.0,
            military_power: 50.0,
            population: 1.0,
            has_nuclear_weapons: false,
            ground_forces: 0.0,
            air_forces: 0.0,
            naval_forces: 0.0,
            nuclear_arsenal: 0,
            tax_rate: 0.25,
            research_spending: 0.05,
            military_spending: 0.10,
            global_reputation: 50.0,
            gdp_growth_rate: 0.0,
        }
    }

    fn event(text: &str) -> GameEvent {
        GameEvent {
            date: "January 1, 2025".to_owned(),
            category: EventCategory::Political,
            text: text.to_owned(),
        }
    }

    #[test]
    fn every_template_names_the_nation() {
        for category in EventCategory::ALL {
            for template in templates(category) {
                assert!(template.contains(NATION_PLACEHOLDER), "{template}");
            }
        }
    }

    #[test]
    fn generated_event_mentions_a_listed_nation() {
        let nations = vec![nation(1, "Atlantis"), nation(2, "Lemuria")];
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let generated = EventGenerator::new()
                .generate("March 1, 2025", &nations, &mut rng)
                .unwrap();
            assert_eq!(generated.date, "March 1, 2025");
            assert!(generated.text.contains("Atlantis") || generated.text.contains("Lemuria"));
            assert!(templates(generated.category).iter().any(|t| {
                let name = if generated.text.contains("Atlantis") { "Atlantis" } else { "Lemuria" };
                t.replace(NATION_PLACEHOLDER, name) == generated.text
            }));
        }
    }

    #[test]
    fn no_nations_means_no_event() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(EventGenerator::new().generate("x", &[], &mut rng).is_none());
    }

    #[test]
    fn log_keeps_most_recent_first() {
        let mut log = EventLog::new(20);
        log.push(event("first"));
        log.push(event("second"));
        assert_eq!(log.latest().unwrap().text, "second");
        assert_eq!(log.to_vec().last().unwrap().text, "first");
    }

    #[test]
    fn log_never_exceeds_capacity() {
        let mut log = EventLog::new(20);
        for i in 0..45 {
            log.push(event(&format!("event {i}")));
            assert!(log.len() <= 20);
            assert_eq!(log.latest().unwrap().text, format!("event {i}"));
        }
        assert_eq!(log.len(), 20);
        // Oldest surviving entry is the 20th most recent.
        assert_eq!(log.iter().last().unwrap().text, "event 25");
    }

    #[test]
    fn from_recent_truncates_the_tail() {
        let events: Vec<GameEvent> = (0..5).map(|i| event(&format!("e{i}"))).collect();
        let log = EventLog::from_recent(events, 3);
        let texts: Vec<String> = log.iter().map(|e| e.text.clone()).collect();
        assert_eq!(texts, vec!["e0", "e1", "e2"]);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest() {
        let mut log = EventLog::new(0);
        log.push(event("only"));
        log.push(event("newer"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.capacity(), 1);
    }
}
