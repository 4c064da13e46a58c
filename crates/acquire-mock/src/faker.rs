//! Seeded fake-value rules for common field kinds.
//!
//! All rules created from one [`Faker`] share its random source, so a seeded
//! faker yields the same values for the same generation order.

use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDate};
use fake::Fake;
use fake::faker::address::en::{CityName, Latitude, Longitude, StreetName, ZipCode};
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::internet::en::{DomainSuffix, SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::debug;

use crate::rule::FieldRule;

struct FakerState {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

/// Factory for fake-value rules backed by a shared, reseedable source.
#[derive(Clone)]
pub struct Faker {
    state: Arc<Mutex<FakerState>>,
}

impl Default for Faker {
    fn default() -> Self {
        Self::new()
    }
}

impl Faker {
    pub fn new() -> Self {
        Self::from_state(FakerState {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            seed: None,
        })
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_state(FakerState {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        })
    }

    fn from_state(state: FakerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn seed(&self, seed: u64) {
        debug!(seed, "faker reseeded");
        let mut state = self.lock();
        state.rng = ChaCha8Rng::seed_from_u64(seed);
        state.seed = Some(seed);
    }

    /// Restart from the last seed, or from fresh entropy if never seeded.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.rng = match state.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
    }

    /// Rule evaluating `generate` against the shared source.
    pub fn rule<F>(&self, generate: F) -> FieldRule
    where
        F: Fn(&mut ChaCha8Rng) -> Value + Send + Sync + 'static,
    {
        let state = Arc::clone(&self.state);
        FieldRule::sync(move |_| {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            generate(&mut state.rng)
        })
    }

    pub fn name(&self) -> FieldRule {
        self.text(|rng| Name().fake_with_rng(rng))
    }

    pub fn first_name(&self) -> FieldRule {
        self.text(|rng| FirstName().fake_with_rng(rng))
    }

    pub fn last_name(&self) -> FieldRule {
        self.text(|rng| LastName().fake_with_rng(rng))
    }

    pub fn username(&self) -> FieldRule {
        self.text(|rng| Username().fake_with_rng(rng))
    }

    pub fn email(&self) -> FieldRule {
        self.text(|rng| SafeEmail().fake_with_rng(rng))
    }

    pub fn phone(&self) -> FieldRule {
        self.text(|rng| PhoneNumber().fake_with_rng(rng))
    }

    pub fn url(&self) -> FieldRule {
        self.text(|rng| {
            let host: String = Word().fake_with_rng(rng);
            let suffix: String = DomainSuffix().fake_with_rng(rng);
            format!("https://{host}.{suffix}")
        })
    }

    pub fn street(&self) -> FieldRule {
        self.text(|rng| StreetName().fake_with_rng(rng))
    }

    pub fn city(&self) -> FieldRule {
        self.text(|rng| CityName().fake_with_rng(rng))
    }

    pub fn zip(&self) -> FieldRule {
        self.text(|rng| ZipCode().fake_with_rng(rng))
    }

    pub fn latitude(&self) -> FieldRule {
        self.text(|rng| Latitude().fake_with_rng(rng))
    }

    pub fn longitude(&self) -> FieldRule {
        self.text(|rng| Longitude().fake_with_rng(rng))
    }

    pub fn company(&self) -> FieldRule {
        self.text(|rng| CompanyName().fake_with_rng(rng))
    }

    pub fn catch_phrase(&self) -> FieldRule {
        self.text(|rng| CatchPhrase().fake_with_rng(rng))
    }

    pub fn word(&self) -> FieldRule {
        self.text(|rng| Word().fake_with_rng(rng))
    }

    /// Sentence with a word count drawn from `words`. An empty range means
    /// exactly `words.start` words.
    pub fn sentence(&self, words: Range<usize>) -> FieldRule {
        let words = words.start..words.end.max(words.start.saturating_add(1));
        self.text(move |rng| {
            if words.is_empty() {
                return String::new();
            }
            Sentence(words.clone()).fake_with_rng(rng)
        })
    }

    /// Paragraph of exactly `sentences` sentences.
    pub fn paragraph(&self, sentences: usize) -> FieldRule {
        self.text(move |rng| Paragraph(sentences..sentences + 1).fake_with_rng(rng))
    }

    pub fn integer(&self, range: Range<i64>) -> FieldRule {
        self.rule(move |rng| {
            if range.is_empty() {
                return Value::from(range.start);
            }
            Value::from(rng.random_range(range.clone()))
        })
    }

    pub fn floating(&self, min: f64, max: f64) -> FieldRule {
        self.rule(move |rng| {
            if min >= max {
                return Value::from(min);
            }
            Value::from(rng.random_range(min..max))
        })
    }

    /// `true` with probability `likelihood` (clamped to `0.0..=1.0`).
    pub fn boolean(&self, likelihood: f64) -> FieldRule {
        let likelihood = likelihood.clamp(0.0, 1.0);
        self.rule(move |rng| Value::from(rng.random_bool(likelihood)))
    }

    pub fn uuid(&self) -> FieldRule {
        self.text(|rng| {
            let bytes: [u8; 16] = rng.random();
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string()
        })
    }

    /// ISO date between `min` and `max`, inclusive.
    pub fn date_between(&self, min: NaiveDate, max: NaiveDate) -> FieldRule {
        self.text(move |rng| {
            let span = (max - min).num_days().max(0);
            let offset = rng.random_range(0..=span);
            (min + Duration::days(offset)).format("%Y-%m-%d").to_string()
        })
    }

    /// One of `values`, or `null` when empty.
    pub fn pick(&self, values: Vec<Value>) -> FieldRule {
        self.rule(move |rng| values.choose(rng).cloned().unwrap_or(Value::Null))
    }

    fn text<F>(&self, generate: F) -> FieldRule
    where
        F: Fn(&mut ChaCha8Rng) -> String + Send + Sync + 'static,
    {
        self.rule(move |rng| Value::String(generate(rng)))
    }

    fn lock(&self) -> MutexGuard<'_, FakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
