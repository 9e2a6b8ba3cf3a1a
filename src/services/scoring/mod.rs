//! Heuristic per-category scorers
//!
//! Each scorer sums a table of named factors over attributes extracted from a
//! gear item's specs, then adds a capped sentiment bonus. Every factor that
//! fires is recorded in the candidate's breakdown.

pub mod chair;
pub mod headset;
pub mod keyboard;
pub mod monitor;
pub mod mouse;

use crate::models::{FactorContribution, GearCategory, GearItem, ScoredCandidate, UserPreferences};

pub use chair::ChairTraits;
pub use headset::HeadsetTraits;
pub use keyboard::KeyboardTraits;
pub use monitor::MonitorTraits;
pub use mouse::MouseTraits;

/// Candidates kept per category
pub const TOP_CANDIDATES: usize = 5;

/// A named bonus (or penalty) applied when its condition holds
pub struct Factor<T> {
    pub name: &'static str,
    pub bonus: f64,
    pub applies: fn(&T, &UserPreferences) -> bool,
    pub reason: fn(&T) -> Option<String>,
}

impl<T> Clone for Factor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Factor<T> {}

impl<T> std::fmt::Debug for Factor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factor")
            .field("name", &self.name)
            .field("bonus", &self.bonus)
            .finish()
    }
}

fn no_reason<T>(_: &T) -> Option<String> {
    None
}

impl<T> Factor<T> {
    /// A factor that contributes points without an explanatory reason
    pub fn silent(
        name: &'static str,
        bonus: f64,
        applies: fn(&T, &UserPreferences) -> bool,
    ) -> Self {
        Self {
            name,
            bonus,
            applies,
            reason: no_reason::<T>,
        }
    }
}

/// Reason emitted when display sentiment exceeds `above`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReason {
    pub above: f64,
    pub label: &'static str,
}

/// Sentiment contribution: `per_point` × display sentiment, capped at `cap`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentBoost {
    pub per_point: f64,
    pub cap: f64,
    pub reason: Option<SentimentReason>,
}

impl SentimentBoost {
    fn apply(&self, sentiment: f64, candidate: &mut Evaluation) {
        if sentiment <= 0.0 {
            return;
        }

        let points = (sentiment * self.per_point).min(self.cap);
        candidate.add("sentiment", points);

        if let Some(reason) = self.reason {
            if sentiment > reason.above {
                candidate.reasons.push(format!("{} ({}/10)", reason.label, sentiment));
            }
        }
    }
}

#[derive(Default)]
struct Evaluation {
    score: f64,
    reasons: Vec<String>,
    breakdown: Vec<FactorContribution>,
}

impl Evaluation {
    fn add(&mut self, factor: &str, points: f64) {
        self.score += points;
        self.breakdown.push(FactorContribution {
            factor: factor.to_string(),
            points,
        });
    }
}

/// Ranks the catalog slice of one category against a preference record
pub trait CategoryScorer: Send + Sync {
    fn category(&self) -> GearCategory;

    fn score(&self, prefs: &UserPreferences, item: &GearItem) -> ScoredCandidate;

    /// Scores every item of this scorer's category, best first
    ///
    /// The sort is stable, so equal scores keep catalog order.
    fn score_all(&self, prefs: &UserPreferences, items: &[GearItem]) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = items
            .iter()
            .filter(|item| item.category == self.category())
            .map(|item| self.score(prefs, item))
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// The top [`TOP_CANDIDATES`] candidates
    fn rank(&self, prefs: &UserPreferences, items: &[GearItem]) -> Vec<ScoredCandidate> {
        let mut ranked = self.score_all(prefs, items);
        ranked.truncate(TOP_CANDIDATES);
        ranked
    }
}

/// Scorer driven by an explicit factor table over extracted attributes `T`
pub struct TableScorer<T> {
    category: GearCategory,
    extract: fn(&GearItem) -> T,
    factors: Vec<Factor<T>>,
    sentiment: SentimentBoost,
}

impl<T> TableScorer<T> {
    pub fn new(
        category: GearCategory,
        extract: fn(&GearItem) -> T,
        factors: Vec<Factor<T>>,
        sentiment: SentimentBoost,
    ) -> Self {
        Self {
            category,
            extract,
            factors,
            sentiment,
        }
    }
}

impl<T> CategoryScorer for TableScorer<T> {
    fn category(&self) -> GearCategory {
        self.category
    }

    fn score(&self, prefs: &UserPreferences, item: &GearItem) -> ScoredCandidate {
        let traits = (self.extract)(item);
        let mut evaluation = Evaluation::default();

        for factor in &self.factors {
            if (factor.applies)(&traits, prefs) {
                evaluation.add(factor.name, factor.bonus);
                if let Some(reason) = (factor.reason)(&traits) {
                    evaluation.reasons.push(reason);
                }
            }
        }

        let sentiment = item.display_sentiment();
        self.sentiment.apply(sentiment, &mut evaluation);

        ScoredCandidate {
            gear: item.clone(),
            score: evaluation.score,
            reasons: evaluation.reasons,
            sentiment,
            breakdown: evaluation.breakdown,
        }
    }
}

/// One scorer per rig category
pub struct ScorerSet {
    mouse: TableScorer<MouseTraits>,
    keyboard: TableScorer<KeyboardTraits>,
    headset: TableScorer<HeadsetTraits>,
    monitor: TableScorer<MonitorTraits>,
    chair: TableScorer<ChairTraits>,
}

impl ScorerSet {
    pub fn new(
        mouse: TableScorer<MouseTraits>,
        keyboard: TableScorer<KeyboardTraits>,
        headset: TableScorer<HeadsetTraits>,
        monitor: TableScorer<MonitorTraits>,
        chair: TableScorer<ChairTraits>,
    ) -> Self {
        Self {
            mouse,
            keyboard,
            headset,
            monitor,
            chair,
        }
    }

    /// Scorer for `category`; mousepads are not scored
    pub fn get(&self, category: GearCategory) -> Option<&dyn CategoryScorer> {
        match category {
            GearCategory::Mouse => Some(&self.mouse),
            GearCategory::Keyboard => Some(&self.keyboard),
            GearCategory::Headset => Some(&self.headset),
            GearCategory::Monitor => Some(&self.monitor),
            GearCategory::Chair => Some(&self.chair),
            GearCategory::Mousepad => None,
        }
    }
}

impl Default for ScorerSet {
    fn default() -> Self {
        Self::new(
            mouse::scorer(),
            keyboard::scorer(),
            headset::scorer(),
            monitor::scorer(),
            chair::scorer(),
        )
    }
}
