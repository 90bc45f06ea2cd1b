//! Human-cadence pacing
//!
//! Requests are spaced by random pauses drawn from configured bounds: one
//! before every track, a longer rest on every Nth track of a collection, and a
//! long pause between collections. Decisions depend only on progress counters.
//! The random draw sits behind [`DelaySource`] so tests can substitute fixed or
//! recorded delays.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::pacing;

/// Inclusive range a pause is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBounds {
    /// Shortest pause
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    /// Longest pause
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl DelayBounds {
    /// Bounds from `min` to `max`
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Bounds that always yield `duration`
    pub const fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    /// Whether `min <= max`
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// Pacing bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Rest on every Nth track of a collection; 0 disables resting
    pub rest_every: usize,
    /// Pause before each track download
    pub track: DelayBounds,
    /// Rest duration
    pub rest: DelayBounds,
    /// Pause between collections
    pub collection: DelayBounds,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            rest_every: pacing::REST_EVERY,
            track: DelayBounds::new(pacing::TRACK_MIN, pacing::TRACK_MAX),
            rest: DelayBounds::new(pacing::REST_MIN, pacing::REST_MAX),
            collection: DelayBounds::new(pacing::COLLECTION_MIN, pacing::COLLECTION_MAX),
        }
    }
}

impl PacingConfig {
    /// Configuration with every pause set to zero
    pub fn disabled() -> Self {
        Self {
            rest_every: 0,
            track: DelayBounds::fixed(Duration::ZERO),
            rest: DelayBounds::fixed(Duration::ZERO),
            collection: DelayBounds::fixed(Duration::ZERO),
        }
    }

    /// Describe every inverted range
    pub fn validate(&self) -> Vec<String> {
        [
            ("pacing.track", &self.track),
            ("pacing.rest", &self.rest),
            ("pacing.collection", &self.collection),
        ]
        .into_iter()
        .filter(|(_, bounds)| !bounds.is_valid())
        .map(|(field, bounds)| {
            format!(
                "{}: min {:?} is greater than max {:?}",
                field, bounds.min, bounds.max
            )
        })
        .collect()
    }
}

/// Source of pause durations
pub trait DelaySource: Send {
    /// Pick a duration within `bounds`
    fn pick(&mut self, bounds: DelayBounds) -> Duration;
}

/// Uniformly random durations
#[derive(Debug)]
pub struct RandomDelay {
    rng: StdRng,
}

impl RandomDelay {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelaySource for RandomDelay {
    fn pick(&mut self, bounds: DelayBounds) -> Duration {
        if bounds.min >= bounds.max {
            return bounds.min;
        }
        self.rng.gen_range(bounds.min..=bounds.max)
    }
}

/// Always the same duration, whatever the bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl DelaySource for FixedDelay {
    fn pick(&mut self, _bounds: DelayBounds) -> Duration {
        self.0
    }
}

/// Decides when and how long to pause
pub struct PacingPolicy {
    config: PacingConfig,
    source: Box<dyn DelaySource>,
}

impl PacingPolicy {
    /// Policy drawing random pauses
    pub fn new(config: PacingConfig) -> Self {
        Self::with_source(config, Box::new(RandomDelay::new()))
    }

    /// Policy with a custom delay source
    pub fn with_source(config: PacingConfig, source: Box<dyn DelaySource>) -> Self {
        Self { config, source }
    }

    /// Current configuration
    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Whether the track at 1-based `position` in its listing earns a rest
    pub fn rest_due(&self, position: usize) -> bool {
        self.config.rest_every > 0 && position > 0 && position % self.config.rest_every == 0
    }

    /// Whether a pause follows the job at `job_index` of `job_count`
    pub fn collection_pause_due(job_index: usize, job_count: usize) -> bool {
        job_count > 1 && job_index + 1 < job_count
    }

    /// Pause before a track download
    pub fn track_delay(&mut self) -> Duration {
        self.source.pick(self.config.track)
    }

    /// Extra rest before the track at `position`, when due
    pub fn rest_delay(&mut self, position: usize) -> Option<Duration> {
        self.rest_due(position)
            .then(|| self.source.pick(self.config.rest))
    }

    /// Pause after the job at `job_index`, when another job follows
    pub fn collection_delay(&mut self, job_index: usize, job_count: usize) -> Option<Duration> {
        Self::collection_pause_due(job_index, job_count)
            .then(|| self.source.pick(self.config.collection))
    }
}

impl std::fmt::Debug for PacingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacingPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Sleep for `duration`; zero returns immediately
pub async fn pause(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    debug!("Pausing for {:?}", duration);
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every bounds request and answers with `min`
    struct Recording(Arc<Mutex<Vec<DelayBounds>>>);

    impl DelaySource for Recording {
        fn pick(&mut self, bounds: DelayBounds) -> Duration {
            self.0.lock().unwrap().push(bounds);
            bounds.min
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_random_delay_within_bounds() {
        let mut source = RandomDelay::seeded(7);
        let bounds = DelayBounds::new(secs(1), secs(4));

        for _ in 0..200 {
            let d = source.pick(bounds);
            assert!(d >= secs(1) && d <= secs(4));
        }
    }

    #[test]
    fn test_random_delay_degenerate_bounds() {
        let mut source = RandomDelay::seeded(1);
        assert_eq!(source.pick(DelayBounds::fixed(secs(3))), secs(3));
    }

    #[test]
    fn test_rest_every_nth_position() {
        let policy =
            PacingPolicy::with_source(PacingConfig::default(), Box::new(FixedDelay::default()));

        let due: Vec<usize> = (1..=25).filter(|p| policy.rest_due(*p)).collect();
        assert_eq!(due, vec![10, 20]);
        assert!(!policy.rest_due(0));
    }

    #[test]
    fn test_rest_disabled() {
        let config = PacingConfig {
            rest_every: 0,
            ..Default::default()
        };
        let mut policy = PacingPolicy::with_source(config, Box::new(FixedDelay::default()));
        assert_eq!(policy.rest_delay(10), None);
    }

    #[test]
    fn test_collection_pause_only_between_jobs() {
        assert!(!PacingPolicy::collection_pause_due(0, 1));
        assert!(PacingPolicy::collection_pause_due(0, 3));
        assert!(PacingPolicy::collection_pause_due(1, 3));
        assert!(!PacingPolicy::collection_pause_due(2, 3));
    }

    #[test]
    fn test_bounds_passed_to_source() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut policy =
            PacingPolicy::with_source(PacingConfig::default(), Box::new(Recording(log.clone())));

        assert_eq!(policy.track_delay(), pacing::TRACK_MIN);
        assert_eq!(policy.rest_delay(10), Some(pacing::REST_MIN));
        assert_eq!(policy.rest_delay(11), None);
        assert_eq!(policy.collection_delay(0, 2), Some(pacing::COLLECTION_MIN));
        assert_eq!(policy.collection_delay(1, 2), None);

        let requested = log.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                PacingConfig::default().track,
                PacingConfig::default().rest,
                PacingConfig::default().collection,
            ]
        );
    }

    #[test]
    fn test_validate_inverted_bounds() {
        let config = PacingConfig {
            rest: DelayBounds::new(secs(20), secs(10)),
            ..Default::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("pacing.rest"));
        assert!(PacingConfig::default().validate().is_empty());
    }

    #[tokio::test]
    async fn test_zero_pause_returns_immediately() {
        let started = std::time::Instant::now();
        pause(Duration::ZERO).await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_config_toml_roundtrip_uses_humantime() {
        let text = toml::to_string(&PacingConfig::default()).unwrap();
        assert!(text.contains("min = \"1s\""));

        let parsed: PacingConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, PacingConfig::default());
    }
}
