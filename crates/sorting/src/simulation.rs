//! Conveyor-belt sorting simulation
//!
//! ## Table of Contents
//! - **SimulationConfig**: Belt geometry, timers and seed
//! - **Simulation**: Deterministic tick-driven scheduler
//! - **SimEvent**: What happened during a tick, for whatever renders it
//! - **Reaction**: Cosmetic transition attached to each classification
//!
//! Time only advances through [`Simulation::tick`]; there is no wall clock in
//! here. A frame moves every object by `belt_step`, objects inside the scan
//! window get their material's verdict, and objects past `bounds` are dropped.

use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::material::Material;
use crate::stats::{Classification, Outcome, SortingStats};

/// Hard cap on objects per spawn wave.
pub const MAX_SPAWN_PER_WAVE: u32 = 3;

/// Parameters of one simulated belt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of one animation frame (ms)
    pub frame_interval_ms: u64,
    /// Time between spawn waves (ms)
    pub spawn_interval_ms: u64,
    /// Upper bound of objects spawned per wave (inclusive, at most 3)
    pub max_spawn_per_wave: u32,
    /// Distance travelled per frame
    pub belt_step: f64,
    /// Position at which objects appear
    pub spawn_position: f64,
    /// Start of the scan window (inclusive)
    pub scan_start: f64,
    /// End of the scan window (inclusive)
    pub scan_end: f64,
    /// Objects beyond this position leave the belt
    pub bounds: f64,
    /// Number of parallel lanes objects are spread over
    pub lane_count: u32,
    /// Maximum deviation from a material's nominal confidence (%)
    pub confidence_jitter: f64,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 50,
            spawn_interval_ms: 1500,
            max_spawn_per_wave: MAX_SPAWN_PER_WAVE,
            belt_step: 0.5,
            spawn_position: 0.0,
            scan_start: 60.0,
            scan_end: 64.0,
            bounds: 100.0,
            lane_count: 3,
            confidence_jitter: 1.5,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Set the RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(SimError::config("frame_interval_ms must be positive"));
        }
        if self.spawn_interval_ms == 0 {
            return Err(SimError::config("spawn_interval_ms must be positive"));
        }
        if !(self.belt_step.is_finite() && self.belt_step > 0.0) {
            return Err(SimError::config("belt_step must be a positive number"));
        }
        if !(self.scan_start <= self.scan_end) {
            return Err(SimError::config("scan_start cannot exceed scan_end"));
        }
        if !(self.spawn_position < self.scan_start) {
            return Err(SimError::config("objects must spawn before the scan window"));
        }
        if !(self.bounds > self.scan_end) {
            return Err(SimError::config("bounds must lie beyond the scan window"));
        }
        if self.lane_count == 0 {
            return Err(SimError::config("lane_count must be at least 1"));
        }
        if self.max_spawn_per_wave > MAX_SPAWN_PER_WAVE {
            return Err(SimError::config(format!(
                "max_spawn_per_wave cannot exceed {MAX_SPAWN_PER_WAVE}"
            )));
        }
        if !(self.confidence_jitter.is_finite()
            && (0.0..=100.0).contains(&self.confidence_jitter))
        {
            return Err(SimError::config("confidence_jitter must lie within [0, 100]"));
        }
        Ok(())
    }
}

/// Lifecycle of a belt object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectState {
    OnBelt,
    Classified(Outcome),
}

/// One object travelling along the belt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeltObject {
    pub id: u64,
    pub material: &'static Material,
    pub position: f64,
    pub lane: u32,
    pub state: ObjectState,
}

impl BeltObject {
    /// Current display color.
    pub fn color(&self) -> &'static str {
        match self.state {
            ObjectState::OnBelt => self.material.color,
            ObjectState::Classified(outcome) => Reaction::from(outcome).color(),
        }
    }

    /// Classified objects fade out while they travel to the end of the belt.
    pub fn opacity(&self) -> f32 {
        match self.state {
            ObjectState::OnBelt => 1.0,
            ObjectState::Classified(_) => 0.6,
        }
    }
}

/// Cosmetic transition triggered by a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Green tint and "ACCEPTED" label
    Accept,
    /// Red tint, "REJECTED" label and an ejector arm sweep
    Reject,
    /// Amber tint for objects that slipped past the scanner
    Flag,
}

impl From<Outcome> for Reaction {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accepted => Reaction::Accept,
            Outcome::Rejected => Reaction::Reject,
            Outcome::Uncertain => Reaction::Flag,
        }
    }
}

impl Reaction {
    pub fn color(self) -> &'static str {
        match self {
            Reaction::Accept => "#22c55e",
            Reaction::Reject => "#ef4444",
            Reaction::Flag => "#f59e0b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Reaction::Accept => "ACCEPTED",
            Reaction::Reject => "REJECTED",
            Reaction::Flag => "CHECK",
        }
    }

    /// Whether the ejector arm swings for this reaction.
    pub fn ejects(self) -> bool {
        self == Reaction::Reject
    }
}

/// Something that happened during a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Spawned {
        id: u64,
        material: &'static str,
        lane: u32,
    },
    Classified {
        classification: Classification,
        reaction: Reaction,
    },
    Discarded {
        id: u64,
    },
}

/// Headless conveyor simulation.
pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    objects: Vec<BeltObject>,
    stats: SortingStats,
    next_id: u64,
    frame_clock: Duration,
    spawn_clock: Duration,
    frames: u64,
    waves: u64,
}

impl Simulation {
    /// Create a simulation; fails on an invalid config.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            rng,
            objects: Vec::new(),
            stats: SortingStats::new(),
            next_id: 0,
            frame_clock: Duration::ZERO,
            spawn_clock: Duration::ZERO,
            frames: 0,
            waves: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> &SortingStats {
        &self.stats
    }

    pub fn objects(&self) -> &[BeltObject] {
        &self.objects
    }

    /// Frames simulated since creation or the last reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Spawn waves fired since creation or the last reset, empty ones included.
    pub fn waves(&self) -> u64 {
        self.waves
    }

    /// Advance by `elapsed`, running every whole frame that fits.
    ///
    /// Leftover time carries over to the next call, so splitting the same
    /// duration across several ticks yields the same events.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<SimEvent> {
        let frame = self.config.frame_interval();
        let mut events = Vec::new();

        self.frame_clock += elapsed;
        while self.frame_clock >= frame {
            self.frame_clock -= frame;
            self.step_frame(&mut events);
        }

        events
    }

    /// Clear the belt, timers and statistics. The RNG stream continues.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.stats.reset();
        self.next_id = 0;
        self.frame_clock = Duration::ZERO;
        self.spawn_clock = Duration::ZERO;
        self.frames = 0;
        self.waves = 0;
    }

    fn step_frame(&mut self, events: &mut Vec<SimEvent>) {
        self.frames += 1;

        self.spawn_clock += self.config.frame_interval();
        let spawn_interval = self.config.spawn_interval();
        while self.spawn_clock >= spawn_interval {
            self.spawn_clock -= spawn_interval;
            self.spawn_wave(events);
        }

        let (scan_start, scan_end) = (self.config.scan_start, self.config.scan_end);
        for object in self.objects.iter_mut() {
            object.position += self.config.belt_step;

            let in_window = object.position >= scan_start && object.position <= scan_end;
            if in_window && object.state == ObjectState::OnBelt {
                let outcome = Outcome::from(object.material.verdict);
                let confidence =
                    detection_confidence(object.material, self.config.confidence_jitter, &mut self.rng);
                object.state = ObjectState::Classified(outcome);

                let classification = Classification {
                    object_id: object.id,
                    material: object.material,
                    outcome,
                    confidence,
                };
                self.stats.record(&classification);
                debug!(
                    id = object.id,
                    material = object.material.name,
                    ?outcome,
                    confidence,
                    "classified"
                );
                events.push(SimEvent::Classified {
                    classification,
                    reaction: Reaction::from(outcome),
                });
            }
        }

        let bounds = self.config.bounds;
        let mut leaving = Vec::new();
        self.objects.retain(|object| {
            if object.position > bounds {
                leaving.push(object.clone());
                false
            } else {
                true
            }
        });

        for object in leaving {
            if object.state == ObjectState::OnBelt {
                let classification = Classification {
                    object_id: object.id,
                    material: object.material,
                    outcome: Outcome::Uncertain,
                    confidence: 0.0,
                };
                self.stats.record(&classification);
                debug!(id = object.id, material = object.material.name, "missed by scanner");
                events.push(SimEvent::Classified {
                    classification,
                    reaction: Reaction::Flag,
                });
            }
            events.push(SimEvent::Discarded { id: object.id });
        }
    }

    fn spawn_wave(&mut self, events: &mut Vec<SimEvent>) {
        self.waves += 1;
        let count = self.rng.gen_range(0..=self.config.max_spawn_per_wave);
        for _ in 0..count {
            let material = Material::random(&mut self.rng);
            let lane = self.rng.gen_range(0..self.config.lane_count);
            let id = self.next_id;
            self.next_id += 1;

            self.objects.push(BeltObject {
                id,
                material,
                position: self.config.spawn_position,
                lane,
                state: ObjectState::OnBelt,
            });
            events.push(SimEvent::Spawned {
                id,
                material: material.name,
                lane,
            });
        }
    }
}

/// Nominal confidence plus uniform jitter, kept within [0, 100].
fn detection_confidence(material: &Material, jitter: f64, rng: &mut StdRng) -> f64 {
    let offset = if jitter > 0.0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0.0
    };
    (material.confidence + offset).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::verdict_for;

    fn seeded(seed: u64) -> Simulation {
        Simulation::new(SimulationConfig::default().seed(seed)).unwrap()
    }

    fn run(sim: &mut Simulation, frames: u32) -> Vec<SimEvent> {
        let frame = sim.config().frame_interval();
        (0..frames).flat_map(|_| sim.tick(frame)).collect()
    }

    fn assert_reconciles(stats: &SortingStats) {
        assert_eq!(
            stats.total(),
            stats.accepted() + stats.rejected() + stats.uncertain()
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            SimulationConfig {
                frame_interval_ms: 0,
                ..Default::default()
            },
            SimulationConfig {
                belt_step: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                scan_start: 70.0,
                scan_end: 60.0,
                ..Default::default()
            },
            SimulationConfig {
                bounds: 50.0,
                ..Default::default()
            },
            SimulationConfig {
                lane_count: 0,
                ..Default::default()
            },
            SimulationConfig {
                spawn_interval_ms: 0,
                ..Default::default()
            },
            SimulationConfig {
                spawn_position: 60.0,
                ..Default::default()
            },
            SimulationConfig {
                max_spawn_per_wave: 4,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(Simulation::new(config).is_err());
        }
    }

    #[test]
    fn test_out_of_range_jitter_rejected() {
        for jitter in [-0.5, f64::NAN, f64::INFINITY, 100.5, 1e308] {
            let config = SimulationConfig {
                confidence_jitter: jitter,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "jitter {jitter}");
        }

        let from_file =
            SimulationConfig::from_toml_str("confidence_jitter = inf\nseed = 1").unwrap();
        assert!(Simulation::new(from_file).is_err());

        let edge = SimulationConfig {
            confidence_jitter: 100.0,
            ..SimulationConfig::default().seed(4)
        };
        let mut sim = Simulation::new(edge).unwrap();
        sim.tick(Duration::from_secs(60));
        assert!(sim.stats().total() > 0);
    }

    #[test]
    fn test_oversized_wave_from_toml_rejected() {
        let config = SimulationConfig::from_toml_str("max_spawn_per_wave = 50").unwrap();
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_spawn_waves_faster_than_frames() {
        let config = SimulationConfig {
            spawn_interval_ms: 10,
            frame_interval_ms: 50,
            ..SimulationConfig::default().seed(6)
        };
        let mut sim = Simulation::new(config).unwrap();

        let events = sim.tick(Duration::from_secs(1));

        assert_eq!(sim.frames(), 20);
        assert_eq!(sim.waves(), 100);
        assert!(sim.spawn_clock < sim.config().spawn_interval());

        let spawned = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
        assert!(spawned <= 300);

        sim.reset();
        assert_eq!(sim.waves(), 0);
    }

    #[test]
    fn test_partial_frame_does_nothing() {
        let mut sim = seeded(1);
        assert!(sim.tick(Duration::from_millis(49)).is_empty());
        assert_eq!(sim.frames(), 0);

        sim.tick(Duration::from_millis(1));
        assert_eq!(sim.frames(), 1);
    }

    #[test]
    fn test_same_seed_same_events() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        assert_eq!(run(&mut a, 2000), run(&mut b, 2000));
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_tick_splitting_is_transparent() {
        let mut whole = seeded(9);
        let mut split = seeded(9);

        let a = whole.tick(Duration::from_secs(30));
        let b: Vec<_> = (0..600).flat_map(|_| split.tick(Duration::from_millis(50))).collect();

        assert_eq!(a, b);
        assert_eq!(whole.objects(), split.objects());
    }

    #[test]
    fn test_waves_stay_within_limit() {
        let mut sim = seeded(3);
        let frames_per_wave = (sim.config().spawn_interval_ms / sim.config().frame_interval_ms) as u32;

        for _ in 0..50 {
            let events = run(&mut sim, frames_per_wave);
            let spawned = events
                .iter()
                .filter(|e| matches!(e, SimEvent::Spawned { .. }))
                .count();
            assert!(spawned <= 3);
        }
    }

    #[test]
    fn test_outcome_follows_material() {
        let mut sim = seeded(5);
        let events = run(&mut sim, 4000);

        let mut classified = 0;
        for event in &events {
            if let SimEvent::Classified {
                classification,
                reaction,
            } = event
            {
                classified += 1;
                let expected = verdict_for(classification.material.name).map(Outcome::from);
                assert_eq!(Some(classification.outcome), expected);
                assert_eq!(*reaction, Reaction::from(classification.outcome));
                assert_eq!(
                    reaction.ejects(),
                    ["PVC", "Metal", "Rubber"].contains(&classification.material.name)
                );
            }
        }
        assert!(classified > 0);
        assert_eq!(sim.stats().uncertain(), 0);
    }

    #[test]
    fn test_counts_reconcile_through_reset() {
        let mut sim = seeded(11);
        for round in 0..5 {
            run(&mut sim, 500 + round * 37);
            assert_reconciles(sim.stats());
        }

        sim.reset();
        assert_eq!(sim.stats(), &SortingStats::default());
        assert!(sim.objects().is_empty());

        run(&mut sim, 1000);
        assert_reconciles(sim.stats());
    }

    #[test]
    fn test_objects_leave_after_bounds() {
        let mut sim = seeded(8);
        let events = run(&mut sim, 3000);

        let spawned = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
        let discarded = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Discarded { .. }))
            .count();

        assert_eq!(spawned, discarded + sim.objects().len());
        assert!(sim.objects().iter().all(|o| o.position <= sim.config().bounds));
        // every discarded object went through the scanner first
        let classified_on_belt = sim
            .objects()
            .iter()
            .filter(|o| o.state != ObjectState::OnBelt)
            .count();
        assert_eq!(sim.stats().total() as usize, discarded + classified_on_belt);
    }

    #[test]
    fn test_skipped_window_counts_as_uncertain() {
        let config = SimulationConfig {
            belt_step: 7.0,
            scan_start: 60.0,
            scan_end: 61.0,
            ..SimulationConfig::default().seed(2)
        };
        let mut sim = Simulation::new(config).unwrap();
        run(&mut sim, 2000);

        let stats = sim.stats();
        assert!(stats.total() > 0);
        assert_eq!(stats.uncertain(), stats.total());
        assert_eq!(stats.precision(), 97.2);
        assert_reconciles(stats);
    }

    #[test]
    fn test_confidence_within_jitter() {
        let mut sim = seeded(13);
        for event in run(&mut sim, 3000) {
            if let SimEvent::Classified { classification, .. } = event {
                let nominal = classification.material.confidence;
                assert!((classification.confidence - nominal).abs() <= 1.5 + 1e-9);
                assert!(classification.confidence <= 100.0);
            }
        }
    }

    #[test]
    fn test_classified_objects_change_color() {
        let mut sim = seeded(21);
        run(&mut sim, 200);

        for object in sim.objects() {
            match object.state {
                ObjectState::OnBelt => {
                    assert_eq!(object.color(), object.material.color);
                    assert_eq!(object.opacity(), 1.0);
                }
                ObjectState::Classified(outcome) => {
                    assert_eq!(object.color(), Reaction::from(outcome).color());
                    assert!(object.position >= sim.config().scan_start);
                }
            }
        }
    }

    #[test]
    fn test_config_from_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            belt_step = 1.0
            seed = 77
            "#,
        )
        .unwrap();

        assert_eq!(config.belt_step, 1.0);
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.bounds, 100.0);

        assert!(SimulationConfig::from_toml_str("belt_step = \"fast\"").is_err());
    }
}
