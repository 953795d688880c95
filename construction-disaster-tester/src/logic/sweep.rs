use anyhow::{Context, Result, bail, ensure};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use construction_disaster::numbers::{ratio, usize_to_f64};
use construction_disaster::{
    Command, Difficulty, DisasterConfig, DisasterEffect, DisasterRule, Pref, Resolution,
    SimWorld, StoryEvent, Tile, TileId,
};

const DAMAGE_TOLERANCE: f32 = 1e-3;

/// One cell of the sweep matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepCase {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub heavy_allowed: bool,
}

impl SweepCase {
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "seed {} x{:.2} {}",
            self.seed,
            self.difficulty.multiplier(),
            if self.heavy_allowed {
                "heavy"
            } else {
                "no-heavy"
            }
        )
    }
}

/// Cartesian product of seeds, difficulties and heavy-disaster settings.
#[must_use]
pub fn build_matrix(seeds: &[u64], difficulties: &[Difficulty], heavy: &[bool]) -> Vec<SweepCase> {
    let mut cases = Vec::with_capacity(seeds.len() * difficulties.len() * heavy.len());
    for &seed in seeds {
        for &difficulty in difficulties {
            for &heavy_allowed in heavy {
                cases.push(SweepCase {
                    seed,
                    difficulty,
                    heavy_allowed,
                });
            }
        }
    }
    cases
}

/// Outcome counts for one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub fires: usize,
    pub explosions: usize,
    pub skipped: usize,
    pub aborted: usize,
    pub damage_fraction_sum: f64,
}

impl OutcomeTally {
    pub fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Skipped { .. } => self.skipped += 1,
            Resolution::Aborted { .. } => self.aborted += 1,
            Resolution::Resolved(outcome) => {
                match outcome.effect {
                    DisasterEffect::Fire => self.fires += 1,
                    DisasterEffect::Explosion { .. } => self.explosions += 1,
                }
                self.damage_fraction_sum += f64::from(outcome.damage_fraction);
            }
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.fires += other.fires;
        self.explosions += other.explosions;
        self.skipped += other.skipped;
        self.aborted += other.aborted;
        self.damage_fraction_sum += other.damage_fraction_sum;
    }

    #[must_use]
    pub const fn resolved(&self) -> usize {
        self.fires + self.explosions
    }

    #[must_use]
    pub fn explosion_rate(&self) -> f64 {
        ratio(self.explosions, self.resolved())
    }

    #[must_use]
    pub fn mean_damage_fraction(&self) -> f64 {
        let resolved = self.resolved();
        if resolved == 0 {
            return 0.0;
        }
        self.damage_fraction_sum / usize_to_f64(resolved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub case_name: String,
    pub seed: u64,
    pub difficulty: f32,
    pub heavy_allowed: bool,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub tally: OutcomeTally,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Totals across every case of a sweep.
#[must_use]
pub fn total_tally(results: &[SweepResult]) -> OutcomeTally {
    let mut total = OutcomeTally::default();
    for result in results {
        total.merge(&result.tally);
    }
    total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileKind {
    Powered,
    Unpowered,
    /// Powered, but the damage model refuses every call.
    Faulty,
}

impl TileKind {
    const fn for_iteration(index: usize) -> Self {
        match index % 10 {
            3 | 7 => Self::Unpowered,
            9 => Self::Faulty,
            _ => Self::Powered,
        }
    }
}

pub struct SweepTester {
    config: DisasterConfig,
    verbose: bool,
}

impl SweepTester {
    #[must_use]
    pub const fn new(config: DisasterConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn run_matrix(&self, cases: &[SweepCase], iterations: usize) -> Vec<SweepResult> {
        cases
            .iter()
            .map(|case| {
                if self.verbose {
                    println!("🧪 Sweeping {}", case.label().bright_white());
                }
                self.run_case(case, iterations)
            })
            .collect()
    }

    pub fn run_case(&self, case: &SweepCase, iterations: usize) -> SweepResult {
        let start_time = Instant::now();
        let mut tally = OutcomeTally::default();
        let mut failures = Vec::new();
        let mut trace = Vec::with_capacity(iterations);

        match self.build_world(case) {
            Ok(mut world) => {
                for index in 0..iterations {
                    match self.run_iteration(&mut world, case, index) {
                        Ok(resolution) => {
                            if self.verbose {
                                println!(
                                    "  ✅ Iteration {}/{} {resolution:?}",
                                    index + 1,
                                    iterations
                                );
                            }
                            tally.record(&resolution);
                            trace.push(resolution);
                        }
                        Err(err) => {
                            let message = format!("Iteration {} ({}): {err:#}", index + 1, case.label());
                            if self.verbose {
                                println!("  ❌ {}", message.clone().red());
                            }
                            failures.push(message);
                        }
                    }
                }
                if failures.is_empty()
                    && let Err(err) = self.check_replay(case, &trace)
                {
                    failures.push(format!("{}: {err:#}", case.label()));
                }
            }
            Err(err) => failures.push(format!("{}: {err:#}", case.label())),
        }

        SweepResult {
            case_name: case.label(),
            seed: case.seed,
            difficulty: case.difficulty.multiplier(),
            heavy_allowed: case.heavy_allowed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: trace.len(),
            failures,
            tally,
            duration: start_time.elapsed(),
        }
    }

    fn build_world(&self, case: &SweepCase) -> Result<SimWorld> {
        let mut world = SimWorld::with_disaster(case.seed, case.difficulty, self.config.clone());
        world.set_pref(Pref::NoHeavyDisasters, !case.heavy_allowed);
        world
            .start_event(DisasterRule::ID)
            .context("failed to start the construction disaster")?;
        Ok(world)
    }

    /// Same seed, same constructions: the resolutions must repeat exactly.
    fn check_replay(&self, case: &SweepCase, trace: &[Resolution]) -> Result<()> {
        let mut world = self.build_world(case)?;
        for (index, expected) in trace.iter().enumerate() {
            let replayed = self.run_iteration(&mut world, case, index)?;
            ensure!(
                &replayed == expected,
                "replay diverged at iteration {}: {replayed:?} != {expected:?}",
                index + 1
            );
        }
        Ok(())
    }

    fn run_iteration(
        &self,
        world: &mut SimWorld,
        case: &SweepCase,
        index: usize,
    ) -> Result<Resolution> {
        let kind = TileKind::for_iteration(index);
        let id = u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1);
        let max_health = 100.0 + 50.0 * f32::from(u8::try_from(index % 7).unwrap_or(0));
        let tile = match kind {
            TileKind::Powered => Tile::powered(id, "tile.battery", max_health),
            TileKind::Unpowered => Tile::unpowered(id, "tile.wall", max_health),
            TileKind::Faulty => Tile::powered(id, "tile.generator", max_health).refusing_damage(),
        };

        let subscribed = world
            .event(DisasterRule::ID)
            .is_some_and(|event| event.is_subscribed());
        if !subscribed {
            world.start_event(DisasterRule::ID)?;
        }

        let logged_before = world.log().len();
        let notified_before = world.notifications().len();
        world.advance_tick();
        world.place(tile);
        let mut resolutions = world.complete_construction(TileId(id))?;
        ensure!(
            resolutions.len() == 1,
            "expected one resolution, got {}",
            resolutions.len()
        );
        let resolution = resolutions.remove(0);
        let commands = world.drain_commands();
        let tile = world.tile(TileId(id)).context("placed tile vanished")?;

        if kind == TileKind::Unpowered {
            ensure!(resolution.is_skipped(), "unpowered tile resolved: {resolution:?}");
            ensure!(world.log().len() == logged_before, "skip wrote a log entry");
            ensure!(
                world.notifications().len() == notified_before,
                "skip posted a notification"
            );
            ensure!(commands.is_empty(), "skip queued a command");
            ensure!(
                !tile.is_on_fire() && tile.total_damage() == 0.0,
                "skip touched the tile"
            );
            return Ok(resolution);
        }

        ensure!(
            world.log().len() == logged_before + 1,
            "expected exactly one log entry"
        );
        ensure!(
            world.notifications().len() == notified_before + 1,
            "expected exactly one notification"
        );
        let handle = resolution
            .log_entry()
            .context("resolution is missing its log entry")?;
        let linked = world
            .notifications()
            .posted()
            .last()
            .map(|note| note.log_entry());
        ensure!(
            linked == Some(handle),
            "notification does not link to the log entry"
        );

        let multiplier = case.difficulty.multiplier();
        match &resolution {
            Resolution::Skipped { .. } => bail!("powered tile was skipped"),
            Resolution::Aborted { .. } if kind == TileKind::Faulty => {
                ensure!(commands.is_empty(), "aborted resolution queued a command");
                ensure!(!tile.is_on_fire(), "aborted resolution ignited the tile");
            }
            Resolution::Aborted { error, .. } => bail!("healthy tile aborted: {error}"),
            Resolution::Resolved(_) if kind == TileKind::Faulty => {
                bail!("faulty damage model did not abort the resolution")
            }
            Resolution::Resolved(outcome) => {
                let damage_range = self.config.damage_fraction.scaled(multiplier);
                ensure!(
                    damage_range.contains(outcome.damage_fraction),
                    "damage fraction {} outside [{}, {}]",
                    outcome.damage_fraction,
                    damage_range.min,
                    damage_range.max
                );
                ensure!(
                    (tile.total_damage() - max_health * outcome.damage_fraction).abs()
                        < DAMAGE_TOLERANCE,
                    "tile took {} damage, expected {}",
                    tile.total_damage(),
                    max_health * outcome.damage_fraction
                );
                self.check_effect(case, outcome.effect, tile.is_on_fire(), &commands)?;
            }
        }
        Ok(resolution)
    }

    fn check_effect(
        &self,
        case: &SweepCase,
        effect: DisasterEffect,
        on_fire: bool,
        commands: &[Command],
    ) -> Result<()> {
        match effect {
            DisasterEffect::Fire => {
                ensure!(on_fire, "fire outcome left the tile unlit");
                ensure!(commands.is_empty(), "fire outcome also queued an explosion");
            }
            DisasterEffect::Explosion { radius, strength } => {
                ensure!(case.heavy_allowed, "explosion while heavy disasters are disabled");
                ensure!(!on_fire, "explosion outcome also ignited the tile");
                ensure!(
                    commands.len() == 1,
                    "expected one explosion command, got {}",
                    commands.len()
                );
                let multiplier = case.difficulty.multiplier();
                let radius_range = self.config.explosion_radius.scaled(multiplier);
                let strength_range = self.config.explosion_strength.scaled(multiplier);
                ensure!(radius_range.contains(radius), "radius {radius} out of range");
                ensure!(
                    strength_range.contains(strength),
                    "strength {strength} out of range"
                );
            }
        }
        Ok(())
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
