//! Masqacre Headless Simulation Harness
//!
//! Drives the core through scripted scenarios and seeded random sessions.
//! Runs entirely in-process: no rendering, no input devices.
//!
//! Usage:
//!   cargo run -p masqacre-simtest
//!   cargo run -p masqacre-simtest -- --seed 7 --runs 200 --verbose

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hecs::Entity;
use masqacre_core::generation::{default_roster, validate_roster};
use masqacre_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fixed step for every session, in milliseconds
const STEP_MS: f32 = 100.0;

/// Corner of the room no guest can wander close to
const QUIET_CORNER: Vec2 = Vec2 { x: 8.0, y: 8.0 };

#[derive(Parser, Debug)]
#[command(about = "Headless simulation harness for Masqacre")]
struct Args {
    #[arg(long, default_value_t = 42, help = "Base seed for every session")]
    seed: u64,
    #[arg(long, default_value_t = 50, help = "Random-walk sessions to sweep")]
    runs: u64,
    #[arg(long, help = "JSON GameConfig to use instead of the defaults")]
    config: Option<PathBuf>,
    #[arg(long)]
    verbose: bool,
    #[arg(long, help = "Print the final state of each scripted scenario as JSON")]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Harness {
    config: GameConfig,
    seed: u64,
    json: bool,
}

impl Harness {
    fn engine(&self, seed: u64) -> Result<MasqueradeEngine> {
        MasqueradeEngine::with_default_roster(self.config.clone(), seed)
            .with_context(|| format!("starting session with seed {seed}"))
    }

    /// Ticks needed to outlast the clock, plus slack
    fn max_ticks(&self) -> usize {
        (self.config.clock.game_time_seconds * 1000.0 / STEP_MS) as usize + 10
    }

    fn dump(&self, scenario: &str, engine: &MasqueradeEngine) -> Result<()> {
        if self.json {
            let state = serde_json::to_string_pretty(&engine.state)?;
            println!("{scenario}: {state}");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_json(&json).with_context(|| format!("loading {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    let harness = Harness {
        config,
        seed: args.seed,
        json: args.json,
    };

    println!("=== Masqacre Simulation Harness (seed {}) ===\n", args.seed);

    let mut results = Vec::new();

    // 1. Roster data
    results.extend(validate_roster_data());

    // 2. Party clock
    results.extend(validate_clock(&harness)?);

    // 3. Clue deduction
    results.extend(validate_deduction(&harness)?);

    // 4. Silent target kill
    results.extend(validate_silent_kill(&harness)?);

    // 5. Witnessed kill of an innocent
    results.extend(validate_witnessed_kill(&harness)?);

    // 6. Suspicion ceiling
    results.extend(validate_suspicion_ceiling(&harness)?);

    // 7. Random-walk sweep
    results.extend(random_walk_sweep(&harness, args.runs)?);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn game_over_count(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count()
}

fn reason_label(state: &GameState) -> &'static str {
    match state.end_reason {
        Some(EndReason::Apprehended) => "apprehended",
        Some(EndReason::TimeExpired) => "time_expired",
        Some(EndReason::KilledInnocent) => "killed_innocent",
        Some(EndReason::TargetEliminated) => "target_eliminated",
        None => "unfinished",
    }
}

/// Tick until the session ends or `max_ticks` pass, collecting every event
fn run_to_end(engine: &mut MasqueradeEngine, max_ticks: usize) -> Vec<GameEvent> {
    let mut events = engine.drain_events();
    for _ in 0..max_ticks {
        if engine.state.is_game_over {
            break;
        }
        engine.update(STEP_MS);
        events.extend(engine.drain_events());
    }
    events
}

/// Place the player at `offset` from a guest, entering their room first
fn approach(engine: &mut MasqueradeEngine, guest: Entity, offset: Vec2) -> Result<()> {
    let pos = *engine
        .world
        .get::<&Position>(guest)
        .context("guest has no position")?;
    if pos.room != engine.state.current_room {
        engine.enter_room(pos.room, pos.local);
    }
    engine.player.position = pos.local + offset;
    Ok(())
}

fn target_entity(engine: &MasqueradeEngine) -> Result<Entity> {
    engine
        .target()
        .and_then(|t| t.entity)
        .context("session started without a target")
}

// ── 1. Roster ───────────────────────────────────────────────────────────

fn validate_roster_data() -> Vec<TestResult> {
    println!("--- Roster ---");
    let mut results = Vec::new();

    let roster = match default_roster() {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult::check("roster_parse", false, format!("{e}")));
            return results;
        }
    };

    results.push(TestResult::check(
        "roster_valid",
        validate_roster(&roster).is_ok(),
        format!("{} guests loaded", roster.len()),
    ));

    for room in RoomId::ALL {
        let here: Vec<_> = roster.iter().filter(|g| g.frequented_room == room).collect();
        let rich = here.iter().filter(|g| g.has_rich_dialogue).count();
        results.push(TestResult::check(
            &format!("roster_{}", room.as_str()),
            !here.is_empty() && rich > 0,
            format!("{} guests, {} informants", here.len(), rich),
        ));
    }

    let eligible = roster.iter().filter(|g| g.is_target_eligible()).count();
    results.push(TestResult::check(
        "roster_target_pool",
        eligible > 1,
        format!("{eligible} guests eligible as target"),
    ));

    results
}

// ── 2. Clock ────────────────────────────────────────────────────────────

fn validate_clock(harness: &Harness) -> Result<Vec<TestResult>> {
    println!("--- Clock ---");
    let mut results = Vec::new();

    let mut engine = harness.engine(harness.seed)?;
    engine.player.position = QUIET_CORNER;
    let events = run_to_end(&mut engine, harness.max_ticks());

    results.push(TestResult::check(
        "clock_expires",
        engine.state.end_reason == Some(EndReason::TimeExpired) && !engine.state.has_won,
        format!("ended: {}", reason_label(&engine.state)),
    ));
    results.push(TestResult::check(
        "clock_floor",
        engine.state.time_remaining == 0.0 && engine.formatted_time() == "0:00",
        format!("{} left", engine.formatted_time()),
    ));

    let clock = &harness.config.clock;
    let expected = (clock.game_time_seconds / clock.chime_interval_seconds).ceil() as usize;
    let chimes = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ClockChimed { .. }))
        .count();
    results.push(TestResult::check(
        "clock_chimes",
        chimes == expected,
        format!("{chimes} chimes, expected {expected}"),
    ));
    results.push(TestResult::check(
        "clock_single_game_over",
        game_over_count(&events) == 1,
        format!("{} GameOver events", game_over_count(&events)),
    ));

    harness.dump("clock", &engine)?;
    Ok(results)
}

// ── 3. Deduction ────────────────────────────────────────────────────────

fn validate_deduction(harness: &Harness) -> Result<Vec<TestResult>> {
    println!("--- Deduction ---");
    let mut results = Vec::new();

    let mut engine = harness.engine(harness.seed)?;
    let mut informants: Vec<Entity> = engine
        .world
        .query::<&GuestProfile>()
        .iter()
        .filter(|(_, profile)| profile.has_rich_dialogue)
        .map(|(entity, _)| entity)
        .collect();
    informants.sort_by_key(|entity| entity.id());
    if informants.len() < 3 {
        bail!("roster has only {} informants", informants.len());
    }

    let topics = [Topic::Masks, Topic::Locations, Topic::Behavior];
    let mut identified_early = false;
    for (i, (guest, topic)) in informants.iter().zip(topics).enumerate() {
        approach(&mut engine, *guest, Vec2::new(20.0, 0.0))?;
        if engine.talk_to(*guest)?.is_none() {
            bail!("informant {i} refused to talk");
        }
        engine.interrogate(*guest, topic)?;
        engine.end_conversation();
        if i < 2 && engine.state.has_identified_target {
            identified_early = true;
        }
    }

    results.push(TestResult::check(
        "deduction_one_clue_per_category",
        engine.state.discovered_clues.len() == 3,
        format!("{} clues", engine.state.discovered_clues.len()),
    ));
    results.push(TestResult::check(
        "deduction_needs_all_three",
        !identified_early && engine.state.has_identified_target,
        format!("identified: {}", engine.state.has_identified_target),
    ));

    let target = target_entity(&engine)?;
    results.push(TestResult::check(
        "deduction_marks_target",
        engine.world.get::<&MarkedTarget>(target).is_ok(),
        "target entity carries the mark",
    ));

    harness.dump("deduction", &engine)?;
    Ok(results)
}

// ── 4. Silent kill ──────────────────────────────────────────────────────

fn validate_silent_kill(harness: &Harness) -> Result<Vec<TestResult>> {
    println!("--- Silent Kill ---");
    let mut results = Vec::new();

    let mut engine = harness.engine(harness.seed)?;
    let target = target_entity(&engine)?;
    // Guests face down until they first move
    approach(&mut engine, target, Vec2::new(0.0, -30.0))?;

    let report = match engine.attempt_kill(target)? {
        KillOutcome::Executed(report) => report,
        other => bail!("backstab did not land: {other:?}"),
    };
    results.push(TestResult::check(
        "silent_kill_unnoticed",
        report.silent && engine.state.suspicion_level == 0.0,
        format!(
            "backstab {}, {} witnesses, suspicion {:.0}",
            report.backstab,
            report.witnesses.len(),
            engine.state.suspicion_level
        ),
    ));
    results.push(TestResult::check(
        "silent_kill_grace",
        engine.is_victory_pending() && !engine.state.is_game_over,
        "victory deferred after the kill",
    ));

    run_to_end(&mut engine, 50);
    results.push(TestResult::check(
        "silent_kill_wins",
        engine.state.has_won && engine.state.end_reason == Some(EndReason::TargetEliminated),
        format!("ended: {}", reason_label(&engine.state)),
    ));

    harness.dump("silent_kill", &engine)?;
    Ok(results)
}

// ── 5. Witnessed kill ───────────────────────────────────────────────────

fn validate_witnessed_kill(harness: &Harness) -> Result<Vec<TestResult>> {
    println!("--- Witnessed Kill ---");
    let mut results = Vec::new();

    let mut engine = harness.engine(harness.seed)?;
    let innocents: Vec<Entity> = engine
        .guests_in_room()
        .into_iter()
        .filter(|g| engine.profile(*g).map(|p| !p.is_target).unwrap_or(false))
        .collect();
    let &[victim, witness, ..] = innocents.as_slice() else {
        bail!("need two innocents in the ballroom, found {}", innocents.len());
    };

    let spot = engine.world.get::<&Position>(victim)?.local;
    engine.world.get::<&mut Position>(witness)?.local = spot + Vec2::new(80.0, 0.0);
    // Facing the victim
    engine.player.position = spot + Vec2::new(0.0, 30.0);

    let report = match engine.attempt_kill(victim)? {
        KillOutcome::Executed(report) => report,
        other => bail!("kill did not land: {other:?}"),
    };
    let expected = harness.config.combat.loud_kill_penalty + harness.config.combat.witnessed_kill_penalty;
    results.push(TestResult::check(
        "witnessed_kill_penalties",
        !report.silent && engine.state.suspicion_level == expected.min(100.0),
        format!("suspicion {:.0}, expected {expected:.0}", engine.state.suspicion_level),
    ));
    results.push(TestResult::check(
        "witnessed_kill_alarms",
        engine.world.get::<&Behavior>(witness)?.is_alarmed(),
        "witness is alarmed",
    ));
    results.push(TestResult::check(
        "witnessed_kill_innocent_ends",
        engine.state.is_game_over && !engine.state.has_won,
        format!("ended: {}", reason_label(&engine.state)),
    ));

    harness.dump("witnessed_kill", &engine)?;
    Ok(results)
}

// ── 6. Suspicion ceiling ────────────────────────────────────────────────

fn validate_suspicion_ceiling(harness: &Harness) -> Result<Vec<TestResult>> {
    println!("--- Suspicion Ceiling ---");
    let mut results = Vec::new();

    let mut engine = harness.engine(harness.seed)?;
    for _ in 0..5 {
        engine.add_suspicion(20.0);
    }
    results.push(TestResult::check(
        "ceiling_apprehended",
        engine.state.end_reason == Some(EndReason::Apprehended),
        format!("ended: {}", reason_label(&engine.state)),
    ));

    engine.add_suspicion(20.0);
    engine.update(STEP_MS);
    let events = engine.drain_events();
    results.push(TestResult::check(
        "ceiling_clamped",
        engine.state.suspicion_level == 100.0,
        format!("suspicion {:.1}", engine.state.suspicion_level),
    ));
    results.push(TestResult::check(
        "ceiling_latched",
        game_over_count(&events) == 1,
        format!("{} GameOver events", game_over_count(&events)),
    ));

    harness.dump("suspicion_ceiling", &engine)?;
    Ok(results)
}

// ── 7. Random walk ──────────────────────────────────────────────────────

/// Outcome of one random session
struct WalkSummary {
    label: &'static str,
    violations: Vec<String>,
}

fn random_walk(harness: &Harness, seed: u64) -> Result<WalkSummary> {
    let mut engine = harness.engine(seed)?;
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let mut violations = Vec::new();
    let mut game_overs = 0;

    for tick in 0..harness.max_ticks() {
        if engine.state.is_game_over {
            break;
        }

        if tick % 10 == 0 {
            let dx = rng.gen_range(-1..=1);
            let dy = rng.gen_range(-1..=1);
            engine.steer(if rng.gen_bool(0.5) {
                PlayerInput::sneak(dx, dy)
            } else {
                PlayerInput::walk(dx, dy)
            });
        }
        engine.use_door();

        if let Some(guest) = engine.nearby_guest() {
            if rng.gen_bool(0.05) && engine.talk_to(guest)?.is_some() {
                let topic = match rng.gen_range(0..4) {
                    0 => Topic::Masks,
                    1 => Topic::Locations,
                    2 => Topic::Behavior,
                    _ => Topic::Threaten,
                };
                engine.interrogate(guest, topic)?;
                engine.end_conversation();
            } else if rng.gen_bool(0.01) {
                engine.attempt_kill(guest)?;
            }
        }

        engine.update(STEP_MS);

        let state = &engine.state;
        if !(0.0..=100.0).contains(&state.suspicion_level) {
            violations.push(format!("tick {tick}: suspicion {}", state.suspicion_level));
        }
        if state.time_remaining < 0.0 {
            violations.push(format!("tick {tick}: time {}", state.time_remaining));
        }
        let categories: HashSet<_> = state.discovered_clues.iter().map(|c| c.category).collect();
        if categories.len() != state.discovered_clues.len() {
            violations.push(format!("tick {tick}: duplicate clue category"));
        }
        game_overs += game_over_count(&engine.drain_events());
    }

    if !engine.state.is_game_over {
        violations.push("session never ended".into());
    }
    if game_overs != 1 {
        violations.push(format!("{game_overs} GameOver events"));
    }

    Ok(WalkSummary {
        label: reason_label(&engine.state),
        violations,
    })
}

fn random_walk_sweep(harness: &Harness, runs: u64) -> Result<Vec<TestResult>> {
    println!("--- Random Walk ({runs} sessions) ---");
    let mut results = Vec::new();

    let mut histogram: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut failures = Vec::new();
    for i in 0..runs {
        let seed = harness.seed.wrapping_add(i);
        let summary = random_walk(harness, seed)?;
        *histogram.entry(summary.label).or_default() += 1;
        if !summary.violations.is_empty() {
            tracing::warn!(seed, violations = ?summary.violations, "invariant broken");
            failures.push(seed);
        }
    }

    let breakdown = histogram
        .iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!("random walk outcomes: {breakdown}");

    results.push(TestResult::check(
        "random_walk_invariants",
        failures.is_empty(),
        if failures.is_empty() {
            format!("{runs} sessions clean ({breakdown})")
        } else {
            format!("seeds {failures:?} broke invariants")
        },
    ));
    results.push(TestResult::check(
        "random_walk_all_end",
        !histogram.contains_key("unfinished"),
        breakdown,
    ));

    Ok(results)
}
