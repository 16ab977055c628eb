//! Game Simulator - plays one game per stored person with a truthful player
//!
//! Usage:
//!   game_sim --scenario offline
//!   game_sim --scenario flaky-oracle --cap 5
//!   game_sim --scenario oracle-confident --db database.json
//!
//! Outputs machine-readable JSON reports to ./artifacts/simulations/

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use twentyq_common::config::GameConfig;
use twentyq_common::oracle::{Backend, ModelTask, ScriptedBackend};
use twentyq_common::{
    AnswerValue, Candidate, Database, GameEngine, GuessSource, Oracle, OracleError, TurnOutcome,
};

const SCENARIOS: [&str; 3] = ["offline", "flaky-oracle", "oracle-confident"];

/// Hard stop for a runaway game
const MAX_TURNS: usize = 100;

#[derive(Debug, Clone, Serialize)]
struct GameRecord {
    target: String,
    guessed: Option<String>,
    correct: bool,
    questions_asked: usize,
    confidence: f64,
    source: Option<GuessSource>,
    repeated_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
struct SimulationReport {
    scenario: String,
    fallback_question_cap: usize,
    games: usize,
    correct: usize,
    undetermined: usize,
    accuracy: f64,
    mean_questions: f64,
    repeated_questions: usize,
    records: Vec<GameRecord>,
}

// ============================================================================
// ORACLES
// ============================================================================

/// Fails every other call, answers the rest with a fixed question
fn flaky_oracle() -> Oracle {
    let calls = AtomicUsize::new(0);
    Oracle::with_backend(Backend::Scripted(ScriptedBackend::from_fn(move |request| {
        if calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            return Err(OracleError::Timeout(30));
        }
        match request.task {
            ModelTask::QuestionGeneration => Ok("Is this person still famous today?".to_string()),
            ModelTask::ConfidenceAnalysis => Ok("0.4".to_string()),
            _ => Err(OracleError::Empty),
        }
    })))
}

/// Knows the answer and says so once allowed to
fn confident_oracle(target: &Candidate) -> Oracle {
    let identification = serde_json::json!({
        "name": target.name,
        "description": target.description,
        "confidence": 0.95,
    })
    .to_string();

    Oracle::with_backend(Backend::Scripted(ScriptedBackend::per_task([
        (ModelTask::ConfidenceAnalysis, Ok("0.95".to_string())),
        (ModelTask::Identification, Ok(identification)),
    ])))
}

fn oracle_for(scenario: &str, target: &Candidate) -> Oracle {
    match scenario {
        "flaky-oracle" => flaky_oracle(),
        "oracle-confident" => confident_oracle(target),
        _ => Oracle::disabled(),
    }
}

// ============================================================================
// SIMULATOR LOGIC
// ============================================================================

fn play_game(engine: &GameEngine, target: &Candidate) -> GameRecord {
    let mut seen = HashSet::new();
    let mut repeated = 0;

    let start = engine.start();
    let mut state = start.state;
    let Some(mut question) = start.question else {
        return GameRecord {
            target: target.name.clone(),
            guessed: None,
            correct: false,
            questions_asked: 0,
            confidence: 0.0,
            source: None,
            repeated_questions: 0,
        };
    };

    for _ in 0..MAX_TURNS {
        if !seen.insert(question.id.clone()) {
            warn!("{} asked twice in the game for {}", question.id, target.name);
            repeated += 1;
        }

        // Oracle questions have no trait to look up; the player is unsure
        let answer: AnswerValue = question
            .trait_key
            .as_deref()
            .and_then(|key| target.trait_value(key))
            .into();

        match engine.submit_answer(question.id.clone(), answer, state) {
            TurnOutcome::Question {
                question: next,
                state: next_state,
                ..
            } => {
                question = next;
                state = next_state;
            }
            TurnOutcome::Result {
                candidate,
                confidence,
                questions_asked,
                source,
            } => {
                let guessed = candidate.map(|c| c.name);
                return GameRecord {
                    correct: guessed.as_deref() == Some(target.name.as_str()),
                    target: target.name.clone(),
                    guessed,
                    questions_asked,
                    confidence,
                    source: Some(source),
                    repeated_questions: repeated,
                };
            }
        }
    }

    warn!("Game for {} hit the turn limit", target.name);
    GameRecord {
        target: target.name.clone(),
        guessed: None,
        correct: false,
        questions_asked: state.asked_count(),
        confidence: 0.0,
        source: None,
        repeated_questions: repeated,
    }
}

fn simulate(scenario: &str, database: &Database, config: &GameConfig) -> SimulationReport {
    let records: Vec<GameRecord> = database
        .store
        .as_slice()
        .iter()
        .map(|target| {
            let engine = GameEngine::new(database.clone(), oracle_for(scenario, target), config.clone());
            let record = play_game(&engine, target);
            info!(
                "{} -> {} in {} questions",
                record.target,
                record.guessed.as_deref().unwrap_or("(undetermined)"),
                record.questions_asked
            );
            record
        })
        .collect();

    let games = records.len();
    let correct = records.iter().filter(|r| r.correct).count();
    let undetermined = records.iter().filter(|r| r.guessed.is_none()).count();
    let total_questions: usize = records.iter().map(|r| r.questions_asked).sum();
    let ratio = |n: usize| if games == 0 { 0.0 } else { n as f64 / games as f64 };

    SimulationReport {
        scenario: scenario.to_string(),
        fallback_question_cap: config.fallback_question_cap,
        games,
        correct,
        undetermined,
        accuracy: ratio(correct),
        mean_questions: ratio(total_questions),
        repeated_questions: records.iter().map(|r| r.repeated_questions).sum(),
        records,
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn print_help() {
    println!("Game Simulator");
    println!();
    println!("Usage:");
    println!("  game_sim [--scenario <scenario>] [--db <path>] [--cap <N>]");
    println!();
    println!("Options:");
    println!("  --scenario <scenario> Scenario: {} (default: offline)", SCENARIOS.join(", "));
    println!("  --db <path>           Candidate database (default: built-in seed)");
    println!("  --cap <N>             Questions before the offline policy guesses (default: 7)");
}

fn main() -> Result<()> {
    let filter = std::env::var("TWENTYQ_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut scenario = "offline".to_string();
    let mut db_path: Option<PathBuf> = None;
    let mut config = GameConfig::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--scenario", Some(v)) => scenario = v.clone(),
            ("--db", Some(v)) => db_path = Some(PathBuf::from(v)),
            ("--cap", Some(v)) => {
                config.fallback_question_cap = v
                    .parse()
                    .with_context(|| format!("--cap expects a number, got '{}'", v))?
            }
            ("--help" | "-h", _) => {
                print_help();
                return Ok(());
            }
            ("--scenario" | "--db" | "--cap", None) => bail!("{} requires a value", args[i]),
            (other, _) => bail!("Unknown argument: {} (run with --help for usage)", other),
        }
        i += 2;
    }

    if !SCENARIOS.contains(&scenario.as_str()) {
        bail!(
            "Unknown scenario: {} (valid: {})",
            scenario,
            SCENARIOS.join(", ")
        );
    }

    let database = match &db_path {
        Some(path) => Database::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Database::builtin(),
    };

    let report = simulate(&scenario, &database, &config);

    let output_dir = PathBuf::from("./artifacts/simulations");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let output_file = output_dir.join(format!("game-{}.json", scenario));
    fs::write(&output_file, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    println!("\n=== Game Simulation: {} ===\n", scenario);
    println!("Games:              {}", report.games);
    println!("Correct:            {}", report.correct);
    println!("Undetermined:       {}", report.undetermined);
    println!("Accuracy:           {:.1}%", report.accuracy * 100.0);
    println!("Mean questions:     {:.2}", report.mean_questions);
    println!("Repeated questions: {}", report.repeated_questions);
    println!();
    for record in &report.records {
        println!(
            "  {:<22} -> {:<22} {:>2} questions{}",
            record.target,
            record.guessed.as_deref().unwrap_or("(undetermined)"),
            record.questions_asked,
            if record.correct { "" } else { "  MISS" }
        );
    }
    println!("\nReport written to: {}", output_file.display());

    Ok(())
}
