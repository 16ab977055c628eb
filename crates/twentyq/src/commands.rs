//! Command handlers for twentyq.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use twentyq_common::config::OracleConfig;
use twentyq_common::{
    AnswerValue, Database, GameEngine, GameState, Oracle, QuestionId, TurnOutcome, TwentyqConfig,
};

use crate::display;

/// Resolve configuration with command-line overrides applied
pub fn load_config(path: Option<&Path>, db: Option<PathBuf>, offline: bool) -> Result<TwentyqConfig> {
    let mut config = match path {
        Some(path) => TwentyqConfig::load_from(path)?,
        None => TwentyqConfig::load()?,
    };

    if let Some(db) = db {
        config.database.path = db;
    }
    if offline {
        config.oracle = OracleConfig::disabled();
    }
    debug!("Using database {}", config.database.path.display());
    Ok(config)
}

fn engine(config: &TwentyqConfig) -> Result<GameEngine> {
    GameEngine::from_config(config)
        .with_context(|| format!("Failed to load {}", config.database.path.display()))
}

fn database(config: &TwentyqConfig) -> Result<Database> {
    Database::load(&config.database.path)
        .with_context(|| format!("Failed to load {}", config.database.path.display()))
}

/// Prompt until the player gives a usable answer. `None` on quit or EOF.
fn read_answer(input: &mut impl BufRead) -> Result<Option<AnswerValue>> {
    loop {
        print!("{}", display::answer_prompt());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let text = line.trim();
        if text.eq_ignore_ascii_case("q") || text.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        match text.parse::<AnswerValue>() {
            Ok(answer) => return Ok(Some(answer)),
            Err(e) => display::error(&e.to_string()),
        }
    }
}

pub fn play(config: &TwentyqConfig) -> Result<()> {
    let engine = engine(config)?;

    display::header("twentyq");
    println!("Think of a famous person. I will try to guess who it is.");
    if !engine.oracle().is_available() {
        println!("(no oracle available, using the built-in questions)");
    }

    let start = engine.start();
    let Some(mut question) = start.question else {
        display::error("The database has no questions");
        return Ok(());
    };
    let mut state = start.state;
    let mut progress = start.progress;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        display::question(state.asked_count() + 1, &question, progress);

        let Some(answer) = read_answer(&mut input)? else {
            println!("Bye.");
            return Ok(());
        };

        match engine.submit_answer(question.id.clone(), answer, state) {
            TurnOutcome::Question {
                question: next,
                progress: next_progress,
                state: next_state,
            } => {
                question = next;
                progress = next_progress;
                state = next_state;
            }
            TurnOutcome::Result {
                candidate,
                confidence,
                questions_asked,
                source,
            } => {
                display::guess(candidate.as_ref(), confidence, questions_asked, source);
                return Ok(());
            }
        }
    }
}

/// Only the empty object starts a game; anything else must be an answer
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StartRequest {}

/// One request of the JSON turn protocol
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TurnRequest {
    Answer {
        question_id: QuestionId,
        /// `true`, `false` or `null` for "not sure"
        #[serde(default)]
        answer: Option<bool>,
        #[serde(default)]
        game_state: GameState,
    },
    Start(StartRequest),
}

fn parse_turn_request(input: &str) -> Result<TurnRequest> {
    if input.trim().is_empty() {
        return Ok(TurnRequest::Start(StartRequest {}));
    }
    serde_json::from_str(input).context("Invalid turn request")
}

pub fn turn(config: &TwentyqConfig) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read turn request from stdin")?;
    let request = parse_turn_request(&input)?;

    let engine = engine(config)?;
    let output = match request {
        TurnRequest::Start(_) => serde_json::to_string(&engine.start())?,
        TurnRequest::Answer {
            question_id,
            answer,
            game_state,
        } => serde_json::to_string(&engine.submit_answer(question_id, answer.into(), game_state))?,
    };

    println!("{}", output);
    Ok(())
}

pub fn status(config: &TwentyqConfig, json: bool) -> Result<()> {
    let oracle = Oracle::probe(&config.oracle);
    if json {
        println!("{}", serde_json::to_string_pretty(oracle.status())?);
    } else {
        display::status(oracle.status());
    }
    Ok(())
}

pub fn people(config: &TwentyqConfig) -> Result<()> {
    let database = database(config)?;
    display::header(&format!("{} people", database.store.len()));
    for candidate in database.store.as_slice() {
        display::person(candidate);
    }
    Ok(())
}

pub fn questions(config: &TwentyqConfig) -> Result<()> {
    let database = database(config)?;
    display::header(&format!("{} questions", database.schema.len()));
    for def in database.schema.iter() {
        display::trait_question(def);
    }
    Ok(())
}

pub fn init(config: &TwentyqConfig, force: bool) -> Result<()> {
    let path = &config.database.path;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Database::write_seed(path).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote seed database to {}", path.display());
    Ok(())
}
