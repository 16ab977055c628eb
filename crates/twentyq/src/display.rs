//! Terminal output, ASCII only

use owo_colors::OwoColorize;
use twentyq_common::{Candidate, GuessSource, OracleStatus, Question, QuestionSource, TraitDef};

const SEPARATOR: &str = "----------------------------------------";
const KEY_WIDTH: usize = 14;

pub fn print_kv(key: &str, value: &str) {
    println!("{:width$} {}", key.dimmed(), value, width = KEY_WIDTH);
}

pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", SEPARATOR.dimmed());
}

pub fn question(number: usize, question: &Question, progress: f64) {
    let marker = match question.source {
        QuestionSource::Schema => "".to_string(),
        QuestionSource::Oracle => " [oracle]".cyan().to_string(),
    };
    println!();
    println!(
        "{} {}{}  {}",
        format!("Q{}:", number).bold(),
        question.text,
        marker,
        format!("({:.0}%)", progress.min(100.0)).dimmed()
    );
}

pub fn answer_prompt() -> String {
    format!("{} ", "[y]es / [n]o / [?] not sure / [q]uit >".dimmed())
}

/// Final guess, colored by confidence
pub fn guess(candidate: Option<&Candidate>, confidence: f64, questions_asked: usize, source: GuessSource) {
    println!();
    println!("{}", SEPARATOR.dimmed());

    let Some(candidate) = candidate else {
        println!(
            "{} after {} questions.",
            "[?] Could not determine who you are thinking of".yellow(),
            questions_asked
        );
        println!("{}", SEPARATOR.dimmed());
        return;
    };

    let conf = format!("{:.0}%", confidence * 100.0);
    let conf = if confidence >= 0.9 {
        conf.bright_green().to_string()
    } else if confidence >= 0.7 {
        conf.yellow().to_string()
    } else {
        conf.bright_red().to_string()
    };

    println!("I think you are thinking of {}!", candidate.name.bold());
    if !candidate.description.is_empty() {
        println!("  {}", candidate.description);
    }
    print_kv("confidence", &conf);
    print_kv("questions", &questions_asked.to_string());
    print_kv(
        "source",
        match source {
            GuessSource::Scorer => "trait matching",
            GuessSource::Oracle => "oracle",
        },
    );
    if let Some(image) = &candidate.image {
        print_kv("image", image);
    }
    println!("{}", SEPARATOR.dimmed());
}

pub fn status(status: &OracleStatus) {
    header("twentyq oracle");
    let selected = status.selected.to_string();
    if status.is_available() {
        print_kv("backend", &selected.bright_green().to_string());
    } else {
        print_kv("backend", &"none (heuristics only)".yellow().to_string());
    }
    for line in status.describe().iter().skip(1) {
        println!("  {}", line);
    }
    println!();
}

pub fn person(candidate: &Candidate) {
    println!("{:>3}  {}", candidate.id, candidate.name.bold());
    if !candidate.description.is_empty() {
        println!("     {}", candidate.description.dimmed());
    }
}

pub fn trait_question(def: &TraitDef) {
    println!("{:>3}  {:<52} {}", def.id, def.text, def.key.dimmed());
}

pub fn error(message: &str) {
    eprintln!("[ERROR] {}", message.red());
}
