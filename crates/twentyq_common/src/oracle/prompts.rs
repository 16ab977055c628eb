//! Prompt builders for the three oracle operations

use crate::answer::QuestionId;
use crate::candidate::Candidate;
use crate::filter::remaining_candidates;
use crate::schema::TraitSchema;
use crate::scorer::score_candidate;
use crate::state::GameState;

pub const QUESTION_SYSTEM_PROMPT: &str = "You are an expert at playing Akinator-style guessing games. \
Your goal is to ask the most strategic question that will help narrow down the person the user is thinking of.\n\n\
Your response should be:\n\
1. A clear, specific yes/no question\n\
2. Focused on distinctive traits that will eliminate many candidates\n\
3. Based on the current game state and remaining candidates\n\
4. Natural and conversational in tone\n\n\
Return ONLY the question text, nothing else.";

pub const CONFIDENCE_SYSTEM_PROMPT: &str = "You are an expert at analyzing confidence levels in guessing games. \
Return only a number between 0.0 and 1.0.";

pub const IDENTIFY_SYSTEM_PROMPT: &str = "You are an expert at playing Akinator-style guessing games. \
Identify the person the user is thinking of from the answers given. \
Respond with a single JSON object: \
{\"name\": string, \"description\": string, \"image\": string (optional URL), \"confidence\": number between 0.0 and 1.0}.";

/// Everything an oracle prompt may describe
#[derive(Debug, Clone, Copy)]
pub struct GameContext<'a> {
    pub candidates: &'a [Candidate],
    pub schema: &'a TraitSchema,
    pub state: &'a GameState,
}

/// `is_20th_century` -> `20th century`
pub fn humanize_trait(key: &str) -> String {
    key.trim_start_matches("is_")
        .trim_start_matches("has_")
        .replace('_', " ")
}

fn question_text(schema: &TraitSchema, id: &QuestionId) -> String {
    match id.schema_id().and_then(|sid| schema.get(sid)) {
        Some(def) => def.text.clone(),
        None => format!("Question {}", id),
    }
}

fn candidate_summary(candidate: &Candidate) -> String {
    let positive: Vec<String> = candidate.positive_traits().map(humanize_trait).collect();
    let negative: Vec<String> = candidate.negative_traits().map(humanize_trait).collect();

    let mut summary = format!("{} ({}): ", candidate.name, candidate.description);
    if !positive.is_empty() {
        summary.push_str(&format!("Positive traits: {}. ", positive.join(", ")));
    }
    if !negative.is_empty() {
        summary.push_str(&format!("Negative traits: {}.", negative.join(", ")));
    }
    summary.trim_end().to_string()
}

fn answered_lines(ctx: &GameContext<'_>) -> Vec<String> {
    ctx.state
        .answers
        .iter()
        .map(|(id, value)| format!("'{}' - {}", question_text(ctx.schema, id), value.label()))
        .collect()
}

fn remaining_names(ctx: &GameContext<'_>) -> Vec<String> {
    let answers = ctx.state.trait_answers(ctx.schema);
    remaining_candidates(ctx.candidates, &answers)
        .iter()
        .map(|c| format!("- {}", c.name))
        .collect()
}

fn game_summary(ctx: &GameContext<'_>) -> String {
    let people: Vec<String> = ctx.candidates.iter().map(candidate_summary).collect();
    let answered = answered_lines(ctx);
    let remaining = remaining_names(ctx);

    format!(
        "AVAILABLE PEOPLE ({} total):\n{}\n\n\
         PREVIOUS QUESTIONS AND ANSWERS:\n{}\n\n\
         REMAINING LIKELY CANDIDATES ({} people):\n{}",
        people.len(),
        people.join("\n"),
        if answered.is_empty() {
            "No questions asked yet.".to_string()
        } else {
            answered.join("\n")
        },
        remaining.len(),
        if remaining.is_empty() {
            "None of the known people match every answer.".to_string()
        } else {
            remaining.join("\n")
        },
    )
}

pub fn question_prompt(ctx: &GameContext<'_>) -> String {
    format!(
        "You are playing an Akinator-style guessing game. Your goal is to ask the most strategic \
         question to narrow down the person the user is thinking of.\n\n\
         {}\n\n\
         TASK: Generate the most strategic yes/no question that will help eliminate the most people possible. Consider:\n\
         1. Which question would split the remaining candidates most evenly?\n\
         2. Which question targets the most distinctive traits?\n\
         3. Which question would provide the most valuable information?\n\
         Do not repeat a question that was already asked.\n\n\
         Return ONLY the question text, nothing else.",
        game_summary(ctx)
    )
}

pub fn identification_prompt(ctx: &GameContext<'_>) -> String {
    format!(
        "{}\n\n\
         TASK: Name the single person the user is most likely thinking of. It may be one of the \
         people above or someone else who fits every answer.\n\n\
         Respond with JSON only: {{\"name\": ..., \"description\": ..., \"image\": ..., \"confidence\": 0.0-1.0}}",
        game_summary(ctx)
    )
}

pub fn confidence_prompt(candidate: &Candidate, ctx: &GameContext<'_>) -> String {
    let answers = ctx.state.trait_answers(ctx.schema);
    let scored = score_candidate(candidate, &answers);

    let analysis: Vec<String> = answers
        .iter()
        .filter_map(|answer| {
            let theirs = candidate.trait_value(answer.key)?;
            let text = ctx
                .schema
                .by_key(answer.key)
                .map(|d| d.text.as_str())
                .unwrap_or(answer.key);
            Some(format!(
                "'{}' - Expected: {}, {}: {} - {}",
                text,
                if answer.value { "Yes" } else { "No" },
                candidate.name,
                if theirs { "Yes" } else { "No" },
                if theirs == answer.value { "match" } else { "mismatch" }
            ))
        })
        .collect();

    let traits: Vec<String> = candidate
        .traits
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    format!(
        "CONFIDENCE ANALYSIS FOR: {name}\n\n\
         PERSON DETAILS:\n\
         - Name: {name}\n\
         - Description: {description}\n\
         - All Traits: {traits}\n\n\
         TRAIT MATCH ANALYSIS:\n{analysis}\n\n\
         SUMMARY:\n\
         - Total questions answered: {total}\n\
         - Correct matches: {matches}\n\
         - Match percentage: {percent:.0}%\n\n\
         TASK: Based on the trait analysis above, rate your confidence (0.0 to 1.0) that {name} is \
         the person the user is thinking of. Consider:\n\
         1. How well the traits match the answers\n\
         2. The distinctiveness of the person's characteristics\n\
         3. Whether there are other people who might also match\n\n\
         Return ONLY a number between 0.0 and 1.0, nothing else.",
        name = candidate.name,
        description = candidate.description,
        traits = traits.join(", "),
        analysis = if analysis.is_empty() {
            "No answered trait is defined for this person.".to_string()
        } else {
            analysis.join("\n")
        },
        total = scored.total,
        matches = scored.matches,
        percent = scored.score * 100.0,
    )
}
