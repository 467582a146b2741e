//! Clarifying questions, operator answers, and the pitch-deck outline.

use std::io::{BufRead, Write};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use deckgen_prompts::{default_outline, outline_prompt, questions_prompt};
use deckgen_shared::{CompanyProfile, DeckgenError, PromptContext, Result};

use crate::llm::{ChatClient, FunctionSpec};

/// Questions asked per pitch deck.
pub const QUESTION_COUNT: usize = 3;

/// Used for any slot the model leaves empty.
pub const FALLBACK_QUESTIONS: [&str; QUESTION_COUNT] = [
    "What is your company's main product or service?",
    "Who is your target market?",
    "What makes your solution unique?",
];

const QUESTIONS_FUNCTION: &str = "get_questions";

/// Exactly [`QUESTION_COUNT`] questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questions([String; QUESTION_COUNT]);

impl Questions {
    pub fn fallback() -> Self {
        Self(FALLBACK_QUESTIONS.map(String::from))
    }

    /// Take the first three; pad a short list with the leading fallbacks, in order.
    pub fn from_model(list: Vec<String>) -> Self {
        let mut iter = list
            .into_iter()
            .chain(FALLBACK_QUESTIONS.iter().map(|q| q.to_string()));
        Self(std::array::from_fn(|_| iter.next().unwrap_or_default()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

#[derive(Deserialize)]
struct QuestionsArgs {
    questions: Vec<String>,
}

fn questions_function() -> FunctionSpec {
    FunctionSpec {
        name: QUESTIONS_FUNCTION.to_string(),
        description: "Get exactly 3 questions to ask the user about their business".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of exactly 3 questions to ask the user about their business"
                }
            },
            "required": ["questions"]
        }),
    }
}

/// Ask the model for three questions about the company. Never fails.
#[instrument(skip_all, fields(url = %profile.url))]
pub async fn generate_questions(chat: &ChatClient, profile: &CompanyProfile) -> Questions {
    let prompt = questions_prompt(profile);
    match chat
        .call_function::<QuestionsArgs>(&prompt, &questions_function(), chat.questions_max_tokens())
        .await
    {
        Ok(args) => {
            info!(returned = args.questions.len(), "questions generated");
            Questions::from_model(args.questions)
        }
        Err(e) => {
            warn!(error = %e, "question generation failed, using defaults");
            Questions::fallback()
        }
    }
}

/// Where operator answers come from.
pub trait AnswerSource {
    /// Show the full question list before the first answer is read.
    fn show_questions(&mut self, _questions: &[String]) -> Result<()> {
        Ok(())
    }

    /// Blocking read of one free-text answer. `number` starts at 1.
    fn answer(&mut self, number: usize, question: &str) -> Result<String>;
}

/// Prompts on a writer and reads one line per answer.
pub struct LineAnswers<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineAnswers<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> AnswerSource for LineAnswers<R, W> {
    fn show_questions(&mut self, questions: &[String]) -> Result<()> {
        let mut listing = String::from("Generated questions:\n");
        for (i, q) in questions.iter().enumerate() {
            listing.push_str(&format!("   {}. {q}\n", i + 1));
        }
        listing.push_str("\nPlease answer the following questions:\n");

        self.output
            .write_all(listing.as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(|e| DeckgenError::Interaction(e.to_string()))
    }

    fn answer(&mut self, number: usize, question: &str) -> Result<String> {
        write!(self.output, "\nQuestion {number}: {question}\nYour answer: ")
            .and_then(|()| self.output.flush())
            .map_err(|e| DeckgenError::Interaction(e.to_string()))?;

        let mut line = String::new();
        // EOF leaves `line` empty.
        self.input
            .read_line(&mut line)
            .map_err(|e| DeckgenError::Interaction(e.to_string()))?;
        Ok(line)
    }
}

/// One trimmed answer per question, in order. Empty answers are kept.
pub fn collect_answers(questions: &Questions, source: &mut dyn AnswerSource) -> Result<Vec<String>> {
    source.show_questions(questions.as_slice())?;
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| source.answer(i + 1, q).map(|a| a.trim().to_string()))
        .collect()
}

/// Ask the model for a markdown outline, falling back to the static one.
#[instrument(skip_all, fields(url = %context.profile.url, answers = context.qa.len()))]
pub async fn generate_outline(chat: &ChatClient, context: &PromptContext) -> String {
    match chat.complete(&outline_prompt(context), chat.outline_max_tokens()).await {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            warn!("model returned an empty outline, using default");
            default_outline(&context.profile)
        }
        Err(e) => {
            warn!(error = %e, "outline generation failed, using default");
            default_outline(&context.profile)
        }
    }
}
