//! Prompt templates for classification, reframe generation and attribute control
//!
//! All functions here are pure template filling; no gateway calls.

use std::fmt::Write;

use crate::control::Attribute;
use crate::retrieval::RetrievalResult;

pub const CLASSIFIER_SYSTEM_PROMPT: &str =
    "You are an expert in identifying cognitive distortions.";

pub const REFRAME_SYSTEM_PROMPT: &str =
    "You are a cognitive therapist helping people reframe negative thoughts.";

/// Substituted for a missing situation or thought in the specificity prompt.
pub const MISSING_CONTEXT_PLACEHOLDER: &str = "(not provided)";

/// Fixed few-shot block for distortion classification: (thought, label with confidence).
pub const DISTORTION_EXAMPLES: &[(&str, &str)] = &[
    ("Everyone will hate me", "Mind Reading (85%)"),
    ("I will fail again", "Fortune Telling (90%)"),
    ("I am completely worthless", "Labeling (80%)"),
    (
        "If it's not perfect, it's a failure",
        "All-or-Nothing Thinking (75%)",
    ),
    ("The worst will happen", "Catastrophizing (88%)"),
];

pub fn classification_prompt(thought: &str, situation: &str) -> String {
    let mut prompt = String::from("Here are examples of cognitive distortion classification:\n\n");
    for (example_thought, label) in DISTORTION_EXAMPLES {
        let _ = writeln!(prompt, "Thought: \"{}\"", example_thought);
        let _ = writeln!(prompt, "Cognitive Distortion: {}\n", label);
    }
    prompt.push_str("---\n\n");
    let _ = writeln!(prompt, "Situation: {}", situation);
    let _ = writeln!(prompt, "Thought: {}", thought);
    prompt.push_str("Cognitive Distortion:");
    prompt
}

/// Few-shot generation prompt; cases are emitted in the order given.
pub fn generation_prompt(thought: &str, situation: &str, cases: &RetrievalResult) -> String {
    let mut prompt = String::new();
    for case in cases.iter() {
        let _ = writeln!(prompt, "Situation: {}", case.situation);
        let _ = writeln!(prompt, "Distorted Thought: {}", case.thought);
        let _ = writeln!(prompt, "Rational Response: {}\n", case.reframe);
    }
    let _ = writeln!(prompt, "Situation: {}", situation);
    let _ = writeln!(prompt, "Distorted Thought: {}", thought);
    prompt.push_str("Rational Response:");
    prompt
}

pub fn control_prompt(attribute: Attribute, reframe: &str, thought: &str, situation: &str) -> String {
    match attribute {
        Attribute::Empathy => format!(
            "Make the following reframed thought more empathic.\n\
             Acknowledge feelings and provide emotional support.\n\n\
             Original: {reframe}\n\
             More Empathic:"
        ),
        Attribute::Actionability => format!(
            "Add specific actionable steps to the following reframed thought.\n\n\
             Original: {reframe}\n\
             More Actionable:"
        ),
        Attribute::Specificity => format!(
            "Make the following reframed thought more specific to the situation.\n\n\
             Situation: {}\n\
             Thought: {}\n\
             Reframe: {reframe}\n\n\
             More Specific:",
            or_placeholder(situation),
            or_placeholder(thought),
        ),
    }
}

fn or_placeholder(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        MISSING_CONTEXT_PLACEHOLDER
    } else {
        trimmed
    }
}
