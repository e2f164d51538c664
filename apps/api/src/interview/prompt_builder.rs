//! Prompt Builder: renders the interviewer system instruction from an `InterviewConfig`.

use crate::interview::prompts::{INTERVIEWER_SYSTEM_TEMPLATE, NOT_PROVIDED};
use crate::models::interview::InterviewConfig;

/// Per-document character budget. Bounds the token cost of uploaded resumes and JDs.
pub const DOCUMENT_CHAR_BUDGET: usize = 3000;

/// Renders the system prompt. Pure and deterministic.
pub fn build_system_prompt(config: &InterviewConfig) -> String {
    render_template(INTERVIEWER_SYSTEM_TEMPLATE, |name| match name {
        "company" => Some(or_placeholder(Some(config.company.as_str()))),
        "position" => Some(or_placeholder(Some(config.position.as_str()))),
        "interview_type" => Some(or_placeholder(config.interview_type.as_deref())),
        "resume_text" => Some(document_field(config.resume_text.as_deref())),
        "jd_text" => Some(document_field(config.job_description_text.as_deref())),
        _ => None,
    })
}

/// Substitutes `{name}` tokens in one left-to-right pass. Inserted values are never
/// rescanned, and tokens `lookup` does not know are copied through unchanged.
fn render_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after
            .find('}')
            .and_then(|close| lookup(&after[..close]).map(|value| (close, value)))
        {
            Some((close, value)) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

fn document_field(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => truncate_chars(t, DOCUMENT_CHAR_BUDGET).to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

/// Cuts `text` to at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
