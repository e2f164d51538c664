// Interview session setup: system prompt rendering, document uploads, and the HTTP handlers.

pub mod documents;
pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
