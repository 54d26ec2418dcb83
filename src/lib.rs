//! contract-drafter — German freelance contracts from a five-stage LLM conversation.
//!
//! - `llm`: chat-completion client (OpenAI-compatible)
//! - `workflow`: stages, session, sequencer, output
//! - `config`: API key, endpoint and generation options
//! - `term`: terminal questions and progress display

pub mod config;
pub mod llm;
pub mod term;
pub mod workflow;
