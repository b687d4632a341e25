//! One module per backend translator (spec §4.2–§4.5). Each exposes a
//! `Translator` type implementing the four operations dispatched to by
//! `llm::Translator`.

pub mod bedrock;
pub mod completions;
pub mod gemini;
pub mod vertex_anthropic;
