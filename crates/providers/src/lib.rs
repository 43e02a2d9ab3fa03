//! LLM provider adapters for VerseGate.
//!
//! One trait, one wire format: any OpenAI-compatible chat completions API
//! (OpenRouter, OpenAI, Ollama, vLLM, LM Studio) serves both chat replies
//! and corpus embeddings.

pub mod openai_compat;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use openai_compat::OpenAiCompatProvider;
pub use traits::{
    ChatRequest, ChatResponse, EmbeddingsRequest, EmbeddingsResponse, LlmProvider, PromptMessage,
    Usage,
};
