pub mod openai;
pub mod provider;

pub use openai::OpenAIProvider;
pub use provider::LLMProvider;
