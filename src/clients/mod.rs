pub mod openai;
pub mod traits;

pub use openai::OpenAiChatClient;
pub use traits::{CompletionRequest, SamplingParams, TextGenerator};
