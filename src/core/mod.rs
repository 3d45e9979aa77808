pub mod gemini;
pub mod prompt;
pub mod relay;
pub mod session;
pub mod tools;

// Re-export commonly used types for convenience
pub use gemini::{GeminiLiveConfig, SetupMessage, build_setup_message, connect_upstream};
pub use prompt::build_system_prompt;
pub use relay::{RelayError, RelayOutcome, RelayResult, relay};
pub use session::{SessionId, SessionProfile, SessionQuery};
pub use tools::{FunctionDeclaration, tool_manifest};
