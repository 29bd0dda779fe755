//! CLI commands

mod completions;
mod profile;
mod resign;
mod sdk;
mod tools;

pub use completions::CompletionsCommand;
pub use profile::ProfileCommand;
pub use resign::ResignCommand;
pub use sdk::SdkCommand;
pub use tools::ToolsCommand;
