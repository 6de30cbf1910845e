//! Built-in tools available to the agent

mod edit_file;
mod fetch_url;
mod list_files;
mod read_file;
mod run_shell;
mod time_now;

pub use edit_file::EditFileTool;
pub use fetch_url::{DEFAULT_FETCH_TIMEOUT, FetchUrlTool, USER_AGENT};
pub use list_files::{ListFilesTool, MAX_LIST_ENTRIES};
pub use read_file::ReadFileTool;
pub use run_shell::{DEFAULT_SHELL_TIMEOUT, RunShellTool};
pub use time_now::TimeNowTool;
