//! Sample sinks: the durable log file and the interactive console view.

pub mod console;
pub mod logfile;

pub use console::ConsoleDisplay;
pub use logfile::{format_log_line, SampleLog};
