//! CLI output formatting utilities.
//!
//! A small, unified system for terminal output: consistent colors,
//! status symbols, headers, tables, and progress bars.

mod headers;
mod output;
mod progress;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{format_duration, print_summary_box};
pub use progress::create_progress_bar;
pub use status::{print_error, print_success, print_warning, Status};
pub use tables::print_package_table;
