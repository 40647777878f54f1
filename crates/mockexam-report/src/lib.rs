//! mockexam-report — Self-contained HTML rendering of scored mock exam attempts.

pub mod html;

pub use html::{generate_html, write_html_report};
