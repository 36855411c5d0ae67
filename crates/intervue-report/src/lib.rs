//! intervue-report — Interviewer dashboard rendering.

pub mod html;

pub use html::{generate_html, write_html_report};
