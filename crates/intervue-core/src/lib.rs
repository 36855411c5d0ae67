//! intervue-core — Scoring, question selection and the interview session engine.
//!
//! This crate defines the data model, the keyword evaluator and score
//! aggregation, the session state machine and the async driver that runs
//! it against an [`traits::InterviewStore`].

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod selector;
pub mod session;
pub mod statistics;
pub mod text;
pub mod traits;
