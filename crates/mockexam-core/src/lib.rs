//! mockexam-core — Blueprint-weighted mock exam generation and scoring.
//!
//! This crate defines the exam data model, the seeded generator that samples
//! a question pool against a certification blueprint, and the scorer that
//! turns a set of answers into a scaled result with study recommendations.

pub mod blueprint;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod random;
pub mod report;
pub mod scale;
pub mod scorer;
