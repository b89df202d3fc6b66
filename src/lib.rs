pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod github;
pub mod llm;
pub mod report;
pub mod rules;
pub mod service;
