//! Alert receiver - LLM-assisted root-cause analysis for alert webhooks
//!
//! Accepts alert-group webhooks, admits them into a bounded queue, and lets a
//! fixed worker pool enrich each job with Prometheus evidence before fanning
//! a single prompt out to every configured LLM backend. Completed analyses
//! are kept in a small newest-first store.

pub mod agent;
pub mod alert;
pub mod api;
pub mod cli;
pub mod config;
pub mod evidence;
pub mod fanout;
pub mod logging;
pub mod metrics;
pub mod prompt;
pub mod queue;
pub mod store;
pub mod worker;
