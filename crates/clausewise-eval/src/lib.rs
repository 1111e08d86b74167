//! # clausewise-eval
//!
//! End-to-end answer quality evaluation for the Clausewise API.
//!
//! A run checks the service is alive, uploads fixture contracts, asks a
//! fixed question set one question at a time, scores each answer by
//! expected-keyword overlap and writes an [`EvalSummary`].
//!
//! ## Important
//!
//! The harness treats the API as a black box. It never calls the
//! extraction engine in `clausewise-core` directly; it only measures what
//! the service answers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clausewise_eval::{EvalConfig, Harness, HttpContractApi};
//!
//! let config = EvalConfig::from_yaml_file("eval/config.yaml")?;
//! let api = Arc::new(HttpContractApi::new(&config)?);
//! let summary = Harness::new(api, config).run().await?;
//! println!("{}", summary.one_line());
//! ```

pub mod client;
pub mod config;
pub mod harness;
pub mod questions;
pub mod scoring;
pub mod summary;

pub use client::{
    ApiError, ApiMetrics, AskResponse, ContractApi, HealthStatus, HttpContractApi, UploadFile,
};
pub use config::{ConfigError, EvalConfig, ScoringConfig, API_URL_ENV};
pub use harness::{Harness, HarnessError, NoopObserver, RunObserver, RunPhase};
pub use questions::{EvalQuestion, QuestionSet, QuestionSetError};
pub use scoring::{ScoreBreakdown, Scorer};
pub use summary::{EvalResult, EvalSummary, Grade};
