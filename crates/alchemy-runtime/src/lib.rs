//! Alchemy Runtime
//!
//! This crate runs the compiler behind an async front door for editors and
//! file watchers, where sources change faster than they compile.
//!
//! # Features
//!
//! - Generation-numbered submissions; a newer one cancels the in-flight compile
//! - Queue draining so only the newest pending source is compiled
//! - Content hashing to skip sources identical to the last published one
//! - Compiles on the blocking pool, results on a `watch` channel
//!
//! # Usage
//!
//! ```rust,ignore
//! use alchemy_dsl::Compiler;
//! use alchemy_runtime::CompileService;
//!
//! let service = CompileService::spawn(Compiler::default());
//! let mut reports = service.subscribe();
//!
//! service.submit(source);
//! reports.changed().await?;
//! let report = reports.borrow().clone();
//!
//! let compiler = service.shutdown().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod jobs;

pub use engine::{CompileReport, CompileService, ServiceStats};
pub use error::{Result, ServiceError};
pub use jobs::{CompileJob, JobMetadata};
