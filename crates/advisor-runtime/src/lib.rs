//! # advisor-runtime
//!
//! Concrete `RecommendationGenerator` backends:
//!
//! - [`HttpGenerator`] — talks to a remote recommendation service over
//!   JSON/HTTP.
//! - [`MockGenerator`] — deterministic in-process backend for tests and
//!   demos; derives one corrective trade per actionable analysis line.

pub mod http;
pub mod mock;

pub use http::{HttpGenerator, HttpGeneratorConfig};
pub use mock::MockGenerator;
