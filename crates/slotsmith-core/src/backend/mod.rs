//! Remote orchestration backend
//!
//! The backend runs the whole pipeline server-side and answers with a
//! [`PipelineResult`](crate::pipeline::PipelineResult) document. It is the
//! first tier tried.

mod client;

pub use client::{BackendClient, OptimizeRequest};
