//! Business logic layer.
//!
//! Batch validation, the task queue, failure classification, progress
//! throttling and the sequential upload engine. Called by the `commands`
//! layer; delegates HTTP interactions to the `api` layer.

pub mod progress;
pub mod retry;
pub mod task_queue;
pub mod upload_engine;
pub mod validator;
