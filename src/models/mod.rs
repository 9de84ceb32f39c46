//! Data models shared across the crate: dropped files, drag events, upload
//! tasks and outcomes, and the uploader options.

pub mod event;
pub mod file;
pub mod options;
pub mod upload;
