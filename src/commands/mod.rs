//! Host-facing entry points.
//!
//! Hosts initialize an uploader here, forward drag events to the returned
//! drop zone, and resolve dropped filesystem paths. Business logic lives in
//! `services`.

pub mod drop_zone;
pub mod files;
pub mod upload;
