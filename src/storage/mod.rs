//! Local persistence of uploader option overrides as a JSON document.

pub mod settings;
