//! Core data models for the image gallery service.
//!
//! These entities represent stored images and time-limited share links.
//! They serialize naturally as JSON via `serde`; the SQLite backend maps
//! them to rows in its own row types.

pub mod image;
pub mod share;
