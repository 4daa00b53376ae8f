//! clin-core: clinical data access tools for the assistant.
//!
//! This crate turns natural-language-derived tool calls into requests
//! against the clinical data REST API and renders the results as text.
//! The pieces, leaves first: [`client`] wraps the HTTP API, [`args`]
//! repairs malformed tool-call arguments, [`resolve`] maps patient
//! references to internal ids, [`summary`] composes the partial-failure
//! patient report, and [`format`] renders records. [`tools`] is the
//! public operation surface the conversational front end invokes.

pub mod args;
pub mod client;
pub mod error;
pub mod format;
pub mod records;
pub mod resolve;
pub mod summary;
pub mod tools;

pub use client::ApiClient;
pub use error::{ApiError, ResolutionError};
pub use resolve::PatientReference;
pub use summary::{PatientSummary, Section, SectionBody};
