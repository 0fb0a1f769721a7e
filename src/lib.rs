//! Postmortem documents and incident meetings on third-party platforms.
//!
//! Postmortems are created from a template on Notion (page blocks) or awork
//! (HTML documents); incident bridges are Zoom meetings.

pub mod config;
pub mod error;
pub mod integrations;
pub mod models;
pub mod postmortem;

pub use error::{AppError, Result};
