//! Postmortem Generation Module
//!
//! Instantiates a postmortem for an incident on a document platform:
//! check that the target exists, fetch the template, substitute incident
//! data, create a new resource and hand back its URL.
//!
//! # Components
//!
//! - [`render`]: placeholder substitution and the participant/timeline tables
//! - [`backend`]: the [`PostmortemBackend`] seam and its Notion and awork
//!   implementations
//! - [`generator`]: the create workflow, generic over a backend
//! - [`service`]: backend selection from configuration
//!
//! # Example
//!
//! ```no_run
//! use incident_postmortem::{config::Config, models::IncidentRecord, postmortem::PostmortemService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let service = PostmortemService::from_config(&config)?;
//!
//!     let incident = IncidentRecord {
//!         channel_id: "C024BE91L".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let url = service.create(&incident, &[], &[], "Checkout outage").await?;
//!     println!("Postmortem: {}", url);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod generator;
pub mod render;
pub mod service;

pub use backend::PostmortemBackend;
pub use generator::PostmortemGenerator;
pub use render::{render_template, PlaceholderMap, PostmortemContext};
pub use service::PostmortemService;
