//! Requirements document domain module.
//!
//! # Module Structure
//!
//! - `model`: Document snapshot types (`RequirementsDocument`, `RequirementItem`,
//!   `DocumentSection`, `Artifacts`)
//! - `mapper`: Pure mapping from a document snapshot to display sections

mod mapper;
mod model;

// Re-export public API
pub use mapper::map_to_sections;
pub use model::{Artifacts, DocumentSection, RequirementItem, RequirementsDocument};
