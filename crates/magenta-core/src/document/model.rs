//! Requirements document domain model.
//!
//! The backend owns the authoritative document; the client treats every
//! received document as an immutable snapshot that replaces the previous
//! one wholesale. Nothing here is ever patched field-by-field.

use serde::{Deserialize, Serialize};

/// A single requirement captured during the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// High, Medium, Low
    pub priority: String,
    /// Draft, Approved, etc.
    pub status: String,
}

/// The backend-shaped requirements document.
///
/// This mirrors the chat service's `RequirementsDocument` DTO one-to-one.
/// List fields default to empty so a partially-filled document from an
/// early interview step still deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsDocument {
    pub project_name: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub business_rules: Vec<String>,
    #[serde(default)]
    pub kpi: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<RequirementItem>,
    #[serde(default)]
    pub diagram_mermaid: Option<String>,

    /// Document header fields.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_document_status")]
    pub document_status: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_document_status() -> String {
    "DRAFT".to_string()
}

fn default_author() -> String {
    "AI Business Analyst".to_string()
}

impl RequirementsDocument {
    /// Formats the display version string, e.g. `v1.0 (DRAFT)`.
    pub fn display_version(&self) -> String {
        format!("v{} ({})", self.version, self.document_status)
    }
}

/// One renderable section of the live document.
///
/// Sections are always derived from a [`RequirementsDocument`] by the
/// mapper and never independently mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub id: String,
    pub title: String,
    /// Markdown content.
    pub content: String,
}

/// View-facing document state derived from the latest requirements snapshot.
///
/// Replaced wholesale whenever a turn carries a new document; restored to
/// its default on session reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub doc_title: String,
    pub doc_version: String,
    pub sections: Vec<DocumentSection>,
    pub diagram_code: String,
}

impl Default for Artifacts {
    fn default() -> Self {
        Self {
            doc_title: "New document".to_string(),
            doc_version: "DRAFT v0.1".to_string(),
            sections: Vec::new(),
            diagram_code: String::new(),
        }
    }
}
