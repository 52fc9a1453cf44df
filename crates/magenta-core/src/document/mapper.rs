//! Deterministic mapping from a requirements document to display sections.
//!
//! The mapper is a pure function: same document in, same sections out.
//! It formats — it never reorders, deduplicates, or validates items.

use super::model::{DocumentSection, RequirementsDocument};

/// Literal placeholder rendered for absent or empty fields.
const NOT_SPECIFIED: &str = "_Not specified_";

/// Maps a requirements document to an ordered list of display sections.
///
/// Canonical section order: goal, scope, stakeholders, business rules,
/// then KPI and functional requirements — the last two only when their
/// source lists are non-empty. List-valued fields render as markdown
/// bullet lists; empty scalar or list fields render as `_Not specified_`.
pub fn map_to_sections(doc: &RequirementsDocument) -> Vec<DocumentSection> {
    let mut sections = vec![
        DocumentSection {
            id: "goal".to_string(),
            title: "Project goal".to_string(),
            content: format_scalar(&doc.goal),
        },
        DocumentSection {
            id: "scope".to_string(),
            title: "Solution scope".to_string(),
            content: format_list(&doc.scope),
        },
        DocumentSection {
            id: "stakeholders".to_string(),
            title: "Stakeholders".to_string(),
            content: format_list(&doc.stakeholders),
        },
        DocumentSection {
            id: "rules".to_string(),
            title: "Business rules and assumptions".to_string(),
            content: format_list(&doc.business_rules),
        },
    ];

    if !doc.kpi.is_empty() {
        sections.push(DocumentSection {
            id: "kpi".to_string(),
            title: "KPI and success metrics".to_string(),
            content: format_list(&doc.kpi),
        });
    }

    if !doc.requirements.is_empty() {
        let content = doc
            .requirements
            .iter()
            .map(|r| {
                format!(
                    "* **{} – {}**\n  - Priority: {}\n  - Status: {}\n  - Description: {}",
                    r.id, r.title, r.priority, r.status, r.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        sections.push(DocumentSection {
            id: "requirements".to_string(),
            title: "Functional requirements".to_string(),
            content,
        });
    }

    sections
}

fn format_scalar(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items
            .iter()
            .map(|item| format!("* {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::RequirementItem;

    fn empty_doc() -> RequirementsDocument {
        RequirementsDocument {
            project_name: "Test project".to_string(),
            goal: String::new(),
            scope: Vec::new(),
            stakeholders: Vec::new(),
            business_rules: Vec::new(),
            kpi: Vec::new(),
            requirements: Vec::new(),
            diagram_mermaid: None,
            version: "1.0".to_string(),
            document_status: "DRAFT".to_string(),
            author: "AI Business Analyst".to_string(),
            updated_at: String::new(),
        }
    }

    fn full_doc() -> RequirementsDocument {
        RequirementsDocument {
            goal: "Increase customer retention".to_string(),
            scope: vec!["Mobile app".to_string(), "Web banking".to_string()],
            stakeholders: vec!["Retail director".to_string()],
            business_rules: vec!["Cashback only for verified clients".to_string()],
            kpi: vec!["Retention +15%".to_string()],
            requirements: vec![RequirementItem {
                id: "REQ-1".to_string(),
                title: "Cashback balance".to_string(),
                description: "Client sees the current cashback balance.".to_string(),
                priority: "HIGH".to_string(),
                status: "DRAFT".to_string(),
            }],
            ..empty_doc()
        }
    }

    #[test]
    fn test_mapper_is_pure() {
        let doc = full_doc();
        assert_eq!(map_to_sections(&doc), map_to_sections(&doc));
    }

    #[test]
    fn test_section_order_with_all_fields() {
        let sections = map_to_sections(&full_doc());
        let ids: Vec<_> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["goal", "scope", "stakeholders", "rules", "kpi", "requirements"]
        );
    }

    #[test]
    fn test_empty_kpi_yields_no_kpi_section() {
        let sections = map_to_sections(&empty_doc());
        let ids: Vec<_> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["goal", "scope", "stakeholders", "rules"]);
    }

    #[test]
    fn test_single_kpi_renders_exact_bullet() {
        let mut doc = empty_doc();
        doc.kpi = vec!["Retention +15%".to_string()];
        let sections = map_to_sections(&doc);
        let kpi = sections.iter().find(|s| s.id == "kpi").unwrap();
        assert_eq!(kpi.content, "* Retention +15%");
    }

    #[test]
    fn test_empty_fields_render_placeholder() {
        let sections = map_to_sections(&empty_doc());
        for section in &sections {
            assert_eq!(section.content, "_Not specified_");
        }
    }

    #[test]
    fn test_requirement_item_formatting() {
        let sections = map_to_sections(&full_doc());
        let reqs = sections.iter().find(|s| s.id == "requirements").unwrap();
        assert_eq!(
            reqs.content,
            "* **REQ-1 – Cashback balance**\n  - Priority: HIGH\n  - Status: DRAFT\n  - Description: Client sees the current cashback balance."
        );
    }

    #[test]
    fn test_items_are_not_reordered_or_deduplicated() {
        let mut doc = empty_doc();
        doc.business_rules = vec![
            "b rule".to_string(),
            "a rule".to_string(),
            "a rule".to_string(),
        ];
        let sections = map_to_sections(&doc);
        let rules = sections.iter().find(|s| s.id == "rules").unwrap();
        assert_eq!(rules.content, "* b rule\n* a rule\n* a rule");
    }
}
