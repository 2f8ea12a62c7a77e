//! The static list of mAI models the recommendation workflow chooses from.

use std::sync::OnceLock;

/// One selectable model and its one-line capability description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub identifier: &'static str,
    pub description: &'static str,
}

/// Read-only, ordered catalog of models. Identifiers are unique.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

const BUILTIN: &[(&str, &str)] = &[
    (
        "m-4.0",
        "The general-purpose model for simple, fast everyday tasks (Everyday).",
    ),
    (
        "m-4.3-mini",
        "The lightest, most efficient and fastest model for short, focused requests (Eco).",
    ),
    (
        "m-4.5 Pro",
        "The professional model, expert in precision, complex data analysis and logical reasoning (Professional).",
    ),
    (
        "m-4.7o",
        "The versatile, precise model that handles long conversations and creative content (Precise).",
    ),
    (
        "m-4.9+",
        "The flagship, the fastest and most capable model for the best result on any short task (Fast).",
    ),
];

static CATALOG: OnceLock<ModelCatalog> = OnceLock::new();

impl ModelCatalog {
    /// The process-wide built-in catalog, initialized on first use.
    pub fn builtin() -> &'static ModelCatalog {
        CATALOG.get_or_init(|| ModelCatalog {
            entries: BUILTIN
                .iter()
                .map(|&(identifier, description)| ModelEntry {
                    identifier,
                    description,
                })
                .collect(),
        })
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// `- identifier: description` lines, in catalog order.
    pub fn as_prompt_lines(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("- {}: {}", e.identifier, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
