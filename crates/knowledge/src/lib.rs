//! Keyword-indexed knowledge retrieval for Groundwell.
//!
//! The knowledge base is a small, immutable table of topic sections about
//! the site owner. Retrieval is plain substring matching without embeddings
//! or ranking:
//!
//! 1. Lower-case the query.
//! 2. A section is relevant if any keyword, or its lower-cased title,
//!    occurs as a substring of the query.
//! 3. Relevant sections are joined in table order, separated by a blank line.
//! 4. No match yields the fallback section, so callers never get empty context.
//!
//! Matching is substring-based, not token-based: the keyword `ai` matches
//! "expl**ai**n". That is the compatible behavior and is kept as-is.

pub mod builtin;

use std::collections::HashSet;
use std::path::Path;

use groundwell_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use builtin::FALLBACK_SECTION_ID;

/// Separator between concatenated section contents.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// A single topic section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSection {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KnowledgeSection {
    /// Whether this section is relevant to an already lower-cased query.
    fn matches(&self, query_lower: &str) -> bool {
        self.keywords.iter().any(|k| query_lower.contains(k.as_str()))
            || query_lower.contains(&self.title.to_lowercase())
    }
}

/// On-disk shape of a knowledge table.
#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default = "default_fallback")]
    fallback: String,
    sections: Vec<KnowledgeSection>,
}

fn default_fallback() -> String {
    FALLBACK_SECTION_ID.into()
}

/// An immutable, validated knowledge table.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    sections: Vec<KnowledgeSection>,
    fallback_index: usize,
}

impl KnowledgeBase {
    /// Validate and build a knowledge base.
    ///
    /// Ids must be unique and the fallback section must exist with
    /// non-empty content. Keywords are lower-cased; blank keywords are
    /// dropped because the empty string matches every query.
    pub fn new(
        sections: Vec<KnowledgeSection>,
        fallback_id: &str,
    ) -> Result<Self, KnowledgeError> {
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.id.as_str()) {
                return Err(KnowledgeError::DuplicateId(section.id.clone()));
            }
        }

        let fallback_index = sections
            .iter()
            .position(|s| s.id == fallback_id)
            .ok_or_else(|| KnowledgeError::MissingFallback(fallback_id.into()))?;

        if sections[fallback_index].content.trim().is_empty() {
            return Err(KnowledgeError::EmptyFallback(fallback_id.into()));
        }

        let sections = sections
            .into_iter()
            .map(|mut s| {
                s.keywords = s
                    .keywords
                    .into_iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                s
            })
            .collect();

        Ok(Self {
            sections,
            fallback_index,
        })
    }

    /// The built-in table about the site owner.
    ///
    /// # Panics
    ///
    /// Panics if the compiled-in table is malformed; that is a build defect.
    pub fn builtin() -> Self {
        Self::new(builtin::sections(), FALLBACK_SECTION_ID)
            .expect("built-in knowledge table must be valid")
    }

    /// Load a knowledge table from a TOML file with `[[sections]]` entries
    /// and an optional top-level `fallback` id (default `about`).
    pub fn load_from(path: &Path) -> Result<Self, KnowledgeError> {
        let read_err = |reason: String| KnowledgeError::Read {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
        let file: KnowledgeFile = toml::from_str(&content).map_err(|e| read_err(e.to_string()))?;

        let base = Self::new(file.sections, &file.fallback)?;
        debug!(path = %path.display(), sections = base.len(), "Knowledge table loaded");
        Ok(base)
    }

    /// All sections in definition order.
    pub fn sections(&self) -> &[KnowledgeSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The section returned when nothing matches.
    pub fn fallback(&self) -> &KnowledgeSection {
        &self.sections[self.fallback_index]
    }

    /// Relevant sections for a query, in table order. May be empty.
    pub fn matching(&self, query: &str) -> Vec<&KnowledgeSection> {
        let query_lower = query.to_lowercase();
        self.sections
            .iter()
            .filter(|s| s.matches(&query_lower))
            .collect()
    }

    /// Map a free-text query to grounding context. Never empty.
    pub fn retrieve(&self, query: &str) -> String {
        let relevant = self.matching(query);

        if relevant.is_empty() {
            debug!("No knowledge section matched, using fallback");
            return self.fallback().content.clone();
        }

        debug!(
            sections = ?relevant.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            "Knowledge sections matched"
        );

        relevant
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_of(kb: &KnowledgeBase, id: &str) -> String {
        kb.sections()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.content.clone())
            .unwrap()
    }

    #[test]
    fn builtin_table_is_valid() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.len(), 6);
        assert_eq!(kb.fallback().id, "about");
    }

    #[test]
    fn retrieve_is_never_empty() {
        let kb = KnowledgeBase::builtin();
        let queries = [
            "",
            " ",
            "zzz",
            "what projects has he built",
            "ภาษาไทย",
            "🦀🦀🦀",
            "RAG",
            "a",
            "\n\t",
            "SKILLS AND TOOLS",
        ];
        for q in queries {
            assert!(!kb.retrieve(q).is_empty(), "empty context for {q:?}");
        }
    }

    #[test]
    fn unmatched_queries_return_fallback() {
        let kb = KnowledgeBase::builtin();
        let fallback = kb.retrieve("");
        assert_eq!(fallback, content_of(&kb, "about"));
        for q in ["zzz", "qwerty", "12345", "ภาษาไทย"] {
            assert!(kb.matching(q).is_empty());
            assert_eq!(kb.retrieve(q), fallback);
        }
    }

    #[test]
    fn projects_query_matches_exact_keyword_set() {
        let kb = KnowledgeBase::builtin();
        let ids: Vec<&str> = kb
            .matching("what projects has he built")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        // Only "project" overlaps; the trading and orchestrator keywords do not.
        assert_eq!(ids, vec!["projects-rag"]);

        let context = kb.retrieve("what projects has he built");
        assert_eq!(context, content_of(&kb, "projects-rag"));
        assert!(!context.contains(&content_of(&kb, "projects-trading")));
    }

    #[test]
    fn multiple_matches_join_in_table_order() {
        let kb = KnowledgeBase::builtin();
        let context = kb.retrieve("Tell me about the TRADING project");
        let expected = format!(
            "{}\n\n{}",
            content_of(&kb, "projects-rag"),
            content_of(&kb, "projects-trading")
        );
        assert_eq!(context, expected);
    }

    #[test]
    fn substring_matching_false_positive_is_preserved() {
        let kb = KnowledgeBase::builtin();
        let ids: Vec<&str> = kb.matching("explain").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["projects-orchestrator"]);
    }

    #[test]
    fn title_inside_query_matches() {
        let kb = KnowledgeBase::new(
            vec![
                KnowledgeSection {
                    id: "about".into(),
                    title: "About".into(),
                    content: "fallback".into(),
                    keywords: vec!["nothing-matches-this".into()],
                },
                KnowledgeSection {
                    id: "garden".into(),
                    title: "Rooftop Garden".into(),
                    content: "Tomatoes and basil.".into(),
                    keywords: vec![],
                },
            ],
            "about",
        )
        .unwrap();
        assert_eq!(kb.retrieve("tell me about the ROOFTOP garden"), "fallback\n\nTomatoes and basil.");
        assert_eq!(kb.retrieve("rooftop garden"), "Tomatoes and basil.");
    }

    #[test]
    fn retrieve_is_deterministic() {
        let kb = KnowledgeBase::builtin();
        let q = "skills, philosophy and latency";
        assert_eq!(kb.retrieve(q), kb.retrieve(q));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut sections = builtin::sections();
        sections.push(sections[0].clone());
        assert!(matches!(
            KnowledgeBase::new(sections, "about"),
            Err(KnowledgeError::DuplicateId(id)) if id == "about"
        ));
    }

    #[test]
    fn missing_or_empty_fallback_rejected() {
        assert!(matches!(
            KnowledgeBase::new(builtin::sections(), "nope"),
            Err(KnowledgeError::MissingFallback(_))
        ));

        let mut sections = builtin::sections();
        sections[0].content = "  ".into();
        assert!(matches!(
            KnowledgeBase::new(sections, "about"),
            Err(KnowledgeError::EmptyFallback(_))
        ));
    }

    #[test]
    fn blank_keywords_are_dropped() {
        let mut sections = builtin::sections();
        sections[1].keywords.push(String::new());
        let kb = KnowledgeBase::new(sections, "about").unwrap();
        assert!(kb.matching("zzz").is_empty());
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.toml");
        std::fs::write(
            &path,
            r#"
fallback = "intro"

[[sections]]
id = "intro"
title = "Intro"
content = "General overview."
keywords = ["hello"]

[[sections]]
id = "rust"
title = "Rust Work"
content = "Systems work in Rust."
keywords = ["Rust", "Cargo"]
"#,
        )
        .unwrap();

        let kb = KnowledgeBase::load_from(&path).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.fallback().id, "intro");
        assert_eq!(kb.retrieve("I like cargo"), "Systems work in Rust.");
        assert_eq!(kb.retrieve("nothing"), "General overview.");
    }

    #[test]
    fn load_from_missing_file_is_read_error() {
        let err = KnowledgeBase::load_from(Path::new("/nonexistent/knowledge.toml")).unwrap_err();
        assert!(matches!(err, KnowledgeError::Read { .. }));
    }
}
