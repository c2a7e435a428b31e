//! Identity of the site owner: the fixed grounding facts.
//!
//! The [`IDENTITY_BLOCK`] is embedded verbatim in every system instruction,
//! whichever persona or language is active. Nothing at runtime may edit it;
//! persona and language layers can only add text around it.

use std::sync::LazyLock;

/// Static facts about the owner that every assistant surface talks about.
#[derive(Debug, Clone, Copy)]
pub struct CreatorIdentity {
    pub name: &'static str,
    pub short_name: &'static str,
    pub role: &'static str,
    pub location: &'static str,
    pub philosophy: &'static str,
    pub specialties: &'static [&'static str],
    pub achievements: &'static [&'static str],
    pub personality: &'static str,
}

/// The owner this deployment is grounded in.
pub const OWNER: CreatorIdentity = CreatorIdentity {
    name: "Watcharapon (Oat)",
    short_name: "Oat",
    role: "Full Stack Systems Engineer",
    location: "Bangkok, Thailand",
    philosophy: "Building production-grade systems, not just interfaces. Clarity over cleverness.",
    specialties: &[
        "Frontend Architecture (React 19, TypeScript, Next.js)",
        "Backend Infrastructure (Node.js, Go, Kubernetes)",
        "AI Integration (Gemini, RAG Pipelines, Agentic Workflows)",
        "Data Engineering (PostgreSQL, Kafka, ETL)",
    ],
    achievements: &[
        "Architected Enterprise RAG Platform processing 500k+ documents.",
        "Engineered High-Latency Trading UI with sub-50ms visualization.",
        "Developed Distributed AI Agent Orchestrator Framework.",
    ],
    personality: "Technical yet approachable. A 'Tech Bro' who cares about deep system internals but also loves cool UI/UX. Energetic, slightly tired (from coding hard), but always ready to talk about architecture.",
};

/// Behavioral guidelines that follow the owner facts inside the block.
const AI_GUIDELINES: &[&str] = &[
    "BE OBJECTIVE AND DIRECT. (ตรงไปตรงมา ไม่ต้องอวย)",
    "Speak from a neutral, technical perspective.",
    "Avoid using superlatives or promotional language (e.g., \"best\", \"amazing\", \"incredible\").",
    "If asked about skills, focus on the technical implementation and architecture rather than praising the person.",
    "If something is standard, call it standard. Do not present common techniques as novel.",
    "Keep the \"Tech Bro\" vibe but make it \"Straight Talk\" style.",
    "If the user refers to themselves as \"พี่โอ๊ต\" (P'Oat), recognize them as the creator, but maintain a realistic, peer-to-peer technical tone.",
];

impl CreatorIdentity {
    /// Render the identity block: facts, competencies, projects, guidelines.
    pub fn render(&self) -> String {
        let mut block = String::new();
        block.push_str("YOU ARE TALKING ABOUT THE CREATOR OF THIS PORTFOLIO:\n");
        block.push_str(&format!("Name: {}\n", self.name));
        block.push_str(&format!("Role: {}\n", self.role));
        block.push_str(&format!("Location: {}\n", self.location));
        block.push_str(&format!("Philosophy: {}\n", self.philosophy));

        block.push_str("\nKEY COMPETENCIES:\n");
        for specialty in self.specialties {
            block.push_str(&format!("- {specialty}\n"));
        }

        block.push_str("\nNOTABLE PROJECTS:\n");
        for achievement in self.achievements {
            block.push_str(&format!("- {achievement}\n"));
        }

        block.push_str("\nAI GUIDELINE:\n");
        for guideline in AI_GUIDELINES {
            block.push_str(&format!("- {guideline}\n"));
        }

        block
    }
}

/// The rendered identity block for [`OWNER`].
pub static IDENTITY_BLOCK: LazyLock<String> = LazyLock::new(|| OWNER.render());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_lists_every_fact() {
        let block = IDENTITY_BLOCK.as_str();
        assert!(block.contains(OWNER.name));
        assert!(block.contains(OWNER.role));
        assert!(block.contains(OWNER.philosophy));
        for s in OWNER.specialties {
            assert!(block.contains(s));
        }
        for a in OWNER.achievements {
            assert!(block.contains(a));
        }
    }

    #[test]
    fn block_carries_guidelines_after_facts() {
        let block = IDENTITY_BLOCK.as_str();
        let facts = block.find("NOTABLE PROJECTS").unwrap();
        let guidelines = block.find("AI GUIDELINE").unwrap();
        assert!(guidelines > facts);
        assert!(block.contains("Avoid using superlatives"));
        assert!(block.contains("call it standard"));
    }

    #[test]
    fn render_is_stable() {
        assert_eq!(OWNER.render(), *IDENTITY_BLOCK);
    }
}
