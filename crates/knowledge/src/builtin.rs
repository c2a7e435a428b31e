//! The site owner's built-in knowledge table.

use crate::KnowledgeSection;

/// Section returned when nothing in the table matches a query.
pub const FALLBACK_SECTION_ID: &str = "about";

fn section(id: &str, title: &str, content: &str, keywords: &[&str]) -> KnowledgeSection {
    KnowledgeSection {
        id: id.into(),
        title: title.into(),
        content: content.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Sections in definition order. Retrieval output follows this order.
pub fn sections() -> Vec<KnowledgeSection> {
    vec![
        section(
            "about",
            "About Watcharapon",
            "Watcharapon is a Senior Full Stack Systems Engineer based in Bangkok. He specializes in building robust, scalable applications that bridge the gap between complex backend logic and seamless user experiences.",
            &["who", "biography", "background", "location", "bangkok"],
        ),
        section(
            "philosophy",
            "Engineering Philosophy",
            "Watcharapon's core philosophy includes: 1. Clarity over Cleverness (prioritizing readable and maintainable code). 2. Impact-Driven Engineering (ensuring technical decisions serve user needs and business goals).",
            &["philosophy", "coding style", "principles", "thinking"],
        ),
        section(
            "skills-core",
            "Core Technical Skills",
            "Expertise in React, TypeScript, Node.js, Kubernetes, Google Cloud, Python, LangChain, Pinecone, Next.js, and Gemini API.",
            &["skills", "languages", "tools", "stack", "tech"],
        ),
        section(
            "projects-rag",
            "Project: Enterprise RAG Platform",
            "Watcharapon architected a retrieval-augmented generation system for legal discovery. He engineered a custom vector processing pipeline that achieved a 94% reduction in document retrieval time. Tech: Python, LangChain, Pinecone, Next.js.",
            &["project", "rag", "enterprise", "legal", "vector"],
        ),
        section(
            "projects-trading",
            "Project: High-Latency Trading UI",
            "Senior UI Engineer for a high-frequency trading interface. Optimized sub-50ms data visualization latency using WebSockets and custom V8-optimized rendering. Tech: React, D3.js, Rust.",
            &["trading", "hft", "websocket", "latency", "performance"],
        ),
        section(
            "projects-orchestrator",
            "Project: AI Agent Orchestrator",
            "Developed a distributed framework for autonomous multi-agent task collaboration with self-healing agent routines. Tech: TypeScript, Docker, Gemini API.",
            &["agent", "ai", "orchestrator", "automation", "multi-agent"],
        ),
    ]
}
