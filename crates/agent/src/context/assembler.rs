//! System instruction assembly.
//!
//! The instruction is built from fixed layers in a fixed order:
//!
//! | # | Layer | Source |
//! |---|-------|--------|
//! | 1 | Framing | Persona name, owner framing, optional visitor name |
//! | 2 | Identity | [`IDENTITY_BLOCK`], verbatim |
//! | 3 | Personality | Persona personality text |
//! | 4 | Core behavior | Fixed straight-talk rules |
//! | 5 | Timestamp | Injected clock, locale date and minute time |
//! | 6 | Output rules | Fixed concise, no-repeat rules |
//! | 7 | Recent conversation | Recalled memory, when non-empty |
//! | 8 | Language override | Appended last, when selected |
//!
//! Layers may be added around the identity block but never replace it.

use std::sync::Arc;

use groundwell_core::clock::Clock;
use groundwell_core::identity::{IDENTITY_BLOCK, OWNER};
use groundwell_core::persona::{PersonaDescriptor, UserProfile};

use super::language::Language;

const IDENTITY_HEADER: &str = "--- CREATOR IDENTITY (BASE DATA) ---";
const IDENTITY_FOOTER: &str = "------------------------------------";

const CORE_BEHAVIOR: &str = "\
CORE BEHAVIOR:
- STRAIGHT TALK ONLY. (พูดตรงไปตรงมา ไม่ต้องอวย ไม่ต้องใช้คำเว่อร์)
- Be objective and technically grounded.
- If something is standard, call it standard. If it's complex, explain why without hype.
- Avoid promotional adjectives. Focus on architecture and implementation details.";

const OUTPUT_RULES: &str = "\
Output a thoughtful, objective response.
Do NOT use any emojis or pantomime text.
Keep it concise.
NEVER repeat things you've said before!";

const MEMORY_HEADER: &str = "RECENT CONVERSATION (oldest first):";

/// Builds system instructions for both the text and the live surfaces.
#[derive(Clone)]
pub struct InstructionAssembler {
    clock: Arc<dyn Clock>,
}

impl InstructionAssembler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Assemble the instruction for a persona, visitor and optional language.
    pub fn build_system_instruction(
        &self,
        persona: &PersonaDescriptor,
        user: &UserProfile,
        language: Option<Language>,
    ) -> String {
        self.build_with_memory(persona, user, language, "")
    }

    /// Like [`build_system_instruction`](Self::build_system_instruction),
    /// with recalled conversation placed before the language override.
    pub fn build_with_memory(
        &self,
        persona: &PersonaDescriptor,
        user: &UserProfile,
        language: Option<Language>,
        memory: &str,
    ) -> String {
        let visitor = match user.display_name() {
            Some(name) => format!(" named {name}"),
            None => String::new(),
        };

        let mut sections = vec![
            format!(
                "Your name is {} and you are the personal AI assistant of {}.\n\
                 You are currently in a conversation with a visitor{}.",
                persona.name, OWNER.name, visitor
            ),
            format!("{IDENTITY_HEADER}\n{}{IDENTITY_FOOTER}", IDENTITY_BLOCK.as_str()),
            format!("Your personality is {}.", persona.personality.trim_end_matches('.')),
            CORE_BEHAVIOR.to_string(),
            format!("Today's date is {}.", self.clock.locale_date_time()),
            OUTPUT_RULES.to_string(),
        ];

        let memory = memory.trim();
        if !memory.is_empty() {
            sections.push(format!("{MEMORY_HEADER}\n{memory}"));
        }

        let mut instruction = sections.join("\n\n");
        if let Some(language) = language {
            instruction.push_str(language.override_block());
        }
        instruction
    }
}

/// The user prompt sent to the service.
///
/// With augmentation it wraps retrieved context around the question;
/// without, it is the raw input.
pub fn build_prompt(input: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Context:\n{context}\n\nUser Question: {input}"),
        None => input.to_string(),
    }
}
