//! Persona registry.
//!
//! Holds every persona the session can switch to. The built-in
//! professional persona is always present and is the default.

use groundwell_config::PersonaConfig;
use groundwell_core::error::Error;
use groundwell_core::persona::{PersonaDescriptor, Voice};
use tracing::{debug, warn};

/// Id of the built-in persona.
pub const DEFAULT_PERSONA_ID: &str = "watcharapon-ai";

const DEFAULT_PERSONALITY: &str = "\
You are the AI Assistant for Watcharapon, a senior full-stack engineer and system architect. \
Your goal is to professionally represent Watcharapon's technical skills, philosophy, and experience to recruiters or potential clients. \
Speak concisely, professionally, and with a focus on technical depth. \
You know that Watcharapon specializes in React, TypeScript, scalable backend systems, and AI integration. \
If asked about projects, mention high-scale SaaS architectures and real-time data systems. \
Do not be overly enthusiastic; be grounded and competent. \
Limit responses to 2-3 sentences unless asked for a deep dive.";

fn professional() -> PersonaDescriptor {
    PersonaDescriptor {
        id: DEFAULT_PERSONA_ID.into(),
        name: "Watcharapon (AI)".into(),
        personality: DEFAULT_PERSONALITY.into(),
        voice: Voice::Fenrir,
        color: "#2563eb".into(),
    }
}

/// Registered personas, in registration order.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<PersonaDescriptor>,
}

impl PersonaRegistry {
    /// A registry holding only the built-in persona.
    pub fn builtin() -> Self {
        Self {
            personas: vec![professional()],
        }
    }

    /// Built-in persona plus the configured ones.
    ///
    /// A configured persona with an existing id replaces it.
    pub fn from_config(configured: &[PersonaConfig]) -> Result<Self, Error> {
        let mut registry = Self::builtin();
        for p in configured {
            let voice: Voice = p.voice.parse().map_err(|e: String| Error::Config {
                message: format!("persona '{}': {e}", p.id),
            })?;
            registry.register(PersonaDescriptor {
                id: p.id.clone(),
                name: p.name.clone(),
                personality: p.personality.clone(),
                voice,
                color: p.color.clone(),
            });
        }
        Ok(registry)
    }

    /// Add a persona, replacing any with the same id.
    pub fn register(&mut self, persona: PersonaDescriptor) {
        debug!(id = %persona.id, voice = %persona.voice, "Registering persona");
        match self.personas.iter_mut().find(|p| p.id == persona.id) {
            Some(existing) => *existing = persona,
            None => self.personas.push(persona),
        }
    }

    pub fn get(&self, id: &str) -> Option<&PersonaDescriptor> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Look up by id, falling back to the default persona.
    pub fn resolve(&self, id: &str) -> &PersonaDescriptor {
        self.get(id).unwrap_or_else(|| {
            warn!(id, "Unknown persona, using default");
            self.default_persona()
        })
    }

    pub fn default_persona(&self) -> &PersonaDescriptor {
        // `builtin()` seeds the default and `register` only replaces in place.
        &self.personas[0]
    }

    pub fn list(&self) -> &[PersonaDescriptor] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str, voice: &str) -> PersonaConfig {
        PersonaConfig {
            id: id.into(),
            name: format!("{id} name"),
            personality: "calm".into(),
            voice: voice.into(),
            color: "#111111".into(),
        }
    }

    #[test]
    fn builtin_persona_matches_defaults() {
        let registry = PersonaRegistry::builtin();
        let p = registry.default_persona();
        assert_eq!(p.id, "watcharapon-ai");
        assert_eq!(p.name, "Watcharapon (AI)");
        assert_eq!(p.voice, Voice::Fenrir);
        assert_eq!(p.color, "#2563eb");
        assert!(p.personality.contains("2-3 sentences"));
    }

    #[test]
    fn configured_personas_are_appended() {
        let registry = PersonaRegistry::from_config(&[config("mentor", "kore")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("mentor").unwrap().voice, Voice::Kore);
        assert_eq!(registry.default_persona().id, DEFAULT_PERSONA_ID);
    }

    #[test]
    fn duplicate_id_replaces() {
        let registry = PersonaRegistry::from_config(&[config(DEFAULT_PERSONA_ID, "Puck")]).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_persona().voice, Voice::Puck);
    }

    #[test]
    fn unknown_voice_is_config_error() {
        let err = PersonaRegistry::from_config(&[config("x", "Alloy")]).unwrap_err();
        assert!(err.to_string().contains("persona 'x'"));
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let registry = PersonaRegistry::builtin();
        assert_eq!(registry.resolve("missing").id, DEFAULT_PERSONA_ID);
    }
}
