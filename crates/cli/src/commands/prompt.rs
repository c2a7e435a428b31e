//! `groundwell prompt`: print the assembled system instruction.
//!
//! Without `--language` this is exactly what the text surface sends,
//! recalled memory included. With it, the spoken-session instruction
//! (language override appended, no memory) is printed instead.

use groundwell_agent::{InstructionAssembler, PersonaRegistry};

pub fn run(language: Option<&str>, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let clock = super::clock(&config);
    let personas = PersonaRegistry::from_config(&config.personas)?;
    let persona = personas.resolve(&config.session.persona);

    let mut profile = super::user_profile(&config);
    if let Some(name) = user {
        profile.name = Some(name.to_string());
    }

    let assembler = InstructionAssembler::new(clock.clone());
    let instruction = match language {
        Some(flag) => {
            let language = super::language(&config, Some(flag))?;
            assembler.build_system_instruction(persona, &profile, Some(language))
        }
        None => {
            let memory = super::memory(&config, clock);
            assembler.build_with_memory(persona, &profile, None, &memory.recall())
        }
    };

    println!("{instruction}");
    Ok(())
}
