//! The grounding core of Groundwell.
//!
//! Both client surfaces share one pipeline:
//!
//! 1. **Assemble** the system instruction: persona, identity block,
//!    behavior rules, timestamp, recalled memory, language override
//! 2. **Retrieve** knowledge context for the visitor's question
//! 3. **Generate** a streamed answer, tracking the request lifecycle
//! 4. **Remember** completed turns in bounded memory
//!
//! The live surface reuses step 1 to push session configuration to a
//! duplex transport and greets once per connection.

pub mod app;
pub mod context;
pub mod live;
pub mod persona;
pub mod session;
pub mod stream_event;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::AppSession;
pub use context::{InstructionAssembler, Language, build_prompt};
pub use live::{LiveInputs, LiveSessionConfigurator};
pub use persona::{DEFAULT_PERSONA_ID, PersonaRegistry};
pub use session::{
    CancelFlag, ERROR_MESSAGE, GenerationController, GenerationOutcome, GenerationRequest,
};
pub use stream_event::GenerationEvent;
pub use trace::{InvalidTransition, RequestTrace, Stage};
