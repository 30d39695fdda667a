//! Command router and session state for Parley.
//!
//! Classifies free-text messages with a keyword ladder, dispatches them to
//! external capabilities through [`CapabilityGateway`], and keeps a bounded
//! transcript of the conversation.

pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod parser;
pub mod replies;
pub mod router;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::SessionCoordinator;
pub use error::{CapabilityError, ParseError, RouteFailure};
pub use gateway::CapabilityGateway;
pub use parser::TextCommandParser;
pub use replies::CannedReplies;
pub use router::CommandRouter;
pub use session::{ConversationSession, DEFAULT_RETENTION};
pub use types::{Capability, ImageHandle, Intent, Joke, Message, RateTable, Speaker, Turn};
