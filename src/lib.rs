//! roomchat library.
//!
//! The message pipeline behind the terminal client: classification, attachment
//! encoding, composition, transport bridging, ordered history and rendering.

pub mod bridge;
pub mod classifier;
pub mod commands;
pub mod composer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod history;
pub mod input_state;
pub mod logging;
pub mod protocol;
pub mod renderer;
pub mod session;
pub mod transport;
pub mod validation;


pub use error::{ChatError, EncodingError, TransportError};
pub use protocol::{ContentType, MessageRecord};
pub use session::ChatSession;
