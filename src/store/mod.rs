//! In-memory stores: session registry and per-session message logs.
//!
//! The two stores are independent; handlers hold both and are responsible
//! for keeping them consistent (a session create seeds its chat log).

pub mod chat;
pub mod session;

pub use chat::{ChatStore, Message, Role};
pub use session::{Session, SessionStore};
