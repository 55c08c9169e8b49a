//! Session state tracked for the lifetime of one connection.

mod isupport;
mod state;

pub use self::isupport::ServerOptions;
pub use self::state::{Channel, SessionState, TrackedUser};
