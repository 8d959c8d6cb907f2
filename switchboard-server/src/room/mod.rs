mod lifecycle;
mod registry;
mod room;
mod session;
mod session_command;

pub use lifecycle::*;
pub use registry::*;
pub use room::*;
pub use session::*;
pub use session_command::*;
