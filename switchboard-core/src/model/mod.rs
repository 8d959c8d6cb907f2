mod close_code;
mod join;
mod message;
mod participant;
mod room;

pub use close_code::*;
pub use join::*;
pub use message::*;
pub use participant::*;
pub use room::*;
