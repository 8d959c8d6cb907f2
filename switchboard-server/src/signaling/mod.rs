mod connection;
mod ws_handler;

pub use connection::*;
pub use ws_handler::*;
