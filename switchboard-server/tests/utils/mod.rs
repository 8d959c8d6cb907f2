pub mod fake_client;

pub use fake_client::*;
pub use test_room::*;
