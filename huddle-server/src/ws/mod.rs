//! WebSocket transport for chat sessions

mod connection;
pub mod protocol;

pub use connection::handle_socket;
pub use protocol::{ClientMessage, RegistrationRejection, ServerMessage};
