mod dto;
mod socket_connection;
mod socket_connection_state_machine;
mod stream_link;
mod transport;

pub use dto::*;
pub use socket_connection::*;
pub use stream_link::*;
pub use transport::*;
