mod dto;
mod tab_broadcaster;
mod transport;

pub use dto::*;
pub use tab_broadcaster::*;
pub use transport::{SignalPublisher, SignalReceiver};
