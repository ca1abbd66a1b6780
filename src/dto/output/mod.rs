mod aggregate_view;
mod notification_event;

pub use aggregate_view::*;
pub use notification_event::*;
