mod chat_message;
mod order_notification;
mod timestamp_millis;
mod unread_count;

pub use chat_message::*;
pub use order_notification::*;
pub use unread_count::*;
