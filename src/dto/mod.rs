pub mod input;
pub mod output;

mod notification_kind;
mod stream_kind;
mod user_identity;

pub use notification_kind::*;
pub use stream_kind::*;
pub use user_identity::*;
