mod dto;
mod http_notifications_api;
mod notifications_api;

pub use dto::*;
pub use http_notifications_api::*;
pub use notifications_api::*;
