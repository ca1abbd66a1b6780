mod event_handler;
mod subscription;
mod subscription_router;
mod topic;

pub use event_handler::*;
pub use subscription::*;
pub use subscription_router::*;
pub use topic::*;
