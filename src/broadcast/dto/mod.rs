mod tab_broadcaster_config;
mod tab_signal;

pub use tab_broadcaster_config::*;
pub use tab_signal::*;
