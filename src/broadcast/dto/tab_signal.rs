use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use uuid::Uuid;

///
/// Auth-identity fact synchronized between sibling tabs. The payload is
/// opaque to the broadcaster itself.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabEventKind {
    #[strum(serialize = "login")]
    Login,
    #[strum(serialize = "logout")]
    Logout,
    #[strum(serialize = "token-refresh")]
    TokenRefresh,
    #[strum(serialize = "user-update")]
    UserUpdate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabSignal {
    /// Tab that published the signal. A tab never hears its own signals.
    pub origin: Uuid,
    #[serde(rename = "type")]
    pub kind: TabEventKind,
    pub data: Option<serde_json::Value>,
}
