use strum::AsRefStr;

///
/// Logical stream a connection or subscription belongs to.
/// Each stream owns its own socket, topic namespace and [crate::StreamState].
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr)]
pub enum StreamKind {
    #[strum(serialize = "order")]
    Order,
    #[strum(serialize = "chat")]
    Chat,
}
