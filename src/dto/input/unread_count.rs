use serde::Deserialize;

///
/// Response of `GET /messages/user/{id}/unread-count`.
///
#[derive(Debug, Deserialize)]
pub struct UnreadCountResponse {
    pub count: usize,
}
