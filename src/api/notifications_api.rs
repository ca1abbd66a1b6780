use crate::{dto::output::NotificationEvent, error::Error};
use async_trait::async_trait;

///
/// REST collaborator of the sync engine: history hydration and the
/// read/delete mutations that must reach the server.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// `GET /notifications`
    async fn fetch_notifications(&self) -> Result<Vec<NotificationEvent>, Error>;

    /// `PUT /notifications/{id}/read`
    async fn mark_read(&self, id: &str) -> Result<(), Error>;

    /// `PUT /notifications/read-all`
    async fn mark_all_read(&self) -> Result<(), Error>;

    /// `DELETE /notifications/{id}`
    async fn delete(&self, id: &str) -> Result<(), Error>;

    /// `DELETE /notifications/clear-all`
    async fn clear_all(&self) -> Result<(), Error>;

    /// `GET /messages/user/{id}/unread-count`
    async fn unread_chat_count(&self, user_id: &str) -> Result<usize, Error>;
}
