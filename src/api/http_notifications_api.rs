use super::{HttpApiConfig, NotificationsApi};
use crate::{
    dto::{
        input::{OrderNotificationFrame, UnreadCountResponse},
        output::NotificationEvent,
    },
    error::Error,
};
use async_trait::async_trait;

pub struct HttpNotificationsApi {
    config: HttpApiConfig,
    client: reqwest::Client,
}

impl HttpNotificationsApi {
    pub fn new(config: HttpApiConfig) -> Self {
        let client = reqwest::Client::new();

        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

#[async_trait]
impl NotificationsApi for HttpNotificationsApi {
    #[tracing::instrument(name = "Notifications API", skip_all)]
    async fn fetch_notifications(&self) -> Result<Vec<NotificationEvent>, Error> {
        tracing::debug!("fetching notification history");

        let frames = self
            .client
            .get(self.url("/notifications"))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<OrderNotificationFrame>>()
            .await?;

        tracing::debug!(count = frames.len(), "fetched notification history");

        Ok(frames.into_iter().map(NotificationEvent::from).collect())
    }

    #[tracing::instrument(name = "Notifications API", skip_all, fields(id))]
    async fn mark_read(&self, id: &str) -> Result<(), Error> {
        self.client
            .put(self.url(&format!("/notifications/{id}/read")))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    #[tracing::instrument(name = "Notifications API", skip_all)]
    async fn mark_all_read(&self) -> Result<(), Error> {
        self.client
            .put(self.url("/notifications/read-all"))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    #[tracing::instrument(name = "Notifications API", skip_all, fields(id))]
    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.client
            .delete(self.url(&format!("/notifications/{id}")))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    #[tracing::instrument(name = "Notifications API", skip_all)]
    async fn clear_all(&self) -> Result<(), Error> {
        self.client
            .delete(self.url("/notifications/clear-all"))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    #[tracing::instrument(name = "Notifications API", skip_all, fields(user_id))]
    async fn unread_chat_count(&self, user_id: &str) -> Result<usize, Error> {
        let response = self
            .client
            .get(self.url(&format!("/messages/user/{user_id}/unread-count")))
            .bearer_auth(&self.config.token)
            .send()
            .await?
            .error_for_status()?
            .json::<UnreadCountResponse>()
            .await?;

        Ok(response.count)
    }
}
