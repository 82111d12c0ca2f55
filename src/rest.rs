use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::PlatformError;
use crate::models::{
    Channel, Community, CreateChannel, CreateEmoji, CreateRole, CurrentUser, EditCommunity, Emoji,
    EntityId, Role,
};
use crate::platform::PlatformApi;

/// reqwest-backed client for the platform's HTTP API.
pub struct RestClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Authorization", &self.token)
    }

    /// Turn non-2xx responses into `PlatformError::Api` with the body as
    /// the message (the platform sends JSON error descriptions).
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// The gateway's websocket URL, discovered through the REST API.
    pub async fn gateway_url(&self) -> Result<String, PlatformError> {
        #[derive(serde::Deserialize)]
        struct Gateway {
            url: String,
        }
        let gw: Gateway = self.get_json("/gateway").await?;
        Ok(gw.url)
    }

    /// Identity of the authenticated account.
    pub async fn current_user(&self) -> Result<CurrentUser, PlatformError> {
        self.get_json("/users/@me").await
    }
}

fn image_data_uri(bytes: &Bytes) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[async_trait]
impl PlatformApi for RestClient {
    async fn fetch_community(&self, id: EntityId) -> Result<Community, PlatformError> {
        self.get_json(&format!("/guilds/{id}")).await
    }

    async fn list_roles(&self, community: EntityId) -> Result<Vec<Role>, PlatformError> {
        self.get_json(&format!("/guilds/{community}/roles")).await
    }

    async fn create_role(
        &self,
        community: EntityId,
        role: &CreateRole,
    ) -> Result<Role, PlatformError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/guilds/{community}/roles"))
            .json(role)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_role(
        &self,
        community: EntityId,
        role: EntityId,
    ) -> Result<(), PlatformError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/guilds/{community}/roles/{role}"),
            )
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_channels(&self, community: EntityId) -> Result<Vec<Channel>, PlatformError> {
        self.get_json(&format!("/guilds/{community}/channels")).await
    }

    async fn create_channel(
        &self,
        community: EntityId,
        channel: &CreateChannel,
    ) -> Result<Channel, PlatformError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/guilds/{community}/channels"),
            )
            .json(channel)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_channel(&self, channel: EntityId) -> Result<(), PlatformError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/channels/{channel}"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_emojis(&self, community: EntityId) -> Result<Vec<Emoji>, PlatformError> {
        self.get_json(&format!("/guilds/{community}/emojis")).await
    }

    async fn create_emoji(
        &self,
        community: EntityId,
        emoji: &CreateEmoji,
    ) -> Result<Emoji, PlatformError> {
        let body = json!({
            "name": emoji.name,
            "image": image_data_uri(&emoji.image),
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/guilds/{community}/emojis"),
            )
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn edit_community(
        &self,
        community: EntityId,
        edit: &EditCommunity,
    ) -> Result<(), PlatformError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &edit.name {
            body.insert("name".into(), json!(name));
        }
        if let Some(icon) = &edit.icon {
            body.insert("icon".into(), json!(image_data_uri(icon)));
        }
        let response = self
            .request(reqwest::Method::PATCH, &format!("/guilds/{community}"))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn send_message(&self, channel: EntityId, content: &str) -> Result<(), PlatformError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/channels/{channel}/messages"),
            )
            .json(&json!({ "content": content }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, PlatformError> {
        // Plain unauthenticated fetch — image URLs point at the CDN, not
        // the API, so no token is attached.
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_encodes_png_prefix() {
        let uri = image_data_uri(&Bytes::from_static(b"\x89PNG"));
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with("iVBORw=="));
    }
}
