use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::PlatformError;
use crate::models::{
    Channel, Community, CreateChannel, CreateEmoji, CreateRole, EditCommunity, Emoji, EntityId,
    Role,
};

/// Remote platform surface the replication engine runs against.
///
/// The production implementation is `rest::RestClient`; integration tests
/// substitute an in-memory fake. Every method maps to exactly one remote
/// call — no caching, no retries at this layer.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn fetch_community(&self, id: EntityId) -> Result<Community, PlatformError>;

    async fn list_roles(&self, community: EntityId) -> Result<Vec<Role>, PlatformError>;

    async fn create_role(
        &self,
        community: EntityId,
        role: &CreateRole,
    ) -> Result<Role, PlatformError>;

    async fn delete_role(&self, community: EntityId, role: EntityId)
        -> Result<(), PlatformError>;

    async fn list_channels(&self, community: EntityId) -> Result<Vec<Channel>, PlatformError>;

    async fn create_channel(
        &self,
        community: EntityId,
        channel: &CreateChannel,
    ) -> Result<Channel, PlatformError>;

    async fn delete_channel(&self, channel: EntityId) -> Result<(), PlatformError>;

    async fn list_emojis(&self, community: EntityId) -> Result<Vec<Emoji>, PlatformError>;

    async fn create_emoji(
        &self,
        community: EntityId,
        emoji: &CreateEmoji,
    ) -> Result<Emoji, PlatformError>;

    async fn edit_community(
        &self,
        community: EntityId,
        edit: &EditCommunity,
    ) -> Result<(), PlatformError>;

    /// Post a plain text message to a channel.
    async fn send_message(&self, channel: EntityId, content: &str) -> Result<(), PlatformError>;

    /// Image-fetch collaborator: raw bytes from a URL (emoji images, icons).
    async fn fetch_image(&self, url: &str) -> Result<Bytes, PlatformError>;
}
