#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use guild_mirror::config::AppConfig;
use guild_mirror::errors::PlatformError;
use guild_mirror::models::{
    Channel, ChannelKind, Community, CreateChannel, CreateEmoji, CreateRole, EditCommunity, Emoji,
    EntityId, PermissionOverwrite, Role,
};
use guild_mirror::platform::PlatformApi;

/// Config with test-appropriate defaults: zero pacing so runs finish fast.
pub fn test_config() -> AppConfig {
    AppConfig {
        token: "test-token".into(),
        api_base: "http://localhost".into(),
        allowed_operators: vec![EntityId(500)],
        delete_pause_ms: 0,
        create_pause_ms: 0,
        emoji_pause_ms: 0,
        gateway_reconnect_secs: 1,
        http_timeout_secs: 5,
    }
}

struct CommunityRecord {
    community: Community,
    roles: Vec<Role>,
    channels: Vec<Channel>,
    emojis: Vec<Emoji>,
}

#[derive(Default)]
struct FakeState {
    communities: HashMap<EntityId, CommunityRecord>,
    /// Messages posted per channel (reporting-channel sink).
    messages: HashMap<EntityId, Vec<String>>,
    /// URL → bytes served by the image collaborator.
    images: HashMap<String, Bytes>,
    /// Image bytes of every emoji created, in creation order.
    created_emoji_images: Vec<(String, Bytes)>,
    /// Every community edit, in order.
    edits: Vec<(EntityId, EditCommunity)>,
    /// Role names whose creation is rigged to fail.
    fail_role_names: HashSet<String>,
    /// When set, every delete call fails (simulates undeletable entities).
    fail_deletes: bool,
    /// When set, listing roles fails (simulates an unexpected API shape).
    fail_role_listing: bool,
}

/// In-memory stand-in for the remote platform. All state behind one mutex;
/// no await points while it is held.
pub struct FakePlatform {
    state: Mutex<FakeState>,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            next_id: AtomicU64::new(1000),
        }
    }

    fn fresh_id(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ── Seeding ────────────────────────────────────────

    pub fn add_community(&self, id: u64, name: &str, icon: Option<&str>) {
        let mut s = self.state.lock().unwrap();
        s.communities.insert(
            EntityId(id),
            CommunityRecord {
                community: Community {
                    id: EntityId(id),
                    name: name.into(),
                    icon: icon.map(Into::into),
                },
                roles: vec![Role {
                    id: EntityId(id),
                    name: "@everyone".into(),
                    color: 0,
                    permissions: 0,
                    hoist: false,
                    mentionable: false,
                    position: 0,
                    managed: false,
                }],
                channels: Vec::new(),
                emojis: Vec::new(),
            },
        );
    }

    pub fn add_role(&self, community: u64, id: u64, name: &str, position: i32, permissions: u64) {
        let mut s = self.state.lock().unwrap();
        s.communities
            .get_mut(&EntityId(community))
            .unwrap()
            .roles
            .push(Role {
                id: EntityId(id),
                name: name.into(),
                color: 0x5865F2,
                permissions,
                hoist: false,
                mentionable: true,
                position,
                managed: false,
            });
    }

    pub fn add_managed_role(&self, community: u64, id: u64, name: &str, position: i32) {
        self.add_role(community, id, name, position, 0);
        let mut s = self.state.lock().unwrap();
        let roles = &mut s.communities.get_mut(&EntityId(community)).unwrap().roles;
        roles.last_mut().unwrap().managed = true;
    }

    pub fn add_category(
        &self,
        community: u64,
        id: u64,
        name: &str,
        position: i32,
        overwrites: Vec<PermissionOverwrite>,
    ) {
        self.push_channel(community, Channel {
            id: EntityId(id),
            name: name.into(),
            kind: ChannelKind::Category,
            position,
            parent_id: None,
            topic: None,
            nsfw: false,
            rate_limit_per_user: None,
            bitrate: None,
            user_limit: None,
            permission_overwrites: overwrites,
        });
    }

    pub fn add_text_channel(
        &self,
        community: u64,
        id: u64,
        name: &str,
        position: i32,
        parent: Option<u64>,
        overwrites: Vec<PermissionOverwrite>,
    ) {
        self.push_channel(community, Channel {
            id: EntityId(id),
            name: name.into(),
            kind: ChannelKind::Text,
            position,
            parent_id: parent.map(EntityId),
            topic: Some("general talk".into()),
            nsfw: false,
            rate_limit_per_user: Some(5),
            bitrate: None,
            user_limit: None,
            permission_overwrites: overwrites,
        });
    }

    pub fn add_voice_channel(
        &self,
        community: u64,
        id: u64,
        name: &str,
        position: i32,
        parent: Option<u64>,
    ) {
        self.push_channel(community, Channel {
            id: EntityId(id),
            name: name.into(),
            kind: ChannelKind::Voice,
            position,
            parent_id: parent.map(EntityId),
            topic: None,
            nsfw: false,
            rate_limit_per_user: None,
            bitrate: Some(64_000),
            user_limit: Some(10),
            permission_overwrites: Vec::new(),
        });
    }

    fn push_channel(&self, community: u64, channel: Channel) {
        let mut s = self.state.lock().unwrap();
        s.communities
            .get_mut(&EntityId(community))
            .unwrap()
            .channels
            .push(channel);
    }

    pub fn add_emoji(&self, community: u64, id: u64, name: &str, image: &[u8]) {
        let emoji = Emoji {
            id: EntityId(id),
            name: name.into(),
        };
        let mut s = self.state.lock().unwrap();
        s.images
            .insert(emoji.image_url(), Bytes::copy_from_slice(image));
        s.communities
            .get_mut(&EntityId(community))
            .unwrap()
            .emojis
            .push(emoji);
    }

    pub fn add_image(&self, url: &str, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(url.into(), Bytes::copy_from_slice(bytes));
    }

    // ── Failure injection ──────────────────────────────

    pub fn fail_role_creation(&self, name: &str) {
        self.state.lock().unwrap().fail_role_names.insert(name.into());
    }

    pub fn fail_deletes(&self) {
        self.state.lock().unwrap().fail_deletes = true;
    }

    pub fn fail_role_listing(&self) {
        self.state.lock().unwrap().fail_role_listing = true;
    }

    // ── Inspection ─────────────────────────────────────

    pub fn community_name(&self, id: u64) -> String {
        self.state.lock().unwrap().communities[&EntityId(id)]
            .community
            .name
            .clone()
    }

    /// Roles in creation order, excluding the default role.
    pub fn roles_of(&self, community: u64) -> Vec<Role> {
        self.state.lock().unwrap().communities[&EntityId(community)]
            .roles
            .iter()
            .filter(|r| r.id != EntityId(community))
            .cloned()
            .collect()
    }

    pub fn channels_of(&self, community: u64) -> Vec<Channel> {
        self.state.lock().unwrap().communities[&EntityId(community)]
            .channels
            .clone()
    }

    pub fn emojis_of(&self, community: u64) -> Vec<Emoji> {
        self.state.lock().unwrap().communities[&EntityId(community)]
            .emojis
            .clone()
    }

    pub fn created_emoji_images(&self) -> Vec<(String, Bytes)> {
        self.state.lock().unwrap().created_emoji_images.clone()
    }

    pub fn edits_of(&self, community: u64) -> Vec<EditCommunity> {
        self.state
            .lock()
            .unwrap()
            .edits
            .iter()
            .filter(|(id, _)| *id == EntityId(community))
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn messages_in(&self, channel: u64) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(&EntityId(channel))
            .cloned()
            .unwrap_or_default()
    }
}

fn not_found() -> PlatformError {
    PlatformError::Api {
        status: 404,
        message: "Unknown entity".into(),
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn fetch_community(&self, id: EntityId) -> Result<Community, PlatformError> {
        let s = self.state.lock().unwrap();
        s.communities
            .get(&id)
            .map(|r| r.community.clone())
            .ok_or_else(not_found)
    }

    async fn list_roles(&self, community: EntityId) -> Result<Vec<Role>, PlatformError> {
        let s = self.state.lock().unwrap();
        if s.fail_role_listing {
            return Err(PlatformError::Api {
                status: 500,
                message: "listing exploded".into(),
            });
        }
        s.communities
            .get(&community)
            .map(|r| r.roles.clone())
            .ok_or_else(not_found)
    }

    async fn create_role(
        &self,
        community: EntityId,
        role: &CreateRole,
    ) -> Result<Role, PlatformError> {
        let id = self.fresh_id();
        let mut s = self.state.lock().unwrap();
        if s.fail_role_names.contains(&role.name) {
            return Err(PlatformError::Api {
                status: 403,
                message: format!("cannot create role {}", role.name),
            });
        }
        let record = s.communities.get_mut(&community).ok_or_else(not_found)?;
        let created = Role {
            id,
            name: role.name.clone(),
            color: role.color,
            permissions: role.permissions,
            hoist: role.hoist,
            mentionable: role.mentionable,
            position: record.roles.len() as i32,
            managed: false,
        };
        record.roles.push(created.clone());
        Ok(created)
    }

    async fn delete_role(
        &self,
        community: EntityId,
        role: EntityId,
    ) -> Result<(), PlatformError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_deletes {
            return Err(PlatformError::Api {
                status: 403,
                message: "role is protected".into(),
            });
        }
        let record = s.communities.get_mut(&community).ok_or_else(not_found)?;
        let before = record.roles.len();
        record.roles.retain(|r| r.id != role);
        if record.roles.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list_channels(&self, community: EntityId) -> Result<Vec<Channel>, PlatformError> {
        let s = self.state.lock().unwrap();
        s.communities
            .get(&community)
            .map(|r| r.channels.clone())
            .ok_or_else(not_found)
    }

    async fn create_channel(
        &self,
        community: EntityId,
        channel: &CreateChannel,
    ) -> Result<Channel, PlatformError> {
        let id = self.fresh_id();
        let mut s = self.state.lock().unwrap();
        let record = s.communities.get_mut(&community).ok_or_else(not_found)?;
        let created = Channel {
            id,
            name: channel.name.clone(),
            kind: channel.kind,
            position: channel.position,
            parent_id: channel.parent_id,
            topic: channel.topic.clone(),
            nsfw: channel.nsfw,
            rate_limit_per_user: channel.rate_limit_per_user,
            bitrate: channel.bitrate,
            user_limit: channel.user_limit,
            permission_overwrites: channel.permission_overwrites.clone(),
        };
        record.channels.push(created.clone());
        Ok(created)
    }

    async fn delete_channel(&self, channel: EntityId) -> Result<(), PlatformError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_deletes {
            return Err(PlatformError::Api {
                status: 403,
                message: "channel is protected".into(),
            });
        }
        for record in s.communities.values_mut() {
            let before = record.channels.len();
            record.channels.retain(|c| c.id != channel);
            if record.channels.len() != before {
                return Ok(());
            }
        }
        Err(not_found())
    }

    async fn list_emojis(&self, community: EntityId) -> Result<Vec<Emoji>, PlatformError> {
        let s = self.state.lock().unwrap();
        s.communities
            .get(&community)
            .map(|r| r.emojis.clone())
            .ok_or_else(not_found)
    }

    async fn create_emoji(
        &self,
        community: EntityId,
        emoji: &CreateEmoji,
    ) -> Result<Emoji, PlatformError> {
        let id = self.fresh_id();
        let mut s = self.state.lock().unwrap();
        let record = s.communities.get_mut(&community).ok_or_else(not_found)?;
        let created = Emoji {
            id,
            name: emoji.name.clone(),
        };
        record.emojis.push(created.clone());
        s.created_emoji_images
            .push((emoji.name.clone(), emoji.image.clone()));
        Ok(created)
    }

    async fn edit_community(
        &self,
        community: EntityId,
        edit: &EditCommunity,
    ) -> Result<(), PlatformError> {
        let mut s = self.state.lock().unwrap();
        let record = s.communities.get_mut(&community).ok_or_else(not_found)?;
        if let Some(name) = &edit.name {
            record.community.name = name.clone();
        }
        s.edits.push((community, edit.clone()));
        Ok(())
    }

    async fn send_message(&self, channel: EntityId, content: &str) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .messages
            .entry(channel)
            .or_default()
            .push(content.to_string());
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, PlatformError> {
        self.state
            .lock()
            .unwrap()
            .images
            .get(url)
            .cloned()
            .ok_or_else(not_found)
    }
}
