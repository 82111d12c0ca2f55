use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Identifiers ───────────────────────────────────────

/// Snowflake-style platform ID. The wire format is a decimal string
/// (the platform serializes 64-bit IDs as strings to survive JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(EntityId)
    }
}

impl From<u64> for EntityId {
    fn from(v: u64) -> Self {
        EntityId(v)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake ID as string or integer")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<EntityId, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<EntityId, E> {
                Ok(EntityId(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Permission bit-sets travel as decimal strings on the wire.
pub mod bits_as_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ─── Community ─────────────────────────────────────────

pub const CDN_BASE: &str = "https://cdn.discordapp.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    pub id: EntityId,
    pub name: String,
    /// Icon asset hash; `None` when the community has no custom icon.
    #[serde(default)]
    pub icon: Option<String>,
}

impl Community {
    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_ref()
            .map(|hash| format!("{CDN_BASE}/icons/{}/{hash}.png?size=1024", self.id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: EntityId,
    pub username: String,
}

// ─── Roles ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub color: u32,
    #[serde(with = "bits_as_string")]
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
    pub position: i32,
    /// Platform-managed roles (integrations, bots) cannot be deleted or copied.
    #[serde(default)]
    pub managed: bool,
}

impl Role {
    /// The default role shares its ID with the community itself.
    pub fn is_default(&self, community_id: EntityId) -> bool {
        self.id == community_id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRole {
    pub name: String,
    pub color: u32,
    #[serde(with = "bits_as_string")]
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
}

// ─── Channels ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Other(u8),
}

impl ChannelKind {
    pub fn from_wire(v: u8) -> Self {
        match v {
            0 => ChannelKind::Text,
            2 => ChannelKind::Voice,
            4 => ChannelKind::Category,
            other => ChannelKind::Other(other),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            ChannelKind::Text => 0,
            ChannelKind::Voice => 2,
            ChannelKind::Category => 4,
            ChannelKind::Other(v) => v,
        }
    }
}

impl Serialize for ChannelKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for ChannelKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ChannelKind::from_wire(u8::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    /// Slow-mode interval in seconds (text channels).
    #[serde(default)]
    pub rate_limit_per_user: Option<u32>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub nsfw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u32>,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    /// A bare category: no parent, no text/voice attributes.
    pub fn category(name: String, position: i32, overwrites: Vec<PermissionOverwrite>) -> Self {
        Self {
            name,
            kind: ChannelKind::Category,
            position,
            parent_id: None,
            topic: None,
            nsfw: false,
            rate_limit_per_user: None,
            bitrate: None,
            user_limit: None,
            permission_overwrites: overwrites,
        }
    }
}

// ─── Permission Overwrites ─────────────────────────────

/// Who a channel overwrite applies to. Role subjects are only meaningful
/// within their own community; member IDs are shared across communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteTarget {
    Role(EntityId),
    Member(EntityId),
}

impl OverwriteTarget {
    pub fn id(&self) -> EntityId {
        match *self {
            OverwriteTarget::Role(id) | OverwriteTarget::Member(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OverwriteWire", into = "OverwriteWire")]
pub struct PermissionOverwrite {
    pub target: OverwriteTarget,
    pub allow: u64,
    pub deny: u64,
}

/// Wire shape: `{"id": "...", "type": 0|1, "allow": "...", "deny": "..."}`
/// where type 0 is a role subject and 1 is a member subject.
#[derive(Serialize, Deserialize)]
struct OverwriteWire {
    id: EntityId,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(with = "bits_as_string")]
    allow: u64,
    #[serde(with = "bits_as_string")]
    deny: u64,
}

impl From<OverwriteWire> for PermissionOverwrite {
    fn from(w: OverwriteWire) -> Self {
        let target = if w.kind == 1 {
            OverwriteTarget::Member(w.id)
        } else {
            OverwriteTarget::Role(w.id)
        };
        PermissionOverwrite {
            target,
            allow: w.allow,
            deny: w.deny,
        }
    }
}

impl From<PermissionOverwrite> for OverwriteWire {
    fn from(o: PermissionOverwrite) -> Self {
        let (id, kind) = match o.target {
            OverwriteTarget::Role(id) => (id, 0),
            OverwriteTarget::Member(id) => (id, 1),
        };
        OverwriteWire {
            id,
            kind,
            allow: o.allow,
            deny: o.deny,
        }
    }
}

// ─── Emojis ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Emoji {
    pub id: EntityId,
    pub name: String,
}

impl Emoji {
    pub fn image_url(&self) -> String {
        format!("{CDN_BASE}/emojis/{}.png", self.id)
    }
}

/// Emoji creation payload. The image travels as raw bytes here; the REST
/// layer encodes it into the data-URI form the platform expects.
#[derive(Debug, Clone)]
pub struct CreateEmoji {
    pub name: String,
    pub image: Bytes,
}

// ─── Community Edits ───────────────────────────────────

/// Partial community update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EditCommunity {
    pub name: Option<String>,
    pub icon: Option<Bytes>,
}

// ─── Inbound Messages ──────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub channel_id: EntityId,
    pub author: MessageAuthor,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageAuthor {
    pub id: EntityId,
    #[serde(default)]
    pub bot: bool,
}
