use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::sleep;

use crate::config::AppConfig;
use crate::errors::{CloneError, CloneResult};
use crate::models::{
    ChannelKind, Community, CreateChannel, CreateEmoji, CreateRole, EditCommunity, EntityId,
};
use crate::platform::PlatformApi;
use crate::progress::{ProgressReporter, Severity};
use crate::remap::{translate_overwrites, RoleRemapTable};
use crate::stats::ReplicationStats;

/// One replication run: destructive cleanup of the target followed by the
/// constructive phases in dependency order. Owns a fresh remap table and
/// stats; both die with the run.
///
/// All remote operations are sequential — the pacing pauses between
/// creations are the only concession to the platform's request budget.
pub struct ServerCloner<A> {
    api: Arc<A>,
    config: AppConfig,
    remap: RoleRemapTable,
    stats: ReplicationStats,
}

impl<A: PlatformApi> ServerCloner<A> {
    pub fn new(api: Arc<A>, config: AppConfig) -> Self {
        Self {
            api,
            config,
            remap: RoleRemapTable::new(),
            stats: ReplicationStats::default(),
        }
    }

    /// Entry point for a confirmed operation. Never returns an error and
    /// never panics the caller: a run-level failure is reported to the
    /// channel and logged, then swallowed.
    pub async fn clone_server(
        mut self,
        source_id: EntityId,
        target_id: EntityId,
        include_emojis: bool,
        reporting_channel: EntityId,
    ) -> ReplicationStats {
        let reporter = ProgressReporter::new(self.api.clone(), reporting_channel);

        if let Err(e) = self
            .run(source_id, target_id, include_emojis, &reporter)
            .await
        {
            reporter
                .emit(&format!("❌ Replication failed: {e}"), Severity::Error)
                .await;
            tracing::error!(error = ?e, %source_id, %target_id, "replication run failed");
        }

        self.stats
    }

    async fn run(
        &mut self,
        source_id: EntityId,
        target_id: EntityId,
        include_emojis: bool,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        // Resolve both communities before any mutation.
        let source = self.api.fetch_community(source_id).await.map_err(|_| {
            CloneError::NotFound("source community (make sure you are a member)".into())
        })?;
        let target = self.api.fetch_community(target_id).await.map_err(|_| {
            CloneError::NotFound("target community (make sure you have admin permissions)".into())
        })?;

        reporter
            .emit(
                &format!("Replicating: {} -> {}", source.name, target.name),
                Severity::Plain,
            )
            .await;

        self.delete_existing_content(&target, reporter).await?;
        self.clone_roles(&source, &target, reporter).await?;
        self.clone_categories(&source, &target, reporter).await?;
        self.clone_channels(&source, &target, reporter).await?;
        if include_emojis {
            self.clone_emojis(&source, &target, reporter).await?;
        }
        self.clone_metadata(&source, &target, reporter).await;

        reporter.emit(&self.stats.to_string(), Severity::Info).await;
        reporter
            .emit(
                "🎉 Community replication completed successfully!",
                Severity::Success,
            )
            .await;
        Ok(())
    }

    /// Phase 1: clear the target. Every channel, then every role that is not
    /// the default role and not platform-managed. Individual delete failures
    /// only bump the failure counter.
    async fn delete_existing_content(
        &mut self,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        reporter
            .emit("🗑️ Deleting existing content...", Severity::Plain)
            .await;

        for channel in self.api.list_channels(target.id).await? {
            match self.api.delete_channel(channel.id).await {
                Ok(()) => sleep(self.config.delete_pause()).await,
                Err(_) => self.stats.failed += 1,
            }
        }

        for role in self.api.list_roles(target.id).await? {
            if role.is_default(target.id) || role.managed {
                continue;
            }
            match self.api.delete_role(target.id, role.id).await {
                Ok(()) => sleep(self.config.delete_pause()).await,
                Err(_) => self.stats.failed += 1,
            }
        }

        reporter.emit("Cleanup completed.", Severity::Plain).await;
        Ok(())
    }

    /// Phase 2: roles, highest position first so the target hierarchy ends
    /// up in source order. Successful creations feed the remap table.
    async fn clone_roles(
        &mut self,
        source: &Community,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        reporter.emit("👑 Replicating roles...", Severity::Plain).await;

        let mut roles: Vec<_> = self
            .api
            .list_roles(source.id)
            .await?
            .into_iter()
            .filter(|r| !r.is_default(source.id))
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position));

        for role in roles {
            let request = CreateRole {
                name: role.name.clone(),
                color: role.color,
                permissions: role.permissions,
                hoist: role.hoist,
                mentionable: role.mentionable,
            };
            match self.api.create_role(target.id, &request).await {
                Ok(created) => {
                    self.remap.record(role.id, created.id);
                    self.stats.roles_created += 1;
                    sleep(self.config.create_pause()).await;
                }
                Err(e) => {
                    reporter
                        .emit(
                            &format!("Failed to create role {}: {e}", role.name),
                            Severity::Error,
                        )
                        .await;
                    self.stats.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Phase 3: categories in ascending position order, overwrites
    /// translated through the remap table.
    async fn clone_categories(
        &mut self,
        source: &Community,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        reporter
            .emit("📁 Replicating categories...", Severity::Plain)
            .await;

        let mut categories: Vec<_> = self
            .api
            .list_channels(source.id)
            .await?
            .into_iter()
            .filter(|c| c.kind == ChannelKind::Category)
            .collect();
        categories.sort_by_key(|c| c.position);

        for category in categories {
            let overwrites = translate_overwrites(&category.permission_overwrites, &self.remap);
            let request =
                CreateChannel::category(category.name.clone(), category.position, overwrites);
            match self.api.create_channel(target.id, &request).await {
                Ok(_) => {
                    self.stats.categories_created += 1;
                    sleep(self.config.create_pause()).await;
                }
                Err(e) => {
                    reporter
                        .emit(
                            &format!("Failed to create category {}: {e}", category.name),
                            Severity::Error,
                        )
                        .await;
                    self.stats.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Phase 4: text and voice channels in ascending position order.
    /// Parents resolve by category NAME in the target — the categories were
    /// recreated with fresh IDs, so source parent IDs mean nothing here.
    async fn clone_channels(
        &mut self,
        source: &Community,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        reporter
            .emit("💬 Replicating channels...", Severity::Plain)
            .await;

        let source_channels = self.api.list_channels(source.id).await?;

        // Source category ID → name, for parent lookup.
        let source_category_names: HashMap<EntityId, String> = source_channels
            .iter()
            .filter(|c| c.kind == ChannelKind::Category)
            .map(|c| (c.id, c.name.clone()))
            .collect();

        // Target category name → ID. First match wins on duplicate names,
        // matching the source platform's lookup behavior.
        let mut target_categories: HashMap<String, EntityId> = HashMap::new();
        for c in self.api.list_channels(target.id).await? {
            if c.kind == ChannelKind::Category {
                target_categories.entry(c.name).or_insert(c.id);
            }
        }

        let mut channels: Vec<_> = source_channels
            .into_iter()
            .filter(|c| matches!(c.kind, ChannelKind::Text | ChannelKind::Voice))
            .collect();
        channels.sort_by_key(|c| c.position);

        for channel in channels {
            let parent_id = channel
                .parent_id
                .and_then(|pid| source_category_names.get(&pid))
                .and_then(|name| target_categories.get(name))
                .copied();

            let request = CreateChannel {
                name: channel.name.clone(),
                kind: channel.kind,
                position: channel.position,
                parent_id,
                topic: Some(channel.topic.clone().unwrap_or_default()),
                nsfw: channel.nsfw,
                rate_limit_per_user: channel.rate_limit_per_user,
                bitrate: channel.bitrate,
                user_limit: channel.user_limit,
                permission_overwrites: translate_overwrites(
                    &channel.permission_overwrites,
                    &self.remap,
                ),
            };
            match self.api.create_channel(target.id, &request).await {
                Ok(_) => {
                    self.stats.channels_created += 1;
                    sleep(self.config.create_pause()).await;
                }
                Err(e) => {
                    reporter
                        .emit(
                            &format!("Failed to create channel {}: {e}", channel.name),
                            Severity::Error,
                        )
                        .await;
                    self.stats.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Phase 5 (optional): emojis. Image bytes come from the image-fetch
    /// collaborator; creation is paced with the long emoji pause.
    async fn clone_emojis(
        &mut self,
        source: &Community,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) -> CloneResult<()> {
        reporter
            .emit("😀 Replicating emojis...", Severity::Plain)
            .await;

        for emoji in self.api.list_emojis(source.id).await? {
            let result = async {
                let image = self.api.fetch_image(&emoji.image_url()).await?;
                let request = CreateEmoji {
                    name: emoji.name.clone(),
                    image,
                };
                self.api.create_emoji(target.id, &request).await
            }
            .await;

            match result {
                Ok(_) => {
                    self.stats.emojis_created += 1;
                    sleep(self.config.emoji_pause()).await;
                }
                Err(e) => {
                    reporter
                        .emit(
                            &format!("Failed to create emoji {}: {e}", emoji.name),
                            Severity::Error,
                        )
                        .await;
                    self.stats.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Phase 6: community name and icon. A failure here is counted but does
    /// not undo or block anything that already happened.
    async fn clone_metadata(
        &mut self,
        source: &Community,
        target: &Community,
        reporter: &ProgressReporter<A>,
    ) {
        reporter
            .emit("🏠 Replicating community info...", Severity::Plain)
            .await;

        let result = async {
            let mut edit = EditCommunity {
                name: Some(source.name.clone()),
                icon: None,
            };
            if let Some(url) = source.icon_url() {
                edit.icon = Some(self.api.fetch_image(&url).await?);
            }
            self.api.edit_community(target.id, &edit).await
        }
        .await;

        if let Err(e) = result {
            reporter
                .emit(
                    &format!("Failed to update community info: {e}"),
                    Severity::Error,
                )
                .await;
            self.stats.failed += 1;
        }
    }
}
