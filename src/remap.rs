use std::collections::HashMap;

use crate::models::{EntityId, OverwriteTarget, PermissionOverwrite};

// ─── Role Remap Table ──────────────────────────────────

/// Source role ID → target role ID, for one replication run.
///
/// Filled during the role phase, read-only during every later phase,
/// discarded with the run. A source role appears here only if its target
/// counterpart was actually created.
#[derive(Debug, Default)]
pub struct RoleRemapTable {
    map: HashMap<EntityId, EntityId>,
}

impl RoleRemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, source: EntityId, target: EntityId) {
        self.map.insert(source, target);
    }

    pub fn resolve(&self, source: EntityId) -> Option<EntityId> {
        self.map.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ─── Overwrite Translation ─────────────────────────────

/// Rewrite a source channel's overwrites so they are valid in the target.
///
/// Role subjects are resolved through the remap table; entries whose role
/// was never replicated (the default role, or a role whose creation failed)
/// are dropped. Member subjects pass through unchanged since member IDs are
/// shared across communities. Allow/deny bit-sets are preserved verbatim.
pub fn translate_overwrites(
    overwrites: &[PermissionOverwrite],
    remap: &RoleRemapTable,
) -> Vec<PermissionOverwrite> {
    overwrites
        .iter()
        .filter_map(|o| {
            let target = match o.target {
                OverwriteTarget::Role(source_id) => OverwriteTarget::Role(remap.resolve(source_id)?),
                OverwriteTarget::Member(id) => OverwriteTarget::Member(id),
            };
            Some(PermissionOverwrite {
                target,
                allow: o.allow,
                deny: o.deny,
            })
        })
        .collect()
}
