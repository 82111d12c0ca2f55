use std::fmt;

/// Per-run replication counters. One entity attempt moves exactly one
/// counter: its type's created counter on success, `failed` otherwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationStats {
    pub roles_created: u64,
    pub categories_created: u64,
    pub channels_created: u64,
    pub emojis_created: u64,
    pub failed: u64,
}

impl ReplicationStats {
    pub fn created_total(&self) -> u64 {
        self.roles_created + self.categories_created + self.channels_created + self.emojis_created
    }

    pub fn attempted(&self) -> u64 {
        self.created_total() + self.failed
    }

    /// Percentage of attempted entities that were created, rounded to the
    /// nearest integer. Zero when nothing was attempted.
    pub fn success_rate(&self) -> u64 {
        let created = self.created_total();
        if created == 0 {
            return 0;
        }
        let attempted = created + self.failed;
        (created * 100 + attempted / 2) / attempted
    }
}

impl fmt::Display for ReplicationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📊 **Replication Statistics:**\n\
             ✅ Roles: {}\n\
             ✅ Categories: {}\n\
             ✅ Channels: {}\n\
             ✅ Emojis: {}\n\
             ❌ Failed: {}\n\
             📈 Success Rate: {}%",
            self.roles_created,
            self.categories_created,
            self.channels_created,
            self.emojis_created,
            self.failed,
            self.success_rate()
        )
    }
}
