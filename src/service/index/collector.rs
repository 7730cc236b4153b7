//! Gathers the threads of a forum that belong in its index.

use dioxus_logger::tracing;
use std::collections::HashSet;

use crate::model::thread::ThreadEntry;
use crate::service::index::channel::ThreadContainer;

/// Thread names that never appear in any index, compared case-insensitively.
const RESERVED_NAMES: [&str; 4] = [
    "index",
    "📜 Character Index",
    "📚 Encyclopedia Index",
    "📂 Resources Index",
];

/// Active and archived threads of one forum, without duplicates.
#[derive(Clone, Debug, Default)]
pub struct ThreadListing {
    pub active: Vec<ThreadEntry>,
    pub archived: Vec<ThreadEntry>,
}

impl ThreadListing {
    /// Collects both listings of `forum`.
    ///
    /// A failing listing is logged and treated as empty so one broken request does not block
    /// the whole refresh. Threads reported by both listings are kept once, as active.
    ///
    /// # Arguments
    /// - `forum` - Forum to list
    ///
    /// # Returns
    /// - `ThreadListing` - Threads found, possibly empty
    pub async fn gather(forum: &dyn ThreadContainer) -> Self {
        let forum_id = forum.snapshot().id;

        let active = forum.active_threads().await.unwrap_or_else(|e| {
            tracing::error!("Failed to list active threads of forum {}: {}", forum_id, e);
            Vec::new()
        });
        let archived = forum.archived_threads().await.unwrap_or_else(|e| {
            tracing::error!(
                "Failed to list archived threads of forum {}: {}",
                forum_id,
                e
            );
            Vec::new()
        });

        let mut seen: HashSet<u64> = active.iter().map(|entry| entry.id).collect();
        let archived = archived
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .collect();

        Self { active, archived }
    }

    /// Finds a thread by exact name, preferring active threads.
    pub fn find_by_title(&self, title: &str) -> Option<&ThreadEntry> {
        self.active
            .iter()
            .chain(self.archived.iter())
            .find(|entry| entry.title == title)
    }

    /// Finds a thread by name, ignoring case and surrounding whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&ThreadEntry> {
        let wanted = name.trim().to_lowercase();
        self.all()
            .find(|entry| entry.title.trim().to_lowercase() == wanted)
    }

    /// Threads to list in an index.
    ///
    /// Drops reserved names, the index thread itself and anything named like it.
    ///
    /// # Arguments
    /// - `index_thread_id` - Id of the index thread, once known
    /// - `index_thread_name` - Configured name of the index thread
    pub fn entries(
        &self,
        index_thread_id: Option<u64>,
        index_thread_name: &str,
    ) -> Vec<ThreadEntry> {
        let own_name = index_thread_name.to_lowercase();

        self.active
            .iter()
            .chain(self.archived.iter())
            .filter(|entry| Some(entry.id) != index_thread_id)
            .filter(|entry| !is_reserved_name(&entry.title))
            .filter(|entry| entry.title.to_lowercase() != own_name)
            .cloned()
            .collect()
    }

    /// Every thread, active first, with no filtering.
    pub fn all(&self) -> impl Iterator<Item = &ThreadEntry> {
        self.active.iter().chain(self.archived.iter())
    }
}

/// Whether `title` is one of the reserved index thread names.
pub fn is_reserved_name(title: &str) -> bool {
    let title = title.to_lowercase();
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.to_lowercase() == title)
}
