use crate::model::thread::ThreadEntry;

/// Name of the terminal group collecting entries that match no other group.
pub const OTHER_GROUP: &str = "Other";
/// Name of the terminal group for inactive characters in the court taxonomy.
pub const INACTIVE_GROUP: &str = "Inactive Characters";

/// One entry of a rendered group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupEntry {
    pub entry: ThreadEntry,
    /// Carries the configured priority tag.
    pub is_priority: bool,
    /// Carries the leadership tag of the court taxonomy.
    pub is_leader: bool,
    /// Name of the source forum, shown by group indexes.
    pub origin: Option<String>,
}

impl GroupEntry {
    pub fn new(entry: ThreadEntry, is_priority: bool) -> Self {
        Self {
            entry,
            is_priority,
            is_leader: false,
            origin: None,
        }
    }
}

/// A group of entries, ordered and ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedGroup {
    pub key: String,
    /// Heading text without the `# ` marker; `None` renders a bare list.
    pub heading: Option<String>,
    pub entries: Vec<GroupEntry>,
}
