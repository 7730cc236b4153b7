//! Renders groups as markdown and packs them into message-sized chunks.
//!
//! Output format:
//!
//! ```text
//! # 🌙 Night
//! - 📌 [Pinned thread](https://discord.com/channels/1/2)
//! - [Other thread](https://discord.com/channels/1/3)
//!
//! # Other
//! - 👑 [Leader](https://discord.com/channels/1/4)
//! ```
//!
//! Lengths are counted in characters, not bytes, since Discord's limit is in characters.

use crate::model::group::{GroupEntry, RenderedGroup};

/// Character budget of one chunk, kept under Discord's 2000 character message limit.
pub const CHUNK_BUDGET: usize = 1900;

/// Single chunk rendered for an index with no entries.
pub const EMPTY_INDEX: &str = "No entries found.";

const SECTION_SEPARATOR: &str = "\n\n";
const LEADER_MARKER: &str = "👑";

/// Renders and chunks groups in one step.
///
/// # Arguments
/// - `groups` - Ordered groups from the grouping engine
/// - `priority_emoji` - Emoji of the priority tag, if the forum tag has one
///
/// # Returns
/// - `Vec<String>` - At least one chunk, none longer than `CHUNK_BUDGET`
pub fn render_chunks(groups: &[RenderedGroup], priority_emoji: Option<&str>) -> Vec<String> {
    chunk_sections(&render_sections(groups, priority_emoji), CHUNK_BUDGET)
}

/// Renders one list line: `- {👑 }{priority emoji }{**origin** - }[title](url)`.
pub fn entry_line(entry: &GroupEntry, priority_emoji: Option<&str>) -> String {
    let mut line = String::from("- ");

    if entry.is_leader {
        line.push_str(LEADER_MARKER);
        line.push(' ');
    }
    if let (true, Some(emoji)) = (entry.is_priority, priority_emoji) {
        line.push_str(emoji);
        line.push(' ');
    }

    if let Some(origin) = &entry.origin {
        line.push_str(&format!("**{}** - ", origin));
    }

    line.push_str(&format!("[{}]({})", entry.entry.title, entry.entry.jump_url));
    line
}

/// Renders each non-empty group as one section: an optional `# heading` line followed by its
/// entry lines.
pub fn render_sections(groups: &[RenderedGroup], priority_emoji: Option<&str>) -> Vec<String> {
    groups
        .iter()
        .filter(|group| !group.entries.is_empty())
        .map(|group| {
            let heading = group.heading.as_ref().map(|h| format!("# {}", h));
            heading
                .into_iter()
                .chain(
                    group
                        .entries
                        .iter()
                        .map(|entry| entry_line(entry, priority_emoji)),
                )
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}

/// Packs sections into chunks of at most `budget` characters.
///
/// Whole sections are kept together, separated by a blank line. A section that does not fit
/// in a chunk on its own is split at line boundaries, and a single line longer than the
/// budget is cut at character boundaries.
///
/// # Returns
/// - `Vec<String>` - Chunks in order; `["No entries found."]` when there are no sections
pub fn chunk_sections(sections: &[String], budget: usize) -> Vec<String> {
    let mut packer = ChunkPacker::new(budget);

    for section in sections {
        packer.push_section(section);
    }

    let chunks = packer.finish();
    if chunks.is_empty() {
        vec![EMPTY_INDEX.to_string()]
    } else {
        chunks
    }
}

struct ChunkPacker {
    budget: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl ChunkPacker {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push_section(&mut self, section: &str) {
        let len = section.chars().count();

        if len > self.budget {
            self.close();
            self.push_oversized(section);
            return;
        }

        if self.current_len > 0 {
            if self.current_len + SECTION_SEPARATOR.len() + len <= self.budget {
                self.current.push_str(SECTION_SEPARATOR);
                self.current.push_str(section);
                self.current_len += SECTION_SEPARATOR.len() + len;
                return;
            }
            self.close();
        }

        self.current.push_str(section);
        self.current_len = len;
    }

    /// Splits a section at line boundaries. The last piece stays open so following sections
    /// can share its chunk.
    fn push_oversized(&mut self, section: &str) {
        for line in section.lines() {
            let len = line.chars().count();

            if len > self.budget {
                self.close();
                let chars: Vec<char> = line.chars().collect();
                for piece in chars.chunks(self.budget) {
                    self.close();
                    self.current = piece.iter().collect();
                    self.current_len = piece.len();
                }
                continue;
            }

            if self.current_len > 0 && self.current_len + 1 + len > self.budget {
                self.close();
            }
            if self.current_len > 0 {
                self.current.push('\n');
                self.current_len += 1;
            }
            self.current.push_str(line);
            self.current_len += len;
        }
    }

    fn close(&mut self) {
        if self.current_len > 0 {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.close();
        self.chunks
    }
}
