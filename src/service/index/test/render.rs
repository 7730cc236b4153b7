use super::*;

fn group(heading: Option<&str>, entries: Vec<GroupEntry>) -> RenderedGroup {
    RenderedGroup {
        key: heading.unwrap_or_default().to_string(),
        heading: heading.map(str::to_string),
        entries,
    }
}

/// Tests the markers of an entry line.
///
/// Expected: crown for leaders, priority emoji only when the tag has one
#[test]
fn entry_line_markers() {
    let mut leader = GroupEntry::new(entry(1, "Rhys", &[]), true);
    leader.is_leader = true;
    let plain = GroupEntry::new(entry(2, "Cassian", &[]), false);

    assert_eq!(
        entry_line(&leader, Some("📌")),
        "- 👑 📌 [Rhys](https://discord.com/channels/1/1)"
    );
    assert_eq!(
        entry_line(&leader, None),
        "- 👑 [Rhys](https://discord.com/channels/1/1)"
    );
    assert_eq!(
        entry_line(&plain, Some("📌")),
        "- [Cassian](https://discord.com/channels/1/2)"
    );
}

/// Tests the source forum shown by group indexes.
///
/// Expected: bold forum name after the markers, before the link
#[test]
fn entry_line_with_origin() {
    let mut pinned = GroupEntry::new(entry(3, "Feyre", &[]), true);
    pinned.origin = Some("characters".to_string());

    assert_eq!(
        entry_line(&pinned, Some("📌")),
        "- 📌 **characters** - [Feyre](https://discord.com/channels/1/3)"
    );
}

/// Tests rendering an index without entries.
///
/// Expected: a single placeholder chunk
#[test]
fn empty_index_renders_placeholder() {
    assert_eq!(render_chunks(&[], None), vec![EMPTY_INDEX.to_string()]);
    assert_eq!(
        render_chunks(&[group(Some("Empty"), Vec::new())], None),
        vec![EMPTY_INDEX.to_string()]
    );
}

/// Tests that small sections share a chunk.
///
/// Expected: one chunk with sections separated by a blank line
#[test]
fn small_sections_share_a_chunk() {
    let chunks = render_chunks(
        &[
            group(Some("Night"), vec![GroupEntry::new(entry(1, "A", &[]), false)]),
            group(Some("Day"), vec![GroupEntry::new(entry(2, "B", &[]), false)]),
        ],
        None,
    );

    assert_eq!(
        chunks,
        vec![
            "# Night\n- [A](https://discord.com/channels/1/1)\n\n\
             # Day\n- [B](https://discord.com/channels/1/2)"
                .to_string()
        ]
    );
}

/// Tests that a section that does not fit in the current chunk starts a new one.
///
/// Expected: two chunks, each holding one whole section
#[test]
fn sections_are_not_split_across_chunks() {
    let first = "a".repeat(1000);
    let second = "b".repeat(1000);

    let chunks = chunk_sections(&[first.clone(), second.clone()], CHUNK_BUDGET);

    assert_eq!(chunks, vec![first, second]);
}

/// Tests splitting a section larger than the budget.
///
/// Expected: chunks within budget, split at line boundaries, nothing lost
#[test]
fn oversized_section_splits_at_lines() {
    let section: String = (0..80)
        .map(|i| format!("- [Entry number {:03}](https://x.y/{})", i, i))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(section.chars().count() > CHUNK_BUDGET);

    let chunks = chunk_sections(&[section.clone()], CHUNK_BUDGET);

    assert!(chunks.len() >= 2);
    assert!(chunks
        .iter()
        .all(|chunk| chunk.chars().count() <= CHUNK_BUDGET));
    assert!(chunks.iter().all(|chunk| chunk.starts_with("- [")));
    assert_eq!(chunks.join("\n"), section);
}

/// Tests hard-splitting a single line longer than the budget.
///
/// Expected: pieces of exactly the budget and a remainder, concatenating to the line
#[test]
fn overlong_line_is_hard_split() {
    let line = "é".repeat(4000);

    let chunks = chunk_sections(&[line.clone()], CHUNK_BUDGET);

    let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
    assert_eq!(lengths, vec![1900, 1900, 200]);
    assert_eq!(chunks.concat(), line);
}

/// Tests that budget is counted in characters rather than bytes.
///
/// Expected: 1900 multi-byte characters fit in one chunk
#[test]
fn budget_counts_characters() {
    let section = "🌙".repeat(CHUNK_BUDGET);

    let chunks = chunk_sections(&[section.clone()], CHUNK_BUDGET);

    assert_eq!(chunks, vec![section]);
}

/// Tests a group whose rendered text is one character over the budget.
///
/// Expected: two chunks within budget that rejoin into the original text
#[test]
fn one_character_over_budget_splits_losslessly() {
    let mut entries: Vec<GroupEntry> = (1..=8)
        .map(|id| GroupEntry::new(entry(id, &"A".repeat(171), &[]), false))
        .collect();
    entries.push(GroupEntry::new(entry(9, &"B".repeat(176), &[]), false));
    let groups = vec![group(Some("Lore"), entries)];

    let text = render_sections(&groups, None).join("\n\n");
    assert_eq!(text.chars().count(), CHUNK_BUDGET + 1);

    let chunks = render_chunks(&groups, None);

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_BUDGET));
    assert_eq!(chunks.join("\n"), text);
}
