use super::*;

fn definition(grouping: GroupingMode) -> IndexDefinition {
    let mut definition = IndexDefinition::new(1, 10, "Lore");
    definition.grouping = grouping;
    definition
}

/// Tests the ungrouped listing.
///
/// Expected: one group without heading, titles sorted case-insensitively
#[test]
fn none_mode_lists_alphabetically() {
    let groups = group_entries(
        &definition(GroupingMode::None),
        &snapshot(10, &[]),
        vec![
            entry(1, "beta", &[]),
            entry(2, "Alpha", &[]),
            entry(3, "gamma", &[]),
        ],
    );

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].heading, None);
    assert_eq!(titles(&groups[0]), vec!["Alpha", "beta", "gamma"]);
}

/// Tests that entries carrying the priority tag come first.
///
/// Expected: B (priority) before A and C
#[test]
fn priority_entries_come_first() {
    let mut definition = definition(GroupingMode::None);
    definition.priority_tag = Some("pinned".to_string());

    let groups = group_entries(
        &definition,
        &snapshot(10, &[("Pinned", Some("📌"))]),
        vec![
            entry(1, "A", &[]),
            entry(2, "B", &["Pinned"]),
            entry(3, "C", &[]),
        ],
    );

    assert_eq!(titles(&groups[0]), vec!["B", "A", "C"]);
    assert!(groups[0].entries[0].is_priority);
}

/// Tests that no entries produce no groups.
///
/// Expected: empty vec
#[test]
fn empty_input_has_no_groups() {
    let groups = group_entries(
        &definition(GroupingMode::ByTag),
        &snapshot(10, &[]),
        Vec::new(),
    );

    assert!(groups.is_empty());
}

/// Tests tag grouping with a preferred order and tag emoji in headings.
///
/// Expected: preferred "Day" first with its emoji, unmatched entries in Other
#[test]
fn by_tag_puts_preferred_first() {
    let mut definition = definition(GroupingMode::ByTag);
    definition.preferred_tags = vec!["Day".to_string()];

    let groups = group_entries(
        &definition,
        &snapshot(10, &[("Night", None), ("Day", Some("☀️"))]),
        vec![
            entry(1, "Moon", &["Night"]),
            entry(2, "Sun", &["Night", "Day"]),
            entry(3, "Untagged", &[]),
        ],
    );

    assert_eq!(headings(&groups), vec!["☀️ Day", OTHER_GROUP]);
    assert_eq!(titles(&groups[0]), vec!["Sun"]);
    assert_eq!(titles(&groups[1]), vec!["Moon", "Untagged"]);
}

/// Tests tag grouping without preferred tags.
///
/// Expected: each entry under its first tag, groups alphabetical, Other last
#[test]
fn by_tag_uses_first_tag() {
    let groups = group_entries(
        &definition(GroupingMode::ByTag),
        &snapshot(10, &[("Night", None), ("Day", None)]),
        vec![
            entry(1, "Moon", &["Night", "Day"]),
            entry(2, "Sun", &["Day"]),
            entry(3, "Stray", &[]),
        ],
    );

    assert_eq!(headings(&groups), vec!["Day", "Night", OTHER_GROUP]);
}

/// Tests date-number grouping.
///
/// Titles sharing the number after the dash share a group, and groups sort numerically by the
/// smallest date code among their entries.
///
/// Expected: group "9" before group "582", with both 582 entries together
#[test]
fn date_number_groups_sort_numerically() {
    let groups = group_entries(
        &definition(GroupingMode::ByTitlePattern(TitlePattern::DateNumber)),
        &snapshot(10, &[]),
        vec![
            entry(1, "SD1-582 Arrival", &[]),
            entry(2, "WD2-582 Party", &[]),
            entry(3, "SD1-9 Start", &[]),
            entry(4, "Loose notes", &[]),
        ],
    );

    assert_eq!(headings(&groups), vec!["9", "582", OTHER_GROUP]);
    assert_eq!(titles(&groups[1]), vec!["SD1-582 Arrival", "WD2-582 Party"]);
}

/// Tests date-suffix grouping.
///
/// Expected: keys are upper-cased full codes
#[test]
fn date_suffix_uses_full_code() {
    let groups = group_entries(
        &definition(GroupingMode::ByTitlePattern(TitlePattern::DateSuffix)),
        &snapshot(10, &[]),
        vec![entry(1, "Log sd1-582", &[]), entry(2, "Log SD1-12", &[])],
    );

    assert_eq!(headings(&groups), vec!["SD1-12", "SD1-582"]);
}

/// Tests after-dash grouping.
///
/// Expected: text after the last dash, trimmed
#[test]
fn after_dash_groups_by_suffix() {
    let groups = group_entries(
        &definition(GroupingMode::ByTitlePattern(TitlePattern::AfterDash)),
        &snapshot(10, &[]),
        vec![
            entry(1, "Ball - Winter", &[]),
            entry(2, "Feast - Winter", &[]),
            entry(3, "Hunt - Autumn", &[]),
        ],
    );

    assert_eq!(headings(&groups), vec!["Autumn", "Winter"]);
    assert_eq!(titles(&groups[1]), vec!["Ball - Winter", "Feast - Winter"]);
}

/// Tests a stored custom pattern that no longer compiles.
///
/// Expected: every entry in Other instead of an error
#[test]
fn invalid_custom_pattern_falls_back_to_other() {
    let groups = group_entries(
        &definition(GroupingMode::ByTitlePattern(TitlePattern::Custom(
            "([A-Z".to_string(),
        ))),
        &snapshot(10, &[]),
        vec![entry(1, "B", &[]), entry(2, "A", &[])],
    );

    assert_eq!(headings(&groups), vec![OTHER_GROUP]);
    assert_eq!(titles(&groups[0]), vec!["A", "B"]);
}

/// Tests a custom pattern with a capture group.
///
/// Expected: first capture group is the key, non-matching titles in Other
#[test]
fn custom_pattern_uses_capture_group() {
    let groups = group_entries(
        &definition(GroupingMode::ByTitlePattern(TitlePattern::Custom(
            r"^\[(\w+)\]".to_string(),
        ))),
        &snapshot(10, &[]),
        vec![
            entry(1, "[war] Siege", &[]),
            entry(2, "[LORE] Founding", &[]),
            entry(3, "No prefix", &[]),
        ],
    );

    assert_eq!(headings(&groups), vec!["LORE", "war", OTHER_GROUP]);
}

/// Tests the court taxonomy.
///
/// Expected: leaders first in their court, inactive entries pulled out, preferred court order
/// applied, terminal groups last
#[test]
fn taxonomy_groups_by_court() {
    let mut definition = definition(GroupingMode::ByFixedTaxonomy);
    definition.preferred_tags = vec!["Day Court".to_string()];

    let groups = group_entries(
        &definition,
        &snapshot(10, &[]),
        vec![
            entry(1, "Yara", &["Night Court"]),
            entry(2, "Xander", &["The Night Court", "High Council"]),
            entry(3, "Dawnstar", &["Day Court", "Inactive"]),
            entry(4, "Wanderer", &["Random"]),
            entry(5, "Helion", &["Day Court"]),
        ],
    );

    assert_eq!(
        headings(&groups),
        vec![
            "☀️ Day Court",
            "💫 Night Court",
            OTHER_GROUP,
            INACTIVE_GROUP
        ]
    );
    assert_eq!(titles(&groups[1]), vec!["Xander", "Yara"]);
    assert!(groups[1].entries[0].is_leader);
    assert_eq!(titles(&groups[3]), vec!["Dawnstar"]);
    assert!(!groups[3].entries[0].is_leader);
}

/// Tests the order of courts that were not named as preferred.
///
/// Expected: the preferred court first, the others alphabetically by name
#[test]
fn remaining_courts_sort_alphabetically() {
    let mut definition = definition(GroupingMode::ByFixedTaxonomy);
    definition.preferred_tags = vec!["Winter".to_string()];

    let groups = group_entries(
        &definition,
        &snapshot(10, &[]),
        vec![
            entry(1, "Tamlin", &["Spring Court"]),
            entry(2, "Beron", &["Autumn Court"]),
            entry(3, "Kallias", &["Winter Court"]),
        ],
    );

    assert_eq!(
        headings(&groups),
        vec!["❄️ Winter Court", "🍁 Autumn Court", "🌿 Spring Court"]
    );
}

/// Tests that every entry lands in exactly one group.
///
/// Expected: total entry count equals the input count
#[test]
fn every_entry_lands_once() {
    let input = vec![
        entry(1, "A", &["Night Court", "Day Court"]),
        entry(2, "B", &["Inactive", "Night Court"]),
        entry(3, "C", &[]),
    ];

    let groups = group_entries(
        &definition(GroupingMode::ByFixedTaxonomy),
        &snapshot(10, &[]),
        input,
    );

    let total: usize = groups.iter().map(|g| g.entries.len()).sum();
    assert_eq!(total, 3);
    assert!(groups.iter().all(|g| !g.entries.is_empty()));
}
