use super::*;

/// Tests storing a group index next to a forum index.
///
/// Expected: Ok with the group under its target key and forum indexes untouched
#[tokio::test]
async fn upsert_then_get_group_index() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_index(factory::index_definition(1, 10, "Lore"))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let mut definition = GroupIndexDefinition::new(1, 50, "All Lore", vec![10, 11]);
    definition.grouping = GroupingMode::ByTag;
    store.upsert_group_index(definition.clone()).await?;

    assert_eq!(
        store.get_group_index(IndexKey::new(1, 50)).await?,
        Some(definition)
    );
    assert_eq!(store.get_indexes(Some(1)).await?.len(), 1);

    let raw = test.read_config().await.unwrap();
    assert_eq!(raw["group_indexes"]["1:50"]["sort_by_tags"], json!(true));

    Ok(())
}

/// Tests listing group indexes when one entry is malformed.
///
/// Expected: Ok with readable entries of the requested guild only
#[tokio::test]
async fn unreadable_group_index_is_skipped() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_group_index(factory::group_index(1, 50, "All Lore", &[10]))
        .with_group_index(factory::group_index(2, 60, "Elsewhere", &[20]))
        .with_group_index(json!({ "guild_id": 1, "target_channel_id": 70, "source_forum_ids": "x" }))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let names: Vec<String> = store
        .get_group_indexes(Some(1))
        .await?
        .into_iter()
        .map(|definition| definition.group_index_name)
        .collect();

    assert_eq!(names, vec!["All Lore"]);
    assert_eq!(store.get_group_indexes(None).await?.len(), 2);

    Ok(())
}

/// Tests removing a group index.
///
/// Expected: Ok with the removed definition, then None on a second removal
#[tokio::test]
async fn remove_group_index() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_group_index(factory::group_index(1, 50, "All Lore", &[10]))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let removed = store.remove_group_index(IndexKey::new(1, 50)).await?;

    assert_eq!(
        removed.map(|definition| definition.source_forum_ids),
        Some(vec![10])
    );
    assert!(store.remove_group_index(IndexKey::new(1, 50)).await?.is_none());

    Ok(())
}
