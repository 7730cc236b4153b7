use super::*;

/// Tests storing a new definition and reading it back.
///
/// Expected: Ok with the definition under its composite key
#[tokio::test]
async fn upsert_then_get_index() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    let mut definition = IndexDefinition::new(1, 2, "Logs");
    definition.grouping = GroupingMode::ByTitlePattern(TitlePattern::DateNumber);
    store.upsert_index(definition.clone()).await?;

    assert_eq!(store.get_index(IndexKey::new(1, 2)).await?, Some(definition));

    let raw = test.read_config().await.unwrap();
    assert_eq!(raw["indexes"]["1:2"]["sort_by_title_pattern"], json!(true));
    assert_eq!(
        raw["indexes"]["1:2"]["title_grouping_pattern"],
        json!("date-number")
    );

    Ok(())
}

/// Tests listing definitions filtered by guild.
///
/// Expected: Ok with only the requested guild's definitions, ordered by key
#[tokio::test]
async fn get_indexes_filters_by_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_index(factory::index_definition(1, 20, "B"))
        .with_index(factory::index_definition(1, 10, "A"))
        .with_index(factory::index_definition(2, 30, "C"))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let guild_one = store.get_indexes(Some(1)).await?;
    let all = store.get_indexes(None).await?;

    let names: Vec<_> = guild_one.iter().map(|d| d.index_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(all.len(), 3);

    Ok(())
}

/// Tests that removing an index also removes its fingerprint.
///
/// Expected: Ok with the removed definition returned and no state left behind
#[tokio::test]
async fn remove_index_drops_fingerprint() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_index(factory::index_definition(1, 2, "Lore"))
        .with_fingerprint(1, 2, &["- [A](x)"])
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let removed = store.remove_index(IndexKey::new(1, 2)).await?;

    assert_eq!(removed.map(|d| d.index_name), Some("Lore".to_string()));
    assert!(store.get_index(IndexKey::new(1, 2)).await?.is_none());
    assert!(store.load_fingerprint(IndexKey::new(1, 2)).await?.is_empty());

    Ok(())
}

/// Tests removing an index that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn remove_missing_index_returns_none() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    assert!(store.remove_index(IndexKey::new(1, 2)).await?.is_none());

    Ok(())
}
