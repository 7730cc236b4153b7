use super::*;

/// Tests loading when no config file exists yet.
///
/// Expected: Ok with the default document
#[tokio::test]
async fn missing_file_loads_default_document() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    let document = store.load().await?;

    assert!(document.indexes.is_empty());
    assert!(document.character_forums.is_empty());
    assert!(document.index_state.is_empty());

    Ok(())
}

/// Tests that `ensure_file` creates the file and its directory with the default shape.
///
/// Expected: Ok with all four sections present on disk
#[tokio::test]
async fn ensure_file_writes_default_shape() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    store.ensure_file().await?;

    let raw = test.read_config().await.unwrap();
    assert_eq!(raw["indexes"], json!({}));
    assert_eq!(raw["character_forums"], json!({}));
    assert_eq!(raw["group_indexes"], json!({}));
    assert_eq!(raw["index_state"], json!({}));

    Ok(())
}

/// Tests that `ensure_file` leaves an existing document untouched.
///
/// Expected: Ok with the seeded index still present
#[tokio::test]
async fn ensure_file_keeps_existing_document() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_index(factory::index_definition(1, 2, "Lore"))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    store.ensure_file().await?;

    assert!(store.get_index(IndexKey::new(1, 2)).await?.is_some());

    Ok(())
}

/// Tests that an empty file reads as the default document.
///
/// Expected: Ok with no indexes
#[tokio::test]
async fn empty_file_loads_default_document() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_raw_config("   \n")
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    assert!(store.load().await?.indexes.is_empty());

    Ok(())
}

/// Tests that a corrupt file is reported instead of being silently replaced.
///
/// Expected: Err with JsonErr and the file left as it was
#[tokio::test]
async fn corrupt_file_is_an_error() {
    let test = TestBuilder::new()
        .with_raw_config("{ not json")
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let result = store.add_character_forum(1, 10).await;

    assert!(matches!(result, Err(AppError::JsonErr(_))));
    let raw = tokio::fs::read_to_string(test.config_path()).await.unwrap();
    assert_eq!(raw, "{ not json");
}

/// Tests that unknown keys and group indexes survive a mutation.
///
/// Expected: Ok with both sections unchanged on disk
#[tokio::test]
async fn mutation_preserves_unknown_sections() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_config(json!({
            "group_indexes": { "1:99": { "group_index_name": "Everything" } },
            "moderation": { "log_channel": 5 }
        }))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    store.add_character_forum(1, 10).await?;

    let raw = test.read_config().await.unwrap();
    assert_eq!(
        raw["group_indexes"]["1:99"]["group_index_name"],
        json!("Everything")
    );
    assert_eq!(raw["moderation"]["log_channel"], json!(5));
    assert_eq!(raw["character_forums"]["1"], json!([10]));

    Ok(())
}
