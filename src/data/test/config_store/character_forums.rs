use super::*;

/// Tests that a legacy single-id entry is read as a list and rewritten as one.
///
/// Expected: Ok with both forums listed and a JSON array on disk
#[tokio::test]
async fn migrates_legacy_single_forum() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_config(json!({ "character_forums": { "1": 10 } }))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    assert_eq!(store.get_character_forums(1).await?, vec![10]);

    store.add_character_forum(1, 11).await?;

    let raw = test.read_config().await.unwrap();
    assert_eq!(raw["character_forums"]["1"], json!([10, 11]));

    Ok(())
}

/// Tests adding the same forum twice.
///
/// Expected: Ok(true) then Ok(false), forum listed once
#[tokio::test]
async fn add_is_idempotent() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    assert!(store.add_character_forum(1, 10).await?);
    assert!(!store.add_character_forum(1, 10).await?);
    assert_eq!(store.get_character_forums(1).await?, vec![10]);

    Ok(())
}

/// Tests that removing the last forum of a guild drops the guild entry.
///
/// Expected: Ok(true), then Ok(false) for a second removal
#[tokio::test]
async fn remove_drops_empty_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_character_forums(1, &[10])
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    assert!(store.remove_character_forum(1, 10).await?);
    assert!(!store.remove_character_forum(1, 10).await?);

    let raw = test.read_config().await.unwrap();
    assert_eq!(raw["character_forums"], json!({}));

    Ok(())
}

/// Tests listing forums of every guild.
///
/// Expected: Ok with guild ids parsed and invalid guild keys skipped
#[tokio::test]
async fn all_character_forums_skips_bad_keys() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_config(json!({
            "character_forums": { "1": [10], "2": [20, 21], "guild": [30] }
        }))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());

    let forums = store.all_character_forums().await?;

    assert_eq!(forums.len(), 2);
    assert_eq!(forums.get(&2), Some(&vec![20, 21]));

    Ok(())
}
