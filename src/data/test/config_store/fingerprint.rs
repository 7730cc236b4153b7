use super::*;

/// Tests saving and loading a fingerprint.
///
/// Expected: Ok with the same chunks returned
#[tokio::test]
async fn save_then_load_fingerprint() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_index(factory::index_definition(1, 2, "Lore"))
        .build()
        .await
        .unwrap();
    let store = ConfigStore::new(test.config_path());
    let chunks = vec!["# A\n- [x](y)".to_string(), "# B\n- [z](w)".to_string()];

    store.save_fingerprint(IndexKey::new(1, 2), &chunks).await?;

    assert_eq!(store.load_fingerprint(IndexKey::new(1, 2)).await?, chunks);

    Ok(())
}

/// Tests that a fingerprint is not stored for an index that no longer exists.
///
/// Expected: Ok with no `index_state` entry
#[tokio::test]
async fn fingerprint_for_removed_index_is_dropped() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    store
        .save_fingerprint(IndexKey::new(1, 2), &["chunk".to_string()])
        .await?;

    assert!(store.load_fingerprint(IndexKey::new(1, 2)).await?.is_empty());

    Ok(())
}
