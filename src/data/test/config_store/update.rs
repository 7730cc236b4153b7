use super::*;

/// Tests that concurrent mutations do not lose updates.
///
/// Twenty tasks each register a different forum at the same time. Without the store lock the
/// load-modify-save sequences would interleave and overwrite each other.
///
/// Expected: Ok with all twenty forums registered
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_lose_nothing() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    let tasks: Vec<_> = (0..20u64)
        .map(|forum_id| {
            let store = store.clone();
            tokio::spawn(async move { store.add_character_forum(1, forum_id).await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap()?);
    }

    let mut forums = store.get_character_forums(1).await?;
    forums.sort_unstable();
    assert_eq!(forums, (0..20u64).collect::<Vec<_>>());

    Ok(())
}

/// Tests that a failing mutation writes nothing.
///
/// Expected: Err from the closure and no file created
#[tokio::test]
async fn failed_mutation_is_not_saved() {
    let test = TestBuilder::new().build().await.unwrap();
    let store = ConfigStore::new(test.config_path());

    let result: Result<(), AppError> = store
        .update(|document| {
            document.character_forums.insert("1".to_string(), vec![10]);
            Err(AppError::BadRequest("rejected".to_string()))
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(!test.config_path().exists());
}
