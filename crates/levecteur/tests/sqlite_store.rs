// Integration tests for the SQLite vector store
//
// These tests verify persistence, nearest-neighbour ordering, the
// insertion-order tie-break and dimension enforcement against a real
// database file.

#[cfg(test)]
mod tests {
    use levecteur::{SqliteVectorStore, StorageConfig, StoreError, VectorStore};
    use rstest::rstest;
    use tempfile::TempDir;

    /// Helper: Create a file-backed store in a fresh temp directory
    fn create_test_store(dimension: usize) -> (TempDir, SqliteVectorStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sentences.db");
        let config = StorageConfig::new(path.to_string_lossy(), dimension);
        let store = SqliteVectorStore::open_with_config(config).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_nearest_neighbors_sorted_by_distance() {
        let (_dir, store) = create_test_store(3);
        store.insert("orthogonal", &[0.0, 1.0, 0.0]).await.unwrap();
        store.insert("identical", &[1.0, 0.0, 0.0]).await.unwrap();
        store.insert("close", &[0.9, 0.1, 0.0]).await.unwrap();
        store.insert("opposite", &[-1.0, 0.0, 0.0]).await.unwrap();

        let neighbors = store.nearest_neighbors(&[1.0, 0.0, 0.0], 10).await.unwrap();
        let contents: Vec<&str> = neighbors.iter().map(|n| n.content.as_str()).collect();

        assert_eq!(contents, vec!["identical", "close", "orthogonal", "opposite"]);
        assert_eq!(neighbors[0].distance, 0.0);
        assert!((neighbors[3].distance - 2.0).abs() < 1e-9);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[tokio::test]
    async fn test_nearest_neighbors_respects_limit(#[case] limit: usize) {
        let (_dir, store) = create_test_store(2);
        for i in 0..4 {
            let angle = i as f32 * 0.3;
            store
                .insert(&format!("sentence {}", i), &[angle.cos(), angle.sin()])
                .await
                .unwrap();
        }

        let neighbors = store.nearest_neighbors(&[1.0, 0.0], limit).await.unwrap();
        assert_eq!(neighbors.len(), limit.min(4));
        assert_eq!(neighbors[0].content, "sentence 0");
    }

    #[tokio::test]
    async fn test_equal_distances_keep_insertion_order() {
        let (_dir, store) = create_test_store(2);
        store.insert("first", &[0.0, 1.0]).await.unwrap();
        store.insert("second", &[0.0, 2.0]).await.unwrap();
        store.insert("third", &[0.0, 0.5]).await.unwrap();

        let neighbors = store.nearest_neighbors(&[1.0, 0.0], 3).await.unwrap();
        let contents: Vec<&str> = neighbors.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_duplicate_content_is_allowed() {
        let (_dir, store) = create_test_store(2);
        store.insert("same", &[1.0, 0.0]).await.unwrap();
        store.insert("same", &[0.0, 1.0]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_neighbors() {
        let (_dir, store) = create_test_store(3);
        let neighbors = store.nearest_neighbors(&[0.1, 0.2, 0.3], 5).await.unwrap();
        assert!(neighbors.is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension() {
        let (_dir, store) = create_test_store(3);
        let result = store.insert("short", &[0.1, 0.2]).await;
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch { expected: 3, got: 2 })
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_rejects_wrong_dimension() {
        let (_dir, store) = create_test_store(3);
        store.insert("a", &[1.0, 0.0, 0.0]).await.unwrap();
        let result = store.nearest_neighbors(&[1.0, 0.0], 5).await;
        assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_insert_rejects_non_finite_components() {
        let (_dir, store) = create_test_store(2);
        let result = store.insert("nan", &[f32::NAN, 1.0]).await;
        assert!(matches!(result, Err(StoreError::InvalidEmbedding(_))));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("persist.db");
        let config = StorageConfig::new(path.to_string_lossy(), 2);

        {
            let store = SqliteVectorStore::open_with_config(config.clone()).unwrap();
            store.insert("The sun rises in the east.", &[1.0, 0.0]).await.unwrap();
            store.insert("A cat is a small, furry mammal.", &[0.0, 1.0]).await.unwrap();
        }

        let store = SqliteVectorStore::open_with_config(config).unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let neighbors = store.nearest_neighbors(&[0.9, 0.1], 1).await.unwrap();
        assert_eq!(neighbors[0].content, "The sun rises in the east.");
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_the_store() {
        let (_dir, store) = create_test_store(2);
        store.insert("x", &[1.0, 0.0]).await.unwrap();
        store.insert("y", &[0.0, 1.0]).await.unwrap();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    let query = if i % 2 == 0 { [1.0, 0.0] } else { [0.0, 1.0] };
                    store.nearest_neighbors(&query, 1).await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let neighbors = handle.await.unwrap().unwrap();
            let expected = if i % 2 == 0 { "x" } else { "y" };
            assert_eq!(neighbors[0].content, expected);
        }
    }
}
