//! Macro-generated test suite for `EntityStore<T>` contract validation.
//!
//! The `entity_store_tests!` macro generates a test module that validates any
//! `StorageEngine` through `Repository<Invoice>` and `Repository<Delivery>`:
//! CRUD, batch variants, identifier generation, error semantics and
//! concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use order_store::storage::InMemoryEngine;
//!
//! entity_store_tests!(Arc::new(InMemoryEngine::new()));
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_save_and_find_by_id`: save then retrieve an equal record
//! - `test_find_by_id_never_saved`: empty result, `exists_by_id` false
//! - `test_find_all_empty` / `test_find_all_single_invoice`
//! - `test_save_existing_id_updates`: same id, second save wins
//! - `test_delete_by_id_existing` / `test_delete_by_id_missing`
//! - `test_count_tracks_distinct_ids`
//!
//! ## Batch
//! - `test_save_all_and_find_all_by_id`
//! - `test_delete_all_by_id_all_or_nothing`
//! - `test_delete_all`
//!
//! ## Paging & sorting
//! - `test_find_page_first_and_last_partial`
//! - `test_find_page_past_end_is_empty`
//! - `test_find_page_descending`
//!
//! ## Identifiers
//! - `test_transient_save_assigns_sequence`
//! - `test_sequence_not_reused_after_delete`
//! - `test_exhausted_sequence_keeps_existing_records`
//! - `test_find_all_in_id_order`
//!
//! ## Edge Cases
//! - `test_operations_after_close_are_unavailable`
//! - `test_concurrent_saves`

/// Generate a full `EntityStore` conformance test suite.
///
/// `$factory` must evaluate to an `Arc` of a `StorageEngine`. It is
/// re-evaluated for each test to ensure isolation. For the concurrent test
/// the engine must tolerate use from several runtime threads.
#[macro_export]
macro_rules! entity_store_tests {
    ($factory:expr) => {
        mod entity_store_contract_tests {
            use super::*;
            use order_store::core::{
                EntityStore, PageRequest, SortOrder, StorageEngine, StoreError,
            };
            use std::sync::Arc;

            // ==================================================================
            // CRUD: Save & find
            // ==================================================================

            #[tokio::test]
            async fn test_save_and_find_by_id() {
                let (invoices, _) = open_repositories($factory).await;
                let original = invoice_with_id(1, "F-0001", 12_500);

                let saved = invoices.save(original.clone()).await.unwrap();
                assert_eq!(saved, original);

                let retrieved = invoices.find_by_id(&1).await.unwrap();
                assert_eq!(retrieved, Some(original));
                assert!(invoices.exists_by_id(&1).await.unwrap());
            }

            #[tokio::test]
            async fn test_find_by_id_never_saved() {
                let (invoices, deliveries) = open_repositories($factory).await;

                assert!(invoices.find_by_id(&99).await.unwrap().is_none());
                assert!(!invoices.exists_by_id(&99).await.unwrap());
                assert!(deliveries.find_by_id(&-3).await.unwrap().is_none());
                assert!(!deliveries.exists_by_id(&-3).await.unwrap());
            }

            #[tokio::test]
            async fn test_find_all_empty() {
                let (invoices, _) = open_repositories($factory).await;

                let all = invoices.find_all().await.unwrap();
                assert!(all.is_empty(), "find_all on empty store should return empty vec");
                assert_eq!(invoices.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_find_all_single_invoice() {
                let (invoices, _) = open_repositories($factory).await;
                invoices
                    .save(invoice_with_id(1, "F-0001", 900))
                    .await
                    .unwrap();

                let all = invoices.find_all().await.unwrap();
                assert_count(&all, 1);
                assert_eq!(all[0].id, Some(1));
                assert_eq!(all[0].number, "F-0001");
            }

            // ==================================================================
            // CRUD: Update via save
            // ==================================================================

            #[tokio::test]
            async fn test_save_existing_id_updates() {
                let (invoices, _) = open_repositories($factory).await;
                invoices
                    .save(invoice_with_id(4, "F-0004", 100))
                    .await
                    .unwrap();

                let mut changed = invoices.find_by_id(&4).await.unwrap().unwrap();
                changed.amount_cents = 150;
                invoices.save(changed).await.unwrap();

                let retrieved = invoices.find_by_id(&4).await.unwrap().unwrap();
                assert_eq!(retrieved.amount_cents, 150);
                assert_eq!(invoices.count().await.unwrap(), 1);
            }

            // ==================================================================
            // CRUD: Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_by_id_existing() {
                let (_, deliveries) = open_repositories($factory).await;
                deliveries
                    .save(delivery_with_id(7, "12 quai des Chartrons"))
                    .await
                    .unwrap();
                assert_eq!(deliveries.count().await.unwrap(), 1);

                deliveries.delete_by_id(&7).await.unwrap();

                assert!(!deliveries.exists_by_id(&7).await.unwrap());
                assert!(deliveries.find_by_id(&7).await.unwrap().is_none());
                assert_eq!(deliveries.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_delete_by_id_missing() {
                let (_, deliveries) = open_repositories($factory).await;

                let err = deliveries.delete_by_id(&7).await.unwrap_err();
                match err {
                    StoreError::NotFound { entity_type, id } => {
                        assert_eq!(entity_type, "delivery");
                        assert_eq!(id, "7");
                    }
                    other => panic!("Expected NotFound, got {:?}", other),
                }
            }

            #[tokio::test]
            async fn test_delete_entity() {
                let (invoices, _) = open_repositories($factory).await;
                let saved = invoices.save(invoice("F-0010", 10)).await.unwrap();

                invoices.delete(&saved).await.unwrap();
                assert_eq!(invoices.count().await.unwrap(), 0);

                let err = invoices.delete(&saved).await.unwrap_err();
                assert!(err.is_not_found());
            }

            #[tokio::test]
            async fn test_count_tracks_distinct_ids() {
                let (invoices, _) = open_repositories($factory).await;

                invoices.save(invoice_with_id(1, "A", 1)).await.unwrap();
                invoices.save(invoice_with_id(2, "B", 2)).await.unwrap();
                invoices.save(invoice_with_id(1, "A bis", 3)).await.unwrap();
                assert_eq!(invoices.count().await.unwrap(), 2);

                invoices.delete_by_id(&2).await.unwrap();
                assert_eq!(invoices.count().await.unwrap(), 1);
            }

            // ==================================================================
            // Batch
            // ==================================================================

            #[tokio::test]
            async fn test_save_all_and_find_all_by_id() {
                let (invoices, _) = open_repositories($factory).await;

                let saved = invoices.save_all(sample_invoices(4)).await.unwrap();
                assert_eq!(ids_of(&saved), vec![1, 2, 3, 4]);
                assert_eq!(invoices.count().await.unwrap(), 4);

                let found = invoices.find_all_by_id(&[3, 42, 1]).await.unwrap();
                assert_eq!(ids_of(&found), vec![3, 1]);
                assert_eq!(found[0].number, "F-0002");
            }

            #[tokio::test]
            async fn test_delete_all_by_id_all_or_nothing() {
                let (invoices, _) = open_repositories($factory).await;
                invoices.save_all(sample_invoices(3)).await.unwrap();

                let err = invoices.delete_all_by_id(&[1, 8]).await.unwrap_err();
                assert!(err.is_not_found());
                assert_eq!(invoices.count().await.unwrap(), 3);

                invoices.delete_all_by_id(&[1, 3]).await.unwrap();
                let remaining = invoices.find_all().await.unwrap();
                assert_eq!(ids_of(&remaining), vec![2]);
            }

            #[tokio::test]
            async fn test_delete_all() {
                let (invoices, deliveries) = open_repositories($factory).await;
                invoices.save_all(sample_invoices(3)).await.unwrap();
                deliveries.save(delivery("8 rue Oberkampf")).await.unwrap();

                assert_eq!(invoices.delete_all().await.unwrap(), 3);
                assert_eq!(invoices.count().await.unwrap(), 0);
                // Other collections are untouched
                assert_eq!(deliveries.count().await.unwrap(), 1);
            }

            // ==================================================================
            // Paging & sorting
            // ==================================================================

            #[tokio::test]
            async fn test_find_page_first_and_last_partial() {
                let (invoices, _) = open_repositories($factory).await;
                invoices.save_all(sample_invoices(5)).await.unwrap();

                let first = invoices.find_page(&PageRequest::new(0, 2)).await.unwrap();
                assert_eq!(ids_of(&first.items), vec![1, 2]);
                assert_eq!(first.total, 5);
                assert_eq!(first.total_pages(), 3);
                assert!(first.has_next());
                assert!(!first.has_previous());

                let last = invoices.find_page(&PageRequest::new(2, 2)).await.unwrap();
                assert_eq!(ids_of(&last.items), vec![5]);
                assert_eq!(last.total, 5);
                assert!(!last.has_next());
                assert!(last.has_previous());
            }

            #[tokio::test]
            async fn test_find_page_past_end_is_empty() {
                let (invoices, deliveries) = open_repositories($factory).await;
                invoices.save_all(sample_invoices(3)).await.unwrap();

                let page = invoices.find_page(&PageRequest::new(7, 2)).await.unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.total, 3);

                // Empty collection
                let page = deliveries.find_page(&PageRequest::default()).await.unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.total, 0);
                assert_eq!(page.total_pages(), 0);
            }

            #[tokio::test]
            async fn test_find_page_descending() {
                let (_, deliveries) = open_repositories($factory).await;
                for id in [12, -4, 3, 40] {
                    deliveries
                        .save(delivery_with_id(id, "somewhere"))
                        .await
                        .unwrap();
                }

                let request = PageRequest::new(0, 3).sorted(SortOrder::Descending);
                let page = deliveries.find_page(&request).await.unwrap();
                assert_eq!(ids_of(&page.items), vec![40, 12, 3]);

                let page = deliveries.find_page(&PageRequest { page: 1, ..request }).await.unwrap();
                assert_eq!(ids_of(&page.items), vec![-4]);

                let all = deliveries.find_all_sorted(SortOrder::Descending).await.unwrap();
                assert_eq!(ids_of(&all), vec![40, 12, 3, -4]);
            }

            // ==================================================================
            // Identifiers
            // ==================================================================

            #[tokio::test]
            async fn test_transient_save_assigns_sequence() {
                let (invoices, _) = open_repositories($factory).await;

                let a = invoices.save(invoice("A", 1)).await.unwrap();
                let b = invoices.save(invoice("B", 2)).await.unwrap();
                let c = invoices.save(invoice("C", 3)).await.unwrap();

                assert_eq!(ids_of(&[a, b, c]), vec![1, 2, 3]);
            }

            #[tokio::test]
            async fn test_sequence_not_reused_after_delete() {
                let (invoices, _) = open_repositories($factory).await;

                let first = invoices.save(invoice("A", 1)).await.unwrap();
                invoices.delete(&first).await.unwrap();

                let second = invoices.save(invoice("B", 2)).await.unwrap();
                assert_eq!(second.id, Some(2));
            }

            #[tokio::test]
            async fn test_exhausted_sequence_keeps_existing_records() {
                let (invoices, _) = open_repositories($factory).await;
                invoices
                    .save(invoice_with_id(-5, "F-neg", 10))
                    .await
                    .unwrap();
                invoices
                    .save(invoice_with_id(i64::MAX, "F-max", 20))
                    .await
                    .unwrap();

                let err = invoices.save(invoice("F-new", 30)).await.unwrap_err();
                assert!(
                    matches!(err, StoreError::SequenceExhausted { .. }),
                    "unexpected error: {:?}",
                    err
                );

                assert_eq!(invoices.count().await.unwrap(), 2);
                let kept = invoices.find_by_id(&-5).await.unwrap().unwrap();
                assert_eq!(kept.number, "F-neg");
            }

            #[tokio::test]
            async fn test_find_all_in_id_order() {
                let (_, deliveries) = open_repositories($factory).await;
                for id in [30, -2, 4, 0] {
                    deliveries
                        .save(delivery_with_id(id, "somewhere"))
                        .await
                        .unwrap();
                }

                let all = deliveries.find_all().await.unwrap();
                assert_eq!(ids_of(&all), vec![-2, 0, 4, 30]);
            }

            // ==================================================================
            // Edge case: closed engine
            // ==================================================================

            #[tokio::test]
            async fn test_operations_after_close_are_unavailable() {
                let engine: Arc<dyn StorageEngine> = $factory;
                let (invoices, deliveries) = open_repositories(Arc::clone(&engine)).await;
                invoices.save(invoice("A", 1)).await.unwrap();

                engine.close().await.unwrap();

                assert!(invoices.find_by_id(&1).await.unwrap_err().is_unavailable());
                assert!(invoices.save(invoice("B", 2)).await.unwrap_err().is_unavailable());
                assert!(invoices.exists_by_id(&1).await.unwrap_err().is_unavailable());
                assert!(deliveries.count().await.unwrap_err().is_unavailable());
                assert!(
                    deliveries
                        .find_page(&PageRequest::default())
                        .await
                        .unwrap_err()
                        .is_unavailable()
                );
                assert!(deliveries.delete_by_id(&1).await.unwrap_err().is_unavailable());
            }

            // ==================================================================
            // Edge case: Concurrent access
            // ==================================================================

            /// Concurrent transient saves from spawned tasks must all land
            /// under distinct identifiers.
            #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
            async fn test_concurrent_saves() {
                let (invoices, _) = open_repositories($factory).await;

                let mut handles = Vec::new();
                for i in 0..8 {
                    let repo = invoices.clone();
                    handles.push(tokio::spawn(async move {
                        repo.save(invoice(&format!("C-{}", i), i)).await
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    let saved = handle.await.unwrap().unwrap();
                    ids.push(saved.id.unwrap());
                }
                ids.sort();
                ids.dedup();

                assert_eq!(ids.len(), 8, "Every save should get its own id");
                assert_eq!(invoices.count().await.unwrap(), 8);
            }
        }
    };
}
