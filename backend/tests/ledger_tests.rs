//! Batch ledger state machine tests
//!
//! Exercises the lifecycle transitions, secondary indexes, and failure
//! atomicity of the ledger state directly, without the HTTP layer.

use proptest::prelude::*;

use herbchain_backend::error::AppError;
use herbchain_backend::services::LedgerState;
use shared::models::{BatchStatus, CreateBatchRequest};
use shared::types::Address;

fn addr(last: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = last;
    Address::from_bytes(&bytes)
}

fn farmer() -> Address {
    addr(0x11)
}

fn officer() -> Address {
    addr(0x22)
}

fn manufacturer() -> Address {
    addr(0x33)
}

fn input(herb: &str) -> CreateBatchRequest {
    CreateBatchRequest {
        herb_name: herb.to_string(),
        location: "Farm A".to_string(),
        moisture_percent: 15,
        photo_hash: "hashX".to_string(),
        notes: "n1".to_string(),
    }
}

const T0: i64 = 1_700_000_000;

// ============================================================================
// Unit Tests
// ============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn create_assigns_sequential_ids_and_pending_status() {
        let mut ledger = LedgerState::new();

        let first = ledger.create_batch(farmer(), input("Basil"), T0);
        let second = ledger.create_batch(farmer(), input("Mint"), T0 + 1);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, BatchStatus::Pending);
        assert_eq!(first.farmer, farmer());
        assert_eq!(first.created_at, T0);
        assert_eq!(ledger.total_batches(), 2);
        assert_eq!(ledger.pending_batches(), vec![1, 2]);
        assert_eq!(ledger.farmer_batches(&farmer()), vec![1, 2]);
    }

    #[test]
    fn happy_path_scenario() {
        let mut ledger = LedgerState::new();

        let batch = ledger.create_batch(farmer(), input("Basil"), T0);
        assert_eq!(batch.id, 1);
        assert_eq!(batch.status, BatchStatus::Pending);

        let batch = ledger.approve_batch(1, officer(), T0 + 100).unwrap();
        assert_eq!(batch.status, BatchStatus::Approved);
        assert_eq!(batch.lab_officer, Some(officer()));
        assert_eq!(batch.approved_at, Some(T0 + 100));

        let batch = ledger
            .process_batch(1, manufacturer(), "qrY".to_string(), T0 + 200)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Processed);
        assert_eq!(batch.qr_code_hash.as_deref(), Some("qrY"));
        assert_eq!(batch.manufacturer, Some(manufacturer()));

        let found = ledger.batch_by_qr("qrY").unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn rejection_scenario() {
        let mut ledger = LedgerState::new();
        ledger.create_batch(farmer(), input("Basil"), T0);

        let batch = ledger
            .reject_batch(1, officer(), "moisture too high".to_string(), T0 + 100)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Rejected);
        assert_eq!(batch.rejection_reason.as_deref(), Some("moisture too high"));
        assert_eq!(batch.rejected_at, Some(T0 + 100));

        // A rejected batch cannot be processed
        let result = ledger.process_batch(1, manufacturer(), "qr".to_string(), T0 + 200);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn review_requires_pending() {
        let mut ledger = LedgerState::new();
        ledger.create_batch(farmer(), input("Basil"), T0);
        ledger.approve_batch(1, officer(), T0 + 100).unwrap();

        assert!(matches!(
            ledger.approve_batch(1, officer(), T0 + 200),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            ledger.reject_batch(1, officer(), "late".to_string(), T0 + 200),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn missing_batch_is_not_found() {
        let mut ledger = LedgerState::new();

        assert!(matches!(ledger.batch(42), Err(AppError::NotFound(_))));
        assert!(matches!(
            ledger.approve_batch(42, officer(), T0),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ledger.batch_by_qr("missing"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_qr_is_rejected_atomically() {
        let mut ledger = LedgerState::new();
        ledger.create_batch(farmer(), input("Basil"), T0);
        ledger.create_batch(farmer(), input("Mint"), T0);
        ledger.approve_batch(1, officer(), T0 + 1).unwrap();
        ledger.approve_batch(2, officer(), T0 + 1).unwrap();

        ledger
            .process_batch(1, manufacturer(), "qrY".to_string(), T0 + 2)
            .unwrap();

        let result = ledger.process_batch(2, manufacturer(), "qrY".to_string(), T0 + 3);
        assert!(matches!(result, Err(AppError::DuplicateKey(_))));

        // No partial state change: batch 2 is untouched and still processable
        let batch = ledger.batch(2).unwrap();
        assert_eq!(batch.status, BatchStatus::Approved);
        assert!(batch.qr_code_hash.is_none());
        assert!(batch.processed_at.is_none());
        assert_eq!(ledger.approved_batches(), vec![2]);

        ledger
            .process_batch(2, manufacturer(), "qrZ".to_string(), T0 + 4)
            .unwrap();
        assert_eq!(ledger.batch_by_qr("qrZ").unwrap().id, 2);
    }

    #[test]
    fn status_indexes_track_transitions() {
        let mut ledger = LedgerState::new();
        for herb in ["Basil", "Mint", "Sage", "Thyme"] {
            ledger.create_batch(farmer(), input(herb), T0);
        }

        ledger.approve_batch(1, officer(), T0 + 1).unwrap();
        ledger.approve_batch(2, officer(), T0 + 1).unwrap();
        ledger
            .reject_batch(3, officer(), "contaminated".to_string(), T0 + 1)
            .unwrap();

        assert_eq!(ledger.pending_batches(), vec![4]);
        assert_eq!(ledger.approved_batches(), vec![1, 2]);

        // Processing removes the id from the approved listing
        ledger
            .process_batch(1, manufacturer(), "qr-1".to_string(), T0 + 2)
            .unwrap();
        assert_eq!(ledger.approved_batches(), vec![2]);
    }

    #[test]
    fn transition_timestamps_follow_creation() {
        let mut ledger = LedgerState::new();
        ledger.create_batch(farmer(), input("Basil"), T0);
        ledger.approve_batch(1, officer(), T0 + 50).unwrap();
        ledger
            .process_batch(1, manufacturer(), "qr".to_string(), T0 + 90)
            .unwrap();

        let batch = ledger.batch(1).unwrap();
        assert!(batch.approved_at.unwrap() >= batch.created_at);
        assert!(batch.processed_at.unwrap() >= batch.approved_at.unwrap());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    /// Strategy for creation inputs with arbitrary free text
    fn input_strategy() -> impl Strategy<Value = CreateBatchRequest> {
        ("[a-zA-Z ]{1,24}", "[a-zA-Z0-9 ]{0,24}", 0u8..=100, "[a-f0-9]{8,16}").prop_map(
            |(herb_name, location, moisture_percent, photo_hash)| CreateBatchRequest {
                herb_name,
                location,
                moisture_percent,
                photo_hash,
                notes: String::new(),
            },
        )
    }

    proptest! {
        /// Every created batch starts Pending and belongs to its creator
        #[test]
        fn prop_created_batches_start_pending(inputs in prop::collection::vec(input_strategy(), 1..20)) {
            let mut ledger = LedgerState::new();
            let count = inputs.len() as u64;

            for (i, input) in inputs.into_iter().enumerate() {
                let batch = ledger.create_batch(farmer(), input, T0 + i as i64);
                prop_assert_eq!(batch.id, i as u64 + 1);
                prop_assert_eq!(batch.status, BatchStatus::Pending);
                prop_assert_eq!(&batch.farmer, &farmer());
            }

            prop_assert_eq!(ledger.total_batches(), count);
            prop_assert_eq!(ledger.pending_batches().len() as u64, count);
            prop_assert_eq!(ledger.farmer_batches(&farmer()).len() as u64, count);
        }

        /// The pending and approved indexes partition exactly by status,
        /// whatever review decisions are applied
        #[test]
        fn prop_indexes_match_status(decisions in prop::collection::vec(0u8..3, 1..24)) {
            let mut ledger = LedgerState::new();

            for (i, decision) in decisions.iter().enumerate() {
                let id = ledger.create_batch(farmer(), input("Herb"), T0).id;
                match decision {
                    0 => {} // leave pending
                    1 => {
                        ledger.approve_batch(id, officer(), T0 + 1).unwrap();
                    }
                    _ => {
                        ledger
                            .reject_batch(id, officer(), format!("r{}", i), T0 + 1)
                            .unwrap();
                    }
                }
            }

            let pending = ledger.pending_batches();
            let approved = ledger.approved_batches();

            for id in 1..=decisions.len() as u64 {
                let status = ledger.batch(id).unwrap().status;
                prop_assert_eq!(pending.contains(&id), status == BatchStatus::Pending);
                prop_assert_eq!(approved.contains(&id), status == BatchStatus::Approved);
            }
        }

        /// A registered QR hash resolves to exactly one batch id, and a
        /// second registration attempt always fails
        #[test]
        fn prop_qr_hash_is_unique(qr in "[a-z0-9]{4,16}") {
            let mut ledger = LedgerState::new();
            ledger.create_batch(farmer(), input("Basil"), T0);
            ledger.create_batch(farmer(), input("Mint"), T0);
            ledger.approve_batch(1, officer(), T0 + 1).unwrap();
            ledger.approve_batch(2, officer(), T0 + 1).unwrap();

            ledger.process_batch(1, manufacturer(), qr.clone(), T0 + 2).unwrap();
            prop_assert_eq!(ledger.batch_by_qr(&qr).unwrap().id, 1);

            let result = ledger.process_batch(2, manufacturer(), qr, T0 + 3);
            prop_assert!(matches!(result, Err(AppError::DuplicateKey(_))));
        }
    }
}
