//! Channel selection and provenance of fetched batches.

use std::sync::Arc;

use roster_verify_core::{Channel, Provenance, RecordBatchFetcher, VerifyError};

use crate::fixtures::{bare_body, unsigned_record, wrapped_body, FakeDirectory, Reply};

fn three_users() -> Vec<roster_verify_core::UserRecord> {
    vec![
        unsigned_record("1", "a@example.com"),
        unsigned_record("2", "b@example.com"),
        unsigned_record("3", "c@example.com"),
    ]
}

#[tokio::test]
async fn binary_500_falls_back_to_structured() {
    let users = three_users();
    let directory = Arc::new(FakeDirectory::new(
        Reply::Status(500),
        Reply::Body(wrapped_body(&users)),
    ));

    let batch = RecordBatchFetcher::new(directory.clone())
        .fetch()
        .await
        .unwrap();

    assert_eq!(batch.provenance(), Provenance::Fallback);
    assert_eq!(batch.len(), 3);
    assert!(batch.export_info().fallback);

    // Fallback size is the serialised record array actually used.
    let array = serde_json::to_vec(&serde_json::to_value(&users).unwrap()).unwrap();
    assert_eq!(batch.byte_size(), array.len() as u64);

    assert_eq!(directory.calls(), vec![Channel::Binary, Channel::Structured]);
}

#[tokio::test]
async fn binary_success_reports_binary_size_and_structured_records() {
    let users = vec![
        unsigned_record("1", "a@example.com"),
        unsigned_record("2", "b@example.com"),
    ];
    let directory = Arc::new(FakeDirectory::new(
        Reply::Body(vec![0x0a; 137]),
        Reply::Body(bare_body(&users)),
    ));

    let batch = RecordBatchFetcher::new(directory.clone())
        .fetch()
        .await
        .unwrap();

    assert_eq!(batch.provenance(), Provenance::Binary);
    assert_eq!(batch.byte_size(), 137);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.records()[1].id, "2");
    // The structured channel is always consulted for records.
    assert_eq!(directory.calls(), vec![Channel::Binary, Channel::Structured]);
}

#[tokio::test]
async fn empty_structured_response_is_a_valid_batch() {
    let directory = Arc::new(FakeDirectory::new(
        Reply::Status(404),
        Reply::Body(br#"{"users":[]}"#.to_vec()),
    ));

    let batch = RecordBatchFetcher::new(directory).fetch().await.unwrap();

    assert!(batch.is_empty());
    assert_eq!(batch.provenance(), Provenance::Fallback);
    assert_eq!(batch.byte_size(), 2);
}

#[tokio::test]
async fn both_channels_down_is_the_only_error() {
    let directory = Arc::new(FakeDirectory::new(Reply::Status(502), Reply::Status(503)));

    let err = RecordBatchFetcher::new(directory).fetch().await.unwrap_err();

    match err {
        VerifyError::NoChannelsReachable { binary, structured } => {
            assert!(binary.contains("502"));
            assert!(structured.contains("503"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn binary_alone_does_not_produce_records() {
    let directory = Arc::new(FakeDirectory::new(
        Reply::Body(vec![1, 2, 3]),
        Reply::Status(500),
    ));

    let err = RecordBatchFetcher::new(directory).fetch().await.unwrap_err();

    assert!(matches!(err, VerifyError::NoChannelsReachable { .. }));
    assert!(err.to_string().contains("3 bytes"));
}

#[tokio::test]
async fn malformed_structured_payload_fails_fetch() {
    let directory = Arc::new(FakeDirectory::new(
        Reply::Status(500),
        Reply::Body(br#"{"data": []}"#.to_vec()),
    ));

    let err = RecordBatchFetcher::new(directory).fetch().await.unwrap_err();

    assert!(matches!(err, VerifyError::NoChannelsReachable { .. }));
    assert!(err.to_string().contains("users"));
}

#[tokio::test]
async fn disabled_binary_channel_is_never_called() {
    let directory = Arc::new(FakeDirectory::new(
        Reply::Body(vec![9; 10]),
        Reply::Body(bare_body(&three_users())),
    ));

    let batch = RecordBatchFetcher::new(directory.clone())
        .with_binary(false)
        .fetch()
        .await
        .unwrap();

    assert_eq!(batch.provenance(), Provenance::Fallback);
    assert_eq!(directory.calls(), vec![Channel::Structured]);
}

#[tokio::test]
async fn odd_records_are_kept_beside_good_ones() {
    let good = unsigned_record("1", "a@example.com");
    let body = serde_json::to_vec(&serde_json::json!({
        "users": [
            good,
            { "id": "2", "email": null, "role": null, "signature": 123, "createdAt": 1.7e12 },
            { "id": 3, "emailHash": false, "publicKey": ["x"], "createdAt": true },
            { "email": "no-id@example.com" },
        ]
    }))
    .unwrap();
    let directory = Arc::new(FakeDirectory::new(Reply::Status(500), Reply::Body(body)));

    let batch = RecordBatchFetcher::new(directory).fetch().await.unwrap();

    let ids: Vec<&str> = batch.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(batch.records()[1].email, "");
    assert!(batch.records()[1].signature.is_none());
    assert!(batch.records()[2].created_at.is_none());
    assert_eq!(batch.provenance(), Provenance::Fallback);
}
