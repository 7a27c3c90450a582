//! Fetch -> verify -> export, end to end over an in-memory directory.

use std::sync::Arc;

use chrono::Utc;
use roster_crypto::encode_field;
use roster_verify_core::{
    export_file_name, write_export, Batch, ExportFormatter, OutcomeCounts, Provenance,
    RecordBatchFetcher, SignatureVerifier, VerificationOutcome, VerificationReport,
};

use crate::fixtures::{
    email_hash, other_rsa_key, rs384_public_key_field, sign_rs384, signed_record,
    tampered_record, unsigned_record, wrapped_body, FakeDirectory, Reply,
};

#[test]
fn valid_signature_is_valid() {
    let record = signed_record("1", "alice@example.com");
    assert_eq!(SignatureVerifier::new().verify(&record), VerificationOutcome::Valid);
}

#[test]
fn flipped_signature_bit_is_invalid() {
    let record = tampered_record("1", "alice@example.com", 17, 3);
    assert_eq!(SignatureVerifier::new().verify(&record), VerificationOutcome::Invalid);
}

#[test]
fn truncated_signature_is_invalid_not_indeterminate() {
    let mut record = signed_record("1", "alice@example.com");
    let hash = email_hash("alice@example.com");
    let mut signature = sign_rs384(crate::fixtures::rsa_key(), &hash);
    signature.truncate(100);
    record.signature = Some(encode_field(&signature));
    assert_eq!(SignatureVerifier::new().verify(&record), VerificationOutcome::Invalid);
}

#[test]
fn signature_under_another_key_is_invalid() {
    let mut record = signed_record("1", "alice@example.com");
    record.public_key = Some(rs384_public_key_field(other_rsa_key()));
    assert_eq!(SignatureVerifier::new().verify(&record), VerificationOutcome::Invalid);
}

#[test]
fn proof_borrowed_from_another_record_is_invalid() {
    let alice = signed_record("1", "alice@example.com");
    let mut bob = signed_record("2", "bob@example.com");
    bob.signature = alice.signature.clone();
    assert_eq!(SignatureVerifier::new().verify(&bob), VerificationOutcome::Invalid);
}

#[test]
fn corrupt_key_descriptor_is_indeterminate() {
    let mut record = signed_record("1", "alice@example.com");
    record.public_key = Some("not-base64!".into());
    assert_eq!(
        SignatureVerifier::new().verify(&record),
        VerificationOutcome::Indeterminate
    );
}

#[test]
fn descriptor_with_other_digest_is_invalid() {
    // Key says RS256 while the signature was made with SHA-384.
    let mut record = signed_record("1", "alice@example.com");
    let json = String::from_utf8(
        base64_decode(record.public_key.as_deref().unwrap()),
    )
    .unwrap()
    .replace("RS384", "RS256");
    record.public_key = Some(encode_field(json.as_bytes()));
    assert_eq!(SignatureVerifier::new().verify(&record), VerificationOutcome::Invalid);
}

fn base64_decode(value: &str) -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(value).unwrap()
}

#[tokio::test]
async fn three_record_batch_end_to_end() {
    let mut no_signature = signed_record("3", "carol@example.com");
    no_signature.signature = None;

    let users = vec![
        signed_record("1", "alice@example.com"),
        tampered_record("2", "bob@example.com", 0, 0),
        no_signature,
    ];
    let directory = Arc::new(FakeDirectory::new(
        Reply::Status(500),
        Reply::Body(wrapped_body(&users)),
    ));

    let batch = RecordBatchFetcher::new(directory).fetch().await.unwrap();
    let report = VerificationReport::build(&batch).await;

    assert_eq!(
        report.counts(),
        OutcomeCounts {
            valid: 1,
            invalid: 1,
            indeterminate: 1,
        }
    );
    assert_eq!(report.outcome_for("1"), Some(VerificationOutcome::Valid));
    assert_eq!(report.outcome_for("2"), Some(VerificationOutcome::Invalid));
    assert_eq!(report.outcome_for("3"), Some(VerificationOutcome::Indeterminate));

    let csv = String::from_utf8(ExportFormatter::report_to_csv(&report).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ID,Email,Role,Status,CreatedAt,SignatureValid");
    assert!(lines[1].starts_with("1,") && lines[1].ends_with(",Yes"));
    assert!(lines[2].starts_with("2,") && lines[2].ends_with(",No"));
    assert!(lines[3].starts_with("3,") && lines[3].ends_with(",No"));
}

#[tokio::test]
async fn export_is_reproducible_from_same_report() {
    let users: Vec<_> = (0..5)
        .map(|i| {
            if i % 2 == 0 {
                signed_record(&i.to_string(), &format!("user{i}@example.com"))
            } else {
                unsigned_record(&i.to_string(), &format!("user{i}@example.com"))
            }
        })
        .collect();
    let batch = Batch::new(users, Provenance::Binary, 512, Utc::now());

    let report = VerificationReport::build(&batch).await;
    let again = VerificationReport::build(&batch).await;

    let first = ExportFormatter::report_to_csv(&report).unwrap();
    assert_eq!(first, ExportFormatter::report_to_csv(&report).unwrap());
    assert_eq!(first, ExportFormatter::report_to_csv(&again).unwrap());

    let text = String::from_utf8(first).unwrap();
    assert_eq!(text.lines().count(), batch.len() + 1);
    let yes: Vec<&str> = text
        .lines()
        .skip(1)
        .filter(|l| l.ends_with(",Yes"))
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(yes, ["0", "2", "4"]);
}

#[tokio::test]
async fn export_file_written_to_directory() {
    let batch = Batch::new(
        vec![signed_record("1", "alice@example.com")],
        Provenance::Fallback,
        10,
        Utc::now(),
    );
    let report = VerificationReport::build(&batch).await;
    let dir = tempfile::tempdir().unwrap();
    let at = Utc::now();

    let path = write_export(dir.path(), &report, at).unwrap();

    assert_eq!(path.file_name().unwrap().to_str().unwrap(), export_file_name(at));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, ExportFormatter::report_to_csv(&report).unwrap());
}

#[tokio::test]
async fn concurrent_and_sequential_reports_agree() {
    let users = vec![
        signed_record("a", "a@example.com"),
        tampered_record("b", "b@example.com", 5, 7),
        unsigned_record("c", "c@example.com"),
        signed_record("d", "d@example.com"),
    ];
    let batch = Batch::new(users, Provenance::Fallback, 0, Utc::now());

    let concurrent = VerificationReport::build(&batch).await;
    let sequential = VerificationReport::build_blocking(&batch, &SignatureVerifier::new());

    assert_eq!(concurrent.outcomes(), sequential.outcomes());
    assert_eq!(concurrent.counts(), sequential.counts());
}

#[tokio::test]
async fn forged_record_sharing_an_id_exports_as_no() {
    let users = vec![
        tampered_record("7", "mallory@example.com", 3, 1),
        signed_record("7", "alice@example.com"),
    ];
    let directory = Arc::new(FakeDirectory::new(
        Reply::Status(500),
        Reply::Body(wrapped_body(&users)),
    ));

    let batch = RecordBatchFetcher::new(directory).fetch().await.unwrap();
    let report = VerificationReport::build(&batch).await;

    assert_eq!(
        report.counts(),
        OutcomeCounts {
            valid: 1,
            invalid: 1,
            indeterminate: 0,
        }
    );
    assert_eq!(
        report.outcomes().to_vec(),
        vec![VerificationOutcome::Invalid, VerificationOutcome::Valid]
    );
    assert_eq!(report.outcome_for("7"), Some(VerificationOutcome::Invalid));

    let csv = String::from_utf8(ExportFormatter::report_to_csv(&report).unwrap()).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("7,mallory@example.com,") && rows[0].ends_with(",No"));
    assert!(rows[1].starts_with("7,alice@example.com,") && rows[1].ends_with(",Yes"));

    for (line, (_, outcome)) in rows.iter().zip(report.entries()) {
        assert_eq!(line.ends_with(",Yes"), outcome == VerificationOutcome::Valid);
    }
}
