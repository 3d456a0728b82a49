use std::time::Duration;

use timicli::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should not be empty
    assert!(!challenge.is_empty());

    // Should be deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_format_elapsed() {
    assert_eq!(format_elapsed(Duration::from_millis(0)), "0.0s");
    assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
    assert_eq!(format_elapsed(Duration::from_secs(59)), "59.0s");
    assert_eq!(format_elapsed(Duration::from_secs(60)), "1m00s");
    assert_eq!(format_elapsed(Duration::from_secs(125)), "2m05s");
}

#[test]
fn test_format_added_date() {
    // Timestamps are shortened to their date part
    assert_eq!(
        format_added_date("2023-10-17T12:34:56.000+0000"),
        "2023-10-17"
    );

    // Short input stays as-is
    assert_eq!(format_added_date("2023"), "2023");
    assert_eq!(format_added_date(""), "");
}
