//! Tests for the verification submission flow.

use educred_holder::provider::example::Provider;
use educred_holder::{ApiClient, AuthEvent, LoginStatus, SessionGate, Verification, VerificationStatus};
use serde_json::json;

const ENTRY_POINT: &str = "http://api.example.internal";
const TOKEN: &str = "token-1";
const DIPLOMAS: &str = "/educationalcredentials/diplomas";
const PERSON: &str = r#"{"identifier": "jdoe", "givenName": "Jane", "familyName": "Doe", "roles": []}"#;

fn api() -> ApiClient<Provider> {
    ApiClient::new(Provider::new(), ENTRY_POINT)
}

async fn login(api: &ApiClient<Provider>, gate: &SessionGate) {
    api.provider().respond("GET", "/base/people/jdoe", 200, PERSON);
    let event = AuthEvent {
        login_status: LoginStatus::LoggedIn,
        token: Some(TOKEN.into()),
        person_id: Some("jdoe".into()),
    };
    gate.handle_event(api, &event).await;
    assert!(gate.is_logged_in());
}

#[tokio::test]
async fn accepted_submission_reads_as_verified() {
    let api = api();
    let gate = SessionGate::new();
    login(&api, &gate).await;

    api.provider().respond("POST", DIPLOMAS, 201, json!({"@id": "abc"}).to_string());

    let mut verification = Verification::new();
    assert_eq!(verification.status(), VerificationStatus::Unverified);

    verification.submit(&api, &gate, "credential text").await;

    assert_eq!(verification.status(), VerificationStatus::Verified);
    assert_eq!(verification.status().code(), 1);
    assert!(!verification.is_submitting());

    // The submission posts the text as a form field.
    let request = api.provider().requests().pop().expect("should have sent a request");
    let content_type = request
        .headers
        .iter()
        .find(|(name, _)| name.as_str() == "content-type")
        .expect("should set a content type");
    assert_eq!(content_type.1, "application/x-www-form-urlencoded");
    let body = request.body.expect("should carry a body");
    assert_eq!(String::from_utf8_lossy(&body), "text=credential+text");
}

#[tokio::test]
async fn rejected_submission_reads_as_rejected() {
    let api = api();
    let gate = SessionGate::new();
    login(&api, &gate).await;

    api.provider().respond("POST", DIPLOMAS, 400, json!({"hydra:description": "no"}).to_string());

    let mut verification = Verification::new();
    verification.submit(&api, &gate, "credential text").await;

    assert_eq!(verification.status(), VerificationStatus::Rejected);
    assert_eq!(verification.status().code(), 90);
}

#[tokio::test]
async fn transport_failure_reads_as_unverified() {
    let api = api();
    let gate = SessionGate::new();
    login(&api, &gate).await;

    api.provider().fail("POST", DIPLOMAS);

    let mut verification = Verification::new();
    verification.submit(&api, &gate, "credential text").await;

    assert_eq!(verification.status(), VerificationStatus::Unverified);
    assert!(!verification.is_submitting());
}

// Statuses other than 400 are not distinguished; the outcome of the previous
// submission does not survive a new one.
#[tokio::test]
async fn other_error_statuses_reset_to_unverified() {
    let api = api();
    let gate = SessionGate::new();
    login(&api, &gate).await;

    api.provider().respond("POST", DIPLOMAS, 201, "{}");
    api.provider().respond("POST", DIPLOMAS, 503, "unavailable");

    let mut verification = Verification::new();
    verification.submit(&api, &gate, "credential text").await;
    assert_eq!(verification.status(), VerificationStatus::Verified);

    verification.submit(&api, &gate, "credential text").await;
    assert_eq!(verification.status(), VerificationStatus::Unverified);
}

#[tokio::test]
async fn empty_text_is_not_submitted() {
    let api = api();
    let gate = SessionGate::new();
    login(&api, &gate).await;

    let mut verification = Verification::new();
    verification.submit(&api, &gate, "   ").await;

    assert_eq!(verification.status(), VerificationStatus::Unverified);
    // Only the profile fetch has gone out.
    assert_eq!(api.provider().requests().len(), 1);
}

#[tokio::test]
async fn submission_requires_a_logged_in_session() {
    let api = api();
    let gate = SessionGate::new();

    let mut verification = Verification::new();
    verification.submit(&api, &gate, "credential text").await;

    assert_eq!(verification.status(), VerificationStatus::Unverified);
    assert!(api.provider().requests().is_empty());
}

#[tokio::test]
async fn wallet_presentations_can_be_selected_for_submission() {
    let api = api();

    api.provider().seed_presentation(json!({
        "id": "urn:uuid:first",
        "credentialSubject": {
            "id": "did:example:subject-1",
            "studyProgram": "Software Engineering",
            "learningAchievement": "Master of Science",
            "dateOfAchievement": "2021-10-29T00:00:00+02:00",
        },
    }));
    api.provider().seed_presentation(json!({
        "id": "urn:uuid:second",
        "credentialSubject": {
            "id": "did:example:subject-2",
            "studyProgram": "Physics",
            "learningAchievement": "Bachelor of Science",
            "dateOfAchievement": "2019-07-01T00:00:00+02:00",
        },
    }));

    let mut verification = Verification::new();
    let text = verification
        .from_wallet(api.provider())
        .await
        .expect("should reach the wallet")
        .expect("should hold a presentation");

    // The first presentation becomes the selection.
    assert!(text.contains("urn:uuid:first"));
    assert_eq!(verification.presentations().len(), 2);
    let selected = verification.selected().expect("should have a selection");
    assert_eq!(selected.name, "Software Engineering");
    assert_eq!(selected.educational_level, "Master of Science");

    // Selection works by credential id or by subject id.
    let text = verification.select("urn:uuid:second").expect("should match");
    assert!(text.contains("Physics"));
    assert_eq!(verification.selected().expect("should have a selection").name, "Physics");

    verification.select("did:example:subject-1").expect("should match");
    assert_eq!(
        verification.selected().expect("should have a selection").name,
        "Software Engineering"
    );

    assert!(verification.select("urn:uuid:missing").is_none());
}

#[tokio::test]
async fn empty_wallet_yields_no_selection() {
    let api = api();

    let mut verification = Verification::new();
    let text = verification.from_wallet(api.provider()).await.expect("should reach the wallet");

    assert!(text.is_none());
    assert!(verification.selected().is_none());
}
