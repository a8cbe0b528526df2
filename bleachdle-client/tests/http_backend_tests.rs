
use bleachdle_client::backend::{GameBackend, HttpBackend, PageFetcher};
use bleachdle_client::error::ClientError;
use bleachdle_types::{CompareOutcome, GuessRequest};
use serde_json::json;
use test_helpers::*;

fn names(results: &[bleachdle_types::CharacterSummary]) -> Vec<&str> {
    results.iter().map(|c| c.name.as_str()).collect()
}

#[tokio::test]
async fn test_search_matches_first_and_last_names() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = HttpBackend::new(&config_for(&base_url)).unwrap();

    let results = backend.search_characters("kuchiki").await.unwrap();
    assert_eq!(names(&results), vec!["Byakuya Kuchiki", "Rukia Kuchiki"]);

    let results = backend.search_characters("Ich").await.unwrap();
    assert_eq!(names(&results), vec!["Ichigo Kurosaki"]);

    let results = backend.search_characters("Aizen").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_query_is_url_encoded() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = create_backend(&base_url);

    let results = backend.search_characters("Rukia K").await.unwrap();
    assert_eq!(names(&results), vec!["Rukia Kuchiki"]);

    let results = backend.search_characters("a&query=b").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_compare_character_reply() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = create_backend(&base_url);

    let response = backend
        .compare("/compare_character", &GuessRequest::new("Rukia Kuchiki"))
        .await
        .unwrap();

    assert!(response.error.is_none());
    assert!(response.is_correct.is_none());
    assert_eq!(response.comparison_result["chr_height"].value, Some(json!(144)));

    let CompareOutcome::Accepted(result) = response.into_outcome() else {
        panic!("Expected an accepted comparison");
    };
    assert!(!result.is_correct);
    assert!(result.is_attribute_correct("chr_gender"));
    assert!(!result.is_attribute_correct("chr_race"));
    assert_eq!(result.todays_character.number("chr_height"), Some(181.0));
}

#[tokio::test]
async fn test_compare_unknown_character_is_rejected() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = create_backend(&base_url);

    let response = backend
        .compare("/compare_character", &GuessRequest::new("Sosuke Aizen"))
        .await
        .unwrap();

    assert_eq!(
        response.into_outcome(),
        CompareOutcome::Rejected("Character not found in the database".to_string())
    );
}

#[tokio::test]
async fn test_compare_name_only_variant() {
    let base_url = start_stub_server("Kenpachi Zaraki").await;
    let backend = create_backend(&base_url);

    let response = backend
        .compare("/compare_bankai", &GuessRequest::new("Kenpachi Zaraki"))
        .await
        .unwrap();

    assert_eq!(response.is_correct, Some(true));
    assert!(response.comparison_result.is_empty());
    assert!(matches!(response.into_outcome(), CompareOutcome::Accepted(r) if r.is_correct));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = create_backend(&base_url);

    let err = backend.fetch_page("/broken").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));

    let err = backend
        .compare("/compare_nothing", &GuessRequest::new("Ichigo Kurosaki"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_page_returns_html() {
    let base_url = start_stub_server("Ichigo Kurosaki").await;
    let backend = create_backend(&base_url);

    let html = backend.fetch_page("/bankai").await.unwrap();
    assert!(html.contains("<h1>bankai</h1>"));
    assert!(html.contains(r#"id="content-container""#));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let backend = unreachable_backend();

    let err = backend.search_characters("Ichigo").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
