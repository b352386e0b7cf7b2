use contact_relay::{
    email::resend::ResendClient,
    entities::email::OutgoingEmail,
    errors::EmailError,
    repositories::email_sender::EmailSender,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn outgoing() -> OutgoingEmail {
    OutgoingEmail {
        from: "Example Contact <contact@example.com>".to_string(),
        to: vec!["inbox@example.com".to_string()],
        reply_to: "john@example.com".to_string(),
        subject: "New Contact Form: John Doe".to_string(),
        html: "<p>Hello</p>".to_string(),
        text: "Hello".to_string(),
    }
}

#[actix_rt::test]
async fn posts_email_and_returns_provider_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_test_api_key"))
        .and(body_partial_json(json!({
            "from": "Example Contact <contact@example.com>",
            "to": ["inbox@example.com"],
            "reply_to": "john@example.com",
            "subject": "New Contact Form: John Doe",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_123" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ResendClient::new("re_test_api_key", &server.uri()).unwrap();
    let id = client.send(&outgoing()).await.unwrap();

    assert_eq!(id.as_deref(), Some("email_123"));
}

#[actix_rt::test]
async fn empty_or_missing_id_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = ResendClient::new("re_test_api_key", &server.uri()).unwrap();

    assert_eq!(client.send(&outgoing()).await.unwrap(), None);
    assert_eq!(client.send(&outgoing()).await.unwrap(), None);
}

#[actix_rt::test]
async fn rejection_carries_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "Invalid `to` field."
        })))
        .mount(&server)
        .await;

    let client = ResendClient::new("re_test_api_key", &server.uri()).unwrap();
    let err = client.send(&outgoing()).await.unwrap_err();

    match err {
        EmailError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid `to` field.");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[actix_rt::test]
async fn rejection_without_json_keeps_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = ResendClient::new("re_test_api_key", &server.uri()).unwrap();
    let err = client.send(&outgoing()).await.unwrap_err();

    assert!(matches!(
        err,
        EmailError::Rejected { status: 503, ref message } if message == "upstream unavailable"
    ));
}

#[actix_rt::test]
async fn unreachable_provider_is_a_transport_error() {
    let client = ResendClient::new("re_test_api_key", "http://127.0.0.1:9").unwrap();
    let err = client.send(&outgoing()).await.unwrap_err();

    assert!(matches!(err, EmailError::Transport(_)));
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        ResendClient::new("re_test_api_key", "not a url"),
        Err(EmailError::Transport(_))
    ));
}
