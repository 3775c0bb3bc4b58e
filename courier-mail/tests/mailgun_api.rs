//! Integration tests for the Mailgun transport against a mock API.

#![cfg(feature = "mailgun")]

use std::time::Duration;

use courier_mail::prelude::*;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MESSAGES_PATH: &str = "/v2/mg.example.com/messages";

fn transport(server: &MockServer) -> MailgunTransport {
    let config = MailgunConfig::new("key-test", "mg.example.com").base_url(server.uri());
    MailgunTransport::new(config).unwrap()
}

fn message() -> Message {
    Message::builder()
        .sender("noreply@example.com", "Example")
        .to("jane@example.com", "Jane Doe")
        .bcc("audit@example.com", "")
        .subject("Welcome")
        .body("Thanks for signing up")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_send_posts_form_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(basic_auth("api", "key-test"))
        .and(body_string_contains("to=Jane+Doe+%3Cjane%40example.com%3E"))
        .and(body_string_contains("bcc=audit%40example.com"))
        .and(body_string_contains("from=noreply%40example.com"))
        .and(body_string_contains("subject=Welcome"))
        .and(body_string_contains("text=Thanks+for+signing+up"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":"<20260101.1@mg.example.com>","message":"Queued. Thank you."}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server).send(&message()).await.unwrap();
}

#[tokio::test]
async fn test_cc_only_message_is_addressed_to_sender() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_string_contains("to=noreply%40example.com"))
        .and(body_string_contains("cc=Bob+%3Cbob%40example.com%3E"))
        .and(body_string_contains("html=%3Cp%3EHi%3C%2Fp%3E"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let message = Message::builder()
        .sender("noreply@example.com", "Example")
        .cc("bob@example.com", "Bob")
        .subject("Copy")
        .body("<p>Hi</p>")
        .build()
        .unwrap();

    transport(&server).send(&message).await.unwrap();
}

#[tokio::test]
async fn test_bcc_only_message_is_addressed_to_sender() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_string_contains("to=noreply%40example.com"))
        .and(body_string_contains("bcc=audit%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let message = Message::builder()
        .sender("noreply@example.com", "Example")
        .bcc("audit@example.com", "")
        .subject("Audit")
        .body("Copy for the records")
        .build()
        .unwrap();

    transport(&server).send(&message).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = transport(&server).send(&message()).await.unwrap_err();

    assert!(matches!(err, MailError::Rejected { status: 500, .. }));
    assert_eq!(err.to_string(), "Mailgun rejected the message (HTTP 500)");
}

#[tokio::test]
async fn test_empty_success_body_is_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = transport(&server).send(&message()).await.unwrap_err();

    assert!(matches!(err, MailError::EmptyResponse { status: 200, .. }));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = MailgunConfig::new("key-test", "mg.example.com")
        .base_url(server.uri())
        .timeout(Duration::from_millis(200));
    let err = MailgunTransport::new(config)
        .unwrap()
        .send(&message())
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::Timeout));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = MailgunConfig::new("key-test", "mg.example.com").base_url(uri);
    let err = MailgunTransport::new(config)
        .unwrap()
        .send(&message())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_usable_as_trait_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport: Box<dyn Transport> = Box::new(transport(&server));

    assert_eq!(transport.provider_name(), "Mailgun");
    transport.send(&message()).await.unwrap();
}
