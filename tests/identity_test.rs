mod common;

use campusflow_backend::error::Error;
use campusflow_backend::services::identity_service::{IdentityService, Prompt, Session};
use common::test_config;
use mockito::Matcher;

fn identity(server: &mockito::ServerGuard) -> IdentityService {
    let token_url = format!("{}/token", server.url());
    let config = test_config(&[
        ("GOOGLE_CLIENT_ID", "client-123.apps.googleusercontent.com"),
        ("GOOGLE_CLIENT_SECRET", "shh"),
        ("GOOGLE_SHEETS_API_KEY", "sheets-key"),
        ("GOOGLE_OAUTH_TOKEN_URL", token_url.as_str()),
    ]);
    IdentityService::new(&config, reqwest::Client::new())
}

#[tokio::test]
async fn consent_then_silent_refresh() {
    let mut server = mockito::Server::new_async().await;
    let exchange = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.first","refresh_token":"1//refresh","expires_in":3599,"token_type":"Bearer","scope":"https://www.googleapis.com/auth/spreadsheets"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.second","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;

    let service = identity(&server);
    let session = tokio_test::assert_ok!(service.init_clients(Session::Uninitialized));
    assert_eq!(session, Session::ClientsReady);
    assert_eq!(Prompt::for_session(&session), Prompt::Consent);

    let url = service.consent_url(&session, "xyz").unwrap();
    assert!(url.contains("prompt=consent"));
    assert!(url.contains("state=xyz"));
    assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));

    let (session, token) = service.authenticate(session, Some("auth-code")).await.unwrap();
    assert_eq!(token, "ya29.first");
    assert_eq!(Prompt::for_session(&session), Prompt::Silent);
    assert!(service.consent_url(&session, "abc").unwrap().contains("prompt=none"));

    let (session, token) = service.authenticate(session, None).await.unwrap();
    assert_eq!(token, "ya29.second");
    match session {
        Session::TokenAcquired(tokens) => {
            assert_eq!(tokens.refresh_token.as_deref(), Some("1//refresh"))
        }
        other => panic!("unexpected session: {:?}", other),
    }

    exchange.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn provider_error_payload_is_an_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"access_denied","error_description":"The user denied access"}"#)
        .create_async()
        .await;

    let service = identity(&server);
    let err = service
        .authenticate(Session::ClientsReady, Some("bad-code"))
        .await
        .unwrap_err();

    match err {
        Error::Auth { error, description } => {
            assert_eq!(error, "access_denied");
            assert_eq!(description.as_deref(), Some("The user denied access"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn session_preconditions() {
    let server = mockito::Server::new_async().await;
    let service = identity(&server);

    let err = service.authenticate(Session::Uninitialized, None).await.unwrap_err();
    assert!(matches!(err, Error::ProviderUnavailable(_)));

    let err = service.authenticate(Session::ClientsReady, None).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    assert!(matches!(
        Session::Uninitialized.access_token(),
        Err(Error::ProviderUnavailable(ref m)) if m == "Google Sheets API not initialized"
    ));
}

#[test]
fn missing_client_id_is_a_config_error() {
    let service = IdentityService::new(&test_config(&[]), reqwest::Client::new());
    assert!(matches!(
        service.init_clients(Session::Uninitialized),
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn html_error_page_is_a_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/token")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Bad Gateway</body></html>")
        .create_async()
        .await;

    let service = identity(&server);
    let err = service
        .authenticate(Session::ClientsReady, Some("auth-code"))
        .await
        .unwrap_err();

    match err {
        Error::Provider { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("Bad Gateway"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
