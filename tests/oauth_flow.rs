//! Integration tests for the OAuth2 authorization-code flow.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use aegis_auth::mocks::{MockJwtVerifier, MockTokenExchanger, MockUserDirectory};
use aegis_auth::providers::SessionStore;
use aegis_auth::stores::{InMemoryCsrfTokenStore, InMemorySessionStore};
use aegis_auth::{
    AuthError, CallbackParams, CompleteOutcome, CookieCrypto, CookieKey, JwtClaims,
    OAuth2Config, OAuth2Orchestrator, RequestCookies, RequireAuth, SessionCookies,
    SessionDocument, SessionLifecycle, SetCookie,
};
use std::collections::HashMap;

const DOMAIN: &str = "auth.example.com";
const CLIENT_ID: &str = "client-1";

type TestOrchestrator = OAuth2Orchestrator<
    InMemoryCsrfTokenStore,
    MockTokenExchanger,
    MockJwtVerifier,
    InMemorySessionStore,
    MockUserDirectory,
>;

struct TestEngine {
    crypto: CookieCrypto,
    exchanger: MockTokenExchanger,
    sessions: InMemorySessionStore,
    users: MockUserDirectory,
    oauth: TestOrchestrator,
}

fn test_config() -> OAuth2Config {
    OAuth2Config::new(
        DOMAIN.to_string(),
        CLIENT_ID.to_string(),
        "client-secret".to_string(),
        "https://app.example.com/auth/callback".to_string(),
    )
}

fn valid_claims() -> JwtClaims {
    JwtClaims {
        iss: format!("https://{DOMAIN}/"),
        aud: CLIENT_ID.to_string(),
        exp: 4_000_000_000,
        iat: 1_700_000_000,
        sub: "p|1".to_string(),
        email: Some("a@b.com".to_string()),
        email_verified: Some(true),
    }
}

fn engine(exchanger: MockTokenExchanger, verifier: MockJwtVerifier) -> TestEngine {
    let crypto = CookieCrypto::new(&CookieKey::generate());
    let sessions = InMemorySessionStore::new();
    let users = MockUserDirectory::new();
    let lifecycle = SessionLifecycle::new(sessions.clone(), users.clone());
    let oauth = OAuth2Orchestrator::new(
        test_config(),
        InMemoryCsrfTokenStore::new(),
        exchanger.clone(),
        verifier,
        lifecycle,
    );

    TestEngine {
        crypto,
        exchanger,
        sessions,
        users,
        oauth,
    }
}

/// Simulated user agent carrying cookies between requests.
struct Browser {
    cookies: HashMap<String, String>,
}

impl Browser {
    fn new() -> Self {
        Self {
            cookies: HashMap::new(),
        }
    }

    fn request(&self, crypto: &CookieCrypto) -> SessionCookies {
        SessionCookies::from_request(crypto.clone(), RequestCookies::new(self.cookies.clone()))
            .unwrap()
    }

    fn apply(&mut self, pending: &[SetCookie]) {
        for cookie in pending {
            if cookie.is_clearing() {
                self.cookies.remove(&cookie.name);
            } else {
                self.cookies.insert(cookie.name.clone(), cookie.value.clone());
            }
        }
    }
}

fn query_params(location: &str) -> HashMap<String, String> {
    let (_, query) = location.split_once('?').unwrap();
    serde_urlencoded::from_str(query).unwrap()
}

#[tokio::test]
async fn test_start_builds_authorization_redirect() {
    let engine = engine(MockTokenExchanger::new(), MockJwtVerifier::new());
    let mut browser = Browser::new();
    let mut jar = browser.request(&engine.crypto);

    let redirect = engine.oauth.start(&mut jar).await.unwrap();

    assert!(redirect
        .location
        .starts_with("https://auth.example.com/authorize?"));

    let params = query_params(&redirect.location);
    assert_eq!(params["audience"], "https://auth.example.com/userinfo");
    assert_eq!(params["client_id"], CLIENT_ID);
    assert_eq!(params["redirect_uri"], "https://app.example.com/auth/callback");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["scope"], "openid email");
    assert!(params["state"].len() >= 12);
    assert_eq!(params.len(), 6);

    // The anonymous cookie pair is pending on the response.
    browser.apply(jar.pending());
    assert!(browser.cookies.contains_key("anon.sid"));
    assert!(browser.cookies.contains_key("nonce.sid"));
    assert!(!browser.cookies.contains_key("aegis.sid"));

    // And the anonymous document is stored.
    assert_eq!(
        engine.sessions.get(redirect.session_id).await.unwrap(),
        Some(SessionDocument::Anonymous { id_token: None })
    );
}

#[tokio::test]
async fn test_start_twice_continues_one_anonymous_session() {
    let engine = engine(MockTokenExchanger::new(), MockJwtVerifier::new());
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let first = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(jar.pending());

    let mut jar = browser.request(&engine.crypto);
    let second = engine.oauth.start(&mut jar).await.unwrap();

    assert_eq!(first.session_id, second.session_id);
}

#[tokio::test]
async fn test_complete_happy_path() {
    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new().with_claims(valid_claims()),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(&mut jar, &CallbackParams { code: "auth-code-1".to_string(), state })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CompleteOutcome::Authenticated { session_id: redirect.session_id }
    );
    assert_eq!(engine.exchanger.exchanged_codes(), vec!["auth-code-1"]);

    // The anonymous document now carries the validated claims, under the
    // same session ID.
    assert_eq!(
        engine.sessions.get(redirect.session_id).await.unwrap(),
        Some(SessionDocument::Anonymous { id_token: Some(valid_claims()) })
    );
}

#[tokio::test]
async fn test_complete_rejects_forged_state_before_exchange() {
    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new().with_claims(valid_claims()),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());

    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(
            &mut jar,
            &CallbackParams { code: "auth-code-1".to_string(), state: "forged".to_string() },
        )
        .await
        .unwrap();

    assert_eq!(outcome, CompleteOutcome::CsrfRejected);
    // Redirect and stop: the token exchange never ran.
    assert!(engine.exchanger.exchanged_codes().is_empty());
}

#[tokio::test]
async fn test_state_parameter_is_single_use() {
    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new().with_claims(valid_claims()),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    let callback = CallbackParams { code: "auth-code-1".to_string(), state };

    let mut jar = browser.request(&engine.crypto);
    let first = engine.oauth.complete(&mut jar, &callback).await.unwrap();
    browser.apply(&jar.take_pending());
    assert!(matches!(first, CompleteOutcome::Authenticated { .. }));

    // Replaying the callback fails CSRF verification.
    let mut jar = browser.request(&engine.crypto);
    let second = engine.oauth.complete(&mut jar, &callback).await.unwrap();
    assert_eq!(second, CompleteOutcome::CsrfRejected);
}

#[tokio::test]
async fn test_complete_fails_open_when_exchange_fails() {
    let engine = engine(
        MockTokenExchanger::new().with_failure(503, "provider down"),
        MockJwtVerifier::new().with_claims(valid_claims()),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(&mut jar, &CallbackParams { code: "auth-code-1".to_string(), state })
        .await
        .unwrap();

    match outcome {
        CompleteOutcome::FailedOpen { cause } => {
            assert_eq!(
                cause,
                AuthError::TokenExchangeFailed { status: 503, detail: "provider down".to_string() }
            );
        }
        other => panic!("expected FailedOpen, got {other:?}"),
    }

    // Nothing was authenticated: the stored document is still the plain
    // anonymous one and no secure cookie is pending.
    assert_eq!(
        engine.sessions.get(redirect.session_id).await.unwrap(),
        Some(SessionDocument::Anonymous { id_token: None })
    );
    assert!(jar.pending().iter().all(|c| c.name != "aegis.sid"));
}

#[tokio::test]
async fn test_complete_fails_open_on_signature_failure() {
    // The default mock verifier rejects every token.
    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new(),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(&mut jar, &CallbackParams { code: "c".to_string(), state })
        .await
        .unwrap();

    match outcome {
        CompleteOutcome::FailedOpen { cause } => assert!(cause.is_signature_error()),
        other => panic!("expected FailedOpen, got {other:?}"),
    }
}

#[tokio::test]
async fn test_complete_fails_open_on_claims_failure() {
    let mut expired = valid_claims();
    expired.exp = chrono::Utc::now().timestamp() - 1000;

    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new().with_claims(expired),
    );
    let mut browser = Browser::new();

    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(&mut jar, &CallbackParams { code: "c".to_string(), state })
        .await
        .unwrap();

    match outcome {
        CompleteOutcome::FailedOpen { cause } => {
            assert!(cause.is_claims_error());
            assert!(matches!(cause, AuthError::TokenExpired { .. }));
        }
        other => panic!("expected FailedOpen, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_journey_from_start_to_authenticated_request() {
    let engine = engine(
        MockTokenExchanger::new().with_id_token("stub-id-token"),
        MockJwtVerifier::new().with_claims(valid_claims()),
    );
    let lifecycle = SessionLifecycle::new(engine.sessions.clone(), engine.users.clone());
    let mut browser = Browser::new();

    // Start.
    let mut jar = browser.request(&engine.crypto);
    let redirect = engine.oauth.start(&mut jar).await.unwrap();
    browser.apply(&jar.take_pending());
    let state = query_params(&redirect.location)["state"].clone();

    // Callback.
    let mut jar = browser.request(&engine.crypto);
    let outcome = engine
        .oauth
        .complete(&mut jar, &CallbackParams { code: "auth-code-1".to_string(), state })
        .await
        .unwrap();
    browser.apply(&jar.take_pending());
    assert!(matches!(outcome, CompleteOutcome::Authenticated { .. }));

    // Next request: the protected route upgrades and authenticates.
    let mut jar = browser.request(&engine.crypto);
    let result = lifecycle
        .require_authenticated(&mut jar, "/login")
        .await
        .unwrap();
    browser.apply(&jar.take_pending());

    match result {
        RequireAuth::Authenticated(user) => {
            assert_eq!(user.session_id, redirect.session_id);
            assert_eq!(user.email, "a@b.com");
            assert_eq!(user.providers, vec!["p|1"]);
        }
        RequireAuth::Redirect(path) => panic!("expected authentication, got redirect to {path}"),
    }

    assert_eq!(engine.users.calls(), vec![("a@b.com".to_string(), "p|1".to_string())]);

    // The browser now holds the secure pair only.
    assert!(browser.cookies.contains_key("aegis.sid"));
    assert!(!browser.cookies.contains_key("anon.sid"));

    // And subsequent requests authenticate without another upgrade.
    let mut jar = browser.request(&engine.crypto);
    let result = lifecycle
        .require_authenticated(&mut jar, "/login")
        .await
        .unwrap();
    assert!(matches!(result, RequireAuth::Authenticated(_)));
    assert_eq!(engine.users.calls().len(), 1);
}
