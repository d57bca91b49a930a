use super::common::*;
use std::sync::Arc;

use crate::workflows::testament::auth::{
    session_from_token, AuthError, Credentials, SessionContext, SessionManager, SignUpOutcome,
    SignUpRequest,
};

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn tokens_resolve_to_sessions_or_anonymous() {
    let auth = FakeAuth::default();

    assert_eq!(
        session_from_token(&auth, Some(JUAN_TOKEN)).await,
        Ok(signed_in(juan()))
    );
    assert_eq!(
        session_from_token(&auth, Some("expired")).await,
        Ok(SessionContext::Anonymous)
    );
    assert_eq!(
        session_from_token(&auth, Some("  ")).await,
        Ok(SessionContext::Anonymous)
    );
    assert_eq!(
        session_from_token(&auth, None).await,
        Ok(SessionContext::Anonymous)
    );
}

#[tokio::test]
async fn subscribers_observe_sign_in_and_sign_out() {
    let auth = Arc::new(FakeAuth::default());
    let manager = SessionManager::new(Arc::clone(&auth));
    let mut subscription = manager.subscribe();
    assert_eq!(subscription.current(), SessionContext::Anonymous);

    let session = manager
        .sign_in(&credentials("juan@example.cl", PASSWORD))
        .await
        .expect("sign-in succeeds");
    assert_eq!(session, juan());
    assert_eq!(subscription.changed().await, Some(signed_in(juan())));

    manager.sign_out().await.expect("sign-out succeeds");
    assert_eq!(subscription.changed().await, Some(SessionContext::Anonymous));
    assert_eq!(manager.current(), SessionContext::Anonymous);
    assert_eq!(auth.signed_out(), vec![JUAN_TOKEN.to_string()]);
}

#[tokio::test]
async fn failed_sign_in_leaves_the_session_untouched() {
    let manager = SessionManager::new(Arc::new(FakeAuth::default()));

    let err = manager
        .sign_in(&credentials("juan@example.cl", "otra-clave"))
        .await
        .expect_err("wrong password");

    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(manager.current(), SessionContext::Anonymous);
}

#[tokio::test]
async fn sign_up_with_confirmation_keeps_the_caller_anonymous() {
    let manager = SessionManager::new(Arc::new(FakeAuth::requiring_confirmation()));

    let outcome = manager
        .sign_up(&SignUpRequest {
            email: " rosa@example.cl ".to_string(),
            password: "secreto123".to_string(),
            password_confirmation: "secreto123".to_string(),
        })
        .await
        .expect("sign-up accepted");

    assert_eq!(
        outcome,
        SignUpOutcome::ConfirmationPending {
            email: "rosa@example.cl".to_string()
        }
    );
    assert!(!manager.current().is_authenticated());
}

#[tokio::test]
async fn restored_sessions_are_broadcast_until_unsubscribed() {
    let manager = SessionManager::new(Arc::new(FakeAuth::default()));
    let mut subscription = manager.subscribe();

    manager.restore(ANA_TOKEN).await.expect("restore succeeds");
    assert_eq!(subscription.changed().await, Some(signed_in(ana())));

    subscription.unsubscribe();
    assert!(!subscription.is_active());
    manager.restore(JUAN_TOKEN).await.expect("restore succeeds");
    assert_eq!(subscription.changed().await, None);
    assert_eq!(subscription.current(), SessionContext::Anonymous);
}
