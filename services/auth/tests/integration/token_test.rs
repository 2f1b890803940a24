use chrono::{Duration, Utc};

use otpgate_auth::domain::types::TokenSettings;
use otpgate_auth::error::AuthServiceError;
use otpgate_auth::usecase::token::{
    LogoutUseCase, RefreshTokenUseCase, issue_token, validate_refresh_token,
};
use otpgate_auth_types::token::{TokenKind, validate_access_token};

use crate::helpers::{
    MockRefreshTokenRepo, MockUserRepo, TEST_JWT_SECRET, TEST_PHONE, session_issuer, test_user,
};

// ── issue_token / validate_refresh_token ─────────────────────────────────────

#[tokio::test]
async fn should_issue_access_token_that_validates_successfully() {
    let user = test_user(TEST_PHONE, true);
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    let now = Utc::now();

    let issued = issue_token(&user, TokenKind::Access, &settings, now).unwrap();
    assert_eq!(issued.expires, now + Duration::minutes(30));

    let info = validate_access_token(&issued.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.user_role, user.role.as_u8());
    assert_eq!(info.access_token_exp, issued.expires.timestamp() as u64);
}

#[tokio::test]
async fn should_not_accept_access_token_as_refresh_token() {
    let user = test_user(TEST_PHONE, true);
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    let access = issue_token(&user, TokenKind::Access, &settings, Utc::now()).unwrap();

    let result = validate_refresh_token(&access.token, TEST_JWT_SECRET);
    assert!(
        matches!(result, Err(AuthServiceError::Unauthenticated)),
        "expected Unauthenticated, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_token_signed_with_wrong_secret() {
    let user = test_user(TEST_PHONE, true);
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    let refresh = issue_token(&user, TokenKind::Refresh, &settings, Utc::now()).unwrap();

    let result = validate_refresh_token(&refresh.token, "wrong-secret");
    assert!(matches!(result, Err(AuthServiceError::Unauthenticated)));
}

#[tokio::test]
async fn should_mint_distinct_tokens_within_one_second() {
    let user = test_user(TEST_PHONE, true);
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    let now = Utc::now();

    let a = issue_token(&user, TokenKind::Refresh, &settings, now).unwrap();
    let b = issue_token(&user, TokenKind::Refresh, &settings, now).unwrap();
    assert_ne!(a.token, b.token);
}

// ── RefreshTokenUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_rotate_refresh_token() {
    let user = test_user(TEST_PHONE, true);
    let users = MockUserRepo::new(vec![user.clone()]);
    let repo = MockRefreshTokenRepo::default();
    let first = session_issuer(&repo).issue_pair(&user).await.unwrap();

    let usecase = RefreshTokenUseCase {
        users,
        sessions: session_issuer(&repo),
    };
    let second = usecase.execute(&first.refresh.token).await.unwrap();

    assert_ne!(second.refresh.token, first.refresh.token);
    let info = validate_access_token(&second.access.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);

    let records = repo.records_handle();
    {
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token, second.refresh.token);
    }

    // The old token is no longer usable.
    let result = usecase.execute(&first.refresh.token).await;
    assert!(
        matches!(result, Err(AuthServiceError::Unauthenticated)),
        "expected Unauthenticated, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_for_unknown_token() {
    let user = test_user(TEST_PHONE, true);
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    // Validly signed, never persisted.
    let refresh = issue_token(&user, TokenKind::Refresh, &settings, Utc::now()).unwrap();

    let usecase = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user]),
        sessions: session_issuer(&MockRefreshTokenRepo::default()),
    };
    let result = usecase.execute(&refresh.token).await;
    assert!(matches!(result, Err(AuthServiceError::Unauthenticated)));
}

#[tokio::test]
async fn should_reject_refresh_for_deleted_user() {
    let user = test_user(TEST_PHONE, true);
    let repo = MockRefreshTokenRepo::default();
    let pair = session_issuer(&repo).issue_pair(&user).await.unwrap();

    let usecase = RefreshTokenUseCase {
        users: MockUserRepo::default(),
        sessions: session_issuer(&repo),
    };
    let result = usecase.execute(&pair.refresh.token).await;
    assert!(matches!(result, Err(AuthServiceError::Unauthenticated)));
}

#[tokio::test]
async fn should_reject_expired_refresh_token() {
    let user = test_user(TEST_PHONE, true);
    let repo = MockRefreshTokenRepo::default();
    let settings = TokenSettings::new(TEST_JWT_SECRET);
    let issued_at = Utc::now() - Duration::days(31);
    let stale = issue_token(&user, TokenKind::Refresh, &settings, issued_at).unwrap();

    let usecase = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user]),
        sessions: session_issuer(&repo),
    };
    let result = usecase.execute(&stale.token).await;
    assert!(matches!(result, Err(AuthServiceError::Unauthenticated)));
}

// ── LogoutUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_refresh_token_on_logout() {
    let user = test_user(TEST_PHONE, true);
    let repo = MockRefreshTokenRepo::default();
    let pair = session_issuer(&repo).issue_pair(&user).await.unwrap();

    let usecase = LogoutUseCase {
        refresh_tokens: repo.clone(),
    };
    usecase.execute(&pair.refresh.token).await.unwrap();
    assert!(repo.records_handle().lock().unwrap().is_empty());

    let again = usecase.execute(&pair.refresh.token).await;
    assert!(matches!(again, Err(AuthServiceError::TokenNotFound)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_token_on_logout() {
    let usecase = LogoutUseCase {
        refresh_tokens: MockRefreshTokenRepo::default(),
    };
    let result = usecase.execute("not-a-stored-token").await;
    assert!(
        matches!(result, Err(AuthServiceError::TokenNotFound)),
        "expected TokenNotFound, got {result:?}"
    );
}
