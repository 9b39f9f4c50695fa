use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::{
    dto::auth_dto::{CallbackQuery, ConsentResponse, SessionResponse, TokenResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    services::identity_service::Prompt,
    utils::token::generate_oauth_state,
    AppState,
};

/// Check the OAuth client configuration and mark the caller's session ready.
pub async fn init_clients(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionResponse>> {
    let mut auth = state.auth.write().await;
    let next = state.identity_service.init_clients(auth.session(&claims.sub))?;
    let label = next.label();
    auth.store(&claims.sub, next);
    Ok(Json(SessionResponse { session: label }))
}

/// Authorization URL for the consent (first use) or silent prompt.
pub async fn consent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ConsentResponse>> {
    let mut auth = state.auth.write().await;
    let session = auth.session(&claims.sub);
    let oauth_state = generate_oauth_state(32);
    let authorization_url = state.identity_service.consent_url(&session, &oauth_state)?;
    auth.begin_consent(&claims.sub, oauth_state);

    Ok(Json(ConsentResponse {
        authorization_url,
        prompt: Prompt::for_session(&session).as_str(),
    }))
}

/// Redirect target of the consent screen. The `state` parameter identifies
/// which user asked for consent; the token is stored for that user only.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<TokenResponse>> {
    if let Some(error) = query.error {
        return Err(Error::Auth {
            error,
            description: None,
        });
    }
    let code = query
        .code
        .ok_or_else(|| Error::BadRequest("Missing authorization code".to_string()))?;
    let received = query.state.unwrap_or_default();

    let (user, current) = {
        let mut auth = state.auth.write().await;
        let user = auth
            .complete_consent(&received)
            .ok_or_else(|| Error::Unauthorized("OAuth state mismatch".to_string()))?;
        let current = auth.session(&user);
        (user, current)
    };

    let (session, access_token) = state
        .identity_service
        .authenticate(current, Some(&code))
        .await?;
    let label = session.label();
    state.auth.write().await.store(&user, session);

    Ok(Json(TokenResponse {
        session: label,
        token_type: "Bearer",
        access_token,
    }))
}

/// Silent renewal of the caller's cached token.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TokenResponse>> {
    let current = state.auth.read().await.session(&claims.sub);
    let (session, access_token) = state
        .identity_service
        .authenticate(current, None)
        .await?;
    let label = session.label();
    state.auth.write().await.store(&claims.sub, session);

    Ok(Json(TokenResponse {
        session: label,
        token_type: "Bearer",
        access_token,
    }))
}
