use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Redirect};

use crate::{Error, Res, api::AppState, management::UserIdentity};

/// Starts a login and sends the browser to Spotify's authorize page.
pub async fn login(Extension(state): Extension<Arc<AppState>>) -> Res<Redirect> {
    let (login, url) = state.oauth.begin_login()?;
    state.sessions().remember_login(login).await;
    Ok(Redirect::temporary(&url))
}

/// Completes a login started at `/login`.
///
/// The `state` parameter must match a pending login and is consumed, so a
/// replayed callback is rejected.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Res<Redirect> {
    if let Some(reason) = params.get("error") {
        return Err(Error::BadRequest(format!("authorization denied: {reason}")));
    }

    let code = params
        .get("code")
        .ok_or_else(|| Error::BadRequest("missing code parameter".into()))?;
    let login_state = params
        .get("state")
        .ok_or_else(|| Error::BadRequest("missing state parameter".into()))?;

    let verifier = state
        .sessions()
        .take_verifier(login_state)
        .await
        .ok_or_else(|| Error::BadRequest("unknown or already used state".into()))?;

    let token = state
        .oauth
        .exchange_code_pkce(code, &verifier)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "login.exchange.failed"))?;

    let profile = state.spotify.current_user(&token.access_token).await?;
    let display_name = profile.display_name.unwrap_or_else(|| profile.id.clone());

    state.store().upsert_user(&profile.id, &display_name).await?;
    state
        .sessions()
        .register(
            UserIdentity {
                user_id: profile.id.clone(),
                display_name,
            },
            token,
        )
        .await;

    tracing::info!(user_id = %profile.id, "login.completed");
    Ok(Redirect::to("/top-artists"))
}
