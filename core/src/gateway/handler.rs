//! Image request handler
//! Single entry point for every request the gateway receives.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::cors::{apply_cors, ALLOWED_METHODS, DEFAULT_CONTENT_TYPE, IMMUTABLE_CACHE_CONTROL};
use super::route::{route, Route};
use super::server::AppState;
use crate::error::GatewayError;
use crate::store::StoredObject;

/// Route the request, answer it, then stamp CORS headers if enabled
pub async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = match route(&method, &path, &state.config) {
        Route::Preflight => preflight(state.config.cors_enabled),
        Route::DebugList => debug_list(&state).await.unwrap_or_else(IntoResponse::into_response),
        Route::Object { key, head } => serve_object(&state, &key, head)
            .await
            .unwrap_or_else(IntoResponse::into_response),
        Route::NotFound => GatewayError::NotFound.into_response(),
        Route::MethodNotAllowed => GatewayError::MethodNotAllowed.into_response(),
    };

    if state.config.cors_enabled {
        apply_cors(response.headers_mut());
    }
    response
}

fn preflight(cors_enabled: bool) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    if !cors_enabled {
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    }
    response
}

async fn serve_object(state: &AppState, key: &str, head: bool) -> Result<Response, GatewayError> {
    tracing::debug!("Fetching key from {} store: {}", state.store.name(), key);

    let Some(object) = state.store.get(key).await? else {
        tracing::debug!("Object not found for key: {}", key);
        return Err(GatewayError::NotFound);
    };

    Ok(object_response(object, head))
}

/// Build the 200 response for a found object
fn object_response(object: StoredObject, head: bool) -> Response {
    let StoredObject { body, metadata } = object;

    let content_type = metadata
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let body = if head { Body::empty() } else { Body::from_stream(body) };
    let mut response = (StatusCode::OK, body).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
    );
    if let Some(etag) = metadata.etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
        headers.insert(header::ETAG, etag);
    }
    if let Some(len) = metadata.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    response
}

async fn debug_list(state: &AppState) -> Result<Response, GatewayError> {
    let keys = state
        .store
        .list(&state.config.debug_list_prefix, state.config.debug_list_limit)
        .await?;
    tracing::info!("Debug list under {:?}: {:?}", state.config.debug_list_prefix, keys);

    let body = serde_json::to_string_pretty(&keys).unwrap_or_else(|_| "[]".to_string());
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
