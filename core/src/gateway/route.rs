//! Request classification

use axum::http::Method;

use crate::config::GatewayConfig;

pub const DEBUG_LIST_PATH: &str = "/debug-list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Preflight,
    DebugList,
    Object { key: String, head: bool },
    NotFound,
    MethodNotAllowed,
}

/// Classify a request. Preflight wins over everything, including unknown paths.
pub fn route(method: &Method, path: &str, config: &GatewayConfig) -> Route {
    if method == Method::OPTIONS {
        return Route::Preflight;
    }

    if config.debug_endpoint_enabled && path == DEBUG_LIST_PATH {
        return if method == Method::GET || method == Method::HEAD {
            Route::DebugList
        } else {
            Route::MethodNotAllowed
        };
    }

    if !path.starts_with(&config.prefix) {
        return Route::NotFound;
    }

    if method == Method::GET || method == Method::HEAD {
        Route::Object {
            key: object_key(path),
            head: method == Method::HEAD,
        }
    } else {
        Route::MethodNotAllowed
    }
}

/// Store key for a request path: the path minus its single leading slash.
/// The prefix segment stays in the key; stored objects are keyed by the full public path.
pub fn object_key(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}
