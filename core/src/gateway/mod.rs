//! Image proxy gateway
//! Maps `GET /images/...` onto object store keys and serves them with cache and CORS headers.

pub mod cors;
pub mod handler;
pub mod route;
pub mod server;

pub use route::{object_key, route, Route};
pub use server::{build_router, AppState, GatewayServer};
