//! Image Gateway Core Library
//! Object store backends and the HTTP gateway that serves them

pub mod config;
pub mod error;
pub mod gateway;
pub mod store;
