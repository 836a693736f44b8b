//! Post'On: a small task board API.
//!
//! Users log in with a bare username and receive a signed bearer token;
//! every task route re-derives the caller from that token and checks task
//! ownership before reading or writing.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod tasks;
