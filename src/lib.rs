pub mod auth;
pub mod cli;
pub mod config;
pub mod http;
pub mod mcp;
pub mod queries;
pub mod server;
pub mod tools;
