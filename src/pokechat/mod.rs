pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod connection;
pub mod error;
pub mod orchestrator;
pub mod session_channel;
pub mod tool_protocol;
pub mod tool_protocols;
pub mod tool_server;
pub mod tools;
pub mod translator;
