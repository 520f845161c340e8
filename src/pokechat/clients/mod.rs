//! Model client implementations.
//!
//! Each provider is exposed as a [`ClientWrapper`](crate::client_wrapper::ClientWrapper)
//! implementation; all wrappers share the pooled HTTP client in [`common`].

pub mod common;
pub mod openai;

pub use openai::OpenAIClient;
