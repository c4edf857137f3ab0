/// Remote image model client
///
/// - `wire.rs` - generateContent request/response bodies
/// - `client.rs` - the HTTP call and failure normalization

pub mod client;
pub mod wire;

pub use client::GeminiClient;
