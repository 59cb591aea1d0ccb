//! Logging trait for Groq client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`Groq`](crate::Groq) client.

use crate::{ChatCompletion, ChatCompletionChunk, ChatCompletionCreateParams};

/// A trait for logging Groq client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including both non-streaming responses and individual streaming chunks.
///
/// # Example
///
/// ```rust,ignore
/// use groq_chat::{ChatCompletion, ChatCompletionChunk, ChatCompletionCreateParams, ClientLogger};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, params: &ChatCompletionCreateParams) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(params).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, completion: &ChatCompletion) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(completion).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log the parameters of an outgoing request, streaming or not.
    fn log_request(&self, params: &ChatCompletionCreateParams) {
        _ = params;
    }

    /// Log a complete response from a non-streaming `send` call.
    fn log_response(&self, completion: &ChatCompletion);

    /// Log an individual streaming chunk.
    ///
    /// This method is called for each [`ChatCompletionChunk`] received during
    /// a streaming request, in arrival order.
    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk);
}
