use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("groq_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("groq_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("groq_chat.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("groq_chat.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("groq_chat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("groq_chat.stream.bytes");

pub(crate) static HISTORY_WRITES: Counter = Counter::new("groq_chat.history.writes");
pub(crate) static HISTORY_TRUNCATED_TURNS: Counter =
    Counter::new("groq_chat.history.truncated_turns");
pub(crate) static HISTORY_PARSE_FALLBACKS: Counter =
    Counter::new("groq_chat.history.parse_fallbacks");

pub(crate) static CREDENTIAL_PROMPTS: Counter = Counter::new("groq_chat.credentials.prompts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&HISTORY_WRITES);
    collector.register_counter(&HISTORY_TRUNCATED_TURNS);
    collector.register_counter(&HISTORY_PARSE_FALLBACKS);

    collector.register_counter(&CREDENTIAL_PROMPTS);
}
