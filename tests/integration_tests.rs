//! Integration tests for the groq-chat client.
//!
//! Most tests run the client against a one-shot HTTP/1.1 server on localhost.
//! The live test at the bottom requires GROQ_API_KEY in the environment.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::StreamExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use groq_chat::{
        ChatCompletion, ChatCompletionChunk, ChatCompletionCreateParams, ChatTurn, ClientLogger,
        CompletionService, Error, Groq, KnownModel, Model,
    };

    struct CapturedRequest {
        head: String,
        body: serde_json::Value,
    }

    /// Serve exactly one request with the given status line, content type,
    /// and body, and hand back what the client sent.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: String,
    ) -> (String, oneshot::Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending the body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body =
                serde_json::from_slice(&buf[head_end..head_end + content_length]).unwrap();
            let _ = tx.send(CapturedRequest {
                head,
                body: request_body,
            });

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nx-request-id: req_123\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (format!("http://{addr}/v1"), rx)
    }

    fn params(stream: bool) -> ChatCompletionCreateParams {
        ChatCompletionCreateParams::new(
            vec![
                ChatTurn::user("hi"),
                ChatTurn::assistant(None),
                ChatTurn::user("again"),
            ],
            Model::Known(KnownModel::Llama3370bVersatile),
        )
        .with_stream(stream)
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<String>>,
    }

    impl ClientLogger for RecordingLogger {
        fn log_request(&self, params: &ChatCompletionCreateParams) {
            self.events
                .lock()
                .unwrap()
                .push(format!("request:{}", params.messages.len()));
        }

        fn log_response(&self, completion: &ChatCompletion) {
            self.events
                .lock()
                .unwrap()
                .push(format!("response:{}", completion.text().unwrap_or("")));
        }

        fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
            self.events
                .lock()
                .unwrap()
                .push(format!("chunk:{}", chunk.text().unwrap_or("")));
        }
    }

    #[tokio::test]
    async fn send_posts_history_and_parses_completion() {
        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1733000000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Olá!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })
        .to_string();
        let (base_url, captured) = serve_once("200 OK", "application/json", body).await;

        let logger = Arc::new(RecordingLogger::default());
        let client = Groq::with_options("gsk_test", Some(base_url), None)
            .unwrap()
            .with_logger(logger.clone());
        let completion = client.complete(params(false)).await.unwrap();
        assert_eq!(completion.text(), Some("Olá!"));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);

        let request = captured.await.unwrap();
        let head = request.head.to_ascii_lowercase();
        assert!(head.starts_with("post /v1/chat/completions http/1.1"));
        assert!(head.contains("authorization: bearer gsk_test"));
        assert_eq!(
            request.body,
            serde_json::json!({
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": null},
                    {"role": "user", "content": "again"}
                ],
                "model": "llama-3.3-70b-versatile",
                "stream": false
            })
        );
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["request:3".to_string(), "response:Olá!".to_string()]
        );
    }

    #[tokio::test]
    async fn stream_yields_fragments_in_order() {
        let body = [
            r#"data: {"id":"c1","choices":[{"index":0,"delta":{"role":"assistant","content":""}}]}"#,
            r#"data: {"id":"c1","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
            r#"data: {"id":"c1","choices":[{"index":0,"delta":{"content":"lo"}}]}"#,
            r#"data: {"id":"c1","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"x_groq":{"id":"req_1","usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}}"#,
            "data: [DONE]",
        ]
        .map(|frame| format!("{frame}\n\n"))
        .concat();
        let (base_url, captured) = serve_once("200 OK", "text/event-stream", body).await;

        let logger = Arc::new(RecordingLogger::default());
        let client = Groq::with_options("gsk_test", Some(base_url), None)
            .unwrap()
            .with_logger(logger.clone());
        let chunks: Vec<_> = client
            .complete_streaming(params(false))
            .await
            .unwrap()
            .collect()
            .await;

        let chunks: Vec<ChatCompletionChunk> = chunks.into_iter().map(|c| c.unwrap()).collect();
        let text: String = chunks.iter().filter_map(|c| c.text()).collect();
        assert_eq!(text, "Hello");
        assert_eq!(chunks.last().unwrap().usage().unwrap().total_tokens, 7);

        let request = captured.await.unwrap();
        assert_eq!(request.body["stream"], serde_json::json!(true));
        assert!(
            request
                .head
                .to_ascii_lowercase()
                .contains("accept: text/event-stream")
        );
        assert_eq!(logger.events.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_error() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let (base_url, _captured) =
            serve_once("401 Unauthorized", "application/json", body.to_string()).await;

        let client = Groq::with_options("gsk_wrong", Some(base_url), None).unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.to_string(), "Authentication error: Invalid API Key");
    }

    #[tokio::test]
    async fn rate_limit_and_bad_request_are_distinguished() {
        let body = r#"{"error":{"message":"slow down","type":"tokens"}}"#;
        let (base_url, _captured) =
            serve_once("429 Too Many Requests", "application/json", body.to_string()).await;
        let client = Groq::with_options("gsk_test", Some(base_url), None).unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(err.is_rate_limit());

        let body = r#"{"error":{"message":"model not found","type":"invalid_request_error","param":"model"}}"#;
        let (base_url, _captured) =
            serve_once("400 Bad Request", "application/json", body.to_string()).await;
        let client = Groq::with_options("gsk_test", Some(base_url), None).unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
        assert_eq!(
            err.to_string(),
            "Bad request: model not found (parameter: model)"
        );
    }

    #[tokio::test]
    async fn server_error_keeps_request_id() {
        let (base_url, _captured) =
            serve_once("500 Internal Server Error", "text/plain", "boom".to_string()).await;
        let client = Groq::with_options("gsk_test", Some(base_url), None).unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.request_id(), Some("req_123"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_serialization_error() {
        let (base_url, _captured) =
            serve_once("200 OK", "application/json", "{not json".to_string()).await;
        let client = Groq::with_options("gsk_test", Some(base_url), None).unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(err.is_serialization());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Groq::with_options("gsk_test", Some(format!("http://{addr}/v1")), None)
            .unwrap();
        let err = client.complete(params(false)).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_simple_live_request() {
        // This test requires GROQ_API_KEY to be set
        let Ok(api_key) = std::env::var("GROQ_API_KEY") else {
            eprintln!("Skipping test: GROQ_API_KEY not set");
            return;
        };

        let client = Groq::new(api_key).expect("Failed to create client");
        let params = ChatCompletionCreateParams::new(
            vec![ChatTurn::user("Say 'test passed'")],
            Model::Known(KnownModel::Llama318bInstant),
        );
        let response = client.send(params).await;
        assert!(
            response.is_ok(),
            "Request should succeed with valid API key"
        );
    }
}
