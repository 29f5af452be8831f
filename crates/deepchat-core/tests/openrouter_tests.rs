use deepchat_core::{ChatRequest, LlmClient, Message, OpenRouterClient};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Read one HTTP/1.1 request (headers plus Content-Length body) off the socket.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve a single canned response and hand back the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/api"), handle)
}

fn request() -> ChatRequest {
    ChatRequest::new(
        "deepseek/deepseek-chat",
        vec![Message::system("Be brief."), Message::user("Hello")],
    )
}

#[tokio::test]
async fn test_chat_returns_first_choice_content() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"id":"gen-1","choices":[{"message":{"role":"assistant","content":"Hi there!"}}]}"#,
    )
    .await;

    let client = OpenRouterClient::new().with_base_url(base_url);
    let reply = client.chat("sk-or-abc", &request()).await.unwrap();
    assert_eq!(reply, "Hi there!");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/v1/chat/completions HTTP/1.1"));
    let lower = raw.to_lowercase();
    assert!(lower.contains("authorization: bearer sk-or-abc"));
    assert!(lower.contains("x-title: deepchat"));
    assert!(lower.contains("content-type: application/json"));

    let body_start = raw.find("\r\n\r\n").unwrap() + 4;
    let body: serde_json::Value = serde_json::from_str(&raw[body_start..]).unwrap();
    assert_eq!(body["model"], "deepseek/deepseek-chat");
    assert_eq!(body["max_tokens"], 2000);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1], serde_json::json!({"role": "user", "content": "Hello"}));
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_chat_sends_referer_when_configured() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#,
    )
    .await;

    let client = OpenRouterClient::new()
        .with_base_url(base_url)
        .with_referer("https://shop.example.com")
        .with_title(None);
    client.chat("k", &request()).await.unwrap();

    let lower = server.await.unwrap().to_lowercase();
    assert!(lower.contains("http-referer: https://shop.example.com"));
    assert!(!lower.contains("x-title:"));
}

#[tokio::test]
async fn test_unauthorized_is_terminal_with_api_message() {
    let (base_url, server) = serve_once(
        "401 Unauthorized",
        r#"{"error":{"message":"No auth credentials found","code":401}}"#,
    )
    .await;

    let client = OpenRouterClient::new().with_base_url(base_url);
    let err = client.chat("bad", &request()).await.unwrap_err();
    server.await.unwrap();

    assert!(!err.is_retryable());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.reason(), "API Error: No auth credentials found");
}

#[tokio::test]
async fn test_rate_limit_is_retryable() {
    let (base_url, server) = serve_once("429 Too Many Requests", r#"{"error":{}}"#).await;

    let client = OpenRouterClient::new().with_base_url(base_url);
    let err = client.chat("k", &request()).await.unwrap_err();
    server.await.unwrap();

    assert!(err.is_retryable());
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.reason(), "API Error: Too Many Requests");
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let (base_url, server) = serve_once("502 Bad Gateway", "upstream down").await;

    let client = OpenRouterClient::new().with_base_url(base_url);
    let err = client.chat("k", &request()).await.unwrap_err();
    server.await.unwrap();

    assert!(err.is_retryable());
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_malformed_success_body_is_terminal() {
    let (base_url, server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;

    let client = OpenRouterClient::new().with_base_url(base_url);
    let err = client.chat("k", &request()).await.unwrap_err();
    server.await.unwrap();

    assert!(!err.is_retryable());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_connection_refused_is_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OpenRouterClient::new().with_base_url(format!("http://{addr}/api"));
    let err = client.chat("k", &request()).await.unwrap_err();

    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_hung_request_times_out_as_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = OpenRouterClient::with_timeout(Duration::from_millis(200))
        .with_base_url(format!("http://{addr}/api"));
    let err = client.chat("k", &request()).await.unwrap_err();
    server.abort();

    assert!(err.is_retryable());
}
