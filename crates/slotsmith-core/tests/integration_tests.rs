//! Slotsmith Core Integration Tests
//!
//! Remote services are stood in for by a one-shot HTTP responder on a local
//! port, so every tier runs over real sockets.

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use slotsmith_core::{
    ErrorKind,
    compression::CompressionClient,
    config::Config,
    generation::GenerationClient,
    pipeline::{Credentials, OFFLINE_SPEEDUP_LABEL, Pipeline, PipelineStage},
};

/// Accept one connection, answer with `status` and `body`, and hand back the
/// raw request text.
async fn serve_once(status: u16, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason(status),
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
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
    String::from_utf8_lossy(&buf).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A URL nothing is listening on
async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

fn config_with(backend_url: &str, compression_url: &str, generation_url: &str) -> Config {
    let mut config = Config::default();
    config.services.backend_url = backend_url.to_string();
    config.services.compression_url = compression_url.to_string();
    config.services.generation_base_url = generation_url.to_string();
    config.services.timeout_secs = 5;
    config
}

const CALENDAR: &str = "MONDAY\n09:00 AM - 10:00 AM: Sync";
const PREFERENCES: &str = "30 min with design team";

#[tokio::test]
async fn test_compression_client_round_trip() {
    let (url, server) = serve_once(
        200,
        json!({"results": {"compressed_prompt": "MON busy 9-10"}}).to_string(),
    )
    .await;

    let client = CompressionClient::new(
        reqwest::Client::new(),
        format!("{}/compress/raw/", url),
        Config::default().compression,
    );
    let result = client.compress(CALENDAR, PREFERENCES, "sd-key").await.unwrap();

    assert_eq!(result.compressed_text, "MON busy 9-10");
    assert_eq!(result.raw_size, 55);
    assert_eq!(result.compressed_size, 13);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /compress/raw/ HTTP/1.1"));
    assert!(request.to_lowercase().contains("x-api-key: sd-key"));
    assert!(request.contains(r#""scaledown":{"rate":"auto"}"#));
    assert!(request.contains(r#""model":"gpt-4o""#));
}

#[tokio::test]
async fn test_compression_client_service_error() {
    let (url, server) = serve_once(500, r#"{"detail":"upstream exploded"}"#.to_string()).await;

    let client = CompressionClient::new(reqwest::Client::new(), url, Config::default().compression);
    let err = client.compress(CALENDAR, PREFERENCES, "sd-key").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.code(), "E101");
    assert!(err.to_string().contains("HTTP 500"));
    assert!(err.to_string().contains("upstream exploded"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_generation_client_repairs_truncated_answer() {
    let truncated = "```json\n[{\"title\":\"Design sync\",\"date\":\"Monday\",\"time\":\"11:00 AM - 11:30 AM\",\"duration\":30,\"reasoning\":\"Free after stand";
    let (url, server) = serve_once(
        200,
        json!({"candidates": [{"content": {"parts": [{"text": truncated}]}}]}).to_string(),
    )
    .await;

    let client = GenerationClient::new(reqwest::Client::new(), url, Config::default().generation);
    let schedule = client
        .generate("MON busy 9-10", PREFERENCES, "g-key", "gemini-2.5-flash")
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&schedule).unwrap();
    assert_eq!(parsed[0]["title"], "Design sync");
    assert_eq!(parsed[0]["reasoning"], "Free after stand");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /models/gemini-2.5-flash:generateContent?key=g-key HTTP/1.1"));
    assert!(request.contains(r#""thinkingBudget":0"#));
    assert!(request.contains("MON busy 9-10"));
}

#[tokio::test]
async fn test_generation_client_reports_service_message() {
    let (url, server) = serve_once(
        400,
        json!({"error": {"code": 400, "message": "API key not valid"}}).to_string(),
    )
    .await;

    let client = GenerationClient::new(reqwest::Client::new(), url, Config::default().generation);
    let err = client
        .generate("ctx", PREFERENCES, "bad-key", "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("API key not valid"));

    let request = server.await.unwrap();
    assert!(request.contains("/models/gemini-2.0-flash:generateContent"));
}

#[tokio::test]
async fn test_pipeline_backend_success() {
    let body = json!({
        "status": "success",
        "schedule": "[]",
        "compressed_text": "MON busy 9-10",
        "metrics": {
            "raw_input_size": 55,
            "compressed_input_size": 13,
            "compression_ratio": 0.763,
            "compression_latency_ms": "120",
            "generation_latency_ms": 800,
            "total_pipeline_ms": 920,
            "speedup_factor": "Real AI"
        }
    });
    let (backend_url, server) = serve_once(200, body.to_string()).await;
    let unreachable = closed_url().await;

    let config = config_with(&backend_url, &unreachable, &unreachable);
    let pipeline = Pipeline::from_config(&config).unwrap();
    let credentials = Credentials::new("gemini-2.0-flash").with_compression_key("sd-key");

    let outcome = pipeline.run(CALENDAR, PREFERENCES, &credentials).await;

    assert_eq!(outcome.stage, PipelineStage::Backend);
    assert_eq!(outcome.result.metrics.compression_ratio, "76.3%");
    assert_eq!(outcome.result.metrics.compression_latency_ms, 120);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /optimize HTTP/1.1"));
    assert!(request.contains(r#""api_key":"sd-key""#));
    assert!(request.contains(r#""gemini_api_key":"""#));
    assert!(request.contains(r#""gemini_model":"gemini-2.0-flash""#));
}

#[tokio::test]
async fn test_pipeline_direct_mode_when_backend_unreachable() {
    let backend_url = closed_url().await;
    let generation_url = closed_url().await;
    let (compression_url, server) = serve_once(
        200,
        json!({"compressed_text": "MONDAY 09:00 AM - 10:00 AM: Sync"}).to_string(),
    )
    .await;

    let config = config_with(&backend_url, &compression_url, &generation_url);
    let pipeline = Pipeline::from_config(&config).unwrap();
    let credentials = Credentials::new("").with_compression_key("sd-key");

    let outcome = pipeline.run(CALENDAR, PREFERENCES, &credentials).await;

    assert_eq!(outcome.stage, PipelineStage::DirectCompression);
    assert!(outcome.banner().unwrap().contains("Direct API Mode"));
    assert_eq!(outcome.result.compressed_text, "MONDAY 09:00 AM - 10:00 AM: Sync");

    let candidates = outcome.result.candidates().unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].date, "Monday");
    assert_eq!(candidates[0].time, "11:00 AM - 11:30 AM");
    server.await.unwrap();
}

#[tokio::test]
async fn test_pipeline_offline_when_everything_unreachable() {
    let unreachable = closed_url().await;
    let config = config_with(&unreachable, &unreachable, &unreachable);
    let pipeline = Pipeline::from_config(&config).unwrap();
    let credentials = Credentials::new("gemini-2.0-flash")
        .with_compression_key("sd-key")
        .with_generation_key("g-key");

    let outcome = pipeline.run(CALENDAR, PREFERENCES, &credentials).await;

    assert_eq!(outcome.stage, PipelineStage::HeuristicFallback);
    assert!(outcome.banner().unwrap().contains("Offline Demo Mode"));
    assert_eq!(outcome.result.metrics.speedup_factor, OFFLINE_SPEEDUP_LABEL);

    let candidates = outcome.result.candidates().unwrap();
    let days: Vec<&str> = candidates.iter().map(|c| c.date.as_str()).collect();
    assert_eq!(days, vec!["Monday", "Tuesday", "Wednesday"]);
    assert_eq!(candidates[0].time, "11:00 AM - 11:30 AM");
}
