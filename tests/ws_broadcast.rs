use std::time::Duration;

use futures::StreamExt;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsRead = futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

fn reserve_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

fn test_config(port: u16, log: &std::path::Path) -> logcast::Config {
    logcast::Config {
        port,
        log_file_path: log.to_path_buf(),
        show_logs: false,
        send_timeout_ms: None,
    }
}

async fn next_text(read: &mut WsRead) -> Option<String> {
    while let Some(msg) = read.next().await {
        if let Ok(Message::Text(t)) = msg {
            return Some(t.to_string());
        }
    }
    None
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn change_reaches_every_subscriber() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("app.log");
    tokio::fs::write(&log, "a").await.unwrap();

    let port = reserve_port().unwrap();
    let config = test_config(port, &log);

    // Start server
    let server = tokio::spawn(async move {
        let _ = logcast::server::start(config).await;
    });

    sleep(Duration::from_millis(300)).await;

    // Two clients
    let url = format!("ws://127.0.0.1:{}/ws", port);
    let (ws_a, _) = tokio_tungstenite::connect_async(url.clone())
        .await
        .expect("ws A");
    let (ws_b, _) = tokio_tungstenite::connect_async(url.clone())
        .await
        .expect("ws B");
    let (_write_a, mut read_a) = ws_a.split();
    let (_write_b, mut read_b) = ws_b.split();

    sleep(Duration::from_millis(200)).await;

    tokio::fs::write(&log, "ab").await.unwrap();

    let got_a = timeout(Duration::from_secs(5), next_text(&mut read_a))
        .await
        .expect("client A timed out");
    let got_b = timeout(Duration::from_secs(5), next_text(&mut read_b))
        .await
        .expect("client B timed out");

    assert_eq!(got_a.as_deref(), Some("ab"));
    assert_eq!(got_b.as_deref(), Some("ab"));

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_subscriber_only_sees_future_content() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("app.log");
    tokio::fs::write(&log, "seed").await.unwrap();

    let port = reserve_port().unwrap();
    let config = test_config(port, &log);

    let server = tokio::spawn(async move {
        let _ = logcast::server::start(config).await;
    });

    sleep(Duration::from_millis(300)).await;

    let url = format!("ws://127.0.0.1:{}/ws", port);
    let (ws_early, _) = tokio_tungstenite::connect_async(url.clone())
        .await
        .expect("early client");
    let (_write_early, mut read_early) = ws_early.split();

    sleep(Duration::from_millis(200)).await;

    tokio::fs::write(&log, "first").await.unwrap();
    let got = timeout(Duration::from_secs(5), next_text(&mut read_early))
        .await
        .expect("early client timed out");
    assert_eq!(got.as_deref(), Some("first"));

    // A client joining between two events must never see replayed history.
    let (ws_late, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("late client");
    let (_write_late, mut read_late) = ws_late.split();

    sleep(Duration::from_millis(200)).await;

    tokio::fs::write(&log, "second").await.unwrap();
    let got = timeout(Duration::from_secs(5), next_text(&mut read_late))
        .await
        .expect("late client timed out");
    assert_eq!(got.as_deref(), Some("second"));

    server.abort();
}
