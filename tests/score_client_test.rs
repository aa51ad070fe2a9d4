//! Integration test: game-side score client against a stub backend
//!
//! The stub is a plain std TCP listener that answers a fixed number of
//! requests with canned JSON and records what it received.

use parakeet::highscore::{ClientError, LocalBest, ScoreClient, ScoreReporter, ServerUpdate};
use parakeet::server::http::{parse_request, ParseStatus, Request};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Serve `replies` in order, one per connection. Received requests are sent
/// back over the returned channel.
fn stub_server(replies: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Request>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in replies {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let request = loop {
                if let Ok(ParseStatus::Complete(request)) = parse_request(&buf) {
                    break request;
                }
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    return;
                }
                buf.extend_from_slice(&chunk[..n]);
            };
            let _ = tx.send(request);

            let reply = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        }
    });

    (url, rx)
}

/// A URL nothing listens on.
fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn scratch_best(name: &str) -> LocalBest {
    let path = std::env::temp_dir()
        .join(format!("parakeet-client-{}", std::process::id()))
        .join(name);
    std::fs::remove_file(&path).ok();
    LocalBest::open(path)
}

/// Poll the reporter until `count` updates arrive or a few seconds pass.
fn wait_for_updates(reporter: &ScoreReporter, count: usize) -> Vec<ServerUpdate> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut updates = Vec::new();
    while updates.len() < count && Instant::now() < deadline {
        updates.extend(reporter.poll_updates());
        thread::sleep(Duration::from_millis(10));
    }
    updates
}

// =============================================================================
// ScoreClient
// =============================================================================

#[test]
fn test_submit_score_posts_json() {
    let (url, requests) = stub_server(vec![(200, r#"{"highscore":31}"#)]);
    let client = ScoreClient::new(&url);

    let high = client.submit_score(17).unwrap();
    assert_eq!(high, 31);

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/highscore");
    assert_eq!(request.json_body().unwrap()["score"], 17);
}

#[test]
fn test_fetch_leaderboard() {
    let (url, _requests) = stub_server(vec![(
        200,
        r#"[{"userId":1,"username":"kea","score":40,"t":5},{"userId":null,"username":null,"score":12,"t":9}]"#,
    )]);
    let client = ScoreClient::new(&url);

    let board = client.fetch_leaderboard().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].username.as_deref(), Some("kea"));
    assert_eq!(board[0].user_id, Some(1));
    assert_eq!(board[1].score, 12);
    assert_eq!(board[1].username, None);
}

#[test]
fn test_error_status_reported() {
    let (url, _requests) = stub_server(vec![(500, r#"{"error":"could not save data"}"#)]);
    let client = ScoreClient::new(&url);

    match client.fetch_highscore() {
        Err(ClientError::Status(500, body)) => assert!(body.contains("could not save data")),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let client = ScoreClient::new(&dead_url());
    assert!(matches!(
        client.fetch_highscore(),
        Err(ClientError::Transport(_))
    ));
}

// =============================================================================
// ScoreReporter
// =============================================================================

#[test]
fn test_round_end_submits_then_refreshes() {
    let (url, requests) = stub_server(vec![
        (200, r#"{"highscore":9}"#),
        (200, r#"{"highscore":9}"#),
        (200, r#"[{"userId":null,"username":null,"score":9,"t":1}]"#),
    ]);
    let mut reporter =
        ScoreReporter::new(scratch_best("submit.json"), Some(ScoreClient::new(&url)));

    assert!(reporter.round_ended(9));
    assert_eq!(reporter.local_best(), 9);

    let updates = wait_for_updates(&reporter, 2);
    assert_eq!(updates[0], ServerUpdate::Highscore(9));
    match &updates[1] {
        ServerUpdate::Leaderboard(entries) => assert_eq!(entries[0].score, 9),
        other => panic!("expected leaderboard, got {:?}", other),
    }

    let paths: Vec<String> = (0..3)
        .map(|_| requests.recv_timeout(Duration::from_secs(5)).unwrap().path)
        .collect();
    assert_eq!(paths, vec!["/api/highscore", "/api/highscore", "/api/leaderboard"]);
}

#[test]
fn test_score_below_local_best_is_not_submitted() {
    let (url, requests) = stub_server(vec![
        (200, r#"{"highscore":9}"#),
        (200, r#"{"highscore":9}"#),
        (200, r#"[]"#),
        (200, r#"{"highscore":9}"#),
    ]);
    let mut reporter =
        ScoreReporter::new(scratch_best("below.json"), Some(ScoreClient::new(&url)));

    assert!(reporter.round_ended(9));
    for _ in 0..3 {
        requests.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    assert!(!reporter.round_ended(3));
    assert!(!reporter.round_ended(9));
    assert_eq!(reporter.local_best(), 9);
    assert!(requests.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn test_zero_score_stays_local() {
    let (url, requests) = stub_server(vec![(200, r#"{"highscore":0}"#)]);
    let mut reporter =
        ScoreReporter::new(scratch_best("zero.json"), Some(ScoreClient::new(&url)));

    assert!(!reporter.round_ended(0));
    assert!(requests.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn test_unreachable_server_does_not_block_play() {
    let mut reporter = ScoreReporter::new(
        scratch_best("unreachable.json"),
        Some(ScoreClient::new(&dead_url())),
    );

    let started = Instant::now();
    assert!(reporter.round_ended(3));
    // round_ended hands off to a background thread
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(reporter.local_best(), 3);

    let updates = wait_for_updates(&reporter, 1);
    assert!(matches!(updates.first(), Some(ServerUpdate::Unreachable(_))));
}
