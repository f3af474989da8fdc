use std::time::Duration;

use sweeper_client::{
    ClientError, LeaderboardClient, LeaderboardPoller, ScoreUploader, SubmissionStatus,
};
use sweeper_core::{Completion, ScoreRecord};
use sweeper_protocol::ProtocolError;
use sweeper_server::{LeaderboardServer, ServerConfig};

async fn start() -> (tempfile::TempDir, LeaderboardServer) {
    let dir = tempfile::tempdir().unwrap();
    let server = LeaderboardServer::start(ServerConfig::local(dir.path().join("scores.txt")))
        .await
        .unwrap();
    (dir, server)
}

async fn stop(server: LeaderboardServer) {
    server.shutdown();
    server.wait().await.unwrap();
}

#[tokio::test]
async fn submit_and_fetch_top() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();

    assert_eq!(client.submit("A", Duration::from_nanos(5)).await.unwrap(), 1);
    assert_eq!(client.submit("B", Duration::from_nanos(3)).await.unwrap(), 1);
    assert_eq!(client.submit("C", Duration::from_nanos(8)).await.unwrap(), 3);
    assert_eq!(client.submit("D", Duration::from_nanos(3)).await.unwrap(), 2);
    assert_eq!(client.submit("E", Duration::from_nanos(4)).await.unwrap(), 3);

    let top = client.top().await.unwrap();
    let names: Vec<_> = top.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(names, ["B", "D", "E", "A", "C"]);

    stop(server).await;
}

#[tokio::test]
async fn names_with_reserved_characters_survive() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();

    client.submit_nanos("Ann & Bob=1?", 12).await.unwrap();

    assert_eq!(
        client.top().await.unwrap(),
        vec![ScoreRecord::new("Ann & Bob=1?", 12)]
    );

    stop(server).await;
}

#[tokio::test]
async fn rejected_submission_is_an_error() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();

    assert!(matches!(
        client.submit_nanos("", 12).await,
        Err(ClientError::Protocol(ProtocolError::Rejected))
    ));

    stop(server).await;
}

#[tokio::test]
async fn uploader_settles_on_rank() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();
    client.submit_nanos("old", 1_000).await.unwrap();

    let uploader = ScoreUploader::new(client);
    assert_eq!(uploader.status(), SubmissionStatus::Idle);

    let mut status = uploader.subscribe();
    let task = uploader.upload("new", Completion::new(Duration::from_nanos(2_000)));
    assert_eq!(uploader.status(), SubmissionStatus::Pending);

    task.await.unwrap();
    let settled = *status.wait_for(|s| s.is_settled()).await.unwrap();
    assert_eq!(settled, SubmissionStatus::Ranked(2));

    stop(server).await;
}

#[tokio::test]
async fn uploader_fails_when_server_is_gone() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();
    stop(server).await;

    let uploader = ScoreUploader::new(client);
    uploader
        .upload("late", Completion::new(Duration::from_secs(3)))
        .await
        .unwrap();

    assert_eq!(uploader.status(), SubmissionStatus::Failed);
}

#[tokio::test]
async fn poller_publishes_latest_list() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();
    client.submit_nanos("first", 10).await.unwrap();

    let poller = LeaderboardPoller::spawn(client.clone(), Duration::from_millis(20));
    let mut latest = poller.subscribe();
    latest.wait_for(|list| list.len() == 1).await.unwrap();

    client.submit_nanos("second", 5).await.unwrap();
    let list = latest.wait_for(|list| list.len() == 2).await.unwrap().clone();
    assert_eq!(list[0], ScoreRecord::new("second", 5));

    poller.shutdown().await;
    stop(server).await;
}

#[tokio::test]
async fn poller_keeps_list_after_failure() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();
    client.submit_nanos("only", 10).await.unwrap();

    let poller = LeaderboardPoller::spawn(client, Duration::from_millis(20));
    let mut latest = poller.subscribe();
    latest.wait_for(|list| list.len() == 1).await.unwrap();

    stop(server).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(poller.latest(), vec![ScoreRecord::new("only", 10)]);
    poller.shutdown().await;
}

/// Accepts connections and never writes a byte back.
async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn zero_interval_still_polls() {
    let (_dir, server) = start().await;
    let client = LeaderboardClient::new(&server.url()).unwrap();
    client.submit_nanos("zero", 1).await.unwrap();

    let poller = LeaderboardPoller::spawn(client, Duration::ZERO);
    let mut latest = poller.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        latest.wait_for(|list| list.len() == 1),
    )
    .await
    .unwrap()
    .unwrap();

    poller.shutdown().await;
    stop(server).await;
}

#[tokio::test]
async fn unanswered_request_times_out() {
    let url = silent_server().await;
    let client = LeaderboardClient::with_timeout(&url, Duration::from_millis(200)).unwrap();

    assert!(matches!(client.top().await, Err(ClientError::Http(err)) if err.is_timeout()));
}

#[tokio::test]
async fn uploader_settles_when_server_never_answers() {
    let url = silent_server().await;
    let client = LeaderboardClient::with_timeout(&url, Duration::from_millis(200)).unwrap();

    let uploader = ScoreUploader::new(client);
    let task = uploader.upload("waiting", Completion::new(Duration::from_secs(1)));
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(uploader.status(), SubmissionStatus::Failed);
}

#[tokio::test]
async fn poller_shutdown_does_not_hang_on_silent_server() {
    let url = silent_server().await;
    let client = LeaderboardClient::with_timeout(&url, Duration::from_millis(200)).unwrap();

    let poller = LeaderboardPoller::spawn(client, Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(50)).await;

    tokio::time::timeout(Duration::from_secs(5), poller.shutdown())
        .await
        .unwrap();
}
