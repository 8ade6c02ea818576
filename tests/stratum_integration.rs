//! End-to-end tests for the Stratum session against a loopback socket
//! standing in for the pool.

use randomx_miner::job::Solution;
use randomx_miner::stratum::{self, Command, StratumEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

async fn fake_pool() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[tokio::test]
async fn login_then_job_push_delivers_job_event() {
    let (listener, port) = fake_pool().await;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let login_line = lines.next_line().await.unwrap().unwrap();
        let login_req: serde_json::Value = serde_json::from_str(&login_line).unwrap();
        assert_eq!(login_req["method"], "login");

        let login_response = serde_json::json!({
            "id": 1,
            "result": { "id": "subscription-1" },
            "error": null
        });
        write_half
            .write_all(format!("{}\n", login_response).as_bytes())
            .await
            .unwrap();

        let job_push = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "job",
            "params": {
                "job_id": "job-1",
                "blob": "00".repeat(76),
                "target": "ffffffff",
                "seed_hash": "11".repeat(32),
            }
        });
        write_half
            .write_all(format!("{}\n", job_push).as_bytes())
            .await
            .unwrap();

        // Keep the socket open until the client is done with it.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    });

    let mut handle = stratum::connect("127.0.0.1", port, "wallet".to_string())
        .await
        .expect("connect should succeed");

    let event = tokio::time::timeout(std::time::Duration::from_secs(2), handle.events.recv())
        .await
        .expect("should receive an event before timeout")
        .expect("channel should not be closed");

    match event {
        StratumEvent::Job(job) => {
            assert_eq!(job.job_id, "job-1");
            assert_eq!(job.blob.len(), 76);
        }
        other => panic!("expected a job event, got {other:?}"),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn submitted_share_is_reported_as_accepted() {
    let (listener, port) = fake_pool().await;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let _login_line = lines.next_line().await.unwrap().unwrap();
        let login_response = serde_json::json!({
            "id": 1,
            "result": { "id": "subscription-1" },
            "error": null
        });
        write_half
            .write_all(format!("{}\n", login_response).as_bytes())
            .await
            .unwrap();

        let submit_line = lines.next_line().await.unwrap().unwrap();
        let submit_req: serde_json::Value = serde_json::from_str(&submit_line).unwrap();
        assert_eq!(submit_req["method"], "submit");
        let req_id = submit_req["id"].as_u64().unwrap();

        let accept_response = serde_json::json!({
            "id": req_id,
            "result": true,
            "error": null
        });
        write_half
            .write_all(format!("{}\n", accept_response).as_bytes())
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    });

    let mut handle = stratum::connect("127.0.0.1", port, "wallet".to_string())
        .await
        .expect("connect should succeed");

    // Drain the login response handling before submitting.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    handle
        .commands
        .send(Command::Submit(Solution {
            job_id: "job-1".to_string(),
            nonce: 42,
            result_hash: [0u8; 32],
        }))
        .expect("command channel should be open");

    let event = tokio::time::timeout(std::time::Duration::from_secs(2), handle.events.recv())
        .await
        .expect("should receive an event before timeout")
        .expect("channel should not be closed");

    assert!(matches!(event, StratumEvent::ShareAccepted));

    server.await.unwrap();
}
