//! Start the health server on a free port and check both liveness routes.

use std::time::Duration;

use relay_module::server::run_health_server;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

#[tokio::test]
async fn health_routes_respond_ok() {
    let port = free_port();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        run_health_server("127.0.0.1", port, async {
            let _ = stop_rx.await;
        })
        .await
    });

    let client = reqwest::Client::new();
    let mut last_err = None;
    let mut served = false;
    for _ in 0..100 {
        match client.get(format!("http://127.0.0.1:{}/", port)).send().await {
            Ok(resp) => {
                assert!(resp.status().is_success());
                assert_eq!(resp.text().await.expect("body"), "ok");
                served = true;
                break;
            }
            Err(err) => last_err = Some(err),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(served, "health server never came up: {:?}", last_err);

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("GET /health");
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.expect("body"), "ok");

    let _ = stop_tx.send(());
    server
        .await
        .expect("server task")
        .expect("server shuts down cleanly");
}

#[tokio::test]
async fn invalid_host_is_rejected() {
    let result = run_health_server("not-a-host", free_port(), async {}).await;
    assert!(result.is_err());
}
