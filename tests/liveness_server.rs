use nasur_bot::health::{self, HEALTH_BODY, ROOT_BODY};
use tokio::net::TcpListener;

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(health::serve(listener));
    format!("http://{addr}")
}

#[tokio::test]
async fn root_reports_running() {
    let base = start_server().await;
    let response = reqwest::get(format!("{base}/")).await.expect("GET /");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), ROOT_BODY);
}

#[tokio::test]
async fn health_reports_ok() {
    let base = start_server().await;
    let response = reqwest::get(format!("{base}/health"))
        .await
        .expect("GET /health");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), HEALTH_BODY);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let base = start_server().await;
    let response = reqwest::get(format!("{base}/metrics"))
        .await
        .expect("GET /metrics");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
