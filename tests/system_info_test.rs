mod common;

use bwtfs_client::ClientError;
use common::setup;

#[tokio::test]
async fn test_info_reports_capacity_and_free_space() {
    let (fs, client) = setup().await;
    {
        let mut fs = fs.lock().unwrap();
        fs.capacity = 10_000;
        fs.files.insert("a".to_string(), vec![0; 1_500]);
    }

    let info = client.info().await.unwrap();
    assert_eq!(info.total, 10_000);
    assert_eq!(info.free, 8_500);
    assert_eq!(info.used(), 1_500);
}

#[tokio::test]
async fn test_info_fails_when_free_size_unavailable() {
    let (fs, client) = setup().await;
    fs.lock().unwrap().fail_free_size = true;

    let err = client.info().await.unwrap_err();
    match err {
        ClientError::InfoUnavailable(reason) => assert!(reason.contains("/free_size")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_info_fails_when_service_unreachable() {
    // Bind then drop a listener to get a port with nothing behind it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = bwtfs_client::FsClient::connect(bwtfs_client::ClientConfig {
        base_url: format!("http://{}", addr),
        ..Default::default()
    })
    .unwrap();

    let err = client.info().await.unwrap_err();
    assert!(matches!(err, ClientError::InfoUnavailable(_)));
}
