mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::{header, StatusCode};

async fn spawn_with_storage() -> Result<common::TestServer> {
    let upstream = common::spawn_upstream(common::mock_upstream(Arc::default())).await?;
    let mut config = common::test_config(&upstream);
    config.storage.endpoint = Some("https://files.example.com".to_string());
    config.storage.access_key = Some("crew-access".to_string());
    config.storage.secret_key = Some("crew-storage-secret".to_string());
    common::spawn_app(config).await
}

#[tokio::test]
async fn download_link_points_at_the_stored_file() -> Result<()> {
    let server = spawn_with_storage().await?;

    let res = common::client()
        .get(server.url("/api/documents/9/download"))
        .header(header::COOKIE, "token=tok-1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let link = common::body_json(res).await?;
    let url = link["url"].as_str().unwrap_or_default();
    assert!(
        url.starts_with("https://files.example.com/crew-documents/seafarers/7/passport%20scan.pdf?token="),
        "{}",
        url
    );
    assert!(link["expires_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn document_without_file_is_404() -> Result<()> {
    let server = spawn_with_storage().await?;

    let res = common::client()
        .get(server.url("/api/documents/10/download"))
        .header(header::COOKIE, "token=tok-1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(res).await?["detail"], "Document has no stored file");
    Ok(())
}

#[tokio::test]
async fn unknown_document_answer_is_forwarded() -> Result<()> {
    let server = spawn_with_storage().await?;

    let res = common::client()
        .get(server.url("/api/documents/404/download"))
        .header(header::COOKIE, "token=tok-1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(res).await?["detail"], "Document not found");
    Ok(())
}

#[tokio::test]
async fn download_without_storage_is_unavailable() -> Result<()> {
    let (server, _) = common::spawn_stack().await?;

    let res = common::client()
        .get(server.url("/api/documents/9/download"))
        .header(header::COOKIE, "token=tok-1")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(common::body_json(res).await?["detail"], "Document storage is not configured");
    Ok(())
}
