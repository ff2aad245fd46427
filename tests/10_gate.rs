mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = common::body_json(res).await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_page_without_credential_redirects_to_login() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;

    let res = common::client().get(server.url("/seafarer/dashboard")).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/login?redirect=%2Fseafarer%2Fdashboard");
    Ok(())
}

#[tokio::test]
async fn admin_area_uses_its_own_login_and_keeps_the_query() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;

    let res = common::client().get(server.url("/admin/users?page=2")).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/admin/login?redirect=%2Fadmin%2Fusers%3Fpage%3D2");
    Ok(())
}

#[tokio::test]
async fn login_pages_are_reachable_without_credential() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;
    let client = common::client();

    for path in ["/login", "/admin/login", "/register", "/forgot-password"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn lookalike_prefix_is_not_gated() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;

    // "/administrator" is outside the "/admin" area, so the gate lets it through to a 404
    let res = common::client().get(server.url("/administrator")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn home_sends_anonymous_visitors_to_login() -> Result<()> {
    let server = common::spawn_app(common::test_config(&common::unreachable_upstream()?)).await?;

    let res = common::client().get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/login");
    Ok(())
}
