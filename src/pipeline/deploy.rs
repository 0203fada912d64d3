use crate::{
    error::{GenError, Result},
    models::{DeployCredentials, PageSet, HOME_PAGE},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use tokio_util::sync::CancellationToken;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Publishes a page set and returns the public site URL.
///
/// Implementations doing several remote calls should stop between them once
/// `cancel` fires.
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(
        &self,
        pages: &PageSet,
        credentials: &DeployCredentials,
        cancel: &CancellationToken,
    ) -> Result<String>;
}

/// Deploys to a fresh GitHub repository served by GitHub Pages.
#[derive(Clone)]
pub struct GithubPagesDeployer {
    client: reqwest::Client,
    api_url: String,
}

impl GithubPagesDeployer {
    pub fn new(api_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.unwrap_or_else(|| GITHUB_API_URL.to_string()),
        }
    }

    pub fn repo_name() -> String {
        format!("generated-website-{}", chrono::Utc::now().timestamp_millis())
    }

    fn file_name(slug: &str) -> String {
        if slug == HOME_PAGE {
            "index.html".to_string()
        } else {
            format!("{}.html", slug)
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        credentials: &DeployCredentials,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&credentials.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "genpipe")
    }

    async fn send(&self, step: &str, builder: reqwest::RequestBuilder) -> Result<()> {
        let response = builder
            .send()
            .await
            .map_err(|e| GenError::DeployError(format!("{}: {}", step, e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::DeployError(format!(
                "{} failed with {}: {}",
                step, status, body
            )));
        }
        log::debug!("GitHub step '{}' succeeded", step);
        Ok(())
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(GenError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl Deployer for GithubPagesDeployer {
    async fn deploy(
        &self,
        pages: &PageSet,
        credentials: &DeployCredentials,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let repo = Self::repo_name();
        let owner = &credentials.account;
        log::info!("Deploying {} page(s) to {}/{}", pages.len(), owner, repo);

        check_cancelled(cancel)?;
        self.send(
            "create repository",
            self.request(reqwest::Method::POST, "/user/repos", credentials)
                .json(&json!({
                    "name": repo,
                    "description": "Generated website",
                    "private": false,
                    "auto_init": false,
                })),
        )
        .await?;

        for (slug, html) in pages {
            check_cancelled(cancel)?;
            let file = Self::file_name(slug);
            self.send(
                "upload page",
                self.request(
                    reqwest::Method::PUT,
                    &format!("/repos/{}/{}/contents/{}", owner, repo, file),
                    credentials,
                )
                .json(&json!({
                    "message": format!("Add {}", file),
                    "content": STANDARD.encode(html.as_bytes()),
                    "branch": "main",
                })),
            )
            .await?;
        }

        check_cancelled(cancel)?;
        self.send(
            "enable pages",
            self.request(
                reqwest::Method::POST,
                &format!("/repos/{}/{}/pages", owner, repo),
                credentials,
            )
            .json(&json!({
                "source": { "branch": "main", "path": "/" }
            })),
        )
        .await?;

        Ok(format!("https://{}.github.io/{}/", owner, repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    fn credentials() -> DeployCredentials {
        DeployCredentials {
            token: "ghp_test".into(),
            account: "octo".into(),
        }
    }

    fn pages() -> PageSet {
        let mut pages = PageSet::new();
        pages.insert(HOME_PAGE.to_string(), "<html></html>".to_string());
        pages
    }

    #[tokio::test]
    async fn test_deploy_runs_all_steps() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/repos/octo/generated-website-\d+/contents/index\.html$"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/repos/octo/generated-website-\d+/pages$"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let deployer = GithubPagesDeployer::new(Some(mock_server.uri()));
        let url = deployer
            .deploy(&pages(), &credentials(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(url.starts_with("https://octo.github.io/generated-website-"));
        assert!(url.ends_with('/'));
    }

    #[tokio::test]
    async fn test_deploy_failure_is_deploy_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_string("name already exists"))
            .mount(&mock_server)
            .await;

        let deployer = GithubPagesDeployer::new(Some(mock_server.uri()));
        let err = deployer
            .deploy(&pages(), &credentials(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenError::DeployError(ref msg) if msg.contains("422")));
    }

    #[tokio::test]
    async fn test_cancelled_deploy_makes_no_calls() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let deployer = GithubPagesDeployer::new(Some(mock_server.uri()));
        let err = deployer
            .deploy(&pages(), &credentials(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GenError::Cancelled));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(GithubPagesDeployer::file_name("home"), "index.html");
        assert_eq!(GithubPagesDeployer::file_name("about"), "about.html");
    }
}
