// file: src/repository/github.rs
// description: GitHub REST API implementation of the content host
// reference: https://docs.github.com/en/rest/repos/contents

use crate::config::HostingConfig;
use crate::error::{PipelineError, Result};
use crate::models::{ContentNode, RepositoryInfo, content::split_segments};
use crate::repository::host::ContentHost;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    full_name: String,
    default_branch: Option<String>,
    language: Option<String>,
    html_url: String,
}

impl From<GitHubRepo> for RepositoryInfo {
    fn from(repo: GitHubRepo) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
            language: repo.language,
            html_url: repo.html_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateFileRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// The contents API answers a PUT without `sha` on an existing file with this 422 message.
const MISSING_SHA: &str = "\"sha\" wasn't supplied";

fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    owner: String,
    token: String,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(config: &HostingConfig, token: &str) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| PipelineError::Config(format!("Invalid api_url {}: {}", config.api_url, e)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_url,
            owner: config.owner.clone(),
            token: token.to_string(),
            per_page: config.per_page,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| PipelineError::Config(format!("api_url cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, repo: &RepositoryInfo, path: &str) -> Result<Url> {
        let (owner, name) = repo
            .full_name
            .split_once('/')
            .unwrap_or((self.owner.as_str(), repo.name.as_str()));

        let mut segments = vec!["repos", owner, name, "contents"];
        segments.extend(split_segments(path));
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(PipelineError::Hosting {
            status: status.as_u16(),
            message,
        })
    }
}

impl ContentHost for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<RepositoryInfo>> {
        info!("Listing repositories for {}", self.owner);
        let mut repositories = Vec::new();
        let mut page = 1u32;

        loop {
            let mut url = self.endpoint(&["users", self.owner.as_str(), "repos"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &self.per_page.to_string())
                .append_pair("page", &page.to_string());

            let response = Self::check(self.request(Method::GET, url).send().await?).await?;
            let batch: Vec<GitHubRepo> = response.json().await?;
            let count = batch.len();
            debug!("Page {} returned {} repositories", page, count);

            repositories.extend(batch.into_iter().map(RepositoryInfo::from));

            if count < self.per_page as usize {
                break;
            }
            page += 1;
        }

        info!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    async fn list_contents(&self, repo: &RepositoryInfo, path: &str) -> Result<Vec<ContentNode>> {
        let mut url = self.contents_url(repo, path)?;
        url.query_pairs_mut().append_pair("ref", &repo.default_branch);

        debug!("Listing {}:/{}", repo.full_name, path);
        let response = Self::check(self.request(Method::GET, url).send().await?).await?;
        let nodes: Vec<ContentNode> = response.json().await?;
        Ok(nodes)
    }

    async fn fetch_file(&self, repo: &RepositoryInfo, node: &ContentNode) -> Result<Vec<u8>> {
        let url = match node.download_url.as_deref() {
            Some(raw) => Url::parse(raw)
                .map_err(|e| PipelineError::Decode(format!("Invalid download url {}: {}", raw, e)))?,
            None => {
                return Err(PipelineError::Decode(format!(
                    "No download url for {}:/{}",
                    repo.full_name, node.path
                )));
            }
        };

        let response = Self::check(self.request(Method::GET, url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn create_file(
        &self,
        repo: &RepositoryInfo,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<()> {
        let url = self.contents_url(repo, path)?;
        let body = CreateFileRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch,
        };

        let response = self.request(Method::PUT, url).json(&body).send().await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let message = error_message(&response.text().await.unwrap_or_default());
            if message.contains(MISSING_SHA) {
                return Err(PipelineError::Conflict(format!("{}:/{}", repo.full_name, path)));
            }
            return Err(PipelineError::Hosting {
                status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                message,
            });
        }

        Self::check(response).await?;
        info!("Created {}:/{} on {}", repo.full_name, path, branch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> GitHubClient {
        GitHubClient::new(&HostingConfig::default(), "token").unwrap()
    }

    fn repo() -> RepositoryInfo {
        RepositoryInfo {
            name: "SFEvar".to_string(),
            full_name: "QuantLet/SFEvar".to_string(),
            default_branch: "master".to_string(),
            language: Some("R".to_string()),
            html_url: "https://github.com/QuantLet/SFEvar".to_string(),
        }
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let url = client().contents_url(&repo(), "SFE var/plots").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/QuantLet/SFEvar/contents/SFE%20var/plots"
        );
    }

    #[test]
    fn test_root_contents_url() {
        let url = client().contents_url(&repo(), "").unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/QuantLet/SFEvar/contents");
    }

    #[test]
    fn test_repo_without_default_branch() {
        let json = r#"{"name":"x","full_name":"o/x","default_branch":null,"language":null,"html_url":"https://github.com/o/x"}"#;
        let repo: RepositoryInfo = serde_json::from_str::<GitHubRepo>(json).unwrap().into();
        assert_eq!(repo.default_branch, "main");
        assert_eq!(repo.language, None);
    }

    async fn create_with_response(response: ResponseTemplate) -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/o/r/contents/q/README.md"))
            .respond_with(response)
            .mount(&server)
            .await;

        let config = HostingConfig {
            api_url: server.uri(),
            ..HostingConfig::default()
        };
        let repo = RepositoryInfo {
            name: "r".to_string(),
            full_name: "o/r".to_string(),
            ..repo()
        };
        GitHubClient::new(&config, "token")
            .unwrap()
            .create_file(&repo, "q/README.md", "Create README.md", "body", "master")
            .await
    }

    #[tokio::test]
    async fn test_existing_file_is_a_conflict() {
        let body = r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied.","documentation_url":"https://docs.github.com"}"#;
        let result = create_with_response(ResponseTemplate::new(422).set_body_string(body)).await;

        match result {
            Err(PipelineError::Conflict(target)) => assert_eq!(target, "o/r:/q/README.md"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_unprocessable_is_a_hosting_error() {
        let body = r#"{"message":"Branch nosuch not found"}"#;
        let result = create_with_response(ResponseTemplate::new(422).set_body_string(body)).await;

        match result {
            Err(PipelineError::Hosting { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "Branch nosuch not found");
            }
            other => panic!("expected hosting error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_moved_branch_head_is_a_hosting_error() {
        let body = r#"{"message":"is at 1234 but expected 5678"}"#;
        let result = create_with_response(ResponseTemplate::new(409).set_body_string(body)).await;

        assert!(matches!(result, Err(PipelineError::Hosting { status: 409, .. })));
    }

    #[tokio::test]
    async fn test_created_file() {
        let result = create_with_response(ResponseTemplate::new(201).set_body_string("{}")).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_message("bad gateway"), "bad gateway");
    }
}
