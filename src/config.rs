use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    api::PaginatedFetcher,
    http::{DEFAULT_API_URL, HttpClient, normalize_api_url},
    runtime::Runtime,
    source::{GitHubSource, RepoId},
};

pub const USER_AGENT: &str = "cube-updater";

/// Upper bound for a whole request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub source: GitHubSource,
    pub repo: RepoId,
    /// Directory that receives `Descargas/`.
    pub base_dir: PathBuf,
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

impl<R: Runtime> Config<R> {
    pub fn new(
        runtime: R,
        repo: RepoId,
        api_url: Option<String>,
        root: Option<PathBuf>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var("GITHUB_TOKEN") {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("GITHUB_TOKEN is not a valid header value")?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication: {}", mask_token(&token));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let api_url = match api_url {
            Some(address) => normalize_api_url(&address)?,
            None => DEFAULT_API_URL.to_string(),
        };
        debug!("Using API root {}", api_url);

        let base_dir = match root {
            Some(root) => root,
            None => runtime.base_dir()?,
        };

        let source = GitHubSource::new(PaginatedFetcher::new(HttpClient::new(client, &api_url)));

        Ok(Self {
            runtime,
            source,
            repo,
            base_dir,
        })
    }
}
