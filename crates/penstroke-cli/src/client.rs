use std::fs;
use std::time::Duration;

use async_trait::async_trait;
use penstroke_api_types::{CreatePostRequest, CreatePostResponse, FieldErrors};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::args::Cli;
use crate::submit::{PostTransport, TransportError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site or PENSTROKE_SITE_URL)")]
    MissingSite,
    #[error("admin key is required (use --key-file or PENSTROKE_ADMIN_KEY)")]
    MissingKey,
    #[error("failed to read key file: {0}")]
    KeyFile(std::io::Error),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid schema file {path}: {message}")]
    SchemaFile { path: String, message: String },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("draft is not valid: {0}")]
    InvalidDraft(FieldErrors),
    #[error("submission failed")]
    SubmissionFailed,
}

/// Explicitly constructed HTTP client for one site.
///
/// Created once per process and passed to whatever issues requests.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub client: Client,
    pub base: Url,
    pub timeout: Duration,
}

impl Ctx {
    pub fn new(site: &str, timeout: Duration) -> Result<Self, CliError> {
        let base = site_base(site)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("penstroke-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, CliError> {
        self.base.join(path).map_err(CliError::Url)
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, CliError> {
        let url = self.url(path)?;
        let mut req = self.client.request(method, url);
        if let Some(b) = body {
            req = req.json(&b);
        }

        let resp = req.send().await?;
        Self::handle(resp).await.map_err(|err| match err {
            TransportError::Http(err) => CliError::Http(err),
            other => CliError::Server(other.to_string()),
        })
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PostTransport for Ctx {
    async fn create_post(
        &self,
        request: &CreatePostRequest,
    ) -> Result<CreatePostResponse, TransportError> {
        let url = self
            .base
            .join("api/post")
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        let resp = self.client.post(url).json(request).send().await?;
        Self::handle(resp).await
    }
}

/// Parse the site URL as a directory so relative joins stay under any path
/// prefix: `https://host/blog` becomes `https://host/blog/`.
fn site_base(site: &str) -> Result<Url, CliError> {
    let mut base = Url::parse(site)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

pub fn build_ctx_from_cli(cli: &Cli) -> Result<Ctx, CliError> {
    let site = cli.site.clone().ok_or(CliError::MissingSite)?;
    Ctx::new(&site, Duration::from_secs(cli.timeout_seconds.max(1)))
}

/// Resolve the admin key, preferring the key file over the environment.
pub fn resolve_admin_key(cli: &Cli) -> Result<String, CliError> {
    if let Some(path) = &cli.key_file {
        return Ok(fs::read_to_string(path)
            .map_err(CliError::KeyFile)?
            .trim()
            .to_string());
    }
    cli.admin_key_env.clone().ok_or(CliError::MissingKey)
}
