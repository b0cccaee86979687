//! Async HTTP client wrapping the Roster JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, Url};
use roster_core::{
  entity::{Entity, Record},
  user::{Credentials, PasswordChange, Signup, User},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Connection settings for the Roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the Roster JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// `{ "error": ..., "details"?: ... }`
#[derive(Deserialize)]
struct ErrorBody {
  error:   String,
  #[serde(default)]
  details: Option<String>,
}

#[derive(Deserialize)]
struct AuthBody {
  user: User,
}

#[derive(Deserialize)]
struct MessageBody {
  message: String,
}

/// Pass successful responses through; turn anything else into an error
/// carrying the server's `error` message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) => {
      tracing::debug!(%status, details = ?body.details, "{what} failed");
      Err(anyhow!(body.error))
    }
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api/{}",
      self.config.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  /// Like [`ApiClient::url`], but each segment is percent-encoded, for paths
  /// that carry user input.
  fn segment_url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.url(""))
      .with_context(|| format!("invalid base url {}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("base url {} cannot take a path", self.config.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `GET /api/<resource>`
  pub async fn list<E: Entity>(&self) -> Result<Vec<Record<E>>> {
    let what = format!("GET /{}", E::PATH);
    let resp = self
      .client
      .get(self.url(E::PATH))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {}", E::COLLECTION))
  }

  /// `POST /api/<resource>`
  pub async fn create<E: Entity>(&self, entity: &E) -> Result<Record<E>> {
    let what = format!("POST /{}", E::PATH);
    let resp = self
      .client
      .post(self.url(E::PATH))
      .json(entity)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising new {}", E::LABEL))
  }

  /// `PUT /api/<resource>/<id>` with any subset of the entity's fields.
  pub async fn update<E: Entity>(
    &self,
    id: Uuid,
    patch: &Map<String, Value>,
  ) -> Result<Record<E>> {
    let what = format!("PUT /{}/{id}", E::PATH);
    let resp = self
      .client
      .put(self.url(&format!("{}/{id}", E::PATH)))
      .json(patch)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising updated {}", E::LABEL))
  }

  /// `DELETE /api/<resource>/<id>`
  pub async fn delete<E: Entity>(&self, id: Uuid) -> Result<()> {
    let what = format!("DELETE /{}/{id}", E::PATH);
    let resp = self
      .client
      .delete(self.url(&format!("{}/{id}", E::PATH)))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what).await?;
    Ok(())
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// `POST /api/auth/signup`
  pub async fn signup(&self, body: &Signup) -> Result<User> {
    let resp = self
      .client
      .post(self.url("auth/signup"))
      .json(body)
      .send()
      .await
      .context("POST /auth/signup failed")?;
    let body: AuthBody = check(resp, "signup")
      .await?
      .json()
      .await
      .context("deserialising signup response")?;
    Ok(body.user)
  }

  /// `POST /api/auth/login`
  pub async fn login(&self, credentials: &Credentials) -> Result<User> {
    let resp = self
      .client
      .post(self.url("auth/login"))
      .json(credentials)
      .send()
      .await
      .context("POST /auth/login failed")?;
    let body: AuthBody = check(resp, "login")
      .await?
      .json()
      .await
      .context("deserialising login response")?;
    Ok(body.user)
  }

  /// `PUT /api/users/<email>/password`, returning the server's message.
  pub async fn change_password(&self, email: &str, body: &PasswordChange) -> Result<String> {
    let resp = self
      .client
      .put(self.segment_url(&["users", email, "password"])?)
      .json(body)
      .send()
      .await
      .context("PUT /users/:email/password failed")?;
    let body: MessageBody = check(resp, "password change")
      .await?
      .json()
      .await
      .context("deserialising password change response")?;
    Ok(body.message)
  }
}
