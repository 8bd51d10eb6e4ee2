use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};

use crate::config::ModemConfig;

const LOGIN_PATH: &str = "/login.cgi";
const STATUS_PATH: &str = "/GetDSLInfo.cgi";

/// An authenticated session against the modem's web UI. The session cookie lives
/// in the client's jar, so a session is only valid for the cycle that created it.
pub struct ModemSession {
    client: Client,
    base: String,
}

impl ModemSession {
    pub async fn login(config: &ModemConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("failed to build modem HTTP client")?;
        let base = config.uri.trim_end_matches('/').to_string();

        let form = [
            ("loginSubmitValue", "1"),
            ("admin_username", config.username.as_str()),
            ("admin_password", config.password.as_str()),
        ];
        let response = client
            .post(format!("{base}{LOGIN_PATH}"))
            .form(&form)
            .send()
            .await
            .with_context(|| format!("login request to {base} failed"))?;
        ensure_success(response, "login").await?;
        tracing::debug!(modem = %base, "modem login accepted");

        Ok(Self { client, base })
    }

    /// Fetches the raw pipe-delimited diagnostic page.
    pub async fn fetch_status(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}{STATUS_PATH}", self.base))
            .send()
            .await
            .with_context(|| format!("status request to {} failed", self.base))?;
        let response = ensure_success(response, "status fetch").await?;
        response
            .text()
            .await
            .context("failed to read status page body")
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.as_u16() < 300 {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("{operation} rejected with {status}: {}", body.trim());
}
