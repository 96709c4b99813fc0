// API client module: a small blocking HTTP client for the SharePoint REST
// surface. Every mutating call carries the request digest in the
// `X-RequestDigest` header; only the digest request itself authenticates
// with the basic credentials alone.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

/// odata=verbose is the flavour the classic REST endpoints speak.
const ODATA_VERBOSE: &str = "application/json;odata=verbose";

/// Comment attached to every checkin issued by this tool.
const CHECKIN_COMMENT: &str = "Checked in via spsync";

/// Checkin type for the `CheckIn(...)` call. The service encodes these as
/// 0, 1 and 2; the publish flow always asks for `Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckinType {
    #[default]
    Minor,
    Major,
    Overwrite,
}

impl CheckinType {
    pub fn code(self) -> u8 {
        match self {
            CheckinType::Minor => 0,
            CheckinType::Major => 1,
            CheckinType::Overwrite => 2,
        }
    }
}

impl fmt::Display for CheckinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The network operations the sync flow needs. `SpClient` is the real
/// implementation; tests substitute a recording fake so the orchestration
/// can be exercised without a server.
pub trait SpOps {
    fn request_digest(&self) -> Result<String>;
    fn folder_exists(&self, server_relative_url: &str) -> Result<bool>;
    fn create_folder(&self, digest: &str, server_relative_url: &str) -> Result<()>;
    fn upload(&self, digest: &str, library: &str, filename: &str, content: &[u8]) -> Result<()>;
    fn update_metadata(
        &self,
        digest: &str,
        library: &str,
        filename: &str,
        metadata: &serde_json::Value,
    ) -> Result<()>;
    fn checkout(&self, digest: &str, library: &str, filename: &str) -> Result<()>;
    fn checkin(&self, digest: &str, library: &str, filename: &str, kind: CheckinType)
        -> Result<()>;
}

/// Response shape of `POST /_api/contextinfo` in odata=verbose form; the
/// digest value is the only field we read.
#[derive(Deserialize)]
struct ContextInfo {
    d: ContextInfoBody,
}

#[derive(Deserialize)]
struct ContextInfoBody {
    #[serde(rename = "GetContextWebInformation")]
    web_information: ContextWebInformation,
}

#[derive(Deserialize)]
struct ContextWebInformation {
    #[serde(rename = "FormDigestValue")]
    form_digest_value: String,
}

/// Blocking SharePoint REST client holding the site URL and credentials.
#[derive(Clone)]
pub struct SpClient {
    client: Client,
    site: String,
    username: String,
    password: String,
}

impl SpClient {
    pub fn new(site: &str, username: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SpClient {
            client,
            site: site.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Basic-auth header value for the configured credentials.
    fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Common headers for digest-authorized mutating calls.
    fn digest_headers(&self, digest: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.basic_auth())?);
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_VERBOSE));
        headers.insert("X-RequestDigest", HeaderValue::from_str(digest)?);
        Ok(headers)
    }

    fn folder_url(&self, server_relative_url: &str) -> String {
        format!(
            "{}/_api/web/GetFolderByServerRelativeUrl('{}')",
            self.site, server_relative_url
        )
    }

    fn file_url(&self, library: &str, filename: &str) -> String {
        format!("{}/Files('{}')", self.folder_url(library), filename)
    }

    /// Create-or-overwrite target for the upload. `overwrite=true` is
    /// always set: an existing file at the path gets replaced.
    fn file_add_url(&self, library: &str, filename: &str) -> String {
        format!(
            "{}/Files/add(url='{}',overwrite=true)",
            self.folder_url(library),
            filename
        )
    }
}

impl SpOps for SpClient {
    /// Request a fresh digest from the contextinfo endpoint.
    fn request_digest(&self) -> Result<String> {
        let url = format!("{}/_api/contextinfo", self.site);
        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.basic_auth())
            .header(ACCEPT, ODATA_VERBOSE)
            .send()
            .context("Failed to send digest request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Digest request failed: {} - {}", status, txt);
        }
        let info: ContextInfo = res.json().context("Parsing contextinfo response json")?;
        Ok(info.d.web_information.form_digest_value)
    }

    /// Check whether a folder exists. A 404 means missing; any other
    /// non-success status is an error.
    fn folder_exists(&self, server_relative_url: &str) -> Result<bool> {
        let url = self.folder_url(server_relative_url);
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.basic_auth())
            .header(ACCEPT, ODATA_VERBOSE)
            .send()
            .context("Failed to send folder lookup request")?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Folder lookup failed: {} - {}", status, txt);
        }
        Ok(true)
    }

    fn create_folder(&self, digest: &str, server_relative_url: &str) -> Result<()> {
        let url = format!("{}/_api/web/folders", self.site);
        let body = serde_json::json!({
            "__metadata": { "type": "SP.Folder" },
            "ServerRelativeUrl": server_relative_url,
        });
        let res = self
            .client
            .post(&url)
            .headers(self.digest_headers(digest)?)
            .header(CONTENT_TYPE, ODATA_VERBOSE)
            .body(serde_json::to_vec(&body)?)
            .send()
            .context("Failed to send folder create request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!(
                "Creating folder {} failed: {} - {}",
                server_relative_url,
                status,
                txt
            );
        }
        Ok(())
    }

    /// Upload the file bytes, replacing any existing file at that path.
    fn upload(&self, digest: &str, library: &str, filename: &str, content: &[u8]) -> Result<()> {
        let url = self.file_add_url(library, filename);
        let res = self
            .client
            .post(&url)
            .headers(self.digest_headers(digest)?)
            .body(content.to_vec())
            .send()
            .context("Failed to send upload request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Upload failed: {} - {}", status, txt);
        }
        Ok(())
    }

    /// Partial metadata update on the file's list item. MERGE with
    /// `If-Match: *` so it applies regardless of the current version.
    fn update_metadata(
        &self,
        digest: &str,
        library: &str,
        filename: &str,
        metadata: &serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}/listitemallfields", self.file_url(library, filename));
        let res = self
            .client
            .post(&url)
            .headers(self.digest_headers(digest)?)
            .header(CONTENT_TYPE, ODATA_VERBOSE)
            .header("X-HTTP-Method", "MERGE")
            .header("If-Match", "*")
            .body(serde_json::to_vec(metadata)?)
            .send()
            .context("Failed to send metadata request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Metadata update failed: {} - {}", status, txt);
        }
        Ok(())
    }

    fn checkout(&self, digest: &str, library: &str, filename: &str) -> Result<()> {
        let url = format!("{}/CheckOut()", self.file_url(library, filename));
        let res = self
            .client
            .post(&url)
            .headers(self.digest_headers(digest)?)
            .header(CONTENT_TYPE, ODATA_VERBOSE)
            .send()
            .context("Failed to send checkout request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Checkout failed: {} - {}", status, txt);
        }
        Ok(())
    }

    fn checkin(
        &self,
        digest: &str,
        library: &str,
        filename: &str,
        kind: CheckinType,
    ) -> Result<()> {
        let url = format!(
            "{}/CheckIn(comment='{}', checkintype={})",
            self.file_url(library, filename),
            CHECKIN_COMMENT,
            kind
        );
        let res = self
            .client
            .post(&url)
            .headers(self.digest_headers(digest)?)
            .header(CONTENT_TYPE, ODATA_VERBOSE)
            .send()
            .context("Failed to send checkin request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Checkin failed: {} - {}", status, txt);
        }
        Ok(())
    }
}
