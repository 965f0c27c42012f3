//! HTTP transport for [`CloudActor`].
//!
//! Record endpoints exchange domain-shape JSON. Export and import speak
//! the v1.0 bundle wire format instead, so a backend dump is
//! byte-compatible with the files the guest vault reads and writes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;

use lotus_core::{
    DomainError, ExportBundle, ImportSummary, JournalDraft, JournalEntry, ProgressStats, Ritual,
    RitualDraft, SessionDraft, SessionRecord, UserProfile, export_json, import_json,
};

use crate::actor::{CloudActor, CloudError, UserRole};
use crate::error::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`CloudActor`] over a JSON/HTTP backend.
///
/// One client per sign-in: the bearer principal is baked into the default
/// headers, so a new identity means a new actor.
#[derive(Debug)]
pub struct HttpCloudActor {
    base_url: String,
    client: Client,
}

/// Wire shape of a backend error body. Parsed leniently: anything that
/// does not carry a recognized `code` falls through to the status-only
/// mapping.
#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

#[derive(Deserialize)]
struct RoleBody {
    role: UserRole,
}

impl HttpCloudActor {
    pub fn new(base_url: &str, principal: &str) -> Result<Self, SyncError> {
        let bearer = HeaderValue::from_str(&format!("Bearer {principal}"))
            .map_err(|e| SyncError::Remote(format!("principal is not header-safe: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Remote(format!("failed to create HTTP client: {e}")))?;

        Ok(HttpCloudActor {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, CloudError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_err)?;
        decode(resp).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, CloudError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_err)?;
        decode(resp).await
    }

    async fn send_unit<B>(&self, method: Method, path: &str, body: &B) -> Result<(), CloudError>
    where
        B: serde::Serialize,
    {
        let resp = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_err)?;
        expect_success(resp).await
    }

    async fn delete_unit(&self, path: &str) -> Result<(), CloudError> {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(transport_err)?;
        expect_success(resp).await
    }
}

fn transport_err(e: reqwest::Error) -> CloudError {
    if e.is_connect() || e.is_timeout() {
        CloudError::NotReady(format!("backend unreachable: {e}"))
    } else {
        CloudError::Other(format!("request failed: {e}"))
    }
}

fn domain_from_code(code: &str) -> Option<DomainError> {
    match code {
        "duplicate-soundscape" => Some(DomainError::DuplicateSoundscape),
        "ritual-limit-exceeded" => Some(DomainError::RitualLimitExceeded),
        "ritual-not-found" => Some(DomainError::RitualNotFound),
        "journal-entry-not-found" => Some(DomainError::JournalEntryNotFound),
        _ => None,
    }
}

async fn error_from_response(resp: Response) -> CloudError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CloudError::Unauthorized(format!("backend returned {status}"))
        }
        StatusCode::SERVICE_UNAVAILABLE => CloudError::NotReady(format!("backend returned {status}")),
        StatusCode::CONFLICT | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            match serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| domain_from_code(&b.code))
            {
                Some(rule) => CloudError::Domain(rule),
                None => CloudError::Other(format!("backend returned {status}: {body}")),
            }
        }
        _ => CloudError::Other(format!("backend returned {status}: {body}")),
    }
}

async fn decode<T>(resp: Response) -> Result<T, CloudError>
where
    T: serde::de::DeserializeOwned,
{
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    resp.json()
        .await
        .map_err(|e| CloudError::Other(format!("malformed backend response: {e}")))
}

async fn expect_success(resp: Response) -> Result<(), CloudError> {
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(())
}

#[async_trait]
impl CloudActor for HttpCloudActor {
    async fn add_journal_entry(&self, draft: JournalDraft) -> Result<JournalEntry, CloudError> {
        self.send_json(Method::POST, "/journal", &draft).await
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, CloudError> {
        self.get_json("/journal").await
    }

    async fn update_journal_entry(&self, entry: JournalEntry) -> Result<(), CloudError> {
        self.send_unit(Method::PUT, &format!("/journal/{}", entry.id), &entry)
            .await
    }

    async fn delete_journal_entry(&self, id: u64) -> Result<(), CloudError> {
        self.delete_unit(&format!("/journal/{id}")).await
    }

    async fn record_session(&self, draft: SessionDraft) -> Result<SessionRecord, CloudError> {
        self.send_json(Method::POST, "/sessions", &draft).await
    }

    async fn progress(&self) -> Result<ProgressStats, CloudError> {
        self.get_json("/progress").await
    }

    async fn save_ritual(&self, draft: RitualDraft) -> Result<Ritual, CloudError> {
        self.send_json(Method::POST, "/rituals", &draft).await
    }

    async fn list_rituals(&self) -> Result<Vec<Ritual>, CloudError> {
        self.get_json("/rituals").await
    }

    async fn delete_ritual(&self, id: u64) -> Result<(), CloudError> {
        self.delete_unit(&format!("/rituals/{id}")).await
    }

    /// Backends answer `null` for an account that never saved a profile.
    async fn get_profile(&self) -> Result<Option<UserProfile>, CloudError> {
        self.get_json("/profile").await
    }

    async fn save_profile(&self, profile: UserProfile) -> Result<(), CloudError> {
        self.send_unit(Method::PUT, "/profile", &profile).await
    }

    async fn role(&self) -> Result<UserRole, CloudError> {
        let body: RoleBody = self.get_json("/role").await?;
        Ok(body.role)
    }

    async fn export_bundle(&self) -> Result<ExportBundle, CloudError> {
        let resp = self
            .client
            .get(self.url("/export"))
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let text = resp
            .text()
            .await
            .map_err(|e| CloudError::Other(format!("failed to read export body: {e}")))?;
        import_json(&text).map_err(|e| CloudError::Other(format!("backend sent an invalid bundle: {e}")))
    }

    async fn import_bundle(&self, bundle: ExportBundle) -> Result<ImportSummary, CloudError> {
        let json = export_json(&bundle)
            .map_err(|e| CloudError::Other(format!("bundle encode failed: {e}")))?;
        let resp = self
            .client
            .post(self.url("/import"))
            .header(CONTENT_TYPE, "application/json")
            .body(json)
            .send()
            .await
            .map_err(transport_err)?;
        decode(resp).await
    }
}
