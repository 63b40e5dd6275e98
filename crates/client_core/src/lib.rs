//! Async REST client for the pet map backend: report listings, multipart
//! report submission, candidate-match lookups, and photo downloads.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use shared::{
    domain::{Coordinate, FoundReport, FoundReportId, LostReport, LostReportId, PetCategory},
    error::{ApiError, ApiException},
    protocol::{multipart, ApiEnvelope},
};
use tracing::debug;
use url::Url;

pub mod config;
pub use config::ClientConfig;

/// Hard cap on photos attached to a lost-pet report; enforced here as well
/// as in the form so an over-cap draft never reaches the wire.
pub const MAX_LOST_REPORT_PHOTOS: usize = 5;

/// Draft of a lost-pet report as collected by the creation form.
#[derive(Debug, Clone)]
pub struct NewLostReport {
    pub name: String,
    pub category: PetCategory,
    pub contact: String,
    pub location: String,
    pub loss_date: NaiveDate,
    pub description: String,
    pub coordinate: Coordinate,
    pub photos: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct NewFoundReport {
    pub category: PetCategory,
    pub location: String,
    pub found_date: NaiveDate,
    pub contact: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub photo: PathBuf,
}

/// Conversion draft; the category is inherited from the lost report
/// server-side, so it is not part of the payload.
#[derive(Debug, Clone)]
pub struct NewFoundFromLost {
    pub location: String,
    pub found_date: NaiveDate,
    pub contact: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub photo: PathBuf,
}

pub struct PetMapClient {
    http: Client,
    base_url: Url,
}

impl PetMapClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: config.parsed_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_lost_reports(&self) -> Result<Vec<LostReport>> {
        let res = self.http.get(self.endpoint(&["pets"])?).send().await?;
        let envelope: ApiEnvelope<Vec<LostReport>> = expect_success(res).await?.json().await?;
        debug!(count = envelope.data.len(), "listed lost reports");
        Ok(envelope.data)
    }

    pub async fn get_lost_report(&self, id: &LostReportId) -> Result<LostReport> {
        let res = self
            .http
            .get(self.endpoint(&["pets", &id.0])?)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }

    pub async fn list_found_reports(&self) -> Result<Vec<FoundReport>> {
        let res = self.http.get(self.endpoint(&["found-pets"])?).send().await?;
        let envelope: ApiEnvelope<Vec<FoundReport>> = expect_success(res).await?.json().await?;
        debug!(count = envelope.data.len(), "listed found reports");
        Ok(envelope.data)
    }

    pub async fn get_found_report(&self, id: &FoundReportId) -> Result<FoundReport> {
        let res = self
            .http
            .get(self.endpoint(&["found-pets", &id.0])?)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }

    /// Both report listings, fetched concurrently. Either both succeed or
    /// the whole call errors; callers keep their previous data on failure.
    pub async fn fetch_reports(&self) -> Result<(Vec<LostReport>, Vec<FoundReport>)> {
        tokio::try_join!(self.list_lost_reports(), self.list_found_reports())
    }

    /// Per-id candidate-match lookups, joined; the first failure aborts the
    /// whole batch. Results come back in the order the ids were given.
    pub async fn fetch_matches(&self, ids: &[FoundReportId]) -> Result<Vec<FoundReport>> {
        futures::future::try_join_all(ids.iter().map(|id| self.get_found_report(id))).await
    }

    pub async fn create_lost_report(&self, draft: &NewLostReport) -> Result<LostReport> {
        if draft.photos.len() > MAX_LOST_REPORT_PHOTOS {
            bail!(
                "a lost report can carry at most {MAX_LOST_REPORT_PHOTOS} photos, got {}",
                draft.photos.len()
            );
        }

        let mut form = Form::new()
            .text(multipart::NAME, draft.name.clone())
            .text(multipart::CATEGORY, draft.category.wire_name())
            .text(multipart::CONTACT, draft.contact.clone())
            .text(multipart::LOSS_LOCATION, draft.location.clone())
            .text(multipart::LOSS_DATE, format_date(draft.loss_date))
            .text(multipart::DESCRIPTION, draft.description.clone())
            .text(multipart::COORDINATE, coordinate_json(draft.coordinate)?);
        for photo in &draft.photos {
            form = form.part(multipart::LOST_PHOTOS, photo_part(photo).await?);
        }

        let res = self
            .http
            .post(self.endpoint(&["pets"])?)
            .multipart(form)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }

    pub async fn create_found_report(&self, draft: &NewFoundReport) -> Result<FoundReport> {
        let form = Form::new()
            .text(multipart::CATEGORY, draft.category.wire_name())
            .text(multipart::FOUND_LOCATION, draft.location.clone())
            .text(multipart::FOUND_DATE, format_date(draft.found_date))
            .text(multipart::CONTACT, draft.contact.clone())
            .text(multipart::DESCRIPTION, draft.description.clone())
            .text(multipart::COORDINATE, coordinate_json(draft.coordinate)?)
            .part(multipart::FOUND_PHOTO, photo_part(&draft.photo).await?);

        let res = self
            .http
            .post(self.endpoint(&["found-pets"])?)
            .multipart(form)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }

    pub async fn create_found_from_lost(
        &self,
        lost_id: &LostReportId,
        draft: &NewFoundFromLost,
    ) -> Result<FoundReport> {
        let form = Form::new()
            .text(multipart::FOUND_LOCATION, draft.location.clone())
            .text(multipart::FOUND_DATE, format_date(draft.found_date))
            .text(multipart::CONTACT, draft.contact.clone())
            .text(multipart::DESCRIPTION, draft.description.clone())
            .text(multipart::COORDINATE, coordinate_json(draft.coordinate)?)
            .part(multipart::FOUND_PHOTO, photo_part(&draft.photo).await?);

        let res = self
            .http
            .post(self.endpoint(&["found-pets", "from-lost", &lost_id.0])?)
            .multipart(form)
            .send()
            .await?;
        Ok(expect_success(res).await?.json().await?)
    }

    /// Absolute URL for a photo path relative to the backend static root.
    pub fn photo_url(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL cannot be a base"))?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    pub async fn download_photo(&self, path: &str) -> Result<Vec<u8>> {
        let res = self.http.get(self.photo_url(path)?).send().await?;
        Ok(expect_success(res).await?.bytes().await?.to_vec())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn coordinate_json(coordinate: Coordinate) -> Result<String> {
    serde_json::to_string(&coordinate).context("failed to encode coordinate")
}

async fn photo_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read photo {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo")
        .to_string();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Part::bytes(bytes)
        .file_name(filename)
        .mime_str(mime.essence_str())
        .context("invalid photo content type")
}

/// Maps non-2xx responses to errors, preferring the backend's typed error
/// envelope when the body carries one.
async fn expect_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
        return Err(ApiException::from(api_error).into());
    }
    bail!("request failed with status {status}: {body}")
}

#[cfg(test)]
mod tests;
