//! HTTP implementation of the analytics backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::raw::{
    CdevResult, CensusFacultyDrop, Envelope, EquityResult, GenderResult, YoyFacultyCounts,
};
use super::{AnalyticsBackend, BackendError, BackendResult, UploadFile};
use crate::api::Term;
use crate::models::AnalysisMode;

/// Reqwest-backed client for the analytics service.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAnalyticsClient {
    /// Create a client against the given base URL, e.g.
    /// `http://localhost:8088`. A trailing slash is stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn get_result<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> BackendResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching analytics dataset");
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.bytes().await?;
        decode_envelope(&body)
    }

    async fn post_form(&self, path: &str, form: Form) -> BackendResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Unwrap the `{code, message, result}` envelope every read endpoint
/// returns. Malformed bodies surface as a decode error rather than a
/// transport one.
fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> BackendResult<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(envelope.result)
}

#[async_trait]
impl AnalyticsBackend for HttpAnalyticsClient {
    async fn participation_gender(&self) -> BackendResult<GenderResult> {
        self.get_result("/par_gender_agg", &[]).await
    }

    async fn equity_cohort(&self) -> BackendResult<EquityResult> {
        self.get_result("/equity_cohort_agg", &[]).await
    }

    async fn cdev(&self) -> BackendResult<CdevResult> {
        self.get_result("/cdev_agg", &[]).await
    }

    async fn yoy_comparison(&self) -> BackendResult<Vec<YoyFacultyCounts>> {
        self.get_result("/yoy_comparison", &[]).await
    }

    async fn census_gender_drop(&self, term: &Term) -> BackendResult<Vec<CensusFacultyDrop>> {
        self.get_result("/census_gender_drop", &[("term", term.as_str())])
            .await
    }

    async fn upload_batch(&self, mode: AnalysisMode, files: &[UploadFile]) -> BackendResult<()> {
        let mut form = Form::new().text("analysis_mode", mode.as_str());
        for file in files {
            let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            form = form.part("files", part);
        }
        self.post_form("/batch_upload", form).await
    }

    async fn send_report(&self, filename: &str, pdf: Vec<u8>, email: &str) -> BackendResult<()> {
        let part = Part::bytes(pdf)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("file_path", part)
            .text("email", email.to_string());
        self.post_form("/send_email", form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = HttpAnalyticsClient::new("http://localhost:8088/");
        assert_eq!(client.base_url, "http://localhost:8088");
    }

    #[test]
    fn envelope_decodes_family_payload() {
        let body = r#"{
            "code": 200,
            "message": "Success",
            "result": {
                "gender proportion in WIL": [
                    {
                        "faculty_descr": "Faculty of Engineering",
                        "gender_counts": {"F": 30, "M": 60, "U": 10},
                        "total_count": 100
                    }
                ]
            }
        }"#;
        let result: GenderResult = decode_envelope(body.as_bytes()).unwrap();
        let faculty = &result.by_faculty[0];
        assert_eq!(faculty.faculty_descr, "Faculty of Engineering");
        assert_eq!(faculty.gender_counts.get("F"), Some(&30));
        assert_eq!(faculty.total_count, 100);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let result = decode_envelope::<GenderResult>(b"<html>bad gateway</html>");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}
