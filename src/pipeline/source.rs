use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::AuroraError;

const HTTP_TIMEOUT_S: u64 = 30;
const FRAME_FILE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const FRAME_FILE_EXTENSION: &str = "jpg";

/// One entry of a remote animation index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    pub url: String,
    pub time_tag: String,
}

/// Where frames come from. The HTTP implementation talks to the forecast
/// service; tests script their own.
pub trait FrameSource {
    fn fetch_index(&mut self, url: &str) -> Result<Vec<IndexEntry>, AuroraError>;
    fn fetch_image(&mut self, url: &str) -> Result<Vec<u8>, AuroraError>;
}

pub struct HttpFrameSource {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpFrameSource {
    pub fn new() -> Result<Self, AuroraError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AuroraError::RuntimeError { source: e })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_S))
            .build()
            .map_err(|e| AuroraError::HttpClientError { source: e })?;
        Ok(Self { client, runtime })
    }
}

impl FrameSource for HttpFrameSource {
    fn fetch_index(&mut self, url: &str) -> Result<Vec<IndexEntry>, AuroraError> {
        let client = &self.client;
        self.runtime
            .block_on(async {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<Vec<IndexEntry>>()
                    .await
            })
            .map_err(|e| AuroraError::IndexFetchError {
                url: url.to_string(),
                source: e,
            })
    }

    fn fetch_image(&mut self, url: &str) -> Result<Vec<u8>, AuroraError> {
        let client = &self.client;
        self.runtime
            .block_on(async {
                let bytes = client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                Ok::<_, reqwest::Error>(bytes.to_vec())
            })
            .map_err(|e| AuroraError::ImageFetchError {
                url: url.to_string(),
                source: e,
            })
    }
}

/// Index entries carry service-relative paths; absolute URLs pass through.
pub fn resolve_image_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

/// Parses a time tag such as `2024-05-10T12:05:00Z`. Tags without an offset
/// are taken as UTC.
pub fn parse_time_tag(time_tag: &str) -> Result<DateTime<Utc>, AuroraError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(time_tag) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(time_tag, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| AuroraError::InvalidTimeTag {
            time_tag: time_tag.to_string(),
            source: e,
        })
}

/// Local file name for a frame, sortable by forecast time.
pub fn frame_file_name(time_tag: &str) -> Result<String, AuroraError> {
    let timestamp = parse_time_tag(time_tag)?;
    Ok(format!(
        "{}.{}",
        timestamp.format(FRAME_FILE_FORMAT),
        FRAME_FILE_EXTENSION
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_file_name_from_utc_tag() {
        assert_eq!(
            frame_file_name("2024-05-01T12:30:00Z").unwrap(),
            "2024-05-01_12-30-00.jpg"
        );
    }

    #[test]
    fn test_frame_file_name_normalizes_offsets() {
        assert_eq!(
            frame_file_name("2024-05-01T14:30:00+02:00").unwrap(),
            "2024-05-01_12-30-00.jpg"
        );
        assert_eq!(
            frame_file_name("2024-05-01T12:30:00").unwrap(),
            "2024-05-01_12-30-00.jpg"
        );
    }

    #[test]
    fn test_invalid_time_tag() {
        match frame_file_name("yesterday") {
            Err(AuroraError::InvalidTimeTag { time_tag, .. }) => assert_eq!(time_tag, "yesterday"),
            other => panic!("Expected InvalidTimeTag, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url(
                "https://services.swpc.noaa.gov/",
                "/images/animations/ovation/north/a.jpg"
            ),
            "https://services.swpc.noaa.gov/images/animations/ovation/north/a.jpg"
        );
        assert_eq!(
            resolve_image_url("https://services.swpc.noaa.gov", "https://cdn.example/a.jpg"),
            "https://cdn.example/a.jpg"
        );
    }

    #[test]
    fn test_index_entry_deserialization() {
        let entries: Vec<IndexEntry> = serde_json::from_str(
            r#"[{"url": "/images/a.jpg", "time_tag": "2024-05-01T12:30:00Z"},
                {"url": "/images/b.jpg", "time_tag": "2024-05-01T12:35:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].url, "/images/b.jpg");
    }
}
