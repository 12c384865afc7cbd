/// Client for the exercise analysis service
///
/// The service receives a video URL and answers with the detected exercise
/// segments, either as a bare JSON array or wrapped in an `exercises` field.
use crate::config::AnalysisConfig;
use crate::segment::Segment;
use crate::video_id::validate_submission;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Anything that can produce the segment list for a video
#[async_trait]
pub trait SegmentSource: Send + Sync {
    async fn fetch_segments(&self, video_url: &str) -> Result<Vec<Segment>>;
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnalysisResponse {
    Bare(Vec<Segment>),
    Wrapped { exercises: Vec<Segment> },
}

/// Decode a response body from the analysis service
pub fn parse_analysis_response(body: &str) -> Result<Vec<Segment>> {
    let response: AnalysisResponse =
        serde_json::from_str(body).context("Unrecognized analysis response")?;
    Ok(match response {
        AnalysisResponse::Bare(segments) => segments,
        AnalysisResponse::Wrapped { exercises } => exercises,
    })
}

/// HTTP implementation of `SegmentSource`
pub struct AnalysisClient {
    endpoint: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow!("Analysis endpoint not configured"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SegmentSource for AnalysisClient {
    async fn fetch_segments(&self, video_url: &str) -> Result<Vec<Segment>> {
        validate_submission(video_url)?;

        debug!("Sending analysis request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalysisRequest { url: video_url })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Analysis service error {}: {}", status, text));
        }

        let body = response.text().await?;
        let segments = parse_analysis_response(&body)?;
        info!("📋 Analysis returned {} segments", segments.len());
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::PlaybackWindow;

    #[test]
    fn test_parse_bare_array() {
        let body = r#"[
            {"name_of_exercise": "Squat", "description": "Slow tempo", "timestamp": "00:00:05-00:00:15"},
            {"name_of_exercise": "Burpee", "description": "", "timestamp": "00:00:20-00:00:50"}
        ]"#;
        let segments = parse_analysis_response(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].window(), PlaybackWindow::new(20, 50));
    }

    #[test]
    fn test_parse_wrapped_object() {
        let body = r#"{"exercises": [{"name_of_exercise": "Plank", "description": "Hold", "timestamp": "00:01:00-00:02:00"}]}"#;
        let segments = parse_analysis_response(body).unwrap();
        assert_eq!(segments[0].name, "Plank");
    }

    #[test]
    fn test_parse_rejects_unknown_shape() {
        assert!(parse_analysis_response(r#"{"status": "queued"}"#).is_err());
        assert!(parse_analysis_response("not json").is_err());
    }

    #[test]
    fn test_client_requires_endpoint() {
        assert!(AnalysisClient::new(&AnalysisConfig::default()).is_err());

        let config = AnalysisConfig {
            endpoint: Some("http://localhost:8000/analyze".to_string()),
            timeout_seconds: 5,
        };
        let client = AnalysisClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/analyze");
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url_before_request() {
        let config = AnalysisConfig {
            endpoint: Some("http://127.0.0.1:9/analyze".to_string()),
            timeout_seconds: 1,
        };
        let client = AnalysisClient::new(&config).unwrap();
        let err = client.fetch_segments("https://vimeo.com/1").await.unwrap_err();
        assert!(err.to_string().contains("valid YouTube URL"));
    }
}
