//! YouTube transcripts fetched with yt-dlp.

use super::{normalize_whitespace, SourceDocument, SourceKind, SourceResult, TextSource};
use crate::error::SourceError;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One timed caption from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

#[derive(Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a yt-dlp `json3` subtitle file into transcript entries.
///
/// Events without text (window and style events) are skipped.
pub fn parse_json3(content: &str) -> SourceResult<Vec<TranscriptEntry>> {
    let parsed: Json3 = serde_json::from_str(content)
        .map_err(|e| SourceError::ReadError(format!("Invalid json3 subtitles: {}", e)))?;

    Ok(parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = normalize_whitespace(&text);
            if text.is_empty() {
                return None;
            }
            Some(TranscriptEntry {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect())
}

/// YouTube transcript source.
pub struct YoutubeSource {
    video_id_regex: Regex,
}

impl YoutubeSource {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            ^(?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/)
                ([a-zA-Z0-9_-]{11})
                (?:[?&\#/].*)?
            |
                ([a-zA-Z0-9_-]{11})
            )$
        ",
        )
        .expect("Invalid regex");

        Self { video_id_regex }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Download English subtitles into `dir` and return the json3 file.
    async fn download_subtitles(&self, video_id: &str, dir: &Path) -> SourceResult<String> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = dir.join("%(id)s.%(ext)s");

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--skip-download",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                "en.*",
                "--sub-format",
                "json3",
                "--no-warnings",
                "-o",
            ])
            .arg(&template)
            .arg(&url)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SourceError::ReadError(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::NotFound(format!(
                "Video {} not found or unavailable: {}",
                video_id,
                stderr.trim()
            )));
        }

        let mut candidates: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| SourceError::ReadError(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json3"))
            .collect();
        // Shortest name first: plain `en` before `en-US`, `en-orig` and the like
        candidates.sort_by_key(|p| (p.as_os_str().len(), p.clone()));

        let path = candidates.into_iter().next().ok_or_else(|| {
            SourceError::NotFound(format!("No English transcript available for {}", video_id))
        })?;

        debug!("Reading subtitles from {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Fetch the timed transcript of a video.
    pub async fn fetch_transcript(&self, video_id: &str) -> SourceResult<Vec<TranscriptEntry>> {
        let dir = tempfile::tempdir()
            .map_err(|e| SourceError::ReadError(format!("Failed to create temp dir: {}", e)))?;
        let content = self.download_subtitles(video_id, dir.path()).await?;
        parse_json3(&content)
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSource for YoutubeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::YouTube
    }

    fn can_handle(&self, input: &str) -> bool {
        self.extract_video_id(input).is_some()
    }

    async fn load(&self, input: &str) -> SourceResult<SourceDocument> {
        let video_id = self.extract_video_id(input).ok_or_else(|| {
            SourceError::UnsupportedFormat(format!("Invalid YouTube video ID or URL: {}", input))
        })?;

        let entries = self.fetch_transcript(&video_id).await?;
        if entries.is_empty() {
            return Err(SourceError::NotFound(format!(
                "Transcript for {} is empty",
                video_id
            )));
        }

        let joined: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        let text = normalize_whitespace(&joined.join(" "));

        let doc = SourceDocument::new(
            video_id.clone(),
            format!("YouTube: {}", video_id),
            SourceKind::YouTube,
            text,
        );
        info!(
            "Fetched transcript for {}: {} captions, {} words",
            video_id,
            entries.len(),
            doc.word_count()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let source = YoutubeSource::new();

        assert_eq!(
            source.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(source.extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(source.extract_video_id("too-short"), None);
        assert_eq!(source.extract_video_id(""), None);
    }

    #[test]
    fn test_parse_json3() {
        let content = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 5000, "id": 1, "wWinId": 1},
                {"tStartMs": 120, "dDurationMs": 2500,
                 "segs": [{"utf8": "Welcome to"}, {"utf8": " the lecture"}]},
                {"tStartMs": 2620, "dDurationMs": 10, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 3000, "dDurationMs": 1500, "segs": [{"utf8": "on  vectors."}]}
            ]
        }"#;

        let entries = parse_json3(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Welcome to the lecture");
        assert_eq!(entries[0].start, 0.12);
        assert_eq!(entries[0].duration, 2.5);
        assert_eq!(entries[1].text, "on vectors.");
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        assert!(matches!(
            parse_json3("not json"),
            Err(SourceError::ReadError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_rejects_non_youtube() {
        let err = YoutubeSource::new()
            .load("https://example.com/video")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat(_)));
    }
}
