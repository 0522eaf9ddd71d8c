//! Audio/video multiplexing via an external ffmpeg binary.
//!
//! The merge resolves the audio key to a temporary URL, downloads both
//! streams into scratch space, and remuxes them: video copied untouched,
//! audio re-encoded, output truncated to the shorter stream.
//!
//! `TranscodeError` keeps the failure causes distinguishable because the
//! orchestrator treats merge-scoped failures as recoverable (it continues
//! with the silent video) while a storage-gateway failure stays fatal.

use async_trait::async_trait;
use reelforge_storage::{Storage, StorageError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;

use crate::fetch::{self, FetchError};
use crate::video::SilentVideo;

const AUDIO_URL_EXPIRY: Duration = Duration::from_secs(3_600);

/// How much of ffmpeg's stderr to keep in error messages.
const STDERR_TAIL_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to fetch video: {0}")]
    VideoFetch(String),

    #[error("failed to fetch audio: {0}")]
    AudioFetch(String),

    #[error("media tool invocation failed: {0}")]
    Tool(String),

    #[error("media tool produced an empty output file")]
    EmptyOutput,

    #[error("scratch IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage gateway itself failed (resolving the audio key). Unlike
    /// the other variants this is not merge-scoped and callers must not
    /// degrade past it.
    #[error("storage gateway error: {0}")]
    Storage(#[from] StorageError),
}

impl TranscodeError {
    /// Whether a caller may continue with the unmerged silent video.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TranscodeError::Storage(_))
    }
}

/// Capability: merge a persisted narration track into a silent video.
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Returns the merged video bytes.
    async fn merge_audio_into_video(
        &self,
        video: &SilentVideo,
        audio_key: &str,
    ) -> Result<Vec<u8>, TranscodeError>;
}

/// Transcoder backed by an ffmpeg subprocess.
pub struct FfmpegTranscoder {
    storage: Arc<dyn Storage>,
    http_client: reqwest::Client,
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(storage: Arc<dyn Storage>, ffmpeg_path: String) -> Self {
        Self {
            storage,
            http_client: reqwest::Client::new(),
            ffmpeg_path,
        }
    }

    async fn fetch_video(&self, video: &SilentVideo, dest: &Path) -> Result<(), TranscodeError> {
        if fetch::is_remote(&video.url) {
            let bytes = fetch::fetch_bytes(&self.http_client, &video.url)
                .await
                .map_err(|e| TranscodeError::VideoFetch(fetch_error_message(e)))?;
            tokio::fs::write(dest, bytes).await?;
        } else {
            // A local path from an on-disk synthesis step; stage a copy so
            // ffmpeg always reads from scratch space.
            tokio::fs::copy(&video.url, dest)
                .await
                .map_err(|e| TranscodeError::VideoFetch(e.to_string()))?;
        }
        Ok(())
    }
}

fn fetch_error_message(err: FetchError) -> String {
    match err {
        FetchError::Http(e) => e.to_string(),
        FetchError::Status(status) => format!("unexpected status {}", status),
    }
}

/// Build the ffmpeg argument list for the merge: copy the video stream,
/// encode the audio stream to AAC, stop at the shorter of the two.
fn ffmpeg_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-shortest".to_string(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self, video), fields(audio_key = %audio_key))]
    async fn merge_audio_into_video(
        &self,
        video: &SilentVideo,
        audio_key: &str,
    ) -> Result<Vec<u8>, TranscodeError> {
        let audio_url = self
            .storage
            .get_presigned_url(audio_key, AUDIO_URL_EXPIRY)
            .await?;

        let scratch = TempDir::new()?;
        let video_path = scratch.path().join("input.mp4");
        let audio_path = scratch.path().join("audio.mp3");
        let output_path = scratch.path().join("output.mp4");

        self.fetch_video(video, &video_path).await?;

        let audio_bytes = fetch::fetch_bytes(&self.http_client, &audio_url)
            .await
            .map_err(|e| TranscodeError::AudioFetch(fetch_error_message(e)))?;
        tokio::fs::write(&audio_path, audio_bytes).await?;

        let args = ffmpeg_args(&video_path, &audio_path, &output_path);
        tracing::debug!(ffmpeg = %self.ffmpeg_path, ?args, "Running audio merge");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| TranscodeError::Tool(format!("failed to run {}: {}", self.ffmpeg_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut tail_start = stderr.len().saturating_sub(STDERR_TAIL_CHARS);
            while !stderr.is_char_boundary(tail_start) {
                tail_start += 1;
            }
            return Err(TranscodeError::Tool(format!(
                "exit status {}: {}",
                output.status,
                &stderr[tail_start..]
            )));
        }

        let merged = tokio::fs::read(&output_path)
            .await
            .map_err(|_| TranscodeError::EmptyOutput)?;
        if merged.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }

        tracing::info!(size_bytes = merged.len() as u64, "Audio merged into video");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelforge_storage::MemoryStorage;
    use std::path::PathBuf;

    #[test]
    fn test_ffmpeg_args_copy_video_encode_audio_shortest() {
        let args = ffmpeg_args(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/a.mp3"),
            &PathBuf::from("/tmp/out.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-c:v copy"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-map 0:v"));
        assert!(joined.contains("-map 1:a"));
        assert!(joined.contains("-shortest"));
        assert!(joined.ends_with("/tmp/out.mp4"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(TranscodeError::EmptyOutput.is_recoverable());
        assert!(TranscodeError::Tool("exit 1".to_string()).is_recoverable());
        assert!(TranscodeError::AudioFetch("404".to_string()).is_recoverable());
        assert!(
            !TranscodeError::Storage(StorageError::BackendError("down".to_string()))
                .is_recoverable()
        );
    }

    #[tokio::test]
    async fn test_missing_audio_key_surfaces_storage_error() {
        let storage = Arc::new(MemoryStorage::default());
        let transcoder = FfmpegTranscoder::new(storage, "ffmpeg".to_string());
        let video = SilentVideo {
            url: "https://cdn.example/silent.mp4".to_string(),
        };

        let err = transcoder
            .merge_audio_into_video(&video, "audio/missing.mp3")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::Storage(StorageError::NotFound(_))
        ));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_unfetchable_video_is_a_video_fetch_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::default());
        storage
            .upload("audio/a.mp3", "audio/mpeg", vec![1, 2, 3])
            .await
            .unwrap();

        let transcoder = FfmpegTranscoder::new(storage, "ffmpeg".to_string());
        let video = SilentVideo {
            url: format!("{}/silent.mp4", server.uri()),
        };

        let err = transcoder
            .merge_audio_into_video(&video, "audio/a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::VideoFetch(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_local_video_path_is_a_video_fetch_error() {
        let storage = Arc::new(MemoryStorage::default());
        storage
            .upload("audio/a.mp3", "audio/mpeg", vec![1, 2, 3])
            .await
            .unwrap();

        let transcoder = FfmpegTranscoder::new(storage, "ffmpeg".to_string());
        let video = SilentVideo {
            url: "/definitely/not/here.mp4".to_string(),
        };

        let err = transcoder
            .merge_audio_into_video(&video, "audio/a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::VideoFetch(_)));
    }
}
