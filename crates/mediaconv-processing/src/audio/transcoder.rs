//! Audio transcoding through an ffmpeg child process

use crate::traits::{ConversionOutput, MediaConverter};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use mediaconv_core::AudioOptions;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::OwnedSemaphorePermit;

/// Maximum number of stderr bytes carried in an error.
const STDERR_TAIL_BYTES: usize = 2000;

pub struct AudioTranscoder {
    ffmpeg_path: String,
}

impl AudioTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// ffmpeg audio codec and muxer for an output format.
    pub fn codec_for(format: &str) -> Option<(&'static str, &'static str)> {
        match format {
            "mp3" => Some(("libmp3lame", "mp3")),
            "wav" => Some(("pcm_s16le", "wav")),
            "ogg" => Some(("libvorbis", "ogg")),
            "m4a" => Some(("aac", "ipod")),
            "aac" => Some(("aac", "adts")),
            "flac" => Some(("flac", "flac")),
            _ => None,
        }
    }

    /// Full argument list for one transcode. The output path is always the last argument.
    pub fn build_args(
        input: &Path,
        output: &Path,
        format: &str,
        options: &AudioOptions,
    ) -> Result<Vec<String>> {
        let (codec, muxer) = Self::codec_for(format)
            .ok_or_else(|| anyhow!("Unsupported audio output format: {}", format))?;

        let args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-b:a".to_string(),
            options.bitrate.clone(),
            "-ar".to_string(),
            options.sample_rate.to_string(),
            "-ac".to_string(),
            options.channels.to_string(),
            "-c:a".to_string(),
            codec.to_string(),
            "-f".to_string(),
            muxer.to_string(),
            output.to_string_lossy().to_string(),
        ];

        Ok(args)
    }
}

#[async_trait]
impl MediaConverter for AudioTranscoder {
    type Options = AudioOptions;

    #[tracing::instrument(skip_all, fields(input = %input.display(), format = %format))]
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: &str,
        options: AudioOptions,
        _permit: OwnedSemaphorePermit,
    ) -> Result<ConversionOutput> {
        let args = Self::build_args(input, output, format, &options)?;
        let start = Instant::now();

        tracing::debug!(
            ffmpeg = %self.ffmpeg_path,
            bitrate = %options.bitrate,
            sample_rate = options.sample_rate,
            channels = options.channels,
            "Starting ffmpeg transcode"
        );

        // Dropping the future (timeout) kills the child
        let output_result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(anyhow!(
                "FFmpeg transcode failed ({}): {}",
                output_result.status,
                stderr_tail(&stderr)
            ));
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg transcode finished"
        );

        Ok(ConversionOutput::default())
    }
}

fn stderr_tail(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed;
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}
