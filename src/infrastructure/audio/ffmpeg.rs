use super::{AudioCompositor, AudioMetadata, ComposedAudio, CompositorError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

/// Encoder for an output suffix
pub fn codec_for(audio_suffix: &str) -> Result<&'static str, CompositorError> {
    match audio_suffix {
        ".mp3" => Ok("libmp3lame"),
        ".ogg" => Ok("libvorbis"),
        ".opus" => Ok("libopus"),
        other => Err(CompositorError::Unsupported(other.to_string())),
    }
}

/// Input list for the ffmpeg concat demuxer
pub fn concat_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|path| {
            let quoted = path.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", quoted)
        })
        .collect()
}

/// Running start offsets for a sequence of durations
pub fn boundaries(durations: &[f64]) -> Vec<f64> {
    durations
        .iter()
        .scan(0.0, |start, duration| {
            let boundary = *start;
            *start += duration;
            Some(boundary)
        })
        .collect()
}

/// `ffmpeg` concat demuxer with durations probed by `ffprobe`
pub struct FfmpegCompositor {
    ffmpeg_path: String,
    ffprobe_path: String,
    work_dir: PathBuf,
}

impl FfmpegCompositor {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            work_dir: work_dir.into(),
        }
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CompositorError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompositorError::Process {
                tool: program.to_string(),
                message: stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, CompositorError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let stdout = self.run(&self.ffprobe_path, &args).await?;
        let text = String::from_utf8_lossy(&stdout);
        text.trim()
            .parse::<f64>()
            .map_err(|e| CompositorError::Process {
                tool: self.ffprobe_path.clone(),
                message: format!("{}: duration {:?}: {}", path.display(), text.trim(), e),
            })
    }

    fn concat_args(
        list_path: &Path,
        output_path: &Path,
        codec: &str,
        metadata: &AudioMetadata,
    ) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y", "-hide_banner", "-f", "concat", "-safe", "0", "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(list_path.to_string_lossy().to_string());
        args.push("-c:a".to_string());
        args.push(codec.to_string());
        for (key, value) in metadata.tags() {
            args.push("-metadata".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(output_path.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl AudioCompositor for FfmpegCompositor {
    async fn concat(
        &self,
        inputs: &[PathBuf],
        metadata: &AudioMetadata,
        audio_suffix: &str,
    ) -> Result<ComposedAudio, CompositorError> {
        if inputs.is_empty() {
            return Err(CompositorError::Empty);
        }
        let codec = codec_for(audio_suffix)?;
        let start_time = std::time::Instant::now();

        let mut durations = Vec::with_capacity(inputs.len());
        for input in inputs {
            durations.push(self.probe_duration(input).await?);
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let stem = Uuid::new_v4();
        let list_path = self.work_dir.join(format!("{}.txt", stem));
        let output_path = self.work_dir.join(format!("{}{}", stem, audio_suffix));
        tokio::fs::write(&list_path, concat_list(inputs)).await?;

        let args = Self::concat_args(&list_path, &output_path, codec, metadata);
        let result = self.run(&self.ffmpeg_path, &args).await;
        let bytes = match result {
            Ok(_) => tokio::fs::read(&output_path).await.map_err(CompositorError::from),
            Err(e) => Err(e),
        };

        let _ = tokio::fs::remove_file(&list_path).await;
        let _ = tokio::fs::remove_file(&output_path).await;
        let bytes = bytes?;

        let duration_seconds: f64 = durations.iter().sum();
        tracing::info!(
            inputs = inputs.len(),
            codec,
            duration_seconds,
            size = bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio composed"
        );

        Ok(ComposedAudio {
            bytes,
            duration_seconds,
            track_boundaries: boundaries(&durations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codec_for_suffix() {
        assert_eq!(codec_for(".mp3").unwrap(), "libmp3lame");
        assert_eq!(codec_for(".ogg").unwrap(), "libvorbis");
        assert_eq!(codec_for(".opus").unwrap(), "libopus");
        assert!(matches!(codec_for(".wav"), Err(CompositorError::Unsupported(_))));
    }

    #[test]
    fn test_concat_list_quotes_paths() {
        let list = concat_list(&[
            PathBuf::from("/sounds/common/ab/ab12.mp3"),
            PathBuf::from("/sounds/it's/cd34.mp3"),
        ]);
        assert_eq!(
            list,
            "file '/sounds/common/ab/ab12.mp3'\nfile '/sounds/it'\\''s/cd34.mp3'\n"
        );
    }

    #[test]
    fn test_boundaries_are_running_offsets() {
        assert_eq!(boundaries(&[1.5, 2.0, 0.5]), vec![0.0, 1.5, 3.5]);
        assert!(boundaries(&[]).is_empty());
    }

    #[test]
    fn test_concat_args_include_metadata() {
        let metadata = AudioMetadata {
            title: "thig1.1".to_string(),
            publisher: "voice.suttacentral.net".to_string(),
            ..Default::default()
        };
        let args = FfmpegCompositor::concat_args(
            Path::new("/tmp/list.txt"),
            Path::new("/tmp/out.ogg"),
            "libvorbis",
            &metadata,
        );
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-f", "concat", "-safe", "0", "-i", "/tmp/list.txt",
                "-c:a", "libvorbis", "-metadata", "title=thig1.1", "-metadata",
                "publisher=voice.suttacentral.net", "/tmp/out.ogg",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let compositor = FfmpegCompositor::new("ffmpeg", "ffprobe", std::env::temp_dir());
        let result = compositor
            .concat(&[], &AudioMetadata::default(), ".mp3")
            .await;
        assert!(matches!(result, Err(CompositorError::Empty)));
    }
}
