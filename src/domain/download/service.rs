use super::args::{DownloadArgs, DownloadDefaults, DownloadRequest};
use super::error::DownloadError;
use super::registry::TaskRegistry;
use super::task::{BuildTask, DownloadInfo, TaskSnapshot};
use crate::domain::document::DocumentQuery;
use crate::domain::playlist::{Playlist, PlaylistAssembler, PlaylistStats};
use crate::domain::synthesis::{content_hash, Signature, SpeakSegment, Voice, COMMON_VOLUME};
use crate::domain::voice::VoiceResolver;
use crate::infrastructure::audio::{AudioCompositor, AudioMetadata};
use crate::infrastructure::repositories::{ContentCache, DocumentRepository};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Silence between consecutive tracks
pub const TRACK_BREAK_SECS: f32 = 1.0;

const COMPOSER_API: &str = "ffmpeg-concat";
const COPYRIGHT: &str = "https://suttacentral.net/licensing";
const PUBLISHER: &str = "voice.suttacentral.net";

/// Response of a build request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub args: DownloadArgs,
    pub task: TaskSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlaylistStats>,
}

/// Composed audio ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct PlaylistDownload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
}

pub struct DownloadService {
    resolver: Arc<VoiceResolver>,
    documents: Arc<dyn DocumentRepository>,
    assembler: PlaylistAssembler,
    cache: Arc<ContentCache>,
    compositor: Arc<dyn AudioCompositor>,
    registry: Arc<TaskRegistry>,
    defaults: DownloadDefaults,
}

impl DownloadService {
    pub fn new(
        resolver: Arc<VoiceResolver>,
        documents: Arc<dyn DocumentRepository>,
        assembler: PlaylistAssembler,
        cache: Arc<ContentCache>,
        compositor: Arc<dyn AudioCompositor>,
        registry: Arc<TaskRegistry>,
        defaults: DownloadDefaults,
    ) -> Self {
        Self {
            resolver,
            documents,
            assembler,
            cache,
            compositor,
            registry,
            defaults,
        }
    }

    pub fn download_args(&self, request: &DownloadRequest) -> Result<DownloadArgs, DownloadError> {
        DownloadArgs::from_request(request, self.defaults)
    }

    /// Start (or join) the build for a request and return immediately
    pub async fn start_build(
        self: &Arc<Self>,
        request: &DownloadRequest,
    ) -> Result<BuildStatus, DownloadError> {
        let args = self.download_args(request)?;
        let task = self.build_task(&args).await;
        Ok(Self::status(args, &task))
    }

    /// The registered task for `args`, started when none can be reused
    async fn build_task(self: &Arc<Self>, args: &DownloadArgs) -> Arc<BuildTask> {
        let name = format!("Create {} audio download for:{}", args.audio_suffix, args.pattern);
        let service = Arc::clone(self);
        let build_args = args.clone();
        self.registry
            .get_or_start(&args.hash, &name, move |task| async move {
                service
                    .build_download(&build_args, &task)
                    .await
                    .inspect_err(|e| {
                        task.fail(
                            e.to_string(),
                            format!("Cannot build audio download:{}", build_args.pattern),
                        );
                    })
            })
            .await
    }

    pub fn task_status(&self, hash: &str) -> Result<TaskSnapshot, DownloadError> {
        self.registry
            .poll(hash)
            .ok_or_else(|| DownloadError::NotFound(format!("no build task for {}", hash)))
    }

    /// Composed audio for a request. Joins the registered build for the
    /// request, starting one when needed, and waits for it to finish.
    pub async fn download_playlist(
        self: &Arc<Self>,
        request: &DownloadRequest,
    ) -> Result<PlaylistDownload, DownloadError> {
        let args = self.download_args(request)?;
        let download = self
            .build_task(&args)
            .await
            .outcome()
            .await
            .map_err(DownloadError::Build)?;

        tracing::info!(
            fingerprint = %args.hash,
            guid = %download.guid,
            filename = %download.filename,
            "Sending audio download"
        );
        Ok(PlaylistDownload {
            bytes: self.cache.read(&download.filepath).await?,
            filename: download.filename,
            mime_type: args.audio_suffix.mime_type(),
        })
    }

    /// Resolve documents, speak every segment language and compose the result.
    ///
    /// Progress: two fixed actions (playlist and composition) plus one per
    /// spoken segment language and one per track break.
    pub async fn build_download(
        &self,
        args: &DownloadArgs,
        task: &BuildTask,
    ) -> Result<DownloadInfo, DownloadError> {
        task.add_actions(2);
        let query = DocumentQuery {
            pattern: args.pattern.clone(),
            lang: args.lang.clone(),
            max_results: args.max_results,
        };
        let documents = self.documents.resolve(&query).await?;
        let playlist = self
            .assembler
            .assemble(&documents, &args.langs, args.max_duration);
        let stats = playlist.stats();
        task.action_done();

        let voice_trans = self.resolver.voice_of_name(&args.vtrans)?;
        let voice_root = self.resolver.voice_of_name(&args.vroot)?;
        let build_date = Utc::now();
        let metadata = Self::metadata(args, &playlist, &voice_trans, &voice_root, build_date);

        let inputs = self
            .speak_playlist(&playlist, &voice_trans, &voice_root, task)
            .await?;

        let signature = self.download_signature(args, &inputs, &metadata, &voice_trans);
        let input_paths: Vec<PathBuf> = inputs.into_iter().map(|(path, _)| path).collect();
        let (filepath, cached) = self
            .cache
            .fetch_or_store(&signature, || async {
                let composed = self
                    .compositor
                    .concat(&input_paths, &metadata, args.audio_suffix.as_str())
                    .await?;
                tracing::debug!(
                    guid = %signature.guid,
                    duration_secs = composed.duration_seconds,
                    tracks = composed.track_boundaries.len(),
                    "Composed audio"
                );
                Ok::<_, DownloadError>(composed.bytes)
            })
            .await?;
        task.action_done();

        tracing::debug!(
            fingerprint = %args.hash,
            guid = %signature.guid,
            cached,
            actions_done = task.actions_done(),
            actions_total = task.actions_total(),
            "Build download done"
        );
        Ok(DownloadInfo {
            filepath,
            filename: args.filename(),
            guid: signature.guid,
            stats,
            build_date,
        })
    }

    /// Audio paths in playback order, each with the guid it was stored under
    async fn speak_playlist(
        &self,
        playlist: &Playlist,
        voice_trans: &Voice,
        voice_root: &Voice,
        task: &BuildTask,
    ) -> Result<Vec<(PathBuf, String)>, DownloadError> {
        let languages = playlist.languages();
        let spoken: usize = playlist
            .tracks()
            .iter()
            .flat_map(|track| &track.segments)
            .map(|segment| {
                languages
                    .iter()
                    .filter(|lang| segment.text_of(lang).is_some())
                    .count()
            })
            .sum();
        let breaks = playlist.tracks().len().saturating_sub(1);
        task.add_actions(spoken + breaks);

        let mut inputs = Vec::with_capacity(spoken + breaks);
        for (i, track) in playlist.tracks().iter().enumerate() {
            if i > 0 {
                let silence = voice_trans
                    .speak_break(TRACK_BREAK_SECS, COMMON_VOLUME, None)
                    .await?;
                inputs.push((silence.path, silence.signature.guid));
                task.action_done();
            }
            for segment in &track.segments {
                for lang in languages {
                    if segment.text_of(lang).is_none() {
                        continue;
                    }
                    let voice = if lang == "pli" { voice_root } else { voice_trans };
                    let spoken = voice
                        .speak_segment(&SpeakSegment {
                            sutta_uid: &track.sutta_uid,
                            segment,
                            language: lang,
                            translator: &track.author,
                            usage: None,
                        })
                        .await?;
                    inputs.push((spoken.path, spoken.signature.guid));
                    task.action_done();
                }
            }
        }
        Ok(inputs)
    }

    fn metadata(
        args: &DownloadArgs,
        playlist: &Playlist,
        voice_trans: &Voice,
        voice_root: &Voice,
        build_date: DateTime<Utc>,
    ) -> AudioMetadata {
        let voices = args.langs.iter().map(|lang| {
            if lang == "pli" {
                voice_root.name().to_string()
            } else {
                voice_trans.name().to_string()
            }
        });
        let artist = playlist
            .author_uids()
            .into_iter()
            .chain(voices)
            .collect::<Vec<_>>()
            .join(", ");

        AudioMetadata {
            title: args.pattern.clone(),
            album: format!("{} voice.suttacentral.net", build_date.format("%Y-%m")),
            album_artist: artist.clone(),
            artist,
            languages: args.langs.join(","),
            copyright: COPYRIGHT.to_string(),
            publisher: PUBLISHER.to_string(),
        }
    }

    /// Content address of the composed file: the ordered input guids plus
    /// everything written into the file besides them
    fn download_signature(
        &self,
        args: &DownloadArgs,
        inputs: &[(PathBuf, String)],
        metadata: &AudioMetadata,
        voice_trans: &Voice,
    ) -> Signature {
        let guids: Vec<&str> = inputs.iter().map(|(_, guid)| guid.as_str()).collect();
        let guid = content_hash(&json!({
            "api": COMPOSER_API,
            "audioSuffix": args.audio_suffix.as_str(),
            "guids": guids,
            "tags": metadata.tags(),
        }));
        Signature {
            guid,
            api: COMPOSER_API.to_string(),
            voice: voice_trans.name().to_string(),
            reader: None,
            volume: COMMON_VOLUME.to_string(),
            audio_suffix: args.audio_suffix.as_str().to_string(),
            text: args.pattern.clone(),
        }
    }

    fn status(args: DownloadArgs, task: &BuildTask) -> BuildStatus {
        let download = task.download();
        BuildStatus {
            args,
            task: task.snapshot(),
            filename: download.as_ref().map(|d| d.filename.clone()),
            guid: download.as_ref().map(|d| d.guid.clone()),
            stats: download.map(|d| d.stats),
        }
    }
}
