//! lotmedia CLI: queue, capture and upload vehicle media.
//!
//! Set LOTMEDIA_API_URL (or API_URL) and, when the backend requires it,
//! LOTMEDIA_API_TOKEN (or AUTH_TOKEN). Uses Bearer auth.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lotmedia_api_client::ApiClient;
use lotmedia_capture::{CaptureMode, CaptureSession, FileSourceDevices};
use lotmedia_cli::{format_bytes, format_record_row, init_tracing};
use lotmedia_core::{
    validate_selection, CaptureConfig, ClientConfig, ErrorMetadata, MediaCategory, MediaFile,
    MediaKind, SelectionPolicy, UploadUrlRequest,
};
use lotmedia_upload::{UploadEvent, UploadQueue, UploadSummary};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lotmedia", about = "Vehicle media capture and upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue local files for a car and upload them one by one
    Upload {
        /// Car the files belong to
        #[arg(long)]
        car_id: String,
        /// Category applied to every file: general, exterior, interior, engine, damage
        #[arg(long, default_value = "general")]
        category: MediaCategory,
        /// Files to upload (JPG, PNG, WEBP, GIF, MP4, WEBM, MOV)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Capture a photo or clip from file-backed sources
    Capture {
        #[arg(long, value_enum, default_value = "both")]
        mode: ModeArg,
        /// Image served as the camera frame
        #[arg(long)]
        image: Option<PathBuf>,
        /// WebM file replayed as the recording
        #[arg(long)]
        video: Option<PathBuf>,
        /// Record a clip instead of taking a photo
        #[arg(long)]
        record: bool,
        /// Recording length in seconds
        #[arg(long, default_value = "3")]
        record_secs: u64,
        /// Directory to write the captured file into
        #[arg(long)]
        output: Option<PathBuf>,
        /// Upload the capture to this car
        #[arg(long)]
        car_id: Option<String>,
        #[arg(long, default_value = "general")]
        category: MediaCategory,
    },
    /// List media for a car, or all media page by page
    List {
        #[arg(long)]
        car_id: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long, default_value = "20")]
        limit: u32,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete a media item by ID
    Delete {
        /// Media ID
        id: String,
    },
    /// Request a presigned upload URL
    UploadUrl {
        #[arg(long)]
        car_id: String,
        #[arg(long, value_enum)]
        r#type: KindArg,
        #[arg(long)]
        file_name: String,
        #[arg(long)]
        category: Option<MediaCategory>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Photo,
    Video,
    Both,
}

impl From<ModeArg> for CaptureMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Photo => CaptureMode::PhotoOnly,
            ModeArg::Video => CaptureMode::VideoOnly,
            ModeArg::Both => CaptureMode::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Image,
    Video,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => MediaKind::Image,
            KindArg::Video => MediaKind::Video,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadReport<'a> {
    title: &'a str,
    message: String,
    #[serde(flatten)]
    summary: UploadSummary,
    skipped: Vec<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn api_client(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(config).context(
        "Failed to create API client. Set LOTMEDIA_API_URL (or API_URL) and LOTMEDIA_API_TOKEN",
    )
}

/// Log queue progress as the pass advances.
fn spawn_progress_logger(mut events: mpsc::UnboundedReceiver<UploadEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UploadEvent::Started { id, file_name } => {
                    info!(entry_id = %id, file_name = %file_name, "Uploading");
                }
                UploadEvent::Finished { id, status } => {
                    info!(entry_id = %id, status = %status, "Finished");
                }
            }
        }
    });
}

async fn upload_files(
    client: &ApiClient,
    car_id: &str,
    category: MediaCategory,
    files: Vec<MediaFile>,
    skipped: Vec<String>,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_progress_logger(rx);

    let mut queue = UploadQueue::new().with_events(tx);
    for file in files {
        let id = queue.add(file);
        queue.set_category(id, category)?;
    }

    let summary = queue.run_upload(car_id, client).await;
    for entry in queue.entries() {
        if let Some(reason) = entry.error() {
            warn!(file_name = %entry.file().name, error = reason, "Upload failed");
        }
    }

    print_json(&UploadReport {
        title: summary.title(),
        message: summary.message(),
        summary,
        skipped,
    })?;

    if !summary.is_success() {
        anyhow::bail!(summary.message());
    }
    Ok(())
}

/// Read and validate the selection. Rejected files are reported, not fatal.
fn load_selection(
    paths: &[PathBuf],
    policy: &SelectionPolicy,
) -> (Vec<MediaFile>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        let file = match MediaFile::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file");
                skipped.push(path.display().to_string());
                continue;
            }
        };
        match validate_selection(&file, policy) {
            Ok(()) => {
                info!(
                    file_name = %file.name,
                    size = %format_bytes(file.size()),
                    kind = %file.kind(),
                    "File selected"
                );
                accepted.push(file);
            }
            Err(e) => {
                warn!(
                    file_name = %file.name,
                    error = %e,
                    hint = %e.user_message(),
                    "File rejected"
                );
                skipped.push(file.name);
            }
        }
    }

    (accepted, skipped)
}

fn write_capture(dir: &Path, file: &MediaFile) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(&file.name);
    std::fs::write(&path, &file.data)
        .with_context(|| format!("Failed to write capture to {}", path.display()))?;
    Ok(path)
}

#[allow(clippy::too_many_arguments)]
async fn capture(
    mode: CaptureMode,
    image: Option<PathBuf>,
    video: Option<PathBuf>,
    record: bool,
    record_secs: u64,
    output: Option<PathBuf>,
    car_id: Option<String>,
    category: MediaCategory,
) -> anyhow::Result<()> {
    let mut devices = FileSourceDevices::new();
    if let Some(image) = image {
        devices = devices.with_image(image);
    }
    if let Some(video) = video {
        devices = devices.with_video(video);
    }

    let config = CaptureConfig::from_env();
    let timeslice = Duration::from_millis(config.timeslice_ms);
    let mut session = CaptureSession::with_config(Arc::new(devices), mode, config);
    session
        .open()
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;

    let captured = if record {
        if !session.start_recording() {
            session.close();
            anyhow::bail!("Recording is not available for this source and mode");
        }
        let deadline = tokio::time::Instant::now() + Duration::from_secs(record_secs);
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(timeslice).await;
            let buffered = session.pump();
            info!(buffered = %format_bytes(buffered as u64), "Recording");
        }
        session.stop_recording()
    } else {
        session.capture_photo()
    };

    let Some(file) = captured else {
        session.close();
        anyhow::bail!("Nothing was captured");
    };
    info!(file_name = %file.name, size = %format_bytes(file.size()), "Captured");

    if let Some(dir) = output {
        let path = write_capture(&dir, &file)?;
        info!(path = %path.display(), "Capture written");
    }

    match car_id {
        Some(car_id) => {
            let config = ClientConfig::from_env()?;
            let client = api_client(&config)?;
            upload_files(&client, &car_id, category, vec![file], Vec::new()).await
        }
        None => print_json(&serde_json::json!({
            "fileName": file.name,
            "mimeType": file.mime_type,
            "fileSize": file.size(),
        })),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            car_id,
            category,
            files,
        } => {
            let config = ClientConfig::from_env()?;
            let client = api_client(&config)?;
            let policy = SelectionPolicy::with_max_bytes(config.max_upload_bytes);
            let (accepted, skipped) = load_selection(&files, &policy);
            upload_files(&client, &car_id, category, accepted, skipped).await?;
        }
        Commands::Capture {
            mode,
            image,
            video,
            record,
            record_secs,
            output,
            car_id,
            category,
        } => {
            capture(
                mode.into(),
                image,
                video,
                record,
                record_secs,
                output,
                car_id,
                category,
            )
            .await?;
        }
        Commands::List {
            car_id,
            page,
            limit,
            format,
        } => {
            let client = api_client(&ClientConfig::from_env()?)?;
            let records = match car_id {
                Some(car_id) => client.list_media_for_car(&car_id).await?,
                None => {
                    let response = client.list_media(page, Some(limit)).await?;
                    if format == OutputFormat::Json {
                        print_json(&response)?;
                        return Ok(());
                    }
                    response.data
                }
            };

            match format {
                OutputFormat::Json => print_json(&records)?,
                OutputFormat::Table => {
                    println!(
                        "{:<24} {:<6} {:<9} {:>10}  FILE",
                        "ID", "TYPE", "CATEGORY", "SIZE"
                    );
                    for record in &records {
                        println!("{}", format_record_row(record));
                    }
                    println!("\n{} item(s)", records.len());
                }
            }
        }
        Commands::Delete { id } => {
            let client = api_client(&ClientConfig::from_env()?)?;
            client.delete_media(&id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Media {} deleted", id) }),
            )?;
        }
        Commands::UploadUrl {
            car_id,
            r#type,
            file_name,
            category,
        } => {
            let client = api_client(&ClientConfig::from_env()?)?;
            let response = client
                .generate_upload_url(&UploadUrlRequest {
                    car_id,
                    media_type: r#type.into(),
                    file_name,
                    category,
                })
                .await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
