use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use whisper_transcript_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use whisper_transcript_core::pipeline::transcribe_file_use_case::TranscribeFileUseCase;
use whisper_transcript_core::pipeline::transcript_report::TranscriptReport;
use whisper_transcript_core::shared::constants::{DEFAULT_BEAM_SIZE, MAX_BEAM_SIZE};
use whisper_transcript_core::shared::model_resolver::{self, ProgressFn};
use whisper_transcript_core::transcription::domain::model_spec::{
    default_threads, ComputeType, DecodeOptions, Device, ModelSize, ModelSpec,
};
use whisper_transcript_core::transcription::infrastructure::whisper_recognizer::WhisperRecognizer;

/// Transcribe one audio file with Whisper and print `{"transcript": ...}` as JSON.
#[derive(Parser, Debug)]
#[command(name = "whisper-transcript", version)]
struct Cli {
    /// Audio (or video) file to transcribe.
    input: PathBuf,

    /// Model size: tiny, base, small, medium, large-v3-turbo.
    #[arg(long, default_value = "small")]
    model: ModelSize,

    /// Weight precision: int8, float16, float32.
    #[arg(long, default_value = "int8")]
    compute_type: ComputeType,

    /// Inference device: cpu or gpu.
    #[arg(long, default_value = "cpu")]
    device: Device,

    /// Beam search width, 1 to 8 (1 = greedy).
    #[arg(long, default_value_t = DEFAULT_BEAM_SIZE)]
    beam_size: usize,

    /// Spoken language code (e.g. en, de, haw). Detected automatically if omitted.
    #[arg(long)]
    language: Option<String>,

    /// Inference threads (default: available cores, at most 4).
    #[arg(long)]
    threads: Option<usize>,

    /// Use this ggml model file instead of the cached/downloaded one.
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Include duration and per-segment timings in the output.
    #[arg(long)]
    segments: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let model_path = resolve_model(&cli)?;
    let recognizer = WhisperRecognizer::new(&model_path, cli.device, decode_options(&cli))?;

    let use_case =
        TranscribeFileUseCase::new(Box::new(FfmpegAudioReader::new()), Box::new(recognizer));
    let transcript = use_case.execute(&cli.input)?;

    let report = TranscriptReport::from_transcript(&transcript, cli.segments);
    println!("{}", report.to_json_line()?);
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !(1..=MAX_BEAM_SIZE).contains(&cli.beam_size) {
        return Err(format!(
            "Beam size must be between 1 and {MAX_BEAM_SIZE}, got {}",
            cli.beam_size
        )
        .into());
    }
    if cli.threads == Some(0) {
        return Err("Threads must be at least 1".into());
    }
    if let Some(lang) = &cli.language {
        if !(2..=3).contains(&lang.len()) || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Language must be a 2 or 3 letter code, got '{lang}'").into());
        }
    }
    if let Some(path) = &cli.model_path {
        if !path.is_file() {
            return Err(format!("Model file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn decode_options(cli: &Cli) -> DecodeOptions {
    DecodeOptions {
        beam_size: cli.beam_size,
        language: cli.language.as_ref().map(|l| l.to_ascii_lowercase()),
        threads: cli.threads.unwrap_or_else(default_threads),
    }
}

fn resolve_model(cli: &Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.model_path {
        return Ok(path.clone());
    }

    if cli.compute_type == ComputeType::Float32 {
        log::warn!("No float32 ggml weights are published; using float16");
    }

    let spec = ModelSpec::new(cli.model, cli.compute_type);
    let name = spec.file_name();
    log::info!("Resolving model: {name}");
    let progress = DownloadProgress::new();
    let result = model_resolver::resolve(
        &name,
        &spec.download_url(),
        None,
        Some(progress.callback()),
    );
    // Terminate the progress line even when the download failed part-way.
    if progress.finish() {
        eprintln!();
    }
    Ok(result?)
}

/// Prints a single self-overwriting progress line on stderr.
struct DownloadProgress {
    started: Arc<AtomicBool>,
}

impl DownloadProgress {
    fn new() -> Self {
        Self {
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    fn callback(&self) -> ProgressFn {
        let started = self.started.clone();
        Box::new(move |downloaded, total| {
            started.store(true, Ordering::Relaxed);
            eprint!("\r{}", progress_line(downloaded, total));
        })
    }

    /// True if any progress was printed, so the caller owes a newline.
    fn finish(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }
}

fn progress_line(downloaded: u64, total: u64) -> String {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        format!("Downloading Whisper model... {pct}%")
    } else {
        format!("Downloading Whisper model... {downloaded} bytes")
    }
}
