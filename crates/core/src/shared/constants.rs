pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Whisper models are trained on 16 kHz mono input.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const DEFAULT_BEAM_SIZE: usize = 5;

/// Upper bound on inference threads when none are requested.
pub const MAX_DEFAULT_THREADS: usize = 4;

/// Directory name used under the platform cache dir.
pub const APP_DIR_NAME: &str = "whisper-transcript";

/// whisper.cpp runs at most this many decoders (`WHISPER_MAX_DECODERS`).
pub const MAX_BEAM_SIZE: usize = 8;
