pub mod model_spec;
pub mod speech_recognizer;
pub mod transcript;
