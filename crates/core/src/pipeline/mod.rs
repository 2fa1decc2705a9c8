pub mod transcribe_file_use_case;
pub mod transcript_report;
