use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::util::frame::audio::Audio;
use ffmpeg_next::ChannelLayout;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Decodes the best audio stream of any ffmpeg-supported file to mono f32.
#[derive(Debug, Default)]
pub struct FfmpegAudioReader;

impl FfmpegAudioReader {
    pub fn new() -> Self {
        Self
    }
}

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };
        let audio_stream_index = audio_stream.index();

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().audio()?;

        // Some demuxers (raw PCM, older WAV headers) leave the layout unset.
        let source_layout = if decoder.channel_layout().is_empty() {
            ChannelLayout::default(decoder.channels() as i32)
        } else {
            decoder.channel_layout()
        };

        log::debug!(
            "Decoding {}: {} Hz, {} channel(s) -> {} Hz mono",
            path.display(),
            decoder.rate(),
            decoder.channels(),
            target_sample_rate
        );

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            source_layout,
            decoder.rate(),
            Sample::F32(SampleType::Planar),
            ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = Audio::empty();
        let mut resampled_frame = Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler.run(&decoded_frame, &mut resampled_frame)?;
            extract_f32_samples(&resampled_frame, &mut all_samples);
        }

        // The resampler may still hold buffered samples.
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        Ok(Some(AudioSegment::new(all_samples, target_sample_rate)))
    }
}

/// Append the samples of a planar mono f32 frame.
fn extract_f32_samples(frame: &Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    // SAFETY: the resampler outputs planar f32, so plane 0 holds `num_samples` floats.
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}
