//! Video encoder — encode a sequence of frames into a video file.
//!
//! [`VideoEncoder`] turns the transformed frames of one trajectory into a
//! playable video container (MP4 by default, inferred from the output
//! extension) using FFmpeg.
//!
//! # Example
//!
//! ```no_run
//! use image::DynamicImage;
//! use trajvid::{TrajvidError, VideoEncoder, VideoEncoderOptions};
//!
//! let frames = vec![DynamicImage::new_rgb8(64, 64); 5];
//! VideoEncoder::new(VideoEncoderOptions::default()).write("traj_0.mp4", &frames)?;
//! # Ok::<(), TrajvidError>(())
//! ```

use std::path::Path;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::util::error::EAGAIN;
use ffmpeg_next::{Error as FfmpegError, Packet, Rational};
use image::DynamicImage;

use crate::error::TrajvidError;

/// Options for the video encoder.
#[derive(Debug, Clone)]
pub struct VideoEncoderOptions {
    /// Target frames per second (default: 10).
    pub fps: u32,
    /// Codec to use. Default is MPEG-4 Part 2 (`mp4v`).
    pub codec: VideoCodec,
    /// Bitrate in bits per second. `None` leaves the encoder default.
    pub bitrate: Option<usize>,
}

impl Default for VideoEncoderOptions {
    fn default() -> Self {
        Self {
            fps: 10,
            codec: VideoCodec::Mpeg4,
            bitrate: None,
        }
    }
}

impl VideoEncoderOptions {
    /// Set the frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// MPEG-4 Part 2. The default; available in every FFmpeg build.
    Mpeg4,
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
}

impl VideoCodec {
    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Mpeg4 => Id::MPEG4,
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
        }
    }
}

/// Encodes a sequence of frames into a video file.
///
/// Create via [`VideoEncoder::new`], then call [`write`](VideoEncoder::write)
/// once per trajectory. The output is sized to the first frame; every frame
/// is written in sequence and the container is finalized when the sequence
/// is exhausted. FFmpeg contexts are owned values, so codec resources are
/// released even when a write fails partway.
pub struct VideoEncoder {
    options: VideoEncoderOptions,
}

impl VideoEncoder {
    /// Create a new video encoder with the given options.
    pub fn new(options: VideoEncoderOptions) -> Self {
        Self { options }
    }

    /// Write frames to the output path.
    ///
    /// The container format is inferred from the file extension. An existing
    /// file at `path` is overwritten.
    ///
    /// # Errors
    ///
    /// - [`TrajvidError::VideoWrite`] when there are no frames, or on
    ///   container/IO failure.
    /// - [`TrajvidError::VideoEncode`] when the codec is unavailable or
    ///   rejects the frames.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        frames: &[DynamicImage],
    ) -> Result<(), TrajvidError> {
        if frames.is_empty() {
            return Err(TrajvidError::VideoWrite("no frames to write".to_string()));
        }

        let path = path.as_ref();
        let width = frames[0].width();
        let height = frames[0].height();

        // The stream is sized by the first frame; a smaller frame later on
        // would overrun the row copy, so reject mismatches up front.
        for (index, img) in frames.iter().enumerate() {
            if img.width() != width || img.height() != height {
                return Err(TrajvidError::VideoWrite(format!(
                    "frame {index} is {}x{}, expected {width}x{height} from the first frame",
                    img.width(),
                    img.height(),
                )));
            }
        }

        log::info!(
            "writing {} frames ({width}x{height}) to {} (codec={:?}, fps={})",
            frames.len(),
            path.display(),
            self.options.codec,
            self.options.fps,
        );

        ffmpeg_next::init()
            .map_err(|e| TrajvidError::VideoEncode(format!("FFmpeg initialisation failed: {e}")))?;

        let mut output = ffmpeg_next::format::output(path)
            .map_err(|e| TrajvidError::VideoWrite(format!("cannot open output: {e}")))?;
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let codec_id = self.options.codec.to_codec_id();
        let encoder_codec = ffmpeg_next::encoder::find(codec_id)
            .ok_or_else(|| TrajvidError::VideoEncode(format!("codec {codec_id:?} not available")))?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| TrajvidError::VideoWrite(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| TrajvidError::VideoEncode(format!("cannot create codec context: {e}")))?
            .encoder()
            .video()
            .map_err(|e| TrajvidError::VideoEncode(format!("cannot open video encoder: {e}")))?;

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(Pixel::YUV420P);
        encoder.set_time_base(Rational::new(1, self.options.fps as i32));
        encoder.set_frame_rate(Some(Rational::new(self.options.fps as i32, 1)));
        if let Some(bitrate) = self.options.bitrate {
            encoder.set_bit_rate(bitrate);
        }
        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let mut opened = encoder
            .open_as(encoder_codec)
            .map_err(|e| TrajvidError::VideoEncode(format!("cannot open encoder: {e}")))?;
        stream.set_parameters(&opened);

        output
            .write_header()
            .map_err(|e| TrajvidError::VideoWrite(format!("cannot write header: {e}")))?;

        let mut scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| TrajvidError::VideoWrite(format!("cannot create scaler: {e}")))?;

        for (frame_index, img) in frames.iter().enumerate() {
            let src_frame = rgb_to_frame(img, width, height);

            let mut dst_frame = VideoFrame::empty();
            scaler
                .run(&src_frame, &mut dst_frame)
                .map_err(|e| TrajvidError::VideoWrite(format!("scaling failed: {e}")))?;
            dst_frame.set_pts(Some(frame_index as i64));

            opened
                .send_frame(&dst_frame)
                .map_err(|e| TrajvidError::VideoEncode(format!("send_frame failed: {e}")))?;
            self.drain_packets(&mut opened, &mut output, stream_index)?;
        }

        opened
            .send_eof()
            .map_err(|e| TrajvidError::VideoEncode(format!("send_eof failed: {e}")))?;
        self.drain_packets(&mut opened, &mut output, stream_index)?;

        output
            .write_trailer()
            .map_err(|e| TrajvidError::VideoWrite(format!("cannot write trailer: {e}")))?;

        Ok(())
    }

    /// Receive every packet the encoder currently has and write it to the
    /// container, rescaling timestamps from the encoder time base to the
    /// stream time base.
    fn drain_packets(
        &self,
        encoder: &mut OpenedVideoEncoder,
        output: &mut Output,
        stream_index: usize,
    ) -> Result<(), TrajvidError> {
        let mut packet = Packet::empty();
        loop {
            match encoder.receive_packet(&mut packet) {
                Ok(()) => {}
                // EAGAIN means the encoder wants more input; EOF means it
                // is fully drained. Anything else is a real failure.
                Err(FfmpegError::Other { errno: EAGAIN }) | Err(FfmpegError::Eof) => break,
                Err(e) => {
                    return Err(TrajvidError::VideoEncode(format!(
                        "receive_packet failed: {e}"
                    )));
                }
            }

            packet.set_stream(stream_index);
            let stream_time_base = output
                .stream(stream_index)
                .ok_or_else(|| {
                    TrajvidError::VideoWrite(format!("output stream {stream_index} vanished"))
                })?
                .time_base();
            packet.rescale_ts(Rational::new(1, self.options.fps as i32), stream_time_base);
            packet
                .write_interleaved(output)
                .map_err(|e| TrajvidError::VideoWrite(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

/// Copy an image into an RGB24 FFmpeg frame, honoring the frame's stride.
fn rgb_to_frame(img: &DynamicImage, width: u32, height: u32) -> VideoFrame {
    let rgb = img.to_rgb8();
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    let bytes = rgb.as_raw();
    let row_len = width as usize * 3;
    for y in 0..height as usize {
        data[y * stride..y * stride + row_len]
            .copy_from_slice(&bytes[y * row_len..(y + 1) * row_len]);
    }
    frame
}

#[cfg(test)]
mod tests {
    use image::DynamicImage;

    use super::{VideoCodec, VideoEncoder, VideoEncoderOptions};
    use crate::error::TrajvidError;

    #[test]
    fn default_options_match_the_export_contract() {
        let options = VideoEncoderOptions::default();
        assert_eq!(options.fps, 10);
        assert_eq!(options.codec, VideoCodec::Mpeg4);
        assert_eq!(options.bitrate, None);
    }

    #[test]
    fn options_builder_sets_every_field() {
        let options = VideoEncoderOptions::default()
            .fps(24)
            .codec(VideoCodec::H264)
            .bitrate(2_000_000);
        assert_eq!(options.fps, 24);
        assert_eq!(options.codec, VideoCodec::H264);
        assert_eq!(options.bitrate, Some(2_000_000));
    }

    #[test]
    fn empty_frame_sequence_is_rejected() {
        let result = VideoEncoder::new(VideoEncoderOptions::default()).write("unused.mp4", &[]);
        assert!(result.is_err(), "should error on empty frames");
    }

    #[test]
    fn mismatched_frame_dimensions_are_rejected() {
        let frames = vec![DynamicImage::new_rgb8(64, 64), DynamicImage::new_rgb8(32, 32)];
        let result = VideoEncoder::new(VideoEncoderOptions::default()).write("unused.mp4", &frames);
        match result {
            Err(TrajvidError::VideoWrite(message)) => {
                assert!(message.contains("32x32"), "message should name the bad frame: {message}");
            }
            other => panic!("expected a write error, got {other:?}"),
        }
    }
}
