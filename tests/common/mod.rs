//! Shared helpers for integration tests: build small HDF5 dataset files
//! and detect platforms without a usable encoder.

#![allow(dead_code)]

use std::path::Path;

use ndarray::Array4;
use trajvid::BatchSummary;

/// A (frames, height, width, channels) stack with monotonically increasing
/// values, so every frame and pixel is distinguishable.
pub fn gradient_frames(frames: usize, height: usize, width: usize, channels: usize) -> Array4<u8> {
    Array4::from_shape_fn((frames, height, width, channels), |(t, h, w, c)| {
        (t * 97 + h * 13 + w * 5 + c) as u8
    })
}

/// Write a dataset file with the given trajectories. `None` frames produce
/// a trajectory without an observation bundle.
pub fn write_dataset(path: &Path, trajectories: &[(&str, Option<&Array4<u8>>)]) {
    let file = hdf5::File::create(path).expect("create hdf5 file");
    let data = file.create_group("data").expect("create data group");
    for (id, frames) in trajectories {
        let trajectory = data.create_group(id).expect("create trajectory group");
        if let Some(frames) = frames {
            let obs = trajectory.create_group("obs").expect("create obs group");
            obs.new_dataset_builder()
                .with_data(frames.view())
                .create("agentview_rgb")
                .expect("write agentview_rgb");
        }
    }
}

/// Decode a written video and report `(frame_count, width, height)`.
pub fn decoded_frame_info(path: &Path) -> (u64, u32, u32) {
    ffmpeg_next::init().expect("ffmpeg init");
    let mut input = ffmpeg_next::format::input(&path).expect("open encoded video");

    let (stream_index, parameters) = {
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .expect("video stream");
        (stream.index(), stream.parameters())
    };
    let mut decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
        .expect("codec context")
        .decoder()
        .video()
        .expect("video decoder");

    let mut frames = 0u64;
    let mut decoded = ffmpeg_next::frame::Video::empty();
    for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet).expect("send packet");
        while decoder.receive_frame(&mut decoded).is_ok() {
            frames += 1;
        }
    }
    decoder.send_eof().expect("send eof");
    while decoder.receive_frame(&mut decoded).is_ok() {
        frames += 1;
    }

    (frames, decoder.width(), decoder.height())
}

/// `true` when every failure in the summary points at a missing encoder,
/// which happens on FFmpeg builds without the configured codec. Tests use
/// this to skip encode assertions rather than fail.
pub fn encoder_unavailable(summary: &BatchSummary) -> bool {
    !summary.failures.is_empty()
        && summary.failures.iter().all(|(_, error)| {
            let message = error.to_string();
            message.contains("cannot open encoder") || message.contains("not available")
        })
}
