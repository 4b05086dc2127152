use std::ptr;
use std::time::Duration;

use ffmpeg_core::{
    ChannelLayout, Codec, CodecId, Error, Frame, MediaType, PixelFormat, Pts, Rational,
    SampleFormat, SampleLayout, StreamType,
};
use ffmpeg_decode::{MediaReader, OwnedFrame};
use ffmpeg_encode::{AudioEncoderConfig, MediaWriter, VideoEncoderConfig};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn has_encoder(name: &str) -> bool {
    let found = Codec::find_encoder_by_name(name).is_some();
    if !found {
        eprintln!("skipping: encoder {name} is not available");
    }
    found
}

fn video_config() -> VideoEncoderConfig {
    VideoEncoderConfig::new(
        CodecId::MPEG4,
        WIDTH,
        HEIGHT,
        PixelFormat::YUV420P,
        Rational::new(1, 25),
    )
    .with_frame_rate(Rational::new(25, 1))
}

fn audio_config() -> AudioEncoderConfig {
    AudioEncoderConfig::new(
        "pcm_s16le",
        48000,
        SampleFormat::I16(SampleLayout::Packed),
        ChannelLayout::stereo(),
        Rational::new(1, 48000),
    )
}

fn video_frame(index: i64) -> Frame {
    let mut frame = Frame::new_video(WIDTH, HEIGHT, PixelFormat::YUV420P).unwrap();
    let rows = [HEIGHT as usize, HEIGHT as usize / 2, HEIGHT as usize / 2];
    for (plane, rows) in rows.into_iter().enumerate() {
        let len = frame.linesize(plane) as usize * rows;
        let value = if plane == 0 { (index * 20 % 256) as u8 } else { 128 };
        unsafe { ptr::write_bytes(frame.data_mut_ptr(plane), value, len) };
    }
    frame.set_pts(Some(Pts(index)));
    frame
}

fn silent_audio_frame(samples: usize, format: SampleFormat, pts: i64) -> Frame {
    let layout = ChannelLayout::stereo();
    let mut frame = Frame::new_audio(samples, 48000, format, &layout).unwrap();
    let planes = if format.is_planar() { 2 } else { 1 };
    for plane in 0..planes {
        let len = frame.linesize(0) as usize;
        unsafe { ptr::write_bytes(frame.data_mut_ptr(plane), 0, len) };
    }
    frame.set_pts(Some(Pts(pts)));
    frame
}

fn assert_non_decreasing(frames: &[OwnedFrame]) {
    let pts: Vec<i64> = frames.iter().filter_map(|f| f.pts()).map(|p| p.0).collect();
    assert_eq!(pts.len(), frames.len(), "every frame has a pts");
    assert!(pts.windows(2).all(|w| w[0] <= w[1]), "pts decreased: {pts:?}");
}

#[test]
fn video_round_trip_keeps_every_frame() {
    if !has_encoder("mpeg4") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("video.mkv");
    let url = path.to_str().unwrap();

    let mut writer = MediaWriter::create(url, None).unwrap();
    assert_eq!(writer.add_video_stream(video_config()).unwrap(), 0);
    writer.start().unwrap();
    for i in 0..10 {
        writer.write_video_frame(&video_frame(i)).unwrap();
    }
    writer.finish().unwrap();

    let mut reader = MediaReader::open(url).unwrap();
    assert_eq!(reader.video_stream_index(), Some(0));
    assert_eq!(reader.audio_stream_index(), None);
    assert!(reader.video_time_base().unwrap().is_valid());

    let frames = reader
        .video_frames()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(frames.len(), 10);
    assert_eq!(frames[0].width(), WIDTH);
    assert_eq!(frames[0].height(), HEIGHT);
    assert_non_decreasing(&frames);

    // Everything was drained, so a second pass produces nothing.
    assert_eq!(reader.video_frames().count(), 0);
    // No audio stream: the sequence is empty, not an error.
    assert_eq!(reader.audio_frames().count(), 0);
}

#[test]
fn seek_to_start_decodes_again() {
    if !has_encoder("mpeg4") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seek.mkv");
    let url = path.to_str().unwrap();

    let mut writer = MediaWriter::create(url, None).unwrap();
    writer.add_video_stream(video_config().with_gop_size(1)).unwrap();
    writer.start().unwrap();
    for i in 0..10 {
        writer.write_video_frame(&video_frame(i)).unwrap();
    }
    writer.finish().unwrap();

    let mut reader = MediaReader::open(url).unwrap();
    assert_eq!(reader.video_frames().count(), 10);

    reader.seek(Duration::ZERO).unwrap();
    let frames = reader
        .video_frames()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(frames.len(), 10);
    assert_eq!(frames[0].pts(), Some(Pts(0)));
}

#[test]
fn audio_round_trip_keeps_every_sample() {
    if !has_encoder("pcm_s16le") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audio.wav");
    let url = path.to_str().unwrap();

    let config = audio_config();
    let format = config.sample_format;
    let mut writer = MediaWriter::create(url, None).unwrap();
    writer.add_audio_stream(config).unwrap();
    writer.start().unwrap();
    for i in 0..10 {
        let frame = silent_audio_frame(1024, format, i * 1024);
        writer.write_audio_frame(&frame).unwrap();
    }
    writer.finish().unwrap();

    let mut reader = MediaReader::open(url).unwrap();
    assert_eq!(reader.video_stream_index(), None);
    let frames = reader
        .audio_frames()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let samples: usize = frames.iter().map(|f| f.samples()).sum();
    assert_eq!(samples, 10 * 1024);
    assert_eq!(frames[0].sample_rate(), 48000);
    assert_eq!(frames[0].channel_layout().unwrap().channels(), 2);
    assert_non_decreasing(&frames);
}

#[test]
fn interleaved_streams_in_one_pass() {
    if !has_encoder("mpeg4") || !has_encoder("pcm_s16le") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("both.mkv");
    let url = path.to_str().unwrap();

    let config = audio_config();
    let format = config.sample_format;
    let mut writer = MediaWriter::create(url, Some("matroska")).unwrap();
    let video_index = writer.add_video_stream(video_config()).unwrap();
    let audio_index = writer.add_audio_stream(config).unwrap();
    assert_ne!(video_index, audio_index);
    writer.start().unwrap();
    for i in 0..5 {
        writer.write_video_frame(&video_frame(i)).unwrap();
        // 1920 samples is one 1/25 s video frame at 48 kHz
        let frame = silent_audio_frame(1920, format, i * 1920);
        writer.write_audio_frame(&frame).unwrap();
    }
    writer.finish().unwrap();

    let mut reader = MediaReader::open(url).unwrap();
    let mut video = 0;
    let mut audio_samples = 0;
    for item in reader.frames() {
        match item.unwrap() {
            (StreamType::Video, _) => video += 1,
            (StreamType::Audio, frame) => audio_samples += frame.samples(),
        }
    }
    assert_eq!(video, 5);
    assert_eq!(audio_samples, 5 * 1920);
}

#[test]
fn aac_remux_to_adts_keeps_codec() {
    if !has_encoder("aac") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("source.m4a");
    let source_url = source_path.to_str().unwrap();
    let adts_path = dir.path().join("remuxed.aac");
    let adts_url = adts_path.to_str().unwrap();

    let format = SampleFormat::F32(SampleLayout::Planar);
    let mut writer = MediaWriter::create(source_url, Some("mp4")).unwrap();
    writer
        .add_audio_stream(
            AudioEncoderConfig::new(
                CodecId::AAC,
                48000,
                format,
                ChannelLayout::stereo(),
                Rational::new(1, 48000),
            )
            .with_bit_rate(128_000),
        )
        .unwrap();
    let frame_size = writer.audio_encoder().unwrap().frame_size();
    assert_eq!(frame_size, 1024);
    writer.start().unwrap();
    for i in 0..20 {
        let frame = silent_audio_frame(frame_size, format, i * frame_size as i64);
        writer.write_audio_frame(&frame).unwrap();
    }
    writer.finish().unwrap();

    let mut input = ffmpeg_source::InputContext::open(source_url).unwrap();
    let audio_index = input.find_best_stream(MediaType::Audio).unwrap();
    let source_stream = input.stream(audio_index).unwrap();
    assert_eq!(source_stream.codec_id, CodecId::AAC);

    let mut output = ffmpeg_sink::OutputContext::new(adts_url, Some("adts")).unwrap();
    let out_index = output.add_stream(None).unwrap();
    output
        .copy_parameters_from(out_index, &input, audio_index)
        .unwrap();
    output.open_io().unwrap();
    output.write_header(None).unwrap();

    let out_time_base = output.stream_time_base(out_index).unwrap();
    let mut packet = ffmpeg_core::Packet::new().unwrap();
    let mut copied = 0;
    while input.read_packet(&mut packet).unwrap() {
        if packet.stream_index() != audio_index {
            continue;
        }
        packet.rescale_ts(source_stream.time_base, out_time_base);
        packet.set_stream_index(out_index);
        output.write_interleaved(&mut packet).unwrap();
        copied += 1;
    }
    output.write_trailer().unwrap();
    drop(output);
    assert!(copied > 0);

    let remuxed = ffmpeg_source::InputContext::open(adts_url).unwrap();
    let streams = remuxed.streams();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].codec_id, CodecId::AAC);
    assert!(streams[0].is_audio());
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.mp4");
    let err = MediaReader::open(path.to_str().unwrap()).unwrap_err();
    assert!(err.code().is_some_and(|code| code < 0));
}

#[test]
fn missing_encoder_is_encoder_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unused.mkv");
    let mut writer = MediaWriter::create(path.to_str().unwrap(), None).unwrap();
    let config = VideoEncoderConfig::new(
        "definitely_not_an_encoder",
        WIDTH,
        HEIGHT,
        PixelFormat::YUV420P,
        Rational::new(1, 25),
    );
    assert_eq!(
        writer.add_video_stream(config),
        Err(Error::encoder_not_found())
    );
}

#[test]
fn lifecycle_misuse_is_rejected() {
    if !has_encoder("mpeg4") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifecycle.mkv");
    let mut writer = MediaWriter::create(path.to_str().unwrap(), None).unwrap();
    writer.add_video_stream(video_config()).unwrap();
    writer.start().unwrap();

    assert!(matches!(writer.start(), Err(Error::InvalidState(_))));
    assert!(matches!(
        writer.add_audio_stream(audio_config()),
        Err(Error::InvalidState(_))
    ));

    writer.finish().unwrap();
    // Finishing twice is a no-op.
    writer.finish().unwrap();
    assert!(matches!(
        writer.write_video_frame(&video_frame(0)),
        Err(Error::InvalidState(_))
    ));
}
