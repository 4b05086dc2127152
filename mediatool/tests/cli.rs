use std::path::Path;
use std::process::{Command, Output};
use std::ptr;

use ffmpeg_core::{ChannelLayout, Codec, Frame, Pts, Rational, SampleFormat, SampleLayout};
use ffmpeg_encode::{AudioEncoderConfig, MediaWriter};

fn mediatool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mediatool"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn assert_failed(output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.starts_with("Error:"), "stderr: {stderr}");
}

/**
    Write a short silent pcm_s16le WAV file, or return false when the
    encoder is missing from this FFmpeg build.
*/
fn write_pcm_wav(path: &Path) -> bool {
    if Codec::find_encoder_by_name("pcm_s16le").is_none() {
        eprintln!("skipping: encoder pcm_s16le is not available");
        return false;
    }
    let format = SampleFormat::I16(SampleLayout::Packed);
    let layout = ChannelLayout::stereo();
    let config = AudioEncoderConfig::new(
        "pcm_s16le",
        48000,
        format,
        layout.clone(),
        Rational::new(1, 48000),
    );

    let mut writer = MediaWriter::create(path.to_str().unwrap(), None).unwrap();
    writer.add_audio_stream(config).unwrap();
    writer.start().unwrap();
    for i in 0..4 {
        let mut frame = Frame::new_audio(1024, 48000, format, &layout).unwrap();
        let len = frame.linesize(0) as usize;
        unsafe { ptr::write_bytes(frame.data_mut_ptr(0), 0, len) };
        frame.set_pts(Some(Pts(i * 1024)));
        writer.write_audio_frame(&frame).unwrap();
    }
    writer.finish().unwrap();
    true
}

#[test]
fn missing_input_exits_with_error() {
    let output = mediatool(&["inspect", "/nonexistent/mediatool-missing.mp4"]);
    assert_failed(&output);
    assert!(output.stdout.is_empty());
}

#[test]
fn adts_rejects_non_aac_audio() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    if !write_pcm_wav(&input) {
        return;
    }
    let target = dir.path().join("out.aac");

    let output = mediatool(&["adts", input.to_str().unwrap(), target.to_str().unwrap()]);
    assert_failed(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("only AAC"), "stderr: {stderr}");
    assert!(!target.exists());
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let output = mediatool(&["transmogrify"]);
    assert_eq!(output.status.code(), Some(2));
}
