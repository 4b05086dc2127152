use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod adts;
mod decode;
mod encode;
mod filter;
mod inspect;
mod mp3;

#[derive(Parser, Debug)]
#[command(name = "mediatool")]
#[command(about = "Inspect, decode, filter, encode and remux media files")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print container and stream information
    Inspect {
        /// Input file or URL
        input: String,
    },
    /// Decode video frames and print their shape and timestamps
    Decode {
        /// Input file or URL
        input: String,
        /// Stop after this many frames
        #[arg(default_value = "10")]
        max_frames: usize,
    },
    /// Re-encode the video stream, converting to yuv420p when needed
    Encode {
        /// Input file or URL
        input: String,
        /// Output file
        output: PathBuf,
        /// Stop after this many frames
        #[arg(default_value = "60")]
        max_frames: usize,
    },
    /// Run decoded video frames through a filter graph
    Filter {
        /// Input file or URL
        input: String,
        /// Stop after this many filtered frames
        #[arg(default_value = "10")]
        max_frames: usize,
        /// Filter graph description
        #[arg(short, long, default_value = "scale=320:240,hflip")]
        graph: String,
    },
    /// Remux an AAC audio stream into a raw ADTS file
    Adts {
        /// Input file or URL
        input: String,
        /// Output file
        output: PathBuf,
    },
    /// Transcode the audio stream to MP3
    Mp3 {
        /// Input file or URL
        input: String,
        /// Output file
        output: PathBuf,
        /// Stop after this many decoded frames
        max_frames: Option<usize>,
        /// Target bit rate in bits per second
        #[arg(short, long, default_value = "128000")]
        bit_rate: i64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Inspect { input } => inspect::run(&input),
        Command::Decode { input, max_frames } => decode::run(&input, max_frames),
        Command::Encode {
            input,
            output,
            max_frames,
        } => encode::run(&input, &output, max_frames),
        Command::Filter {
            input,
            max_frames,
            graph,
        } => filter::run(&input, &graph, max_frames),
        Command::Adts { input, output } => adts::run(&input, &output),
        Command::Mp3 {
            input,
            output,
            max_frames,
            bit_rate,
        } => mp3::run(&input, &output, max_frames, bit_rate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/**
    Render an output path for FFmpeg, which takes urls as strings.
*/
fn output_url(path: &std::path::Path) -> anyhow::Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("output path {} is not valid UTF-8", path.display()))
}

/**
    Render an optional timestamp the way FFmpeg's tools do.
*/
fn format_pts(pts: Option<ffmpeg_core::Pts>) -> String {
    match pts {
        Some(pts) => pts.0.to_string(),
        None => "NOPTS".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_limits_default() {
        let args = Args::try_parse_from(["mediatool", "decode", "in.mp4"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Decode { max_frames: 10, .. }
        ));

        let args = Args::try_parse_from(["mediatool", "encode", "in.mp4", "out.mp4"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Encode { max_frames: 60, .. }
        ));

        let args = Args::try_parse_from(["mediatool", "mp3", "in.mp4", "out.mp3"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Mp3 {
                max_frames: None,
                bit_rate: 128_000,
                ..
            }
        ));
    }

    #[test]
    fn filter_graph_override() {
        let args =
            Args::try_parse_from(["mediatool", "filter", "in.mp4", "5", "--graph", "vflip"])
                .unwrap();
        match args.command {
            Command::Filter {
                max_frames, graph, ..
            } => {
                assert_eq!(max_frames, 5);
                assert_eq!(graph, "vflip");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(Args::try_parse_from(["mediatool", "adts", "in.mp4"]).is_err());
        assert!(Args::try_parse_from(["mediatool", "decode", "in.mp4", "many"]).is_err());
        assert!(Args::try_parse_from(["mediatool"]).is_err());
    }

    #[test]
    fn pts_rendering() {
        assert_eq!(format_pts(Some(ffmpeg_core::Pts(42))), "42");
        assert_eq!(format_pts(None), "NOPTS");
    }
}
