use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use replay::{
    detect_label_width, render_timelapse, EncodeConfig, FfmpegEncoder, LoadOptions,
    PngDirectorySink, RenderSummary,
};
use structures::CanvasConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a placement CSV into numbered PNG frames
    Render(RenderArgs),
    /// Encode an existing frame set into a video (requires ffmpeg on PATH)
    Encode(EncodeArgs),
    /// Render frames, then encode them
    Run {
        #[command(flatten)]
        render: RenderArgs,
        #[arg(short, long, default_value = "place.mp4")]
        out_file: PathBuf,
        #[arg(long, default_value_t = 60)]
        framerate: u32,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    in_file: PathBuf,
    #[arg(long, default_value = "frames")]
    frames_dir: PathBuf,
    /// Approximate number of frames to sample, excluding the final frame
    #[arg(long, default_value_t = 1000)]
    frame_budget: u32,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 1000)]
    height: u32,
    /// Fail on rows with malformed coordinates or color instead of skipping them
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(long, default_value = "frames")]
    frames_dir: PathBuf,
    #[arg(short, long, default_value = "place.mp4")]
    out_file: PathBuf,
    #[arg(long, default_value_t = 60)]
    framerate: u32,
    /// Digits in the frame file names; read from the frames directory when omitted
    #[arg(long)]
    label_width: Option<usize>,
}

fn render(args: &RenderArgs) -> anyhow::Result<RenderSummary> {
    let file = File::open(&args.in_file)
        .with_context(|| format!("Could not open {}", args.in_file.display()))?;

    let config = CanvasConfig {
        width: args.width,
        height: args.height,
        frame_budget: args.frame_budget,
        ..Default::default()
    };
    let options = LoadOptions {
        strict: args.strict,
    };

    let mut sink = PngDirectorySink::create(&args.frames_dir)?;
    let summary = render_timelapse(BufReader::new(file), &config, options, &mut sink)
        .with_context(|| format!("Could not render {}", args.in_file.display()))?;

    info!(
        "Wrote {} frames to {}",
        summary.frames_written,
        args.frames_dir.display()
    );

    Ok(summary)
}

fn encode(
    frames_dir: &Path,
    label_width: usize,
    out_file: &Path,
    framerate: u32,
) -> anyhow::Result<()> {
    let encoder = FfmpegEncoder::new(EncodeConfig {
        framerate,
        ..Default::default()
    });

    encoder
        .encode(frames_dir, label_width, out_file)
        .with_context(|| format!("Could not encode {}", out_file.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            render(&args)?;
        }
        Commands::Encode(args) => {
            let label_width = match args.label_width {
                Some(label_width) => label_width,
                None => detect_label_width(&args.frames_dir).with_context(|| {
                    format!("Could not read frames in {}", args.frames_dir.display())
                })?,
            };

            encode(&args.frames_dir, label_width, &args.out_file, args.framerate)?;
        }
        Commands::Run {
            render: args,
            out_file,
            framerate,
        } => {
            let summary = render(&args)?;
            encode(&args.frames_dir, summary.label_width, &out_file, framerate)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults_match_reference_job() {
        let cli = Cli::try_parse_from(["place-timelapse", "run", "data.csv"]).unwrap();

        match cli.command {
            Commands::Run {
                render,
                out_file,
                framerate,
            } => {
                assert_eq!(render.in_file, PathBuf::from("data.csv"));
                assert_eq!(render.frames_dir, PathBuf::from("frames"));
                assert_eq!(render.frame_budget, 1000);
                assert!(!render.strict);
                assert_eq!(out_file, PathBuf::from("place.mp4"));
                assert_eq!(framerate, 60);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn encode_label_width_defaults_to_detection() {
        let cli = Cli::try_parse_from(["place-timelapse", "encode"]).unwrap();

        match cli.command {
            Commands::Encode(args) => {
                assert_eq!(args.frames_dir, PathBuf::from("frames"));
                assert_eq!(args.label_width, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli =
            Cli::try_parse_from(["place-timelapse", "encode", "--label-width", "4"]).unwrap();
        match cli.command {
            Commands::Encode(args) => assert_eq!(args.label_width, Some(4)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
