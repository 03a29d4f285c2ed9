//! zbread: bounded image reader.
//!
//! Reads images through `zenbound::read_bounded` and reports the status code
//! per file, or probes headers without decoding.

mod batch;
mod info;
mod read;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zenbound::Size;

#[derive(Parser, Debug)]
#[command(name = "zbread", version, about = "Bounded image reader")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode images within a size/pixel budget and report status codes.
    Read(ReadArgs),

    /// Probe and display image metadata without decoding.
    Info(InfoArgs),
}

/// Arguments for the `read` subcommand.
#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Input files, directories or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Read flags (-1 unchanged, 0 grayscale, 1 color, 2 any depth, 4 any
    /// color, 16/17 reduced 1/2, 32/33 reduced 1/4, 64/65 reduced 1/8,
    /// +128 ignore orientation).
    #[arg(long, env = "ZBREAD_FLAGS", default_value_t = 1, allow_negative_numbers = true)]
    pub flags: i32,

    /// Largest accepted size as WxH (e.g., 4096x4096).
    #[arg(long, env = "ZBREAD_MAX_SIZE", value_parser = parse_size)]
    pub max_size: Option<Size>,

    /// Largest accepted pixel count (width * height).
    #[arg(long, env = "ZBREAD_MAX_PIXELS")]
    pub max_pixels: Option<u64>,

    /// Number of parallel workers (default: CPU count).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Output as JSON lines.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Input files, directories or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse `WxH` into a [`Size`].
fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("size must be WxH (e.g., 800x600), got: {s}"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size: {w}"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size: {h}"))?;
    Ok(Size::new(width, height))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Read(args) => {
            let code = read::run(args)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Command::Info(args) => info::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size("512x512"), Ok(Size::new(512, 512)));
        assert_eq!(parse_size("800X600"), Ok(Size::new(800, 600)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("wx600").is_err());
        assert!(parse_size("800x-1").is_err());
    }

    #[test]
    fn cli_parses_read() {
        let cli = Cli::try_parse_from([
            "zbread",
            "read",
            "a.png",
            "--flags",
            "-1",
            "--max-size",
            "511x512",
            "--max-pixels",
            "1000",
        ])
        .unwrap();
        let Command::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.flags, -1);
        assert_eq!(args.max_size, Some(Size::new(511, 512)));
        assert_eq!(args.max_pixels, Some(1000));
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
