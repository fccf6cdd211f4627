use clap::{Args, Subcommand};
use midirx_decode::{DecoderConfig, RunningStatus};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode MIDI bytes from hex text, a file, or stdin.
    Decode(DecodeArgs),
    /// Receive and decode MIDI from a serial device.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex bytes, e.g. "91 3C 40" or "913C40".
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw bytes from file. Default: stdin.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Accept data bytes that reuse the previous status byte.
    #[arg(long)]
    pub running_status: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Serial device path (e.g. /dev/ttyUSB0).
    pub device: PathBuf,
    /// Line speed in baud.
    #[arg(long, default_value_t = midirx_line::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Accept data bytes that reuse the previous status byte.
    #[arg(long)]
    pub running_status: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn decoder_config(running_status: bool) -> DecoderConfig {
    DecoderConfig {
        running_status: if running_status {
            RunningStatus::Enabled
        } else {
            RunningStatus::Disabled
        },
        ..DecoderConfig::default()
    }
}
