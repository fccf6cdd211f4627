mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "midirx", version, about = "Serial MIDI receive and decode CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). Overridden by MIDIRX_LOG when set.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["midirx", "decode", "--hex", "91 3C 40", "--running-status"])
            .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.hex.as_deref(), Some("91 3C 40"));
                assert!(args.running_status);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_input_args() {
        let err = Cli::try_parse_from([
            "midirx",
            "decode",
            "--hex",
            "90 3C 40",
            "--file",
            "/tmp/input.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_listen_subcommand_with_defaults() {
        let cli = Cli::try_parse_from(["midirx", "listen", "/dev/ttyUSB0"])
            .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.baud, midirx_line::DEFAULT_BAUD_RATE);
                assert_eq!(args.count, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_native_midi_baud() {
        let cli = Cli::try_parse_from(["midirx", "listen", "/dev/ttyAMA0", "--baud", "31250"])
            .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => assert_eq!(args.baud, midirx_line::MIDI_BAUD_RATE),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_listen_baud_and_count() {
        let cli = Cli::try_parse_from([
            "midirx", "listen", "/dev/ttyACM0", "--baud", "115200", "--count", "3",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.baud, 115_200);
                assert_eq!(args.count, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
