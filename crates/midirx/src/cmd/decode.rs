use std::io::Read;

use bytes::Bytes;
use midirx_line::MidiPort;
use midirx_ring::{ByteRing, DEFAULT_CAPACITY};

use crate::cmd::{decoder_config, DecodeArgs};
use crate::exit::{io_error, line_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{MessagePrinter, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;

    let ring = ByteRing::<DEFAULT_CAPACITY>::new();
    let (mut entry, mut port) =
        MidiPort::<DEFAULT_CAPACITY>::split_with_config(&ring, decoder_config(args.running_status))
            .map_err(|err| line_error("ring setup failed", err))?;
    let mut printer = MessagePrinter::new(format, None);

    // Hand over at most one ring's worth per drain so no byte is dropped.
    for chunk in input.chunks(ring.capacity()) {
        for &byte in chunk {
            entry.on_byte_received(byte);
        }
        port.drain_and_dispatch(&mut printer);
    }

    let stats = port.decoder().stats();
    tracing::info!(
        bytes = input.len(),
        messages = stats.dispatched,
        stray = stats.stray,
        abandoned = stats.abandoned,
        truncated = stats.truncated,
        incomplete = !port.decoder().is_idle(),
        "decode complete"
    );

    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Bytes> {
    if let Some(text) = &args.hex {
        return parse_hex(text)
            .map(Bytes::from)
            .map_err(|msg| CliError::new(DATA_INVALID, format!("invalid --hex input: {msg}")));
    }

    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map(Bytes::from)
            .map_err(|err| io_error(&format!("read {} failed", path.display()), err));
    }

    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("read stdin failed", err))?;
    Ok(Bytes::from(buf))
}

/// Parse whitespace- or comma-separated hex bytes. Tokens may carry a `0x`
/// prefix; a token longer than two digits is read as consecutive pairs.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();

    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if token.is_empty() {
            continue;
        }
        if !token.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("non-hex token {token:?}"));
        }
        if token.len() > 2 && token.len() % 2 != 0 {
            return Err(format!("odd number of digits in {token:?}"));
        }

        let mut start = 0;
        while start < token.len() {
            let end = (start + 2).min(token.len());
            let pair = &token[start..end];
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("non-hex token {token:?}"))?;
            out.push(byte);
            start = end;
        }
    }

    Ok(out)
}
