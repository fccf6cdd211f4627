use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use midirx_line::{
    configure_line_with_config, LineConfig, MidiPort, RxPump, SerialDevice, DEFAULT_READ_TIMEOUT,
};
use midirx_ring::{ByteRing, DEFAULT_CAPACITY};

use crate::cmd::{decoder_config, ListenArgs};
use crate::exit::{line_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{MessagePrinter, OutputFormat};

/// Main-loop period between drains. At 38400 baud about 4 bytes arrive per
/// millisecond, well under the ring capacity.
const DRAIN_INTERVAL: Duration = Duration::from_millis(1);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let mut device =
        SerialDevice::open(&args.device).map_err(|err| line_error("open failed", err))?;
    configure_line_with_config(
        &mut device,
        LineConfig {
            baud_rate: args.baud,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        },
    )
    .map_err(|err| line_error("configure failed", err))?;
    tracing::info!(
        device = %device.path().display(),
        baud_rate = args.baud,
        read_timeout = ?device.read_timeout(),
        "listening"
    );

    let ring = ByteRing::<DEFAULT_CAPACITY>::new();
    let (mut entry, mut port) =
        MidiPort::<DEFAULT_CAPACITY>::split_with_config(&ring, decoder_config(args.running_status))
            .map_err(|err| line_error("ring setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printer = MessagePrinter::new(format, args.count);

    let pump_result = std::thread::scope(|scope| {
        let pump = scope.spawn(|| RxPump::new(&mut device).run(&mut entry, &running));

        while running.load(Ordering::SeqCst) && !printer.is_done() && !pump.is_finished() {
            port.drain_and_dispatch(&mut printer);
            std::thread::sleep(DRAIN_INTERVAL);
        }

        running.store(false, Ordering::SeqCst);
        let result = pump.join();
        port.drain_and_dispatch(&mut printer);
        result
    });

    let stats = pump_result
        .map_err(|_| CliError::new(INTERNAL, "receive pump panicked"))?
        .map_err(|err| line_error("receive failed", err))?;

    tracing::info!(
        received = stats.received,
        dropped = stats.dropped,
        messages = printer.printed(),
        "listen finished"
    );

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
