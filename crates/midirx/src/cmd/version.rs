use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("midirx {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: midirx");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("MIDIRX_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("ring_capacity: {}", midirx_ring::DEFAULT_CAPACITY);
    println!(
        "ring_overflow: {}",
        midirx_ring::OverflowPolicy::default().name()
    );
    println!("max_payload: {}", midirx_decode::DEFAULT_MAX_PAYLOAD);
    println!("default_baud: {}", midirx_line::DEFAULT_BAUD_RATE);

    Ok(SUCCESS)
}
