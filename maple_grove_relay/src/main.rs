// CLI entry point for a dedicated Maple Grove host.
//
// Starts a standalone relay host that game clients connect to. The host
// registers peers, merges snapshot updates, and fans them out — it never
// runs the game itself. See `host.rs` for the receive loop and
// `registry.rs` for merge semantics.
//
// Usage:
//   host [OPTIONS]
//     --port <PORT>    Listen port (default: 31337)
//     --bind <IP>      Bind address (default: 0.0.0.0)

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use maple_grove_relay::host::{HostConfig, activate_host};

fn main() {
    env_logger::init();

    let config = parse_args();

    let (handle, addr) = match activate_host(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start host: {e}");
            std::process::exit(1);
        }
    };

    println!("Host listening on {addr}");
    println!("Press Ctrl+C to stop.");

    // Spin until the process is killed. SIGINT/SIGTERM terminate the
    // process outright, which tears the receive thread down with it;
    // graceful in-process shutdown goes through `HostHandle::stop` (the
    // embedded path and the tests use it). If a cleaner exit is ever
    // needed here, wire the flag to the `ctrlc` crate.
    let running = Arc::new(AtomicBool::new(true));
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    println!("\nShutting down...");
    handle.stop();
}

/// Parse command-line arguments into a `HostConfig`. Uses simple
/// `std::env::args()` matching — no clap dependency.
fn parse_args() -> HostConfig {
    let mut config = HostConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--bind" => {
                i += 1;
                config.bind_ip = args
                    .get(i)
                    .and_then(|s| s.parse::<IpAddr>().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--bind requires a valid IP address");
                        std::process::exit(1);
                    });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_usage() {
    println!("Usage: host [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <PORT>    Listen port (default: 31337)");
    println!("  --bind <IP>      Bind address (default: 0.0.0.0)");
    println!("  --help, -h       Show this help");
}
