//! spectroread
//!
//! Read a spectrum from an attached Ocean Optics USB2000 / USB2000+
//! spectrometer and emit it as a space-separated table with optional
//! metadata comment blocks.

mod acquire;
mod config;
mod output;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use common::setup_logging;
use driver::{DeviceRegistry, topology, usb};
use protocol::{DeviceVariant, SessionId};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spectroread")]
#[command(
    author,
    version,
    about = "Read a spectrum from an Ocean Optics USB2000/USB2000+ spectrometer"
)]
#[command(long_about = "
Reads one spectrum from an attached Ocean Optics USB2000 or USB2000+
spectrometer and emits a space-separated table: pixel index, wavelength in
nm, raw amplitude, and baseline-corrected amplitude. Metadata comment
blocks are selected with a verbosity bitmask: 1 serial number, 2 date/time,
4 integration time, 8 generic header, 16 dark pixel level, 32 wavelength
coefficients, 64 USB device id.

EXAMPLES:
    # Acquire with defaults (100 ms integration time, to stdout)
    spectroread

    # 500 ms integration time into a file, all metadata blocks
    spectroread -i 500 -o spectrum.dat -V 127

    # List attached spectrometers
    spectroread --list-devices

    # Acquire from the second attached device with debug logging
    spectroread -d 1 --log-level debug
")]
struct Args {
    /// Output file; `-` writes to stdout
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    output: String,

    /// Integration time in milliseconds (1-10000)
    #[arg(short, long, value_name = "MS")]
    integration_time: Option<u32>,

    /// Device index as listed by --list-devices
    #[arg(short, long, value_name = "INDEX", default_value_t = 0)]
    device: usize,

    /// Verbosity bitmask selecting metadata blocks
    #[arg(short = 'V', long, value_name = "MASK")]
    verbosity: Option<u32>,

    /// List attached spectrometers and exit
    #[arg(long)]
    list_devices: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to the default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = config::CliConfig::default();
        let path = config::CliConfig::default_path();
        config.save(&path)?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        config::CliConfig::load(Some(path.clone())).context("failed to load configuration")?
    } else {
        config::CliConfig::load_or_default()
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    setup_logging(log_level)?;

    let integration_time_ms = args.integration_time.unwrap_or(config.integration_time_ms);
    ensure!(
        (1..=10_000).contains(&integration_time_ms),
        "integration time out of range (1-10000 ms)"
    );
    let verbosity = args.verbosity.unwrap_or(config.verbosity);

    let context = rusb::Context::new().context("failed to create USB context")?;
    let devices = usb::discover(&context)?;

    if args.list_devices {
        if devices.is_empty() {
            println!("no spectrometer attached");
            return Ok(());
        }
        for (index, device) in devices.iter().enumerate() {
            print_device_line(index, device);
        }
        return Ok(());
    }

    ensure!(!devices.is_empty(), "no spectrometer attached");
    let device = devices.get(args.device).with_context(|| {
        format!(
            "no device at index {} ({} attached)",
            args.device,
            devices.len()
        )
    })?;

    let device_topology = usb::probe_topology(device)?;
    let transport = usb::open_transport(device)
        .context("failed to open spectrometer (check device permissions)")?;

    let registry = DeviceRegistry::new();
    let id = SessionId(args.device as u32);
    registry.attach(id, &device_topology, Box::new(transport))?;
    let handle = registry.open(id)?;

    let settings = acquire::AcquireSettings {
        integration_time_ms,
        drain_timeout_ms: config.drain_timeout_ms,
        spectrum_timeout_ms: config.spectrum_timeout_ms,
        read_serial: verbosity & output::verbosity::SERIAL != 0,
    };
    let result = acquire::acquire(&handle, &settings);

    handle.close();
    registry.detach(id);
    let acquisition = result?;

    if args.output == "-" {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        output::write_spectrum(&mut lock, &acquisition, verbosity)?;
        lock.flush()?;
    } else {
        let mut file = File::create(&args.output)
            .with_context(|| format!("failed to open target file {}", args.output))?;
        output::write_spectrum(&mut file, &acquisition, verbosity)?;
    }

    info!(
        pixels = acquisition.values.len(),
        baseline = acquisition.baseline,
        "spectrum acquired"
    );
    Ok(())
}

fn print_device_line(index: usize, device: &rusb::Device<rusb::Context>) {
    match usb::probe_topology(device) {
        Ok(device_topology) => {
            let layout = match topology::resolve(&device_topology) {
                Ok((variant, _)) => variant_name(variant).to_owned(),
                Err(_) => "unrecognized layout".to_owned(),
            };
            println!(
                "{index}: bus {:03} address {:03} product {:#06x} ({layout})",
                device.bus_number(),
                device.address(),
                device_topology.product_id
            );
        }
        Err(e) => println!(
            "{index}: bus {:03} address {:03} (probe failed: {e})",
            device.bus_number(),
            device.address()
        ),
    }
}

fn variant_name(variant: DeviceVariant) -> &'static str {
    match variant {
        DeviceVariant::Usb2000 => "USB2000",
        DeviceVariant::Usb2000Plus => "USB2000+",
    }
}
