use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use take_recorder_app::cli::Args;
use take_recorder_app::commands::{ConsoleCommand, HELP};
use take_recorder_app::{ConsoleStatusSink, Controller, CpalProvider, DeviceEnumerator, Flow};
use take_recorder_core::{AutoCycleScheduler, RecordingSession, SharedInputs, StatusSink};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.list_devices {
        return list_devices();
    }

    let config = args.capture_config();
    log::info!(
        "Writing takes to {} ({} Hz, {} ch, {})",
        config.output_directory.display(),
        config.sample_rate,
        config.channels,
        config.sample_format
    );

    let sink: Arc<dyn StatusSink> = Arc::new(ConsoleStatusSink::stdout());
    let provider = CpalProvider::new().with_status_sink(Arc::clone(&sink));
    let mut session = RecordingSession::new(config, Arc::new(provider)).context("invalid capture configuration")?;
    session.set_status_sink(sink);
    let session = Arc::new(session);

    let inputs = Arc::new(SharedInputs::new(args.device.clone(), args.tag_tuple()));
    inputs.set_wait_seconds(args.wait.clone());
    inputs.set_record_seconds(args.record.clone());

    let scheduler = AutoCycleScheduler::new(&session, inputs.clone());
    let controller = Controller::new(session, scheduler, inputs);

    println!("{}", HELP);
    if args.auto {
        controller.handle(ConsoleCommand::ToggleAuto);
    }

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let command = match ConsoleCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            ConsoleCommand::ListDevices => {
                if let Err(e) = list_devices() {
                    println!("{:#}", e);
                }
            }
            ConsoleCommand::Help => println!("{}", HELP),
            command => {
                if controller.handle(command) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }

    // stdin closed
    controller.shutdown();
    Ok(())
}

fn list_devices() -> Result<()> {
    let devices = DeviceEnumerator::new()
        .list_input_devices()
        .context("failed to list input devices")?;
    if devices.is_empty() {
        println!("No input devices found");
    }
    for device in devices {
        let marker = if device.is_default { "*" } else { " " };
        println!("{} {}", marker, device.name);
    }
    Ok(())
}
