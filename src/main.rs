use anyhow::Context;
use clap::Parser;
use cncpanel::{init_logging, list_ports, run_panel, Args, ConsolePresentation, HeadlessPresentation};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_ports {
        return print_ports();
    }

    init_logging()?;
    tracing::info!("CNC Panel {} (built {})", cncpanel::VERSION, cncpanel::BUILD_DATE);

    let config = args.load_config()?;
    let reason = if args.headless {
        run_panel(&config, &mut HeadlessPresentation)?
    } else {
        let mut console = ConsolePresentation::stdin().context("starting console input")?;
        run_panel(&config, &mut console)?
    };

    tracing::info!("Exiting ({:?})", reason);
    Ok(())
}

fn print_ports() -> anyhow::Result<()> {
    let ports = list_ports().context("listing serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}\t{}", port.port_name, port.description);
    }
    Ok(())
}
