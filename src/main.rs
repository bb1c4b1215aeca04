use clap::Parser;
use log::{error, info};
use od_portal::configuration::{CliArgs, Config};
use od_portal::controller::Controller;

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
 ██████╗ ██████╗     ██████╗  ██████╗ ██████╗ ████████╗ █████╗ ██╗
██╔═══██╗██╔══██╗    ██╔══██╗██╔═══██╗██╔══██╗╚══██╔══╝██╔══██╗██║
██║   ██║██║  ██║    ██████╔╝██║   ██║██████╔╝   ██║   ███████║██║
██║   ██║██║  ██║    ██╔═══╝ ██║   ██║██╔══██╗   ██║   ██╔══██║██║
╚██████╔╝██████╔╝    ██║     ╚██████╔╝██║  ██║   ██║   ██║  ██║███████╗
 ╚═════╝ ╚═════╝     ╚═╝      ╚═════╝ ╚═╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚══════╝
=======================================================================
           On-Duty request, approval and letter portal v{}
=======================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    info!("Importing configuration");

    let args = CliArgs::parse();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration imported successfully");

    let mut controller = match Controller::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Unable to create a controller instance: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    let result = tokio::spawn(async move {
        info!("Spawning the controller");
        controller.run().await
    });

    match result.await {
        Ok(Ok(())) => info!("Controller stopped"),
        Ok(Err(e)) => {
            error!("Error occurred in the controller process: {}, exiting...", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Error joining at the end of execution: {:?}", e);
            std::process::exit(1);
        }
    }
}
