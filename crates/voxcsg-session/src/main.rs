use std::process;
use std::sync::Arc;
use std::thread;

use voxcsg_session::channel;
use voxcsg_session::config::{CliAction, USAGE};
use voxcsg_session::render::{run_viewer, FrameForwarder};
use voxcsg_session::{SessionConfig, SessionController};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let workdir = std::env::current_dir().unwrap_or_default();
    let config = match SessionConfig::from_args(&args, &workdir) {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            eprintln!("{}", USAGE);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let (forwarder, frames) = FrameForwarder::channel();
    let controller = match SessionController::from_config(&config, Box::new(forwarder)) {
        Ok(controller) => Arc::new(controller),
        Err(e) => {
            log::error!("Failed to load shape definitions: {}", e);
            process::exit(1);
        }
    };
    log::info!(
        "Session ready: grid {}, store {}, export {}",
        config.grid_size,
        config.store_path,
        config.export_path.display()
    );

    let listen_addr = config.listen_addr.clone();
    let intake = thread::spawn(move || -> std::io::Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            channel::serve(listener, controller).await
        })
    });

    // Foreground loop; ends once the controller and its renderer are dropped.
    match tokio::runtime::Builder::new_current_thread().build() {
        Ok(viewer) => {
            viewer.block_on(run_viewer(frames));
        }
        Err(e) => log::error!("Failed to start viewer: {}", e),
    }

    match intake.join() {
        Ok(Ok(())) => log::info!("Session ended"),
        Ok(Err(e)) => {
            log::error!("Command channel failed: {}", e);
            process::exit(1);
        }
        Err(_) => {
            log::error!("Command channel thread panicked");
            process::exit(1);
        }
    }
}
