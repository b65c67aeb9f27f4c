#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use paceline::{Archive, Args, DataRoot};
use paceline_app::PacelineApp;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn setup_logging(debug: bool) {
    let default_filter = if debug { "paceline=debug" } else { "paceline=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn generate_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 900.0]),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (args, unrecognized) = Args::parse(&args);

    setup_logging(args.debug);
    for arg in &unrecognized {
        error!("unrecognized argument: {arg}");
    }

    let Some(user) = args.user.clone() else {
        error!("--user <id> is required");
        std::process::exit(1);
    };
    let archive = Archive::new(DataRoot::parse(&args.data_root), user);

    let _res = eframe::run_native(
        "Paceline",
        generate_native_options(),
        Box::new(move |cc| Ok(Box::new(PacelineApp::new(&cc.egui_ctx, archive, &args)))),
    );
}
