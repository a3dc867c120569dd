use std::path::{Path, PathBuf};

use aurora_watch::{
    AppConfig, AuroraError,
    pipeline::{self, HttpFrameSource},
    ui::live::LiveAuroraApp,
};
use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the latest frames and publish a fresh animation per channel
    Fetch {
        /// Only process these channels
        #[arg(long)]
        channel: Vec<String>,
    },
    /// Show the newest published animations fullscreen
    View {
        #[arg(long)]
        check_interval_s: Option<u64>,

        #[arg(long)]
        tick_ms: Option<u64>,

        #[arg(short, long)]
        signal_file: Option<PathBuf>,

        #[arg(short, long)]
        windowed: bool,
    },
    /// Write the default configuration file
    InitConfig {
        #[arg(short, long)]
        force: bool,
    },
}

fn fetch(app_config: &AppConfig, channels: &[String]) -> Result<(), AuroraError> {
    let mut source = HttpFrameSource::new()?;
    let reports = pipeline::run_pipeline(app_config, &mut source, channels)?;
    for report in &reports {
        match &report.published {
            Some(path) => info!(
                "{}: published {} frames to {:?} ({} downloads failed)",
                report.channel, report.encoded_frames, path, report.download.failed
            ),
            None => warn!("{}: nothing published this cycle", report.channel),
        }
    }
    Ok(())
}

fn view(app_config: AppConfig) -> Result<(), AuroraError> {
    let title = app_config
        .channels
        .iter()
        .map(|c| c.display_title.as_str())
        .collect::<Vec<_>>()
        .join("    |    ");

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title(title)
        .with_inner_size(Vec2::new(800., 400.))
        .with_fullscreen(app_config.fullscreen);

    eframe::run_native(
        "aurora-watch",
        native_options,
        Box::new(|cc| Ok(Box::new(LiveAuroraApp::new(app_config, cc)))),
    )
    .map_err(|e| AuroraError::UiError {
        description: e.to_string(),
    })
}

fn init_config(path: Option<&Path>, force: bool) -> Result<(), AuroraError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::default_path()?,
    };
    if config_path.exists() && !force {
        warn!(
            "Config file {:?} already exists, use --force to overwrite it",
            config_path
        );
        return Ok(());
    }
    AppConfig::default().save_to(&config_path)?;
    info!("Wrote default config to {:?}", config_path);
    Ok(())
}

fn run(cli: Args) -> Result<(), AuroraError> {
    match cli.command {
        Commands::Fetch { channel } => {
            let app_config = AppConfig::load(cli.config.as_deref())?;
            fetch(&app_config, &channel)
        }
        Commands::View {
            check_interval_s,
            tick_ms,
            signal_file,
            windowed,
        } => {
            let mut app_config = AppConfig::load(cli.config.as_deref())?;
            if let Some(interval) = check_interval_s {
                app_config.check_interval_s = interval;
            }
            if let Some(tick) = tick_ms {
                app_config.tick_ms = tick;
            }
            if signal_file.is_some() {
                app_config.signal_file = signal_file;
            }
            if windowed {
                app_config.fullscreen = false;
            }
            view(app_config)
        }
        Commands::InitConfig { force } => init_config(cli.config.as_deref(), force),
    }
}

fn main() {
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
