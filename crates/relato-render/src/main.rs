//! Narration-to-video rendering binary.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relato_render::{pipeline, Cli};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("relato=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let cli = Cli::parse();

    let cfg = match cli.to_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let paths = cli.to_paths();

    info!(
        script = %paths.script.display(),
        output = %paths.output.display(),
        canvas = %cfg.canvas,
        "Starting relato-render"
    );

    match pipeline::run(&paths, &cfg).await {
        Ok(out) => {
            info!(
                video = %out.video.display(),
                duration = format!("{:.3}", out.duration),
                turns = out.turns,
                groups = out.groups,
                subtitles = out.subtitle_entries,
                "Render complete"
            );
        }
        Err(e) => {
            error!("Render failed: {}", e);
            std::process::exit(1);
        }
    }
}
