use anyhow::{Context, Result};
use clap::Parser;
use cv_analyzer::app::App;
use cv_analyzer::config::{Settings, DEFAULT_SETTINGS_FILE};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "cv-analyzer")]
#[command(about = "Analyze an image and save a smart-cropped thumbnail")]
struct CliArgs {
    /// Path to the JSON settings file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
}

async fn read_image_reference() -> Result<String> {
    print!("Enter a URL or a local file that you want to analyze: ");
    std::io::stdout().flush().context("failed to write prompt")?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read image reference from stdin")?;
    Ok(line)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cv_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let app = match Settings::load(&args.settings).and_then(|settings| App::new(&settings)) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            println!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    let input = read_image_reference().await?;
    let mut stdout = std::io::stdout();

    tokio::select! {
        outcome = app.run(&input, &mut stdout) => match outcome {
            Ok(report) => {
                let code = report.exit_code();
                if code == 0 {
                    info!("Analysis of {} completed successfully", report.source);
                    Ok(())
                } else {
                    std::process::exit(code);
                }
            }
            Err(e) => {
                println!("{}", e);
                std::process::exit(e.exit_code());
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted before the run completed");
            std::process::exit(EXIT_INTERRUPTED);
        }
    }
}
