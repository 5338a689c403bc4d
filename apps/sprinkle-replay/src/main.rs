mod decode;
mod replay;
mod scenario;

use clap::Parser;
use scenario::Scenario;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_enhance::EnhanceConfig;
use sp_html::HtmlParser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sprinkle-replay")]
#[command(version, about = "Enhance a documentation page and replay a scripted session against it")]
struct Cli {
    /// HTML page to enhance
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// Scenario TOML with viewport, element boxes and steps
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Enhancer config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page URL, overriding the scenario's
    #[arg(long, value_name = "URL")]
    page_url: Option<String>,

    /// Start with a dark color-scheme preference
    #[arg(long)]
    dark: bool,

    /// Print the enhanced markup after the trace
    #[arg(long)]
    dump_html: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("sprinkle-replay: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> SprinkleResult<()> {
    let bytes = std::fs::read(&cli.page).map_err(|error| {
        SprinkleError::new(
            "replay.page.read",
            format!("failed to read {}: {error}", cli.page.display()),
        )
    })?;
    let document = HtmlParser.parse(&decode::decode_page(&bytes));
    info!(
        page = %cli.page.display(),
        title = document.title.as_str(),
        nodes = document.node_count(),
        "page loaded"
    );

    let config = match &cli.config {
        Some(path) => EnhanceConfig::load(path)?,
        None => EnhanceConfig::default(),
    };
    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(url) = &cli.page_url {
        scenario.page_url.clone_from(url);
    }
    scenario.prefers_dark |= cli.dark;

    let output = replay::replay(document, &scenario, config)?;
    for line in &output.trace {
        println!("{line}");
    }
    if cli.dump_html {
        println!("{}", sp_html::to_html(&output.document));
    }
    Ok(())
}
