use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xthread_lib::{parse_thread_input, publish_thread, Config, PostOptions, XConnector};

#[derive(Parser)]
#[command(name = "xthread")]
#[command(about = "Post numbered lines of text to X as a reply-chained thread")]
struct Args {
    /// File holding the thread text (reads stdin when omitted or "-")
    file: Option<PathBuf>,

    /// Print the parsed posts without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Pause after each post in milliseconds (overrides XTHREAD_POST_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let thread_text = read_input(args.file.as_ref())?;

    if args.dry_run {
        let posts = parse_thread_input(&thread_text);
        eprintln!("Parsed {} posts", posts.len());
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    let config = Config::from_env();
    let mut options = PostOptions::from_config(&config);
    if let Some(ms) = args.delay_ms {
        options.delay = Duration::from_millis(ms);
    }

    let connector = XConnector::from_config(&config);
    let report = publish_thread(&connector, &thread_text, &options).await;

    for line in &report.log {
        println!("{}", line);
    }

    if !report.success {
        bail!("thread was not fully posted");
    }

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
