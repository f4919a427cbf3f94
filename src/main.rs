use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use spacetraveling::config::{self, Config};
use spacetraveling::export;
use spacetraveling::paginator::{load_more, LoadMore, PaginationState};
use spacetraveling::prismic::{ContentFetcher, PrismicClient};
use spacetraveling::reading_time;
use spacetraveling::render;

#[derive(Debug, Parser)]
#[command(author, version, about = "Render a Prismic-backed blog")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the post list, loading more on demand
    List,
    /// Show one post with its reading time
    Post {
        /// Post uid (slug)
        uid: String,
    },
    /// Write the list pages and every listed post as static HTML
    Export {
        /// Override app.out_dir
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print an example configuration
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    match args.command {
        Command::ExampleConfig => {
            print!("{}", config::example());
            Ok(())
        }
        Command::List => {
            let (cfg, client) = load_client(&args.config)?;
            run_list(&cfg, &client).await
        }
        Command::Post { uid } => {
            let (_, client) = load_client(&args.config)?;
            run_post(&client, &uid).await
        }
        Command::Export { out_dir } => {
            let (mut cfg, client) = load_client(&args.config)?;
            if let Some(dir) = out_dir {
                cfg.app.out_dir = dir.to_string_lossy().to_string();
            }
            cfg.ensure_dirs()?;
            let summary = export::export_site(
                &client,
                Path::new(&cfg.app.out_dir),
                cfg.app.page_size,
                cfg.app.export_concurrency,
            )
            .await?;
            println!(
                "Wrote {} list page(s) and {} post(s) to {}",
                summary.list_pages, summary.posts, cfg.app.out_dir
            );
            Ok(())
        }
    }
}

/// Load the config file, apply `PRISMIC_ACCESS_TOKEN`, and build the client.
fn load_client(path: &Path) -> Result<(Config, PrismicClient)> {
    let mut cfg = config::load(Some(path))
        .with_context(|| format!("failed to load {}", path.display()))?;
    if let Ok(token) = std::env::var("PRISMIC_ACCESS_TOKEN") {
        cfg.prismic.access_token = Some(token);
    }
    let client = PrismicClient::from_config(&cfg.prismic)?;
    Ok((cfg, client))
}

async fn run_list(cfg: &Config, client: &PrismicClient) -> Result<()> {
    let first = client
        .query(cfg.app.page_size, None)
        .await
        .context("failed to fetch posts")?;
    let mut state = PaginationState::initialize(first);
    for entry in state.entries() {
        println!("{}\n", render::entry_line(entry));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while state.has_more() {
        println!("[{}] Enter to load, q to quit", render::LOAD_MORE_LABEL);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        let shown = state.entries().len();
        match load_more(&mut state, client).await {
            Ok(LoadMore::Appended(added)) => {
                info!(added, "loaded more posts");
                for entry in &state.entries()[shown..] {
                    println!("{}\n", render::entry_line(entry));
                }
            }
            Ok(LoadMore::Exhausted) | Ok(LoadMore::InFlight) => {}
            // The token stays available; the next Enter retries it.
            Err(err) => error!(%err, "failed to load more posts"),
        }
    }
    Ok(())
}

async fn run_post(client: &PrismicClient, uid: &str) -> Result<()> {
    let article = client
        .get_by_uid(uid)
        .await
        .with_context(|| format!("failed to fetch post {}", uid))?;
    let reading = reading_time::estimate(&article);
    print!("{}", render::article_text(&article, reading));
    Ok(())
}
