mod collector;
mod export;
mod extract;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use collector::{blog_id_from_input, collect_posts, CollectorConfig};
use extract::PostRecord;

#[derive(Parser)]
#[command(name = "naver_scraper", about = "Naver blog post-list collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the post list and save it as an .xlsx spreadsheet
    Collect {
        /// Blog id, or a blog URL to take the id from
        blog: String,
        /// Max listing pages to fetch
        #[arg(short = 'n', long)]
        pages: Option<u32>,
        /// Output path (default: naver_blog_<id>.xlsx)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Collect and print a preview without writing a file
    Preview {
        /// Blog id, or a blog URL to take the id from
        blog: String,
        /// Max listing pages to fetch
        #[arg(short = 'n', long)]
        pages: Option<u32>,
        /// Preview row count
        #[arg(long, default_value = "10")]
        rows: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Collect { blog, pages, out } => {
            let blog_id = blog_id_from_input(&blog).to_string();
            let cfg = config_with(pages);
            let posts = collect_posts(&cfg, &blog_id).await?;
            if posts.is_empty() {
                println!("No posts found. Check the blog id, or the blog may be private.");
                Ok(())
            } else {
                print_preview(&posts, 10);
                let path = out.unwrap_or_else(|| PathBuf::from(export::default_filename(&blog_id)));
                export::write_xlsx(&posts, &path)?;
                println!("\nSaved {} posts to {}", posts.len(), path.display());
                Ok(())
            }
        }
        Commands::Preview { blog, pages, rows } => {
            let blog_id = blog_id_from_input(&blog).to_string();
            let cfg = config_with(pages);
            let posts = collect_posts(&cfg, &blog_id).await?;
            if posts.is_empty() {
                println!("No posts found. Check the blog id, or the blog may be private.");
            } else {
                print_preview(&posts, rows);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn config_with(pages: Option<u32>) -> CollectorConfig {
    let mut cfg = CollectorConfig::default();
    if let Some(n) = pages {
        cfg.page_limit = n;
    }
    cfg
}

fn print_preview(posts: &[PostRecord], rows: usize) {
    println!(
        "{:>3} | {:<44} | {:<14} | {:<44}",
        "#", "Title", "Date", "Link"
    );
    println!("{}", "-".repeat(113));

    for (i, p) in posts.iter().take(rows).enumerate() {
        println!(
            "{:>3} | {:<44} | {:<14} | {:<44}",
            i + 1,
            truncate(&p.title, 44),
            truncate(&p.date, 14),
            truncate(&p.link, 44),
        );
    }
    if posts.len() > rows {
        println!("... and {} more", posts.len() - rows);
    }

    println!("\n{} posts collected", posts.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
