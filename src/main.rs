mod crawl;
mod fetch;
mod output;
mod parser;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "niu_events", about = "NIU events calendar scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape all calendar pages and write the merged event file
    Scrape {
        /// Seconds to wait between page fetches
        #[arg(long, default_value_t = 2)]
        delay: u64,
        /// Output file (fully overwritten each run)
        #[arg(short, long, default_value = "niu-events.json")]
        out: PathBuf,
        /// Max pages to fetch (default: all discovered)
        #[arg(short = 'n', long)]
        max_pages: Option<u32>,
        /// Write page 1's raw HTML here for troubleshooting
        #[arg(long)]
        dump_html: Option<PathBuf>,
        /// Date anchor year for the six-month listing
        #[arg(long, default_value_t = fetch::DEFAULT_YEAR)]
        year: u16,
        /// Date anchor month
        #[arg(long, default_value_t = fetch::DEFAULT_MONTH)]
        month: u8,
        /// Date anchor day
        #[arg(long, default_value_t = fetch::DEFAULT_DAY)]
        day: u8,
    },
    /// Summarize a previously written event file
    Inspect {
        /// Event file to read
        #[arg(default_value = "niu-events.json")]
        file: PathBuf,
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
        Commands::Scrape {
            delay,
            out,
            max_pages,
            dump_html,
            year,
            month,
            day,
        } => {
            let source = fetch::CalendarSource {
                year,
                month,
                day,
                ..Default::default()
            };
            let fetcher = fetch::HttpFetcher::new(source)?;
            let options = crawl::CrawlOptions {
                delay: Duration::from_secs(delay),
                page_cap: max_pages,
                dump_first_page: dump_html,
            };

            let run = crawl::crawl(&fetcher, &options).await?;
            let merged = output::merge_events(run.events, &run.tags);
            let tagged = merged.iter().filter(|e| e.get("tags").is_some()).count();
            let doc = output::OutputDocument::new(merged);
            output::write_output(&out, &doc)?;

            println!(
                "Fetched {} pages ({} failed).",
                run.stats.pages_total, run.stats.pages_failed
            );
            println!(
                "{} unique events ({} with tags) saved to {}",
                doc.total_events,
                tagged,
                out.display()
            );
            Ok(())
        }
        Commands::Inspect { file } => {
            let doc = output::read_output(&file)?;
            let tagged = doc.events.iter().filter(|e| e.get("tags").is_some()).count();

            println!("File:      {}", file.display());
            println!("Updated:   {}", doc.last_updated);
            println!("Events:    {}", doc.total_events);
            println!("With tags: {}", tagged);

            let freq = tag_frequencies(&doc.events);
            if !freq.is_empty() {
                println!("\n--- Tags ---");
                for (tag, n) in freq {
                    println!("{:>5}  {}", n, tag);
                }
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

/// Tag usage counts across all events, most frequent first.
fn tag_frequencies(events: &[Value]) -> Vec<(String, usize)> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for event in events {
        if let Some(tags) = event.get("tags").and_then(Value::as_array) {
            for tag in tags.iter().filter_map(Value::as_str) {
                *freq.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
    }
    let mut rows: Vec<_> = freq.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
