//! Interactive place search against the public Nominatim instance
//!
//! Each line typed is fed to the engine one character at a time, like a burst
//! of keystrokes, so only one lookup goes out per line:
//! - `<text>` replace the field with `<text>` and search
//! - `:<n>` commit candidate number `<n>`
//! - `:q` quit
//!
//! Run with `cargo run --example interactive_search`. Set `RUST_LOG=debug` to
//! see debouncing and stale-response handling.

use anyhow::Context;
use placefinder::{GeocoderConfig, LocationSearch, Update, init_logging};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(tracing::Level::INFO)?;

    let config = GeocoderConfig::builder()
        .user_agent(format!(
            "placefinder-example/{} (https://github.com/SamBroomy/placefinder)",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;
    let mut search = LocationSearch::builder_nominatim(config)?
        .on_location_select(|place| {
            println!(
                "Selected: {} ({:.4}, {:.4})",
                place.name, place.latitude, place.longitude
            );
        })
        .on_search_failure(|failure| eprintln!("{}: {}", failure.title(), failure.message()))
        .build();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type a place (':<n>' to select, ':q' to quit)");

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim_end();
        match line.strip_prefix(':') {
            Some("q") => break,
            Some(index) => match index.parse::<usize>() {
                Ok(n) if n > 0 => {
                    if let Err(err) = search.select(n - 1) {
                        eprintln!("{err}");
                    }
                }
                _ => eprintln!("Expected ':<n>' with n starting at 1"),
            },
            None => {
                let mut typed = String::new();
                for ch in line.chars() {
                    typed.push(ch);
                    search.text_changed(typed.clone());
                }
                if line.is_empty() {
                    search.text_changed("");
                }
                for update in search.settle().await {
                    if let Update::ResultsApplied { count, .. } = update {
                        println!("{count} result(s) for '{}'", search.query());
                    }
                }
                for (i, candidate) in search.candidates().iter().enumerate() {
                    println!("  {}. {} [{}]", i + 1, candidate.label(), candidate.kind);
                }
            }
        }
    }

    search.shutdown();
    Ok(())
}
