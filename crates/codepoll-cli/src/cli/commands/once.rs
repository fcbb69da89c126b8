//! `codepoll once` – fetch and print the current codes.

use anyhow::{Context, Result};
use codepoll_core::config::CodepollConfig;
use codepoll_core::model::CodeSet;
use codepoll_core::source::{CodeSource, HttpCodeSource};

pub async fn run_once(cfg: &CodepollConfig) -> Result<()> {
    let source = HttpCodeSource::for_server(&cfg.server, cfg.http_timeouts())?;
    let set = source
        .fetch()
        .await
        .with_context(|| format!("fetch {}", source.url()))?;
    print!("{}", format_codes(&set));
    Ok(())
}

/// `<code>: <name>` per account, then how long the codes stay valid.
fn format_codes(set: &CodeSet) -> String {
    let mut out = String::new();
    for code in &set.codes {
        out.push_str(&format!("{}: {}\n", code.value, code.name));
    }
    out.push_str(&format!("\tGood for {:.6} seconds.\n", set.valid_for().as_secs_f64()));
    out
}
