//! `codepoll watch` – keep the codes on screen until Ctrl-C.

use anyhow::{Context, Result};
use codepoll_core::config::CodepollConfig;
use codepoll_core::controller::{Controller, ControllerSettings};
use codepoll_core::render::TerminalRenderer;
use codepoll_core::source::HttpCodeSource;

pub async fn run_watch(cfg: &CodepollConfig, clear: bool) -> Result<()> {
    let source = HttpCodeSource::for_server(&cfg.server, cfg.http_timeouts())?;
    let url = source.url().to_string();
    tracing::info!(url = %url, "watching codes");

    let renderer = TerminalRenderer::stdout(clear);
    let handle = Controller::new(source, renderer, ControllerSettings::from(cfg)).start();
    let mut state = handle.subscribe();

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for Ctrl-C")?;
            handle.stop().await?;
            tracing::info!("stopped by user");
            Ok(())
        }
        _ = state.wait_for(|s| s.is_final()) => {
            // The page already shows the error; the controller is inert now.
            handle.wait().await?;
            anyhow::bail!("could not load codes from {}", url)
        }
    }
}
