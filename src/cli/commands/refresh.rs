//! Suggestion refresh command.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::config::{EngineConfig, Settings};
use crate::suggest::{RefreshOutcome, SuggestionEvent, SuggestionService};

/// Refresh suggestions once, for one document, or continuously.
pub async fn cmd_refresh(
    settings: &Settings,
    engine: &EngineConfig,
    document_id: Option<i32>,
    force: bool,
    daemon: bool,
    interval: u64,
) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;
    let service = SuggestionService::new(ctx, engine.clone())?;

    // If specific document provided, process just that one (no daemon mode)
    if let Some(id) = document_id {
        println!("{} Refreshing document {}", style("→").cyan(), id);
        match service.refresh_document(id, force).await? {
            RefreshOutcome::Unchanged => {
                println!("{} Document {} unchanged", style("✓").green(), id);
            }
            RefreshOutcome::Updated {
                suggestions,
                candidates,
                fragments,
            } => {
                println!(
                    "{} Document {}: {} suggestions ({} candidates, {} fragments)",
                    style("✓").green(),
                    id,
                    suggestions,
                    candidates,
                    fragments
                );
            }
        }
        return Ok(());
    }

    if daemon {
        println!(
            "{} Running in daemon mode (interval: {}s, threshold: {}, n-grams up to {})",
            style("→").cyan(),
            interval,
            engine.threshold,
            engine.max_ngram
        );
    }

    // At most one refresh pass runs at a time: the next one starts only after
    // this loop iteration finishes.
    loop {
        let (event_tx, event_rx) = mpsc::channel::<SuggestionEvent>(100);
        let event_handler = tokio::spawn(render_events(event_rx));

        let result = service.refresh_all(force, event_tx).await;

        // Wait for event handler to finish
        let _ = event_handler.await;

        match result {
            Ok(_) => {}
            Err(e) if daemon => {
                println!("{} Refresh failed: {}", style("✗").red(), e);
            }
            Err(e) => return Err(e.into()),
        }

        if !daemon {
            break;
        }

        println!(
            "{} Sleeping for {}s before next run...",
            style("→").dim(),
            interval
        );
        tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
    }

    Ok(())
}

async fn render_events(mut event_rx: mpsc::Receiver<SuggestionEvent>) {
    let mut pb: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            SuggestionEvent::Started { total_documents } => {
                let progress = ProgressBar::new(total_documents as u64);
                if let Ok(bar_style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                {
                    progress.set_style(bar_style.progress_chars("█▓░"));
                }
                progress.set_message("Refreshing...");
                pb = Some(progress);
            }
            SuggestionEvent::DocumentStarted { document_id } => {
                if let Some(ref progress) = pb {
                    progress.set_message(format!("document {}", document_id));
                }
            }
            SuggestionEvent::DocumentUnchanged { .. } => {
                if let Some(ref progress) = pb {
                    progress.inc(1);
                }
            }
            SuggestionEvent::DocumentCompleted {
                document_id,
                suggestions,
                ..
            } => {
                if let Some(ref progress) = pb {
                    progress.set_message(format!(
                        "document {}: {} suggestions",
                        document_id, suggestions
                    ));
                    progress.inc(1);
                }
            }
            SuggestionEvent::DocumentFailed { document_id, error } => {
                if let Some(ref progress) = pb {
                    progress.println(format!(
                        "{} document {}: {}",
                        style("✗").red(),
                        document_id,
                        error
                    ));
                    progress.inc(1);
                }
            }
            SuggestionEvent::Complete {
                updated,
                unchanged,
                failed,
            } => {
                if let Some(ref progress) = pb {
                    progress.finish_and_clear();
                }
                pb = None;

                let mark = if failed > 0 {
                    style("!").yellow()
                } else {
                    style("✓").green()
                };
                println!(
                    "{} Refresh complete: {} updated, {} unchanged, {} failed",
                    mark, updated, unchanged, failed
                );
            }
        }
    }
}
