//! Debounced filesystem watching over the projects root.
//!
//! The generative assistant is never spoken to directly; the engine
//! only observes what it leaves behind. A recursive watcher collects
//! create/modify events and holds them until the tree has been quiet
//! for a settle window, so a file is never classified mid-write.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::engine::Engine;

/// Watch the projects root and feed settled events to the engine's
/// dispatcher. Runs until the watch channel closes.
pub async fn watch_projects(engine: &Engine) -> Result<()> {
    let root = engine.config().projects_root.clone();
    let debounce = engine.config().debounce;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            for path in event.paths {
                let _ = tx.send(path);
            }
        }
    })
    .context("Failed to create filesystem watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch projects root {}", root.display()))?;

    tracing::info!(root = %root.display(), "watching for artifact changes");
    run_dispatch_loop(engine, rx, debounce).await;
    Ok(())
}

/// Collect changed paths until the channel has been quiet for the
/// settle window, then dispatch the batch. Exposed to tests through
/// the channel rather than a real watcher.
pub(crate) async fn run_dispatch_loop(
    engine: &Engine,
    mut rx: mpsc::UnboundedReceiver<PathBuf>,
    debounce: Duration,
) {
    let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
    let mut open = true;

    while open {
        match rx.recv().await {
            Some(path) => {
                pending.insert(path);
            }
            None => break,
        }

        // Absorb follow-up events until the tree settles.
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(path)) => {
                    pending.insert(path);
                }
                Ok(None) => {
                    open = false;
                    break;
                }
                Err(_) => break,
            }
        }

        for path in std::mem::take(&mut pending) {
            match engine.handle_file_event(&path) {
                Ok(Some(record)) => {
                    tracing::info!(
                        path = %path.display(),
                        now_at = %record.current_phase_key,
                        "event advanced workflow"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "event handling failed");
                }
            }
        }
    }
}
