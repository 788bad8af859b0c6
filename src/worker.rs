use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::context::FdrContext;
use crate::error::Result;
use crate::feed::FeedSource;
use crate::ingest::IngestSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    Log(String),
    /// Sent exactly once for every `Refresh` command.
    Completed(Result<IngestSummary>),
}

/// Serves refresh requests on a background thread until `Shutdown` arrives
/// or the command channel closes. Requests are handled one at a time, so
/// there is only ever one writer.
pub fn spawn_refresher(
    ctx: Arc<FdrContext>,
    source: Arc<dyn FeedSource>,
    cmd_rx: Receiver<RefreshCommand>,
    tx: Sender<RefreshEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                RefreshCommand::Refresh => {
                    let _ = tx.send(RefreshEvent::Log(format!(
                        "[INFO] Refreshing from {}",
                        source.describe()
                    )));
                    let outcome = ctx.refresh_from(source.as_ref());
                    match &outcome {
                        Ok(summary) => {
                            let _ = tx.send(RefreshEvent::Log(format!(
                                "[INFO] Loaded {} teams, {} fixtures",
                                summary.teams, summary.fixtures
                            )));
                        }
                        Err(err) => {
                            let _ = tx.send(RefreshEvent::Log(format!(
                                "[WARN] Refresh failed: {err}"
                            )));
                        }
                    }
                    if tx.send(RefreshEvent::Completed(outcome)).is_err() {
                        break;
                    }
                }
                RefreshCommand::Shutdown => break,
            }
        }
        log::debug!("refresh worker stopped");
    })
}
