use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::config::ReportConfig;
use crate::models::portfolio::Portfolio;
use crate::report::composer::{render_pdf, Composer};

/// Where a report run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing,
    Rendering,
    Done,
    Failed,
}

/// Snapshot of a run, published over the watch channel after every
/// state change. `percent` is 0..=100 within the composing phase.
#[derive(Debug, Clone)]
pub struct ReportStatus {
    pub phase: Phase,
    pub percent: f32,
    pub error: Option<String>,
}

impl ReportStatus {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            percent: 0.0,
            error: None,
        }
    }
}

/// Runs report generation in the background, one run at a time.
///
/// The worker task is the only status writer; observers hold watch
/// receivers and never contend with it. A second `start` while a run
/// is in flight is refused rather than queued.
pub struct ReportWorker {
    composer: Arc<Composer>,
    running: Arc<AtomicBool>,
    tx: watch::Sender<ReportStatus>,
    rx: watch::Receiver<ReportStatus>,
}

impl ReportWorker {
    pub fn new(composer: Arc<Composer>) -> Self {
        let (tx, rx) = watch::channel(ReportStatus::idle());
        Self {
            composer,
            running: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    /// Subscribe to status updates for the current and future runs.
    pub fn status(&self) -> watch::Receiver<ReportStatus> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Kick off a background run. Returns as soon as the task is
    /// spawned; completion is observable through `status()`.
    pub fn start(
        &self,
        portfolio: Portfolio,
        config: ReportConfig,
        output_dir: PathBuf,
    ) -> Result<(), CoreError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyRunning);
        }

        let composer = Arc::clone(&self.composer);
        let running = Arc::clone(&self.running);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let _ = tx.send(ReportStatus {
                phase: Phase::Composing,
                percent: 0.0,
                error: None,
            });

            let progress_tx = tx.clone();
            let composed = composer
                .compose_document(&portfolio, &config, &output_dir, move |fraction| {
                    let _ = progress_tx.send(ReportStatus {
                        phase: Phase::Composing,
                        percent: fraction * 100.0,
                        error: None,
                    });
                })
                .await;

            let result = match composed {
                Ok(_) => {
                    let _ = tx.send(ReportStatus {
                        phase: Phase::Rendering,
                        percent: 100.0,
                        error: None,
                    });
                    render_pdf(&output_dir)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    info!("report run finished: {}", output_dir.display());
                    let _ = tx.send(ReportStatus {
                        phase: Phase::Done,
                        percent: 100.0,
                        error: None,
                    });
                }
                Err(e) => {
                    error!("report run failed: {e}");
                    let _ = tx.send(ReportStatus {
                        phase: Phase::Failed,
                        percent: 0.0,
                        error: Some(e.to_string()),
                    });
                }
            }

            running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }
}
