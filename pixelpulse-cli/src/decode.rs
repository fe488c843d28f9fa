use std::{
    future::Future,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
};

use pixelpulse::modem::sstv::{
    DecodedImage,
    DecoderConfig,
    Error as SstvError,
    Progress,
    decode_file,
};
use tokio::{
    sync::watch,
    task::{
        JoinError,
        JoinHandle,
    },
};

use crate::Error;

/// Outcome of a decode job.
#[derive(Debug)]
pub enum Decoded {
    Complete(DecodedImage),
    Cancelled { lines_decoded: usize },
}

/// Runs the decoder on the blocking thread pool.
///
/// Progress is logged as it arrives and Ctrl-C cancels the decode.
pub async fn decode_in_background(input: PathBuf, config: DecoderConfig) -> Result<Decoded, Error> {
    let cancel = Arc::new(AtomicBool::new(false));
    let (progress_tx, progress_rx) = watch::channel(None::<Progress>);

    let task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || {
            decode_file(&input, &config, Some(cancel), |progress| {
                progress_tx.send_replace(Some(progress));
            })
        }
    });

    let result = supervise(task, progress_rx, &cancel, tokio::signal::ctrl_c()).await?;

    match result {
        Ok(decoded) => Ok(Decoded::Complete(decoded)),
        Err(SstvError::Cancelled(cancelled)) => {
            Ok(Decoded::Cancelled {
                lines_decoded: cancelled.lines_decoded,
            })
        }
        Err(error) => Err(error.into()),
    }
}

/// Waits for `task`, logging progress every 10% and raising `cancel` once
/// `interrupt` resolves.
async fn supervise<T>(
    mut task: JoinHandle<Result<T, SstvError>>,
    mut progress_rx: watch::Receiver<Option<Progress>>,
    cancel: &AtomicBool,
    interrupt: impl Future,
) -> Result<Result<T, SstvError>, JoinError> {
    tokio::pin!(interrupt);

    let mut last_logged_percent = None;
    loop {
        tokio::select! {
            result = &mut task => break result,
            changed = progress_rx.changed() => {
                if changed.is_err() {
                    // sender dropped, the task is about to finish
                    break (&mut task).await;
                }
                if let Some(progress) = *progress_rx.borrow_and_update() {
                    let percent = (progress.fraction * 100.0) as u32;
                    if last_logged_percent.is_none_or(|last| percent >= last + 10) {
                        last_logged_percent = Some(percent);
                        tracing::info!(percent, lines = progress.line_count, "decoding");
                    }
                }
            }
            _ = &mut interrupt, if !cancel.load(Ordering::Relaxed) => {
                tracing::warn!("Cancelling decode");
                cancel.store(true, Ordering::Relaxed);
            }
        }
    }
}
