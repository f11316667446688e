//! Feeds a recorded `text/event-stream` transcript into the event channel.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use meshdash_telemetry::{RawEvent, SseDecoder, SseFrame};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;

/// Current unix time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Outcome of forwarding one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forward {
    Sent,
    Skipped,
    Closed,
}

/// Decode `reader` line by line and send each tagged frame to `tx`.
///
/// Frames with an unknown event name or an undecodable line are skipped.
/// Returns the number of frames sent; stops early if the receiver is gone.
pub async fn replay<R>(
    mut reader: R,
    tx: mpsc::Sender<RawEvent>,
    interval: Duration,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut decoder = SseDecoder::new();
    let mut buf = Vec::new();
    let mut sent = 0;
    let mut first = true;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).await?;
        let frame = if read == 0 {
            match decoder.finish() {
                Some(frame) => frame,
                None => break,
            }
        } else {
            let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let decoded = match std::str::from_utf8(raw) {
                Ok(line) => decoder.push_line(line),
                Err(e) => {
                    warn!(error = %e, "undecodable stream line");
                    decoder.push_invalid();
                    None
                }
            };
            match decoded {
                Some(frame) => frame,
                None => continue,
            }
        };
        if !first && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        first = false;
        match forward(frame, &tx).await {
            Forward::Sent => sent += 1,
            Forward::Skipped => {}
            Forward::Closed => break,
        }
    }
    debug!(sent, "transcript finished");
    Ok(sent)
}

/// Replay a transcript file.
pub async fn replay_file(
    path: &Path,
    tx: mpsc::Sender<RawEvent>,
    interval: Duration,
) -> Result<usize> {
    let file = tokio::fs::File::open(path).await?;
    replay(BufReader::new(file), tx, interval).await
}

async fn forward(frame: SseFrame, tx: &mpsc::Sender<RawEvent>) -> Forward {
    let event = frame.event.clone();
    match frame.into_raw(now_ms()) {
        Ok(raw) => match tx.send(raw).await {
            Ok(()) => Forward::Sent,
            Err(_) => Forward::Closed,
        },
        Err(e) => {
            warn!(event = %event, error = %e, "skipping stream frame");
            Forward::Skipped
        }
    }
}
