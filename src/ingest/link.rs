use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::{errors::IngestError, models::Sample};

use super::parser::parse_raw_line;

// Set to false to silence per-line logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Sample(Sample),
    Rejected { line: String, error: IngestError },
    Closed(LinkClosed),
}

/// Why the link stopped delivering lines.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkClosed {
    EndOfStream,
    TimedOut(Duration),
    Failed(String),
    Cancelled,
}

pub async fn open_device(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open device {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Read `reactor;vapor` lines until the link ends, forwarding each outcome to `events`.
///
/// The watchdog is re-armed only by valid samples; rejected lines do not keep the link
/// alive. The close reason is sent as the final event and also returned.
pub async fn read_link<R>(
    mut reader: R,
    timeout: Duration,
    events: mpsc::Sender<LinkEvent>,
    cancel: CancellationToken,
) -> LinkClosed
where
    R: AsyncBufRead + Unpin,
{
    let mut deadline = Instant::now() + timeout;
    let mut buf = Vec::with_capacity(64);

    let reason = loop {
        buf.clear();
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                match read {
                    Ok(0) => break LinkClosed::EndOfStream,
                    Ok(_) => {
                        let event = match parse_raw_line(&buf) {
                            Ok(reading) => {
                                deadline = Instant::now() + timeout;
                                let sample = Sample::new(Local::now(), reading.reactor, reading.vapor);
                                log_debug!("sample reactor={} vapor={}", sample.reactor, sample.vapor);
                                LinkEvent::Sample(sample)
                            }
                            Err(error) => {
                                let line = String::from_utf8_lossy(&buf).trim().to_string();
                                log_warn!("rejected device line {line:?}: {error}");
                                LinkEvent::Rejected { line, error }
                            }
                        };
                        if !forward(&events, event, &cancel).await {
                            break LinkClosed::Cancelled;
                        }
                    }
                    Err(err) => break LinkClosed::Failed(err.to_string()),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                log_warn!("no sample within {}s, closing link", timeout.as_secs());
                break LinkClosed::TimedOut(timeout);
            }
            _ = cancel.cancelled() => {
                break LinkClosed::Cancelled;
            }
        }
    };

    log_info!("device link closed: {reason:?}");
    forward(&events, LinkEvent::Closed(reason.clone()), &cancel).await;
    reason
}

/// Send one event unless the consumer is gone or the link was cancelled while the
/// channel is full. Returns whether the event was delivered.
async fn forward(
    events: &mpsc::Sender<LinkEvent>,
    event: LinkEvent,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        sent = events.send(event) => sent.is_ok(),
        _ = cancel.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &'static [u8], timeout: Duration) -> (Vec<LinkEvent>, LinkClosed) {
        let (tx, mut rx) = mpsc::channel(16);
        let reason = read_link(input, timeout, tx, CancellationToken::new()).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (events, reason)
    }

    #[tokio::test]
    async fn forwards_samples_and_rejections_until_eof() {
        let (events, reason) =
            collect(b"251.3;27.8\ngarbage\n240.0;25.0\n", Duration::from_secs(30)).await;

        assert_eq!(reason, LinkClosed::EndOfStream);
        assert_eq!(events.len(), 4);
        match &events[0] {
            LinkEvent::Sample(s) => {
                assert_eq!(s.reactor, 251.3);
                assert_eq!(s.vapor, 27.8);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            events[1],
            LinkEvent::Rejected {
                line: "garbage".into(),
                error: IngestError::FieldCount(1),
            }
        );
        assert!(matches!(events[2], LinkEvent::Sample(_)));
        assert_eq!(events[3], LinkEvent::Closed(LinkClosed::EndOfStream));
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_closes_a_silent_link() {
        let (client, _server) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::channel(4);
        let reason = read_link(
            BufReader::new(client),
            Duration::from_secs(30),
            tx,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(reason, LinkClosed::TimedOut(Duration::from_secs(30)));
        assert_eq!(
            rx.recv().await,
            Some(LinkEvent::Closed(LinkClosed::TimedOut(Duration::from_secs(30))))
        );
    }

    #[tokio::test]
    async fn cancellation_unblocks_a_reader_stuck_on_a_full_channel() {
        let input: String = (0..200).map(|i| format!("{};50\n", 200 + i)).collect();
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let link = tokio::spawn(read_link(
            std::io::Cursor::new(input.into_bytes()),
            Duration::from_secs(30),
            tx,
            cancel.clone(),
        ));

        // Let the reader fill the channel and block on the next send.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(rx.len(), 4);

        cancel.cancel();
        let reason = tokio::time::timeout(Duration::from_secs(3), link)
            .await
            .expect("reader should stop after cancel")
            .unwrap();
        assert_eq!(reason, LinkClosed::Cancelled);
        drop(rx);
    }

    #[tokio::test]
    async fn cancellation_stops_the_reader() {
        let (client, _server) = tokio::io::duplex(64);
        let (tx, _rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let reason =
            read_link(BufReader::new(client), Duration::from_secs(30), tx, cancel).await;
        assert_eq!(reason, LinkClosed::Cancelled);
    }
}
