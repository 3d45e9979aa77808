//! Bidirectional frame pump.
//!
//! One pump per direction reads from a leg and writes to the other, one frame
//! at a time, so each direction preserves arrival order. The first pump to
//! stop ends the relay; the other leg is then closed.

use std::fmt;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::debug;

use super::frame::{CLOSE_INTERNAL_ERROR, CloseInfo, Frame, RelayMessage};

/// Upper bound on teardown writes to a leg that has stopped reading.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// One side of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Client,
    Upstream,
}

impl Leg {
    pub fn other(self) -> Self {
        match self {
            Leg::Client => Leg::Upstream,
            Leg::Upstream => Leg::Client,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Client => write!(f, "client"),
            Leg::Upstream => write!(f, "upstream"),
        }
    }
}

/// Why a leg stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Close frame received
    Closed(Option<CloseInfo>),
    /// Stream ended without a close frame
    Disconnected,
    /// Read or write failed
    Error(String),
}

/// Summary of a finished relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Leg whose termination ended the relay
    pub ended_by: Leg,
    pub reason: EndReason,
    pub client_to_upstream: u64,
    pub upstream_to_client: u64,
}

impl RelayOutcome {
    /// Close frame to send to the leg that did not end the relay.
    fn close_for_peer(&self) -> Option<CloseInfo> {
        match &self.reason {
            EndReason::Closed(Some(info)) if info.is_sendable() => Some(info.clone()),
            EndReason::Closed(_) | EndReason::Disconnected => None,
            EndReason::Error(_) => Some(CloseInfo::new(
                CLOSE_INTERNAL_ERROR,
                format!("{} error", self.ended_by),
            )),
        }
    }
}

enum PumpEnd {
    /// The read side stopped
    Source(EndReason),
    /// Writing to the destination failed
    Sink(String),
}

async fn pump<S, M, E, K, N>(source: &mut S, sink: &mut K, forwarded: &mut u64) -> PumpEnd
where
    S: Stream<Item = Result<M, E>> + Unpin,
    M: RelayMessage,
    E: fmt::Display,
    K: Sink<N> + Unpin,
    K::Error: fmt::Display,
    N: RelayMessage,
{
    while let Some(next) = source.next().await {
        let frame = match next {
            Ok(message) => message.into_frame(),
            Err(e) => return PumpEnd::Source(EndReason::Error(e.to_string())),
        };

        if let Frame::Close(info) = frame {
            return PumpEnd::Source(EndReason::Closed(info));
        }

        let Some(out) = N::from_frame(frame) else {
            continue;
        };

        if let Err(e) = sink.send(out).await {
            return PumpEnd::Sink(e.to_string());
        }
        *forwarded += 1;
    }

    PumpEnd::Source(EndReason::Disconnected)
}

/// Relay frames between a client and an upstream until either leg ends.
///
/// Text and binary frames are forwarded unchanged in both directions. When a
/// leg closes, disconnects or fails, the other leg receives a close frame
/// (the received status when it may be sent, 1011 after an error) and both
/// sinks are closed before this returns.
pub async fn relay<CT, CR, CM, CE, UT, UR, UM, UE>(
    mut client_tx: CT,
    mut client_rx: CR,
    mut upstream_tx: UT,
    mut upstream_rx: UR,
) -> RelayOutcome
where
    CT: Sink<CM> + Unpin,
    CT::Error: fmt::Display,
    CR: Stream<Item = Result<CM, CE>> + Unpin,
    CM: RelayMessage,
    CE: fmt::Display,
    UT: Sink<UM> + Unpin,
    UT::Error: fmt::Display,
    UR: Stream<Item = Result<UM, UE>> + Unpin,
    UM: RelayMessage,
    UE: fmt::Display,
{
    let mut client_to_upstream = 0u64;
    let mut upstream_to_client = 0u64;

    let (ended_by, reason) = tokio::select! {
        end = pump(&mut client_rx, &mut upstream_tx, &mut client_to_upstream) => match end {
            PumpEnd::Source(reason) => (Leg::Client, reason),
            PumpEnd::Sink(e) => (Leg::Upstream, EndReason::Error(e)),
        },
        end = pump(&mut upstream_rx, &mut client_tx, &mut upstream_to_client) => match end {
            PumpEnd::Source(reason) => (Leg::Upstream, reason),
            PumpEnd::Sink(e) => (Leg::Client, EndReason::Error(e)),
        },
    };

    let outcome = RelayOutcome {
        ended_by,
        reason,
        client_to_upstream,
        upstream_to_client,
    };

    debug!(ended_by = %outcome.ended_by, reason = ?outcome.reason, "Relay stopped, closing legs");

    let peer_close = outcome.close_for_peer();
    let teardown = async {
        match outcome.ended_by.other() {
            Leg::Client => {
                if let Some(close) = CM::from_frame(Frame::Close(peer_close)) {
                    let _ = client_tx.send(close).await;
                }
            }
            Leg::Upstream => {
                if let Some(close) = UM::from_frame(Frame::Close(peer_close)) {
                    let _ = upstream_tx.send(close).await;
                }
            }
        }
        let _ = client_tx.close().await;
        let _ = upstream_tx.close().await;
    };

    if tokio::time::timeout(CLOSE_TIMEOUT, teardown).await.is_err() {
        debug!("Timed out closing relay legs");
    }

    outcome
}
