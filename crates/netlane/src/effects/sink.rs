use tokio::sync::mpsc;

use crate::data::NetworkEvent;

/// One-way channel to the host.
///
/// Emission is fire-and-forget: a sink never reports back to the executor,
/// and a host that stopped listening must not make the executor fail.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: NetworkEvent);
}

impl<F> EventSink for F
where
    F: Fn(NetworkEvent) + Send + Sync,
{
    fn emit(&self, event: NetworkEvent) {
        self(event)
    }
}

/// Sink backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<NetworkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NetworkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: NetworkEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            tracing::trace!(id = %event.id(), event = event.name(), "event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::data::RequestId;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: NetworkEvent| seen.lock().unwrap().push(event.id());
        sink.emit(NetworkEvent::success(RequestId(4)));
        assert_eq!(*seen.lock().unwrap(), vec![RequestId(4)]);
    }

    #[tokio::test]
    async fn channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(NetworkEvent::DataReceived {
            id: RequestId(1),
            data: "a".into(),
        });
        sink.emit(NetworkEvent::success(RequestId(1)));
        assert_eq!(rx.recv().await.unwrap().name(), "data-received");
        assert!(rx.recv().await.unwrap().is_terminal());
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(NetworkEvent::success(RequestId(1)));
    }
}
