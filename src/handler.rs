use crate::statistics::{Statistics, Stats};

use codec::{MediaType, PayloadKind};
use service::{ServiceHandler, registry::PeerId};

#[derive(Clone)]
pub struct Handler {
    statistics: Statistics,
}

impl Handler {
    pub fn new(statistics: Statistics) -> Self {
        Self { statistics }
    }
}

impl ServiceHandler for Handler {
    fn on_admitted(&self, id: &PeerId) {
        log::info!("peer admitted: id={}", id);

        self.statistics.register(id.clone());
    }

    /// peer removed
    ///
    /// Triggered once the websocket of the peer is gone, whether it was
    /// closed by the browser or broke. Peers it was introduced to are left
    /// alone.
    fn on_removed(&self, id: &PeerId) {
        log::info!("peer removed: id={}", id);

        self.statistics.unregister(id);
    }

    fn on_paired(&self, requester: &PeerId, candidate: &PeerId, media: MediaType) {
        log::info!(
            "paired: requester={}, candidate={}, media={}",
            requester,
            candidate,
            media
        );

        self.statistics.pair(requester, candidate);
    }

    fn on_unpaired(&self, requester: &PeerId, media: MediaType) {
        log::debug!(
            "no candidate available: requester={}, media={}",
            requester,
            media
        );
    }

    fn on_relayed(&self, from: &PeerId, to: &str, kind: PayloadKind) {
        log::debug!("relay: from={}, to={}, kind={}", from, to, kind);

        self.statistics.add(from, &[Stats::Relayed(1)]);
    }

    fn on_dropped(&self, from: &PeerId, to: Option<&str>, kind: PayloadKind) {
        log::debug!("relay dropped: from={}, to={:?}, kind={}", from, to, kind);

        self.statistics.add(from, &[Stats::Dropped(1)]);
    }
}
