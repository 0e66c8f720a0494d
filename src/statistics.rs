use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ahash::{HashMap, HashMapExt};
use parking_lot::RwLock;
use service::registry::PeerId;

/// The type of information passed to the statistics.
#[derive(Debug, Clone, Copy)]
pub enum Stats {
    Received(usize),
    Relayed(usize),
    Dropped(usize),
    Errors(usize),
    Pairings(usize),
}

pub trait Number {
    fn add(&self, value: usize);
    fn get(&self) -> usize;
}

#[derive(Default)]
pub struct Count(AtomicUsize);

impl Number for Count {
    fn add(&self, value: usize) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Message counters of a peer, or of the whole server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts<T> {
    pub received: T,
    pub relayed: T,
    pub dropped: T,
    pub errors: T,
    pub pairings: T,
}

impl<T: Number> Counts<T> {
    /// # Example
    ///
    /// ```
    /// use peer_signaling::statistics::*;
    ///
    /// let counts = Counts::<Count>::default();
    ///
    /// counts.add(&Stats::Received(1));
    /// assert_eq!(counts.received.get(), 1);
    ///
    /// counts.add(&Stats::Relayed(2));
    /// assert_eq!(counts.relayed.get(), 2);
    ///
    /// counts.add(&Stats::Dropped(1));
    /// assert_eq!(counts.dropped.get(), 1);
    ///
    /// counts.add(&Stats::Errors(1));
    /// assert_eq!(counts.errors.get(), 1);
    ///
    /// counts.add(&Stats::Pairings(1));
    /// assert_eq!(counts.pairings.get(), 1);
    /// ```
    pub fn add(&self, payload: &Stats) {
        match payload {
            Stats::Received(v) => self.received.add(*v),
            Stats::Relayed(v) => self.relayed.add(*v),
            Stats::Dropped(v) => self.dropped.add(*v),
            Stats::Errors(v) => self.errors.add(*v),
            Stats::Pairings(v) => self.pairings.add(*v),
        }
    }

    fn load(&self) -> Counts<usize> {
        Counts {
            received: self.received.get(),
            relayed: self.relayed.get(),
            dropped: self.dropped.get(),
            errors: self.errors.get(),
            pairings: self.pairings.get(),
        }
    }
}

#[derive(Default)]
struct Table {
    peers: RwLock<HashMap<PeerId, Counts<Count>>>,
    total: Counts<Count>,
}

/// Message statistics of the connected peers.
///
/// Peers are registered when they connect and dropped from the table when
/// they leave, the totals cover every peer seen since startup.
#[derive(Clone, Default)]
pub struct Statistics(Arc<Table>);

impl Statistics {
    /// Add a peer to the watch list.
    ///
    /// # Example
    ///
    /// ```
    /// use peer_signaling::statistics::*;
    /// use service::registry::PeerId;
    ///
    /// let statistics = Statistics::default();
    /// let id = PeerId::from("peer_abcdefghi");
    ///
    /// statistics.register(id.clone());
    /// assert!(statistics.get(&id).is_some());
    ///
    /// statistics.unregister(&id);
    /// assert!(statistics.get(&id).is_none());
    /// ```
    pub fn register(&self, id: PeerId) {
        self.0
            .peers
            .write()
            .entry(id)
            .or_insert_with(Counts::default);
    }

    pub fn unregister(&self, id: &PeerId) {
        self.0.peers.write().remove(id);
    }

    /// Update the counters of a peer and the totals.
    ///
    /// Reports for peers that are not registered only count towards the
    /// totals.
    ///
    /// # Example
    ///
    /// ```
    /// use peer_signaling::statistics::*;
    /// use service::registry::PeerId;
    ///
    /// let statistics = Statistics::default();
    /// let id = PeerId::from("peer_abcdefghi");
    ///
    /// statistics.register(id.clone());
    /// statistics.add(&id, &[Stats::Received(1), Stats::Relayed(1)]);
    /// statistics.add(&PeerId::from("peer_gone00000"), &[Stats::Received(1)]);
    ///
    /// let counts = statistics.get(&id).unwrap();
    /// assert_eq!(counts.received, 1);
    /// assert_eq!(counts.relayed, 1);
    ///
    /// assert_eq!(statistics.total().received, 2);
    /// ```
    pub fn add(&self, id: &PeerId, reports: &[Stats]) {
        let peers = self.0.peers.read();
        let counts = peers.get(id);

        for item in reports {
            self.0.total.add(item);

            if let Some(counts) = counts {
                counts.add(item);
            }
        }
    }

    /// Count a pairing of two peers.
    ///
    /// Both sides were introduced, so both are credited, while the totals
    /// count the pairing once.
    ///
    /// # Example
    ///
    /// ```
    /// use peer_signaling::statistics::*;
    /// use service::registry::PeerId;
    ///
    /// let statistics = Statistics::default();
    /// let a = PeerId::from("peer_aaaaaaaaa");
    /// let b = PeerId::from("peer_bbbbbbbbb");
    ///
    /// statistics.register(a.clone());
    /// statistics.register(b.clone());
    /// statistics.pair(&a, &b);
    ///
    /// assert_eq!(statistics.get(&a).unwrap().pairings, 1);
    /// assert_eq!(statistics.get(&b).unwrap().pairings, 1);
    /// assert_eq!(statistics.total().pairings, 1);
    /// ```
    pub fn pair(&self, requester: &PeerId, candidate: &PeerId) {
        let item = Stats::Pairings(1);
        self.0.total.add(&item);

        let peers = self.0.peers.read();
        for id in [requester, candidate] {
            if let Some(counts) = peers.get(id) {
                counts.add(&item);
            }
        }
    }

    pub fn get(&self, id: &PeerId) -> Option<Counts<usize>> {
        self.0.peers.read().get(id).map(Counts::load)
    }

    pub fn total(&self) -> Counts<usize> {
        self.0.total.load()
    }

    /// Number of peers currently registered.
    pub fn len(&self) -> usize {
        self.0.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically write the totals to the log.
    ///
    /// Never returns, with a zero interval it only waits.
    pub async fn report(&self, interval: u64) {
        if interval == 0 {
            return std::future::pending().await;
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(interval));

        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let total = self.total();
            log::info!(
                "statistics: peers={}, received={}, relayed={}, dropped={}, errors={}, pairings={}",
                self.len(),
                total.received,
                total.relayed,
                total.dropped,
                total.errors,
                total.pairings,
            );
        }
    }
}
