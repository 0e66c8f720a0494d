use std::{borrow::Borrow, sync::Arc};

use ahash::{HashMap, HashMapExt};
use codec::MediaType;
use parking_lot::RwLock;
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The server assigned identifier of a connected peer.
///
/// Ids are `peer_` followed by 9 random lowercase alphanumerics, they are
/// immutable for the lifetime of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Arc<str>);

impl PeerId {
    /// Generate a random id.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_service::registry::PeerId;
    ///
    /// let id = PeerId::random();
    ///
    /// assert_eq!(id.as_str().len(), 14);
    /// assert!(id.as_str().starts_with("peer_"));
    /// assert!(id.as_str()[5..].bytes().all(|it| it.is_ascii_digit() || it.is_ascii_lowercase()));
    /// ```
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(14);
        id.push_str("peer_");

        for _ in 0..9 {
            id.push(ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
        }

        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PeerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PeerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connected peer.
#[derive(Debug, Clone)]
pub struct Peer<T> {
    pub transport: T,
    /// Set by the first pairing request the peer makes, unset until then.
    pub media: Option<MediaType>,
}

struct Members<T> {
    peers: HashMap<PeerId, Peer<T>>,
    // Admission order, the starting point of the pairing scan.
    order: Vec<PeerId>,
}

/// All currently connected peers.
///
/// The table and the admission order are kept under one lock, so a reader
/// never observes a peer that is half inserted or half removed.
pub struct Registry<T> {
    members: RwLock<Members<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

impl<T> Registry<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: RwLock::new(Members {
                peers: HashMap::with_capacity(capacity),
                order: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Admit a peer and assign its id.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_service::registry::Registry;
    ///
    /// let registry = Registry::<u32>::default();
    /// let a = registry.admit(1);
    /// let b = registry.admit(2);
    ///
    /// assert_ne!(a, b);
    /// assert_eq!(registry.len(), 2);
    /// assert_eq!(registry.all_ids(), vec![a, b]);
    /// ```
    pub fn admit(&self, transport: T) -> PeerId {
        let mut members = self.members.write();

        let mut id = PeerId::random();
        while members.peers.contains_key(&id) {
            id = PeerId::random();
        }

        members.peers.insert(
            id.clone(),
            Peer {
                media: None,
                transport,
            },
        );

        members.order.push(id.clone());
        id
    }

    /// Remove a peer, returns whether it was present.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_service::registry::Registry;
    ///
    /// let registry = Registry::<u32>::default();
    /// let a = registry.admit(1);
    ///
    /// assert!(registry.remove(a.as_str()));
    /// assert!(!registry.remove(a.as_str()));
    /// assert!(!registry.remove("peer_unknown00"));
    /// assert!(registry.is_empty());
    /// ```
    pub fn remove(&self, id: &str) -> bool {
        let mut members = self.members.write();
        if members.peers.remove(id).is_none() {
            return false;
        }

        if let Some(index) = members.order.iter().position(|it| it.as_str() == id) {
            members.order.remove(index);
        }

        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.read().peers.contains_key(id)
    }

    /// Snapshot of the ids of all peers, in admission order.
    pub fn all_ids(&self) -> Vec<PeerId> {
        self.members.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.members.read().peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record the media type a peer asked to be paired for.
    ///
    /// Only the first request sets it, later ones leave it as is. Returns false
    /// if the peer is not connected.
    ///
    /// # Test
    ///
    /// ```
    /// use codec::MediaType;
    /// use peer_signaling_service::registry::Registry;
    ///
    /// let registry = Registry::<u32>::default();
    /// let a = registry.admit(1);
    ///
    /// assert_eq!(registry.get_media_type(a.as_str()), None);
    /// assert!(registry.set_media_type(a.as_str(), MediaType::Audio));
    /// assert_eq!(registry.get_media_type(a.as_str()), Some(MediaType::Audio));
    ///
    /// assert!(registry.set_media_type(a.as_str(), MediaType::Video));
    /// assert_eq!(registry.get_media_type(a.as_str()), Some(MediaType::Audio));
    ///
    /// assert!(!registry.set_media_type("peer_unknown00", MediaType::Audio));
    /// ```
    pub fn set_media_type(&self, id: &str, media: MediaType) -> bool {
        if let Some(peer) = self.members.write().peers.get_mut(id) {
            peer.media.get_or_insert(media);
            true
        } else {
            false
        }
    }

    pub fn get_media_type(&self, id: &str) -> Option<MediaType> {
        self.members.read().peers.get(id).and_then(|it| it.media)
    }
}

impl<T: Clone> Registry<T> {
    /// Get the transport of a peer.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_service::registry::Registry;
    ///
    /// let registry = Registry::<u32>::default();
    /// let a = registry.admit(7);
    ///
    /// assert_eq!(registry.lookup(a.as_str()), Some(7));
    /// assert_eq!(registry.lookup("peer_unknown00"), None);
    /// ```
    pub fn lookup(&self, id: &str) -> Option<T> {
        self.members
            .read()
            .peers
            .get(id)
            .map(|it| it.transport.clone())
    }
}
