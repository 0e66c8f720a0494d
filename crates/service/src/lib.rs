pub mod registry;
pub mod relay;

use self::{
    registry::{PeerId, Registry},
    relay::Relay,
};

use std::sync::Arc;

use codec::{MediaType, PayloadKind};

/// The outgoing half of a peer's connection.
///
/// Sending never blocks: implementations queue the frame and return, the
/// frames queued on one transport are delivered in order.
pub trait Transport: Clone + Send + Sync {
    fn is_open(&self) -> bool;

    /// Queue a text frame, returns false if the transport has closed.
    fn send(&self, message: String) -> bool;
}

pub trait ServiceHandler: Send + Sync {
    /// peer connected
    #[allow(unused_variables)]
    fn on_admitted(&self, id: &PeerId) {}

    /// peer disconnected
    ///
    /// Peers that were introduced to it are not told, they find out when
    /// their own media connection times out.
    #[allow(unused_variables)]
    fn on_removed(&self, id: &PeerId) {}

    /// Both sides were sent a connect notification.
    #[allow(unused_variables)]
    fn on_paired(&self, requester: &PeerId, candidate: &PeerId, media: MediaType) {}

    /// A pairing request found nobody to pair with, the requester is not
    /// told either.
    #[allow(unused_variables)]
    fn on_unpaired(&self, requester: &PeerId, media: MediaType) {}

    #[allow(unused_variables)]
    fn on_relayed(&self, from: &PeerId, to: &str, kind: PayloadKind) {}

    /// The destination is missing, gone or closed, the frame was discarded.
    #[allow(unused_variables)]
    fn on_dropped(&self, from: &PeerId, to: Option<&str>, kind: PayloadKind) {}
}

pub struct ServiceOptions<H> {
    /// Number of peers to reserve room for.
    pub capacity: usize,
    pub handler: H,
}

/// Signaling service.
#[derive(Clone)]
pub struct Service<T, H> {
    registry: Arc<Registry<T>>,
    handler: H,
}

impl<T, H> Service<T, H>
where
    T: Transport,
    H: ServiceHandler + Clone,
{
    pub fn new(options: ServiceOptions<H>) -> Self {
        Self {
            registry: Arc::new(Registry::with_capacity(options.capacity)),
            handler: options.handler,
        }
    }

    /// Register a newly connected peer.
    pub fn admit(&self, transport: T) -> PeerId {
        let id = self.registry.admit(transport);
        self.handler.on_admitted(&id);
        id
    }

    /// Forget a disconnected peer, removing an unknown peer is a no-op.
    pub fn remove(&self, id: &PeerId) -> bool {
        let removed = self.registry.remove(id.as_str());
        if removed {
            self.handler.on_removed(id);
        }

        removed
    }

    pub fn get_registry(&self) -> &Registry<T> {
        &self.registry
    }

    /// Get the relay acting on behalf of a peer.
    pub fn get_relay(&self, id: PeerId) -> Relay<T, H> {
        Relay::new(id, self.registry.clone(), self.handler.clone())
    }
}
