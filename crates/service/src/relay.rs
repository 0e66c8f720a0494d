use crate::{
    ServiceHandler, Transport,
    registry::{PeerId, Registry},
};

use std::sync::Arc;

use codec::{Envelope, Error, MediaType, Notification, Request};

/// Pairs and forwards on behalf of one peer.
///
/// Each connection holds its own relay, every operation here is safe to run
/// concurrently with the relays of other connections.
pub struct Relay<T, H> {
    id: PeerId,
    registry: Arc<Registry<T>>,
    handler: H,
}

impl<T, H> Relay<T, H>
where
    T: Transport,
    H: ServiceHandler,
{
    pub(crate) fn new(id: PeerId, registry: Arc<Registry<T>>, handler: H) -> Self {
        Self {
            id,
            registry,
            handler,
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// Handle a frame received from the peer.
    ///
    /// A frame that can't be decoded is returned as an error and nothing is
    /// sent, the caller decides whether the connection survives it.
    pub fn process(&self, text: &str) -> Result<(), Error> {
        match Request::decode(text)? {
            Request::Next(media) => {
                self.request_next(media)?;
            }
            Request::Relay(envelope) => {
                self.forward(&envelope)?;
            }
        }

        Ok(())
    }

    /// Introduce the peer to the next available peer.
    ///
    /// Starting right after the requester in admission order, the registry
    /// is scanned circularly and every other peer is visited at most once.
    /// The first peer whose transport is still open is picked, whatever media
    /// type it asked for itself. Both sides receive a connect notification
    /// naming the other.
    ///
    /// Nothing is sent when there is no one else to pair with.
    pub fn request_next(&self, media: MediaType) -> Result<Option<PeerId>, Error> {
        if !self.registry.set_media_type(self.id.as_str(), media) {
            return Ok(None);
        }

        // The scan runs on a snapshot, peers leaving in the meantime are
        // skipped by the transport lookup.
        let ids = self.registry.all_ids();
        let candidate = ids
            .iter()
            .position(|it| it == &self.id)
            .filter(|_| ids.len() > 1)
            .and_then(|position| {
                (1..ids.len())
                    .map(|offset| &ids[(position + offset) % ids.len()])
                    .filter(|it| *it != &self.id)
                    .find_map(|it| {
                        self.registry
                            .lookup(it.as_str())
                            .filter(|transport| transport.is_open())
                            .map(|transport| (it.clone(), transport))
                    })
            });

        let (Some((candidate, transport)), Some(requester)) =
            (candidate, self.registry.lookup(self.id.as_str()))
        else {
            self.handler.on_unpaired(&self.id, media);
            return Ok(None);
        };

        requester.send(
            Notification::Connect {
                peer_id: candidate.as_str(),
                media,
            }
            .encode()?,
        );

        transport.send(
            Notification::Connect {
                peer_id: self.id.as_str(),
                media,
            }
            .encode()?,
        );

        self.handler.on_paired(&self.id, &candidate, media);
        Ok(Some(candidate))
    }

    /// Forward a frame to the peer it is addressed to.
    ///
    /// Fire and forget: returns whether the frame was handed to the
    /// destination's transport, a missing destination is not an error.
    pub fn forward(&self, envelope: &Envelope) -> Result<bool, Error> {
        if let Some(to) = envelope.to() {
            if let Some(transport) = self
                .registry
                .lookup(to)
                .filter(|transport| transport.is_open())
            {
                if transport.send(envelope.encode_from(self.id.as_str())?) {
                    self.handler.on_relayed(&self.id, to, envelope.kind());
                    return Ok(true);
                }
            }
        }

        self.handler
            .on_dropped(&self.id, envelope.to(), envelope.kind());

        Ok(false)
    }
}
