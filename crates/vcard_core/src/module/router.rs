//! Response delivery collaborator.
//!
//! # Responsibility
//! - Deliver stanzas toward their destination address.
//!
//! # Invariants
//! - Delivery is best-effort; callers decide whether failures matter.

use crate::model::iq::Iq;
use crossbeam_channel::{Receiver, Sender};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outbound stanza router.
pub trait Router: Send + Sync {
    fn route(&self, iq: Iq) -> Result<(), RouteError>;
}

/// In-process router that forwards every stanza to one channel.
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    tx: Sender<Iq>,
}

impl ChannelRouter {
    /// Creates a router and the receiving end of its delivery channel.
    pub fn new() -> (Self, Receiver<Iq>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl Router for ChannelRouter {
    fn route(&self, iq: Iq) -> Result<(), RouteError> {
        self.tx.send(iq).map_err(|_| RouteError::Disconnected)
    }
}

/// Stanza routing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// Nobody is listening on the destination side anymore.
    Disconnected,
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "route destination disconnected"),
        }
    }
}

impl Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::{ChannelRouter, RouteError, Router};
    use crate::model::iq::{Iq, IqType};
    use crate::model::jid::Jid;

    fn sample_iq() -> Iq {
        Iq::new(
            IqType::Result,
            Jid::parse("jackal.im").expect("from jid"),
            Jid::parse("ortuman@jackal.im/home").expect("to jid"),
        )
    }

    #[test]
    fn delivers_to_receiver() {
        let (router, rx) = ChannelRouter::new();
        let iq = sample_iq();
        router.route(iq.clone()).expect("route");
        assert_eq!(rx.try_recv().expect("delivered"), iq);
    }

    #[test]
    fn reports_disconnected_receiver() {
        let (router, rx) = ChannelRouter::new();
        drop(rx);
        assert_eq!(router.route(sample_iq()), Err(RouteError::Disconnected));
    }
}
