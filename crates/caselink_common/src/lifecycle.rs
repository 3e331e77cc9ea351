//! Request lifecycle for the panel.
//!
//! Every request the panel fires takes a ticket on its channel. Only the
//! newest ticket on a channel may apply its response; anything older was
//! superseded and is dropped, so a slow poll can never overwrite fresher state.

use std::collections::HashMap;

/// Independent request streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Status,
    Results,
    Config,
    Start,
    Procedure,
}

/// Proof that a response belongs to a specific request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub channel: Channel,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_seq: u64,
    latest: HashMap<Channel, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket; all earlier tickets on the channel become stale
    pub fn issue(&mut self, channel: Channel) -> Ticket {
        self.next_seq += 1;
        self.latest.insert(channel, self.next_seq);
        Ticket {
            channel,
            seq: self.next_seq,
        }
    }

    /// True once for the newest ticket on its channel.
    ///
    /// The ticket is consumed, so a duplicate delivery is also rejected.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        match self.latest.get(&ticket.channel) {
            Some(&seq) if seq == ticket.seq => {
                self.latest.remove(&ticket.channel);
                true
            }
            _ => false,
        }
    }

    /// Drop whatever is in flight on a channel
    pub fn supersede(&mut self, channel: Channel) {
        self.latest.remove(&channel);
    }

    /// Whether a request on the channel is still awaiting its response
    pub fn in_flight(&self, channel: Channel) -> bool {
        self.latest.contains_key(&channel)
    }
}
