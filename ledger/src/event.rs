//! Notification records produced by every state-changing operation.

use levy_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
///
/// Events are ordered: within one operation they appear in the order the
/// state changes happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A single ledger move. Mints carry `from == Address::ZERO`,
    /// burns carry `to == Address::ZERO`.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// A delegated-spend allowance was set.
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    /// A routed transfer was taxed.
    TaxCollected {
        from: Address,
        tax: Amount,
        burn_share: Amount,
        treasury_share: Amount,
        net_amount: Amount,
    },
    /// Principal was locked in the staking pool.
    Staked { account: Address, amount: Amount },
    /// Principal was returned from the staking pool.
    Unstaked { account: Address, amount: Amount },
    /// A staking reward was minted to the account.
    RewardClaimed { account: Address, reward: Amount },
    /// A governance proposal was opened.
    ProposalCreated {
        id: u64,
        proposer: Address,
        deadline: Timestamp,
    },
    /// A vote was recorded. `weight` is the voter's balance at vote time;
    /// it is added to the tally only when `support` is true.
    Voted {
        proposal_id: u64,
        voter: Address,
        support: bool,
        weight: Amount,
    },
    /// Declared for proposal execution; no operation emits it.
    ProposalExecuted { id: u64 },
    /// Declared for vesting releases; no operation emits it.
    VestingReleased { beneficiary: Address, amount: Amount },
    /// Declared for community-pool claims; no operation emits it.
    CommunityRewardClaimed { account: Address, amount: Amount },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline on the calling thread, after the operation
/// that produced the events has committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ledger, TaxPolicy, TaxRouter};
    use levy_types::LedgerParams;
    use std::sync::{Arc, Mutex};

    fn recording_bus() -> (EventBus, Arc<Mutex<Vec<LedgerEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        }));
        (bus, seen)
    }

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = LedgerEvent::TaxCollected {
            from: Address::derive("a"),
            tax: Amount::from_tokens(1),
            burn_share: Amount::new(500_000_000_000_000_000),
            treasury_share: Amount::new(500_000_000_000_000_000),
            net_amount: Amount::from_tokens(49),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "tax_collected");
        assert_eq!(json["burn_share"], "0.5");
        assert_eq!(json["net_amount"], "49");

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn routed_transfer_publishes_moves_before_tax() {
        let owner = Address::derive("owner");
        let treasury = Address::derive("treasury");
        let from = Address::derive("from");
        let to = Address::derive("to");
        let router = TaxRouter::new(
            TaxPolicy::from_params(&LedgerParams::default()),
            owner,
            treasury,
        );
        let mut ledger = Ledger::new(Amount::from_tokens(1_000));
        let mut staged = Vec::new();
        ledger.mint(from, Amount::from_tokens(100), &mut staged).unwrap();
        staged.clear();
        router
            .route(&mut ledger, from, to, Amount::from_tokens(50), &mut staged)
            .unwrap();

        let (bus, seen) = recording_bus();
        for event in &staged {
            bus.emit(event);
        }

        let seen = seen.lock().unwrap();
        let recipients: Vec<Address> = seen
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::Transfer { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(recipients, vec![Address::BURN_SINK, treasury, to]);
        assert!(matches!(
            seen.last(),
            Some(LedgerEvent::TaxCollected { from: f, .. }) if *f == from
        ));
    }

    #[test]
    fn every_listener_sees_every_event() {
        let (mut bus, first) = recording_bus();
        let second = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&second);
        bus.subscribe(Box::new(move |_| {
            if let Ok(mut n) = counter.lock() {
                *n += 1;
            }
        }));

        bus.emit(&LedgerEvent::Staked {
            account: Address::derive("a"),
            amount: Amount::from_tokens(1),
        });
        bus.emit(&LedgerEvent::ProposalCreated {
            id: 1,
            proposer: Address::derive("a"),
            deadline: Timestamp::new(10),
        });

        assert_eq!(bus.listener_count(), 2);
        assert_eq!(first.lock().unwrap().len(), 2);
        assert_eq!(*second.lock().unwrap(), 2);
    }
}
