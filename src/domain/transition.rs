use super::payment::{PaymentEvent, PaymentId, PaymentState};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// An event together with its correlation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub event: PaymentEvent,
    pub payment_id: Option<PaymentId>,
}

impl Message {
    pub fn new(event: PaymentEvent) -> Self {
        Self {
            event,
            payment_id: None,
        }
    }

    pub fn with_payment_id(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    /// Builds a follow-up message that carries this message's correlation id forward.
    pub fn follow_up(&self, event: PaymentEvent) -> Self {
        Self {
            event,
            payment_id: self.payment_id,
        }
    }
}

/// Side-effect-free predicate over a message. A `false` result denies the transition.
pub type Guard = fn(&Message) -> bool;

/// Collects the events an action sends back into its machine.
#[derive(Debug, Default)]
pub struct EventEmitter {
    emitted: Vec<Message>,
}

impl EventEmitter {
    pub fn send(&mut self, message: Message) {
        self.emitted.push(message);
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.emitted
    }
}

/// Side-effecting logic run after a transition has been committed.
///
/// Actions cannot fail the dispatch chain; they express outcomes as follow-up events.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, message: &Message, emitter: &mut EventEmitter);
}

#[derive(Clone)]
pub struct Transition {
    pub source: PaymentState,
    pub event: PaymentEvent,
    pub target: PaymentState,
    pub guard: Option<Guard>,
    pub action: Option<Arc<dyn Action>>,
}

impl Transition {
    pub fn new(source: PaymentState, event: PaymentEvent, target: PaymentState) -> Self {
        Self {
            source,
            event,
            target,
            guard: None,
            action: None,
        }
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn action(mut self, action: Arc<dyn Action>) -> Self {
        self.action = Some(action);
        self
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("event", &self.event)
            .field("target", &self.target)
            .field("guarded", &self.guard.is_some())
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Deterministic `(state, event) -> transition` table.
#[derive(Debug)]
pub struct TransitionTable {
    initial: PaymentState,
    transitions: HashMap<(PaymentState, PaymentEvent), Transition>,
}

impl TransitionTable {
    pub fn builder(initial: PaymentState) -> TransitionTableBuilder {
        TransitionTableBuilder {
            initial,
            transitions: Vec::new(),
        }
    }

    pub fn lookup(&self, state: PaymentState, event: PaymentEvent) -> Option<&Transition> {
        self.transitions.get(&(state, event))
    }

    pub fn initial_state(&self) -> PaymentState {
        self.initial
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    /// States with no outgoing transitions.
    pub fn is_terminal(&self, state: PaymentState) -> bool {
        !self.transitions.keys().any(|(source, _)| *source == state)
    }

    pub fn terminal_states(&self) -> Vec<PaymentState> {
        PaymentState::ALL
            .into_iter()
            .filter(|state| self.is_terminal(*state))
            .collect()
    }
}

pub struct TransitionTableBuilder {
    initial: PaymentState,
    transitions: Vec<Transition>,
}

impl TransitionTableBuilder {
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Fails if two transitions share the same `(source, event)` pair.
    pub fn build(self) -> Result<TransitionTable> {
        let mut transitions = HashMap::with_capacity(self.transitions.len());
        let mut duplicates = BTreeSet::new();

        for transition in self.transitions {
            let key = (transition.source, transition.event);
            if transitions.insert(key, transition).is_some() {
                duplicates.insert(format!("{} on {}", key.0, key.1));
            }
        }

        if !duplicates.is_empty() {
            return Err(PaymentError::InvalidTransitionTable(format!(
                "ambiguous transitions: {}",
                duplicates.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(TransitionTable {
            initial: self.initial,
            transitions,
        })
    }
}
