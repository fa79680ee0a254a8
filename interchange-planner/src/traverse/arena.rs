//! Arena of traversal states for one search.
//!
//! States live in a stack-ordered arena and refer to their parent by
//! handle. The search only ever extends or unwinds the newest state, so a
//! state's descendants are exactly the entries above it and dropping them
//! is a truncate.

use crate::graph::{EdgeId, NodeId};

use super::{JourneyState, StateKind};

/// Handle to a state in a [`StateArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHandle(usize);

/// An edge the state may follow, or the start node for the root state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub edge: Option<EdgeId>,
    pub to: NodeId,
    /// Minutes spent waiting before the edge is taken.
    pub wait_mins: u32,
}

/// One state of the traversal.
#[derive(Debug, Clone)]
pub struct TraversalState {
    pub kind: StateKind,
    /// `None` only for the root.
    pub node: Option<NodeId>,
    pub parent: Option<StateHandle>,
    pub incremental_cost: u32,
    pub total_cost: u32,
    pub journey: JourneyState,
    candidates: Vec<Step>,
    next: usize,
}

impl TraversalState {
    pub fn new(
        kind: StateKind,
        node: Option<NodeId>,
        parent: Option<StateHandle>,
        incremental_cost: u32,
        journey: JourneyState,
        candidates: Vec<Step>,
    ) -> Self {
        Self {
            kind,
            node,
            parent,
            incremental_cost,
            total_cost: journey.elapsed_mins(),
            journey,
            candidates,
            next: 0,
        }
    }

    /// Take the next candidate not yet followed.
    pub fn next_step(&mut self) -> Option<Step> {
        let step = self.candidates.get(self.next).copied()?;
        self.next += 1;
        Some(step)
    }
}

#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<TraversalState>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: TraversalState) -> StateHandle {
        self.states.push(state);
        StateHandle(self.states.len() - 1)
    }

    /// The newest state.
    pub fn top(&self) -> Option<StateHandle> {
        self.states.len().checked_sub(1).map(StateHandle)
    }

    pub fn get(&self, handle: StateHandle) -> Option<&TraversalState> {
        self.states.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: StateHandle) -> Option<&mut TraversalState> {
        self.states.get_mut(handle.0)
    }

    /// Drop the newest state.
    pub fn pop(&mut self) -> Option<TraversalState> {
        self.states.pop()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States from `handle` back to the root, newest first.
    pub fn ancestry(&self, handle: StateHandle) -> impl Iterator<Item = &TraversalState> + '_ {
        std::iter::successors(self.get(handle), |state| {
            state.parent.and_then(|parent| self.get(parent))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(kind: StateKind, node: u32, parent: Option<StateHandle>, steps: &[u32]) -> TraversalState {
        let candidates = steps
            .iter()
            .map(|to| Step {
                edge: None,
                to: NodeId(*to),
                wait_mins: 0,
            })
            .collect();
        TraversalState::new(kind, Some(NodeId(node)), parent, 0, JourneyState::new(), candidates)
    }

    #[test]
    fn candidates_are_taken_in_order() {
        let mut s = state(StateKind::Hour, 0, None, &[3, 4]);
        assert_eq!(s.next_step().map(|step| step.to), Some(NodeId(3)));
        assert_eq!(s.next_step().map(|step| step.to), Some(NodeId(4)));
        assert!(s.next_step().is_none());
    }

    #[test]
    fn ancestry_walks_parents() {
        let mut arena = StateArena::new();
        let root = arena.push(state(StateKind::NotStarted, 0, None, &[]));
        let child = arena.push(state(StateKind::Walking, 1, Some(root), &[]));
        let grandchild = arena.push(state(StateKind::PlatformStation, 2, Some(child), &[]));

        let kinds: Vec<_> = arena.ancestry(grandchild).map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StateKind::PlatformStation, StateKind::Walking, StateKind::NotStarted]
        );

        arena.pop();
        assert_eq!(arena.top(), Some(child));
        assert!(arena.get(grandchild).is_none());
    }
}
