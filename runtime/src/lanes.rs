//! Generation counters backing `Effect::Cancellable` lanes.
//!
//! Every time an effect starts in a lane the lane's generation is bumped and
//! the effect receives a [`LaneToken`] carrying that generation. When the
//! effect settles, the runtime only feeds its action back if the token is
//! still current, i.e. no newer effect has started in the same lane since.

use composable_state_core::effect::EffectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Generations = Arc<Mutex<HashMap<EffectId, u64>>>;

/// Per-store table of lane generations
#[derive(Clone, Default)]
pub(crate) struct LaneRegistry {
    generations: Generations,
}

impl LaneRegistry {
    /// Start a new effect in `id`, superseding anything in flight there
    pub(crate) fn begin(&self, id: &EffectId) -> LaneToken {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = generations.entry(id.clone()).or_insert(0);
        *generation += 1;

        tracing::trace!(lane = %id, generation = *generation, "Lane generation advanced");

        LaneToken {
            id: id.clone(),
            generation: *generation,
            generations: Arc::clone(&self.generations),
        }
    }

    /// Current generation of `id` (0 if the lane was never used)
    pub(crate) fn generation(&self, id: &EffectId) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(0)
    }
}

/// Proof that an effect was the latest one started in its lane
#[derive(Clone)]
pub(crate) struct LaneToken {
    id: EffectId,
    generation: u64,
    generations: Generations,
}

impl LaneToken {
    pub(crate) fn is_current(&self) -> bool {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.id)
            .is_some_and(|current| *current == self.generation)
    }

    pub(crate) const fn id(&self) -> &EffectId {
        &self.id
    }
}

impl std::fmt::Debug for LaneToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaneToken")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_token_is_current() {
        let lanes = LaneRegistry::default();
        let lane = EffectId::new("load");

        let first = lanes.begin(&lane);
        assert!(first.is_current());

        let second = lanes.begin(&lane);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(lanes.generation(&lane), 2);
    }

    #[test]
    fn lanes_are_independent() {
        let lanes = LaneRegistry::default();

        let toggle = lanes.begin(&EffectId::new("toggle"));
        let _delete = lanes.begin(&EffectId::new("delete"));

        assert!(toggle.is_current());
        assert_eq!(lanes.generation(&EffectId::new("add")), 0);
    }
}
