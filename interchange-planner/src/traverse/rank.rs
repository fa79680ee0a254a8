//! Ranking and filtering of found journeys.

use std::cmp::Ordering;

use super::Journey;

fn preference(a: &Journey, b: &Journey) -> Ordering {
    a.arrival_time()
        .cmp(&b.arrival_time())
        .then_with(|| a.change_count().cmp(&b.change_count()))
        .then_with(|| a.total_duration().cmp(&b.total_duration()))
}

/// Sort journeys best-first: earliest arrival, then fewest changes, then
/// shortest duration. The sort is stable.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by(preference);
    journeys
}

/// Returns true if `a` is no worse than `b` on arrival, changes and duration,
/// and strictly better on at least one.
pub fn dominates(a: &Journey, b: &Journey) -> bool {
    let no_worse = a.arrival_time() <= b.arrival_time()
        && a.change_count() <= b.change_count()
        && a.total_duration() <= b.total_duration();
    no_worse
        && (a.arrival_time() < b.arrival_time()
            || a.change_count() < b.change_count()
            || a.total_duration() < b.total_duration())
}

/// Keep only journeys no other journey dominates.
pub fn remove_dominated(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut kept: Vec<Journey> = Vec::with_capacity(journeys.len());
    for journey in journeys {
        if kept.iter().any(|existing| dominates(existing, &journey)) {
            continue;
        }
        kept.retain(|existing| !dominates(&journey, existing));
        kept.push(journey);
    }
    kept
}

/// Collapse journeys with the same departure, arrival and change count,
/// keeping the one with the least walking.
pub fn deduplicate(mut journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    journeys.sort_by(|a, b| {
        a.arrival_time()
            .cmp(&b.arrival_time())
            .then_with(|| a.departure_time().cmp(&b.departure_time()))
            .then_with(|| a.change_count().cmp(&b.change_count()))
            .then_with(|| a.walk_mins().cmp(&b.walk_mins()))
    });
    journeys.dedup_by_key(|journey| {
        (
            journey.arrival_time(),
            journey.departure_time(),
            journey.change_count(),
        )
    });
    journeys
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{ServiceTime, TripId};
    use crate::traverse::{Journey, JourneyState};

    /// A journey leaving `depart` minutes after 08:00, taking `duration`
    /// minutes and changing `changes` times.
    pub fn journey(depart: u32, duration: u32, changes: u32) -> Journey {
        walking_journey(depart, duration, changes, 0)
    }

    pub fn walking_journey(depart: u32, duration: u32, changes: u32, walk: u32) -> Journey {
        let start = ServiceTime::of(8, 0).unwrap();
        let mut state = JourneyState::new();
        state.add_cost(depart);
        for leg in 0..=changes {
            state.alight();
            let trip = TripId::new(format!("T{depart}-{leg}")).unwrap();
            state.board(&trip, start + state.elapsed_mins());
        }
        if walk > 0 {
            state.begin_walk(walk);
            state.end_walk();
        }
        state.add_cost(duration);
        Journey::new(start, &state, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{journey, walking_journey};
    use super::*;

    #[test]
    fn rank_by_arrival() {
        let late = journey(0, 60, 0);
        let early = journey(10, 20, 0);

        let ranked = rank_journeys(vec![late.clone(), early.clone()]);
        assert_eq!(ranked, vec![early, late]);
    }

    #[test]
    fn rank_by_changes_when_same_arrival() {
        let direct = journey(0, 30, 0);
        let two_changes = journey(10, 20, 2);
        assert_eq!(direct.arrival_time(), two_changes.arrival_time());

        let ranked = rank_journeys(vec![two_changes.clone(), direct.clone()]);
        assert_eq!(ranked[0], direct);
    }

    #[test]
    fn remove_dominated_keeps_pareto_optimal() {
        // Arrives earlier but with a change.
        let fast = journey(0, 20, 1);
        // Arrives later, direct.
        let direct = journey(0, 40, 0);
        // Later and more changes than both.
        let worse = journey(0, 45, 2);

        let kept = remove_dominated(vec![fast.clone(), worse, direct.clone()]);
        assert_eq!(kept.len(), 2);
        assert!(kept.contains(&fast));
        assert!(kept.contains(&direct));
    }

    #[test]
    fn deduplicate_prefers_less_walking() {
        let walked = walking_journey(0, 30, 1, 12);
        let rode = walking_journey(0, 30, 1, 0);

        let result = deduplicate(vec![walked, rode.clone()]);
        assert_eq!(result, vec![rode]);
    }

    #[test]
    fn empty_input() {
        assert!(rank_journeys(vec![]).is_empty());
        assert!(remove_dominated(vec![]).is_empty());
        assert!(deduplicate(vec![]).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::journey;
    use super::*;
    use proptest::prelude::*;

    fn journeys_strategy() -> impl Strategy<Value = Vec<Journey>> {
        prop::collection::vec((0u32..90, 5u32..90, 0u32..4), 0..15).prop_map(|params| {
            params
                .into_iter()
                .map(|(depart, duration, changes)| journey(depart, duration, changes))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn rank_journeys_is_sorted(journeys in journeys_strategy()) {
            let ranked = rank_journeys(journeys);
            for window in ranked.windows(2) {
                let a = (window[0].arrival_time(), window[0].change_count(), window[0].total_duration());
                let b = (window[1].arrival_time(), window[1].change_count(), window[1].total_duration());
                prop_assert!(a <= b, "{:?} ranked before {:?}", a, b);
            }
        }

        #[test]
        fn rank_journeys_preserves_elements(journeys in journeys_strategy()) {
            let len = journeys.len();
            prop_assert_eq!(rank_journeys(journeys).len(), len);
        }

        #[test]
        fn remove_dominated_no_internal_domination(journeys in journeys_strategy()) {
            let result = remove_dominated(journeys);
            for (i, a) in result.iter().enumerate() {
                for (j, b) in result.iter().enumerate() {
                    prop_assert!(i == j || !dominates(a, b), "{} dominates {}", i, j);
                }
            }
        }

        #[test]
        fn remove_dominated_keeps_every_undominated(journeys in journeys_strategy()) {
            let result = remove_dominated(journeys.clone());
            for candidate in &journeys {
                if !journeys.iter().any(|other| dominates(other, candidate)) {
                    prop_assert!(result.contains(candidate));
                }
            }
        }

        #[test]
        fn deduplicate_no_duplicate_keys(journeys in journeys_strategy()) {
            let result = deduplicate(journeys);
            for (i, a) in result.iter().enumerate() {
                for b in &result[i + 1..] {
                    prop_assert_ne!(
                        (a.arrival_time(), a.departure_time(), a.change_count()),
                        (b.arrival_time(), b.departure_time(), b.change_count())
                    );
                }
            }
        }
    }

    #[test]
    fn deduplicate_distribution() {
        use proptest::test_runner::{Config, TestRunner};
        use std::cell::Cell;

        let mut runner = TestRunner::new(Config::with_cases(300));
        let removed = Cell::new(0u32);
        let total = Cell::new(0u32);

        // Few distinct values so duplicates are common.
        let strategy = prop::collection::vec((0u32..3, 0u32..2, 0u32..2), 2..10).prop_map(|params| {
            params
                .into_iter()
                .map(|(depart, duration, changes)| journey(depart * 30, duration * 30 + 30, changes))
                .collect::<Vec<_>>()
        });

        let _ = runner.run(&strategy, |journeys| {
            let len = journeys.len();
            if deduplicate(journeys).len() < len {
                removed.set(removed.get() + 1);
            }
            total.set(total.get() + 1);
            Ok(())
        });

        assert!(
            removed.get() > 0,
            "never removed duplicates in {} runs",
            total.get()
        );
    }
}
