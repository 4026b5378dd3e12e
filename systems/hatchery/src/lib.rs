#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns hatch announcements into fish spawn commands.
//!
//! The tank announces [`Event::EggHatched`] exactly once per egg; this
//! system is the sole emitter of [`Command::SpawnFish`], so exactly one fish
//! exists per hatched egg. A processed-egg ledger guards against replayed
//! event batches producing duplicate spawns.

use std::collections::BTreeSet;

use aquarium_core::{Command, EggId, Event};

/// Pure system reacting to hatch events with spawn commands.
#[derive(Debug, Default)]
pub struct Hatchery {
    processed: BTreeSet<EggId>,
}

impl Hatchery {
    /// Creates a new hatchery with an empty processed-egg ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processed: BTreeSet::new(),
        }
    }

    /// Consumes tank events and emits spawn commands for new hatches.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EggHatched {
                    egg,
                    kind,
                    position,
                } => {
                    if self.processed.insert(*egg) {
                        out.push(Command::SpawnFish {
                            kind: *kind,
                            position: *position,
                        });
                    }
                }
                Event::EggRemoved { egg } => {
                    // The egg is gone; its ledger entry can go too.
                    let _ = self.processed.remove(egg);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Hatchery;
    use aquarium_core::{Command, EggId, EggKind, Event};
    use glam::Vec2;

    fn hatch_event(egg: u32) -> Event {
        Event::EggHatched {
            egg: EggId::new(egg),
            kind: EggKind::Tropical,
            position: Vec2::new(1.0, -2.0),
        }
    }

    #[test]
    fn hatch_event_spawns_exactly_one_fish() {
        let mut hatchery = Hatchery::new();
        let mut commands = Vec::new();

        hatchery.handle(&[hatch_event(0)], &mut commands);
        assert_eq!(commands.len(), 1);
        assert!(matches!(
            commands[0],
            Command::SpawnFish {
                kind: EggKind::Tropical,
                ..
            }
        ));
    }

    #[test]
    fn replayed_hatch_events_do_not_duplicate_spawns() {
        let mut hatchery = Hatchery::new();
        let mut commands = Vec::new();

        hatchery.handle(&[hatch_event(0)], &mut commands);
        hatchery.handle(&[hatch_event(0)], &mut commands);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn distinct_eggs_each_spawn_a_fish() {
        let mut hatchery = Hatchery::new();
        let mut commands = Vec::new();

        hatchery.handle(&[hatch_event(0), hatch_event(1)], &mut commands);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn removal_clears_the_ledger_entry() {
        let mut hatchery = Hatchery::new();
        let mut commands = Vec::new();

        hatchery.handle(&[hatch_event(0)], &mut commands);
        hatchery.handle(
            &[Event::EggRemoved {
                egg: EggId::new(0),
            }],
            &mut commands,
        );
        assert!(hatchery.processed.is_empty());
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let mut hatchery = Hatchery::new();
        let mut commands = Vec::new();

        hatchery.handle(&[Event::CoinsChanged { coins: 10 }], &mut commands);
        assert!(commands.is_empty());
    }
}
