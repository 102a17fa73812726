/*!
Host-owned set of characters stepped by one shared clock.

Characters are kept in a `BTreeMap` so every tick visits them in the same order. Each tick runs
every character exactly once, with the input latched for it since its previous tick.
*/

use std::collections::BTreeMap;

use crate::character::Character;
use crate::collision::SpatialQuery;
use crate::error::TickError;
use crate::input::InputSnapshot;
use crate::tick::{TickClock, TickSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterId(pub u32);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct CharacterRegistry {
    clock: TickClock,
    characters: BTreeMap<CharacterId, Character>,
}

impl CharacterRegistry {
    /// Settings are clamped into their supported ranges, as config validation does for each
    /// character.
    pub fn new(settings: TickSettings) -> Result<Self, TickError> {
        Ok(Self {
            clock: TickClock::with_settings(settings.clamped())?,
            characters: BTreeMap::new(),
        })
    }

    /// Adds a character. Returns the one previously registered under `id`, if any.
    pub fn register(&mut self, id: CharacterId, character: Character) -> Option<Character> {
        log::debug!("[CharacterRegistry] register {id}");
        self.characters.insert(id, character)
    }

    pub fn unregister(&mut self, id: CharacterId) -> Option<Character> {
        log::debug!("[CharacterRegistry] unregister {id}");
        self.characters.remove(&id)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    #[inline]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut TickClock {
        &mut self.clock
    }

    /// Frame entry point. Latches this frame's inputs, then runs the due ticks for every
    /// character. Characters without an entry in `inputs` keep their previous input levels.
    ///
    /// Returns the number of ticks executed.
    pub fn update<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        real_dt: f32,
        inputs: &BTreeMap<CharacterId, InputSnapshot>,
    ) -> u32 {
        for (id, input) in inputs {
            match self.characters.get_mut(id) {
                Some(character) => character.push_input(*input),
                None => log::warn!("[CharacterRegistry] input for unknown character {id}"),
            }
        }

        let mut due = Vec::new();
        let executed = self.clock.update(real_dt, |tick, dt| due.push((tick, dt)));
        for (tick, dt) in due {
            for character in self.characters.values_mut() {
                let input = character.take_input();
                character.simulate_at(world, &input, tick, dt);
            }
        }
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, WorldStaticDef};
    use crate::config::MovementConfig;
    use crate::state::StateId;
    use crate::types::{CapsuleSpec, Quat, Vec3};

    fn floor() -> CollisionWorld {
        CollisionWorld::build([WorldStaticDef::cuboid(
            1,
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
        )])
    }

    fn spawn(x: f32) -> Character {
        Character::builder(MovementConfig::default())
            .capsule(CapsuleSpec::default())
            .spawn(Vec3::new(x, 0.0, 0.0), Quat::identity())
            .build()
            .expect("valid character")
    }

    #[test]
    fn every_character_runs_every_tick() {
        let world = floor();
        let mut registry = CharacterRegistry::new(TickSettings::default()).expect("valid rate");
        assert!(registry.register(CharacterId(2), spawn(2.0)).is_none());
        assert!(registry.register(CharacterId(1), spawn(-2.0)).is_none());

        let mut inputs = BTreeMap::new();
        inputs.insert(
            CharacterId(1),
            InputSnapshot::default().with_move(0.0, 1.0).with_look(Vec3::z()),
        );
        let mut total = 0;
        for _ in 0..30 {
            total += registry.update(&world, 1.0 / 60.0, &inputs);
        }
        assert_eq!(total, 30);

        let runner = registry.get(CharacterId(1)).expect("registered");
        let idler = registry.get(CharacterId(2)).expect("registered");
        assert_eq!(runner.current_tick(), 30);
        assert_eq!(idler.current_tick(), 30);
        assert_eq!(runner.current_state(), Some(StateId::Running));
        assert_eq!(idler.current_state(), Some(StateId::Idling));
        assert!(runner.position().z > 0.5);
        assert!(idler.position().z.abs() < 1.0e-4);

        let order: Vec<CharacterId> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![CharacterId(1), CharacterId(2)]);
    }

    #[test]
    fn clock_matches_validated_character_rate() {
        let settings = TickSettings {
            tick_rate: 200,
            max_ticks_per_frame: 10,
        };
        let registry = CharacterRegistry::new(settings).expect("valid rate");
        let config = MovementConfig {
            tick: settings,
            ..MovementConfig::default()
        }
        .validate()
        .expect("clamped, not rejected")
        .config;
        assert_eq!(registry.clock().rate(), 128);
        assert_eq!(registry.clock().rate(), config.tick.tick_rate);
    }

    #[test]
    fn unregister_removes() {
        let mut registry = CharacterRegistry::new(TickSettings::default()).expect("valid rate");
        registry.register(CharacterId(7), spawn(0.0));
        assert!(registry.unregister(CharacterId(7)).is_some());
        assert!(registry.is_empty());
        assert!(registry.get_mut(CharacterId(7)).is_none());
    }
}
