/*!
A simulated character: tick clock, decision layer, locomotion and input latch wired together.

Per tick, in this order and nothing interleaved:
1. stamp the tick and copy the input into [`ReusableData`]
2. state machine `handle_input` then `update` (decisions, transitions)
3. state machine `physics_update` (intents)
4. locomotion (consumes intents, moves the capsule)
5. sync velocities and ground status back into [`ReusableData`]

[`Character::simulate`] is a pure function of the character's state, the input, `dt` and the
config, so a [`CharacterSnapshot`] plus the same inputs always replays to the same result.
*/

use std::sync::Arc;

use crate::collision::SpatialQuery;
use crate::config::MovementConfig;
use crate::data::ReusableData;
use crate::error::{ConfigWarning, ConstructionError, StateMachineError};
use crate::input::{InputLatch, InputSnapshot};
use crate::locomotion::{CharacterLocomotion, LocomotionInput, LocomotionOutput, LocomotionState};
use crate::motor::{CharacterMotor, GroundInfo, MotorSettings};
use crate::state::{
    MovementStateMachine, Sensors, StateHistory, StateId, StateLocals, TransitionReason,
};
use crate::tick::TickClock;
use crate::types::{CapsuleSpec, Quat, Vec3};
use crate::utils::flatten;

/// Everything needed to put a character back at a given tick.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSnapshot {
    pub tick: u64,
    pub locomotion: LocomotionState,
    pub data: ReusableData,
    pub state: StateId,
    pub locals: StateLocals,
}

/// Decision layer: the state machine and the data it shares with locomotion.
#[derive(Debug)]
pub struct MovementController {
    machine: MovementStateMachine,
    data: ReusableData,
}

impl MovementController {
    fn new(machine: MovementStateMachine) -> Self {
        Self {
            machine,
            data: ReusableData::default(),
        }
    }

    #[inline]
    pub fn machine(&self) -> &MovementStateMachine {
        &self.machine
    }

    #[inline]
    pub fn data(&self) -> &ReusableData {
        &self.data
    }

    fn decide(
        &mut self,
        config: &MovementConfig,
        sensors: &dyn Sensors,
        dt: f32,
    ) -> Result<(), StateMachineError> {
        self.machine.handle_input(&mut self.data, config, sensors)?;
        self.machine.update(&mut self.data, config, sensors, dt)?;
        self.machine.physics_update(&mut self.data, config, sensors, dt)
    }

    fn sync(&mut self, out: &LocomotionOutput) {
        let data = &mut self.data;
        let ground = &out.report.ground;
        data.horizontal_velocity = out.horizontal_velocity;
        data.vertical_velocity = out.vertical_velocity;
        data.is_grounded = ground.is_stable();
        data.ground_snapping_prevented = ground.snapping_prevented();
        data.ground_distance = ground.floor_below;
        data.is_sliding = out.is_sliding;
    }
}

/// Sensors for a character that has not been simulated yet: a pose and nothing around it.
struct SpawnSensors {
    position: Vec3,
}

impl Sensors for SpawnSensors {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn ground(&self) -> GroundInfo {
        GroundInfo::none()
    }

    fn ceiling_hit(&self, _distance: f32) -> bool {
        false
    }
}

/// Assembles a [`Character`], failing fast on anything that would simulate wrongly.
#[derive(Clone, Debug)]
pub struct CharacterBuilder {
    config: MovementConfig,
    capsule: Option<CapsuleSpec>,
    position: Vec3,
    rotation: Quat,
    initial_state: StateId,
}

impl CharacterBuilder {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            capsule: None,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            initial_state: StateId::Idling,
        }
    }

    pub fn capsule(mut self, capsule: CapsuleSpec) -> Self {
        self.capsule = Some(capsule);
        self
    }

    /// Feet position and facing at spawn.
    pub fn spawn(mut self, position: Vec3, rotation: Quat) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    pub fn initial_state(mut self, state: StateId) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> Result<Character, ConstructionError> {
        let capsule = self.capsule.ok_or(ConstructionError::MissingCapsule)?;
        validate_capsule(&capsule)?;

        let validated = self.config.validate()?;
        let config = Arc::new(validated.config);
        let clock = TickClock::with_settings(config.tick)?;

        let mut motor = CharacterMotor::new(capsule, MotorSettings::from(&*config), self.position);
        motor.set_rotation(self.rotation);
        let locomotion = CharacterLocomotion::new(motor);

        let mut controller = MovementController::new(MovementStateMachine::with_default_states()?);
        controller.data.last_grounded_height = self.position.y;
        let sensors = SpawnSensors {
            position: self.position,
        };
        controller.machine.initialize(
            self.initial_state,
            &mut controller.data,
            &config,
            &sensors,
        )?;

        log::debug!(
            "[CharacterBuilder] spawned at {:?} in {} ({} config warnings)",
            self.position,
            self.initial_state,
            validated.warnings.len()
        );

        Ok(Character {
            config,
            warnings: validated.warnings,
            clock,
            latch: InputLatch::default(),
            controller,
            locomotion,
        })
    }
}

fn validate_capsule(c: &CapsuleSpec) -> Result<(), ConstructionError> {
    let invalid = |reason: String| Err(ConstructionError::InvalidCapsule(reason));
    if !(c.radius > 0.0) {
        return invalid(format!("radius must be positive, got {}", c.radius));
    }
    if !(c.height >= 2.0 * c.radius) {
        return invalid(format!(
            "height {} is below twice the radius {}",
            c.height, c.radius
        ));
    }
    if !(c.skin_width >= 0.0 && c.skin_width < c.radius) {
        return invalid(format!(
            "skin width {} must be in [0, radius {})",
            c.skin_width, c.radius
        ));
    }
    Ok(())
}

#[derive(Debug)]
pub struct Character {
    config: Arc<MovementConfig>,
    warnings: Vec<ConfigWarning>,
    clock: TickClock,
    latch: InputLatch,
    controller: MovementController,
    locomotion: CharacterLocomotion,
}

impl Character {
    pub fn builder(config: MovementConfig) -> CharacterBuilder {
        CharacterBuilder::new(config)
    }

    /// Frame entry point. Latches `input` and runs every tick the clock releases.
    ///
    /// Returns the number of ticks executed.
    pub fn update<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        real_dt: f32,
        input: InputSnapshot,
    ) -> u32 {
        self.latch.push(input);
        let mut due = Vec::new();
        let executed = self.clock.update(real_dt, |tick, dt| due.push((tick, dt)));
        for (tick, dt) in due {
            let input = self.latch.take();
            self.run_tick(world, &input, tick, dt);
        }
        executed
    }

    /// Runs exactly one tick with `input`. Returns the tick number.
    pub fn simulate<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        input: &InputSnapshot,
        dt: f32,
    ) -> u64 {
        let tick = self.clock.step();
        self.run_tick(world, input, tick, dt);
        tick
    }

    /// Runs one tick stamped with `tick`, for hosts that drive a shared clock.
    pub fn simulate_at<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        input: &InputSnapshot,
        tick: u64,
        dt: f32,
    ) {
        self.clock.set_tick(tick);
        self.run_tick(world, input, tick, dt);
    }

    fn run_tick<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        input: &InputSnapshot,
        tick: u64,
        dt: f32,
    ) {
        let config = &*self.config;
        let data = &mut self.controller.data;
        data.current_tick = tick;
        data.apply_input(input);

        let sensors = self.locomotion.sensors(world, config.ground_layers);
        if let Err(e) = self.controller.decide(config, &sensors, dt) {
            log::error!("[Character] tick {tick}: {e}");
        }

        let locomotion_input = LocomotionInput::from(&self.controller.data);
        let out = self.locomotion.simulate(
            world,
            config,
            &locomotion_input,
            &mut self.controller.data.intents,
            dt,
        );
        self.controller.sync(&out);
    }

    /// Teleport. Ground contact is forgotten and the fall reference moves along.
    pub fn set_position_and_rotation(&mut self, position: Vec3, rotation: Quat) {
        self.locomotion.set_position_and_rotation(position, rotation);
        let data = &mut self.controller.data;
        data.last_grounded_height = position.y;
        data.time_since_grounded = 0.0;
        data.is_grounded = false;
    }

    /// External impulse, e.g. knockback. An upward component lifts the character off the ground.
    pub fn apply_velocity(&mut self, velocity: Vec3) {
        self.locomotion.apply_velocity(velocity);
        let data = &mut self.controller.data;
        data.horizontal_velocity = flatten(velocity);
        data.vertical_velocity = velocity.y;
    }

    pub fn stop_movement(&mut self) {
        self.locomotion.stop_movement();
        let data = &mut self.controller.data;
        data.horizontal_velocity = Vec3::zeros();
        data.vertical_velocity = 0.0;
    }

    /// Switches state from outside the graph, e.g. to follow an authoritative server.
    pub fn force_state<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        state: StateId,
        reason: TransitionReason,
    ) -> Result<(), StateMachineError> {
        let config = &*self.config;
        let sensors = self.locomotion.sensors(world, config.ground_layers);
        self.controller.machine.force_transition(
            state,
            reason,
            &mut self.controller.data,
            config,
            &sensors,
        )
    }

    pub fn capture_state(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            tick: self.clock.current_tick(),
            locomotion: self.locomotion.state(),
            data: self.controller.data.clone(),
            state: self.controller.machine.current().unwrap_or(StateId::Idling),
            locals: *self.controller.machine.locals(),
        }
    }

    /// Puts the character back at `snapshot`. A state change is recorded as a rollback.
    pub fn apply_state(&mut self, snapshot: &CharacterSnapshot) -> Result<(), StateMachineError> {
        self.controller.machine.restore(
            snapshot.state,
            snapshot.locals,
            TransitionReason::Rollback,
            snapshot.tick,
        )?;
        self.clock.set_tick(snapshot.tick);
        self.locomotion.restore(&snapshot.locomotion);
        self.controller.data = snapshot.data.clone();
        Ok(())
    }

    // Diagnostics

    #[inline]
    pub fn config(&self) -> &Arc<MovementConfig> {
        &self.config
    }

    /// Warnings raised when the config was validated.
    #[inline]
    pub fn config_warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    #[inline]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut TickClock {
        &mut self.clock
    }

    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    #[inline]
    pub fn current_state(&self) -> Option<StateId> {
        self.controller.machine.current()
    }

    pub fn current_state_name(&self) -> &'static str {
        self.controller.machine.current_name()
    }

    #[inline]
    pub fn history(&self) -> &StateHistory {
        self.controller.machine.history()
    }

    #[inline]
    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    #[inline]
    pub fn data(&self) -> &ReusableData {
        &self.controller.data
    }

    #[inline]
    pub fn locomotion(&self) -> &CharacterLocomotion {
        &self.locomotion
    }

    #[inline]
    pub fn ground(&self) -> &GroundInfo {
        self.locomotion.motor().ground()
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.locomotion.motor().position()
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.locomotion.motor().rotation()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.controller.data.velocity()
    }

    #[inline]
    pub fn horizontal_velocity(&self) -> Vec3 {
        self.controller.data.horizontal_velocity
    }

    #[inline]
    pub fn vertical_velocity(&self) -> f32 {
        self.controller.data.vertical_velocity
    }

    pub(crate) fn push_input(&mut self, input: InputSnapshot) {
        self.latch.push(input);
    }

    pub(crate) fn take_input(&mut self) -> InputSnapshot {
        self.latch.take()
    }
}
