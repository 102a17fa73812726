use std::collections::BTreeMap;

use crate::config::MovementConfig;
use crate::data::ReusableData;
use crate::error::StateMachineError;

use super::{
    MovementState, Sensors, StateContext, StateHistory, StateHistoryEntry, StateId, StateLocals,
    TransitionReason, default_states,
};

#[derive(Clone, Copy)]
enum Phase {
    HandleInput,
    Update,
    PhysicsUpdate,
}

/// Owns the registered states and the single active one.
#[derive(Debug, Default)]
pub struct MovementStateMachine {
    states: BTreeMap<StateId, Box<dyn MovementState>>,
    current: Option<StateId>,
    locals: StateLocals,
    history: StateHistory,
}

impl MovementStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine with every default state registered.
    pub fn with_default_states() -> Result<Self, StateMachineError> {
        let mut machine = Self::new();
        for state in default_states() {
            machine.register(state)?;
        }
        Ok(machine)
    }

    pub fn register(&mut self, state: Box<dyn MovementState>) -> Result<(), StateMachineError> {
        let id = state.id();
        if self.states.contains_key(&id) {
            return Err(StateMachineError::DuplicateState(id));
        }
        self.states.insert(id, state);
        Ok(())
    }

    pub fn is_registered(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn state(&self, id: StateId) -> Option<&dyn MovementState> {
        self.states.get(&id).map(|s| s.as_ref())
    }

    /// Looks a registered state up by its display name.
    pub fn state_by_name(&self, name: &str) -> Option<&dyn MovementState> {
        self.states
            .values()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    #[inline]
    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_name(&self) -> &'static str {
        self.current.map_or("None", StateId::name)
    }

    #[inline]
    pub fn locals(&self) -> &StateLocals {
        &self.locals
    }

    #[inline]
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut StateHistory {
        &mut self.history
    }

    /// Enters `initial`, recording an `Init` transition.
    pub fn initialize(
        &mut self,
        initial: StateId,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
    ) -> Result<(), StateMachineError> {
        self.change(initial, TransitionReason::Init, data, config, sensors)
    }

    pub fn handle_input(
        &mut self,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
    ) -> Result<(), StateMachineError> {
        self.run(Phase::HandleInput, data, config, sensors, 0.0)
    }

    pub fn update(
        &mut self,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
        dt: f32,
    ) -> Result<(), StateMachineError> {
        self.locals.state_time += dt;
        self.run(Phase::Update, data, config, sensors, dt)
    }

    pub fn physics_update(
        &mut self,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
        dt: f32,
    ) -> Result<(), StateMachineError> {
        self.run(Phase::PhysicsUpdate, data, config, sensors, dt)
    }

    /// Transition requested from outside the state graph. Runs exit and enter hooks.
    pub fn force_transition(
        &mut self,
        to: StateId,
        reason: TransitionReason,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
    ) -> Result<(), StateMachineError> {
        self.change(to, reason, data, config, sensors)
    }

    /// Reinstates a captured active state without running hooks.
    ///
    /// A change of state is recorded with `reason` at `tick`.
    pub fn restore(
        &mut self,
        current: StateId,
        locals: StateLocals,
        reason: TransitionReason,
        tick: u64,
    ) -> Result<(), StateMachineError> {
        if !self.is_registered(current) {
            return Err(StateMachineError::UnknownState(current));
        }
        if self.current != Some(current) {
            self.history.push(StateHistoryEntry {
                from: self.current,
                to: current,
                tick,
                reason,
            });
            log::debug!("[MovementStateMachine] {} -> {current} ({reason})", self.current_name());
        }
        self.current = Some(current);
        self.locals = locals;
        Ok(())
    }

    fn run(
        &mut self,
        phase: Phase,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
        dt: f32,
    ) -> Result<(), StateMachineError> {
        let id = self.current.ok_or(StateMachineError::NotInitialized)?;
        let state = self
            .states
            .get_mut(&id)
            .ok_or(StateMachineError::UnknownState(id))?;

        let mut ctx = StateContext {
            data: &mut *data,
            config,
            sensors,
            locals: &mut self.locals,
        };
        let next = match phase {
            Phase::HandleInput => state.handle_input(&mut ctx),
            Phase::Update => state.update(&mut ctx, dt),
            Phase::PhysicsUpdate => state.physics_update(&mut ctx, dt),
        };

        if let Some(next) = next {
            if let Err(e) = self.change(next, TransitionReason::Condition, data, config, sensors) {
                log::warn!("[MovementStateMachine] {id} requested {next}: {e}");
            }
        }
        Ok(())
    }

    fn change(
        &mut self,
        to: StateId,
        reason: TransitionReason,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &dyn Sensors,
    ) -> Result<(), StateMachineError> {
        if !self.states.contains_key(&to) {
            return Err(StateMachineError::UnknownState(to));
        }

        let from = self.current;
        if let Some(state) = from.and_then(|id| self.states.get_mut(&id)) {
            let mut ctx = StateContext {
                data: &mut *data,
                config,
                sensors,
                locals: &mut self.locals,
            };
            state.exit(&mut ctx);
        }

        self.locals = StateLocals::default();
        self.current = Some(to);
        self.history.push(StateHistoryEntry {
            from,
            to,
            tick: data.current_tick,
            reason,
        });
        log::debug!(
            "[MovementStateMachine] tick {}: {} -> {to} ({reason})",
            data.current_tick,
            from.map_or("None", StateId::name),
        );

        if let Some(state) = self.states.get_mut(&to) {
            let mut ctx = StateContext {
                data,
                config,
                sensors,
                locals: &mut self.locals,
            };
            state.enter(&mut ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;
    use crate::state::test_support::FakeSensors;
    use crate::state::{IdlingState, MovingState};

    const DT: f32 = 1.0 / 60.0;

    fn machine() -> MovementStateMachine {
        MovementStateMachine::with_default_states().expect("default states")
    }

    fn tick(
        m: &mut MovementStateMachine,
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &FakeSensors,
    ) {
        m.handle_input(data, config, sensors).expect("initialized");
        m.update(data, config, sensors, DT).expect("initialized");
        m.physics_update(data, config, sensors, DT).expect("initialized");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut m = MovementStateMachine::new();
        m.register(Box::new(IdlingState)).expect("first");
        assert_eq!(
            m.register(Box::new(IdlingState)),
            Err(StateMachineError::DuplicateState(StateId::Idling))
        );
        m.register(Box::new(MovingState::new(StateId::Walking)))
            .expect("distinct gait");
    }

    #[test]
    fn updates_before_initialize_fail() {
        let mut m = machine();
        let mut data = ReusableData::default();
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        assert_eq!(
            m.update(&mut data, &config, &sensors, DT),
            Err(StateMachineError::NotInitialized)
        );
    }

    #[test]
    fn unknown_state_is_an_error() {
        let mut m = MovementStateMachine::new();
        m.register(Box::new(IdlingState)).expect("register");
        let mut data = ReusableData::default();
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        assert_eq!(
            m.initialize(StateId::Falling, &mut data, &config, &sensors),
            Err(StateMachineError::UnknownState(StateId::Falling))
        );
        assert!(m.current().is_none());
    }

    #[test]
    fn idle_to_running_on_input_and_back() {
        let mut m = machine();
        let mut data = ReusableData::default();
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        m.initialize(StateId::Idling, &mut data, &config, &sensors)
            .expect("init");

        data.apply_input(&InputSnapshot::default().with_move(0.0, 1.0));
        tick(&mut m, &mut data, &config, &sensors);
        assert_eq!(m.current(), Some(StateId::Running));
        assert_eq!(data.movement_speed_modifier, config.run_modifier());

        data.apply_input(&InputSnapshot::default().with_move(0.0, 1.0).sprinting());
        tick(&mut m, &mut data, &config, &sensors);
        assert_eq!(m.current(), Some(StateId::Sprinting));

        data.apply_input(&InputSnapshot::default());
        tick(&mut m, &mut data, &config, &sensors);
        assert_eq!(m.current(), Some(StateId::Idling));

        let names: Vec<String> = m.history().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "[Tick 0] None -> Idling (Init)",
                "[Tick 0] Idling -> Running (Condition)",
                "[Tick 0] Running -> Sprinting (Condition)",
                "[Tick 0] Sprinting -> Idling (Condition)",
            ]
        );
    }

    #[test]
    fn locals_reset_on_enter() {
        let mut m = machine();
        let mut data = ReusableData::default();
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        m.initialize(StateId::Idling, &mut data, &config, &sensors)
            .expect("init");
        for _ in 0..10 {
            tick(&mut m, &mut data, &config, &sensors);
        }
        assert!(m.locals().state_time > 0.1);

        m.force_transition(
            StateId::Walking,
            TransitionReason::Forced,
            &mut data,
            &config,
            &sensors,
        )
        .expect("registered");
        assert_eq!(m.locals().state_time, 0.0);
        assert_eq!(
            m.history().last().map(|e| e.reason),
            Some(TransitionReason::Forced)
        );
    }

    #[test]
    fn restore_records_rollback_only_on_change() {
        let mut m = machine();
        let mut data = ReusableData::default();
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        m.initialize(StateId::Idling, &mut data, &config, &sensors)
            .expect("init");

        m.restore(StateId::Idling, StateLocals::default(), TransitionReason::Rollback, 3)
            .expect("registered");
        assert_eq!(m.history().len(), 1);

        m.restore(StateId::Falling, StateLocals::default(), TransitionReason::Rollback, 4)
            .expect("registered");
        assert_eq!(m.current(), Some(StateId::Falling));
        assert_eq!(
            m.history().last().map(|e| e.to_string()),
            Some("[Tick 4] Idling -> Falling (Rollback)".to_owned())
        );
    }

    #[test]
    fn lookup_by_name() {
        let m = machine();
        assert_eq!(
            m.state_by_name("Sprinting").map(|s| s.id()),
            Some(StateId::Sprinting)
        );
        assert!(m.state_by_name("Swimming").is_none());
    }
}
