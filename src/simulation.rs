use crate::clock::SimulationClock;
use crate::component::{Component, Stage};
use crate::{ComponentId, Result};
use slotmap::SlotMap;
use smallvec::SmallVec;

/// Steps a set of components in lockstep with a fixed-step clock.
///
/// Each step has two phases. First every component that can synchronize is
/// told the current time, then every component that can advance is moved
/// forward by one step, and finally the clock itself advances. Within a phase,
/// components are visited by [Stage] and then in the order they were added.
pub struct SimulationManager {
    /// The simulation clock.
    clock: SimulationClock,
    /// The registered components.
    components: SlotMap<ComponentId, Box<dyn Component>>,
    /// The components in the order they are stepped.
    order: SmallVec<[ComponentId; 8]>,
}

impl SimulationManager {
    /// Creates a new simulation driven by the given clock.
    pub fn new(clock: SimulationClock) -> Self {
        Self {
            clock,
            components: SlotMap::with_key(),
            order: SmallVec::new(),
        }
    }

    /// Adds a component to the simulation.
    pub fn add(&mut self, component: impl Component + 'static) -> ComponentId {
        self.add_boxed(Box::new(component))
    }

    /// Adds a boxed component to the simulation.
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> ComponentId {
        let stage = component.stage();
        log::debug!("Adding {} at the {:?} stage", component.name(), stage);
        let id = self.components.insert(component);
        let pos = self
            .order
            .partition_point(|other| self.components[*other].stage() <= stage);
        self.order.insert(pos, id);
        id
    }

    /// Removes a component from the simulation.
    pub fn remove(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let component = self.components.remove(id)?;
        self.order.retain(|other| *other != id);
        Some(component)
    }

    /// Gets a reference to the component with the given ID.
    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id).map(|c| c.as_ref())
    }

    /// Returns an iterator over the components in stepping order.
    pub fn iter_components(&self) -> impl Iterator<Item = (ComponentId, &dyn Component)> {
        self.order
            .iter()
            .map(move |id| (*id, self.components[*id].as_ref()))
    }

    /// The stages of the components, in stepping order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.iter_components().map(|(_, c)| c.stage())
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Gets the current simulation time in s.
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Synchronizes every component to the current time.
    pub fn synchronize(&mut self) -> Result<()> {
        let time = self.clock.time();
        for id in &self.order {
            let component = &mut self.components[*id];
            let result = match component.as_synchronize() {
                Some(c) => c.synchronize(time),
                None => Ok(()),
            };
            result.map_err(|err| err.in_component(component.name()))?;
        }
        Ok(())
    }

    /// Advances every component by one step, then the clock.
    pub fn advance(&mut self) -> Result<()> {
        let step = self.clock.step_size();
        for id in &self.order {
            let component = &mut self.components[*id];
            let result = match component.as_advance() {
                Some(c) => c.advance(step),
                None => Ok(()),
            };
            result.map_err(|err| err.in_component(component.name()))?;
        }
        self.clock.advance(step)
    }

    /// Returns false once the end time has passed or any component asks to stop.
    pub fn is_ok(&self) -> bool {
        self.clock.is_ok()
            && self
                .components
                .values()
                .filter_map(|c| c.as_poll())
                .all(|c| c.is_ok())
    }

    /// Performs a single step of the simulation.
    pub fn step(&mut self) -> Result<()> {
        self.synchronize()?;
        self.advance()
    }

    /// Steps the simulation until [SimulationManager::is_ok] returns false.
    pub fn run(&mut self) -> Result<()> {
        log::debug!(
            "Running with step {} s until {:?}",
            self.clock.step_size(),
            self.clock.end_time()
        );
        while self.is_ok() {
            self.step()?;
        }
        log::debug!(
            "Stopped at t={:.3} after {} steps",
            self.clock.time(),
            self.clock.step_number()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::component::{Advance, Poll, Synchronize};
    use crate::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: String,
        stage: Stage,
        log: Log,
        stop_at: Option<f64>,
        time: f64,
        fail: bool,
    }

    impl Probe {
        fn new(name: &str, stage: Stage, log: &Log) -> Self {
            Self {
                name: name.into(),
                stage,
                log: log.clone(),
                stop_at: None,
                time: 0.0,
                fail: false,
            }
        }
    }

    impl Synchronize for Probe {
        fn synchronize(&mut self, time: f64) -> Result<()> {
            if self.fail {
                return Err(Error::InvalidStep(-1.0));
            }
            self.time = time;
            self.log.borrow_mut().push(format!("sync {}", self.name));
            Ok(())
        }
    }

    impl Advance for Probe {
        fn advance(&mut self, _step: f64) -> Result<()> {
            self.log.borrow_mut().push(format!("advance {}", self.name));
            Ok(())
        }
    }

    impl Poll for Probe {
        fn is_ok(&self) -> bool {
            self.stop_at.map_or(true, |t| self.time < t)
        }
    }

    impl Component for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn stage(&self) -> Stage {
            self.stage
        }

        fn as_synchronize(&mut self) -> Option<&mut dyn Synchronize> {
            Some(self)
        }

        fn as_advance(&mut self) -> Option<&mut dyn Advance> {
            Some(self)
        }

        fn as_poll(&self) -> Option<&dyn Poll> {
            Some(self)
        }
    }

    fn manager(end: Option<f64>) -> SimulationManager {
        SimulationManager::new(SimulationClock::new(0.1, 0.1, end).unwrap())
    }

    #[test]
    fn phases_follow_stage_order() {
        let log = Log::default();
        let mut sim = manager(None);
        sim.add(Probe::new("ctrl", Stage::Controller, &log));
        sim.add(Probe::new("car", Stage::Vehicle, &log));
        sim.add(Probe::new("env", Stage::Environment, &log));
        sim.add(Probe::new("car2", Stage::Vehicle, &log));
        sim.step().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "sync env",
                "sync car",
                "sync car2",
                "sync ctrl",
                "advance env",
                "advance car",
                "advance car2",
                "advance ctrl"
            ]
        );
        assert_eq!(sim.clock().step_number(), 1);
    }

    #[test]
    fn runs_until_end_time() {
        let mut sim = manager(Some(1.0));
        sim.run().unwrap();
        assert_eq!(sim.clock().step_number(), 10);
        assert!((sim.time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn runs_until_a_component_stops() {
        let log = Log::default();
        let mut sim = manager(None);
        let mut probe = Probe::new("script", Stage::Controller, &log);
        probe.stop_at = Some(0.5);
        sim.add(probe);
        sim.run().unwrap();
        assert_eq!(sim.clock().step_number(), 6);
    }

    #[test]
    fn errors_name_the_component() {
        let log = Log::default();
        let mut sim = manager(None);
        let mut probe = Probe::new("broken", Stage::Vehicle, &log);
        probe.fail = true;
        sim.add(probe);
        match sim.step() {
            Err(Error::Component { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sim.clock().step_number(), 0);
    }

    #[test]
    fn removed_components_are_skipped() {
        let log = Log::default();
        let mut sim = manager(None);
        let id = sim.add(Probe::new("gone", Stage::Vehicle, &log));
        sim.add(Probe::new("kept", Stage::Vehicle, &log));
        assert_eq!(sim.remove(id).unwrap().name(), "gone");
        assert!(sim.component(id).is_none());
        sim.step().unwrap();
        assert_eq!(*log.borrow(), vec!["sync kept", "advance kept"]);
        assert_eq!(sim.stages().collect::<Vec<_>>(), vec![Stage::Vehicle]);
    }
}
