//! Fire-and-forget delivery of actuator commands
//!
//! Digital operations never wait on the device. Each plan runs as its own
//! task; the steps inside one plan run strictly in order.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pollboard_actuator::{Actuator, DisplayFrame, Error as ActuatorError};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(i64),
    Settle(Duration),
    Display(DisplayFrame),
}

/// Sequence of actuator commands executed one after another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    commands: Vec<Command>,
}

impl CommandPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_motor(mut self, steps: i64) -> Self {
        if steps != 0 {
            self.commands.push(Command::Move(steps));
        }
        self
    }

    pub fn settle(mut self, pause: Duration) -> Self {
        self.commands.push(Command::Settle(pause));
        self
    }

    pub fn display(mut self, frame: DisplayFrame) -> Self {
        self.commands.push(Command::Display(frame));
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// True when nothing would reach the device
    pub fn is_empty(&self) -> bool {
        self.commands
            .iter()
            .all(|c| matches!(c, Command::Settle(_)))
    }
}

pub struct Dispatcher {
    actuator: Arc<dyn Actuator>,
    runtime: Handle,
    tasks: Mutex<JoinSet<()>>,
}

impl Dispatcher {
    pub fn new(actuator: Arc<dyn Actuator>, runtime: Handle) -> Self {
        Self {
            actuator,
            runtime,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn actuator(&self) -> &Arc<dyn Actuator> {
        &self.actuator
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("Dispatcher mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Run a future on the runtime, tracked until it finishes
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(task, &self.runtime);
    }

    /// Execute a plan in the background
    pub fn run(&self, plan: CommandPlan) {
        if plan.is_empty() {
            return;
        }
        let actuator = self.actuator.clone();
        self.spawn(async move {
            for command in plan.commands {
                execute(actuator.as_ref(), command).await;
            }
        });
    }

    pub fn display(&self, frame: DisplayFrame) {
        self.run(CommandPlan::new().display(frame));
    }

    /// Tasks spawned and not yet reaped
    pub fn in_flight(&self) -> usize {
        self.tasks().len()
    }

    /// Wait for every tracked task, including ones spawned while waiting
    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.tasks());
            if pending.is_empty() {
                break;
            }
            while pending.join_next().await.is_some() {}
        }
    }
}

async fn execute(actuator: &dyn Actuator, command: Command) {
    let result = match &command {
        Command::Settle(pause) => {
            tokio::time::sleep(*pause).await;
            return;
        }
        Command::Move(steps) => actuator.move_motor(*steps).await,
        Command::Display(frame) => actuator.update_display(frame).await,
    };

    match result {
        Ok(()) => debug!(?command, "Actuator command delivered"),
        Err(ActuatorError::NotConfigured) => {}
        Err(e) => warn!(?command, error = %e, "Actuator command failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeActuator, Recorded};

    #[test]
    fn test_plan_skips_zero_moves() {
        let plan = CommandPlan::new().move_motor(0).settle(Duration::from_millis(5));
        assert!(plan.is_empty());
        assert_eq!(plan.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_plan_runs_in_order() {
        let actuator = Arc::new(FakeActuator::default());
        let dispatcher = Dispatcher::new(actuator.clone(), Handle::current());

        dispatcher.run(
            CommandPlan::new()
                .move_motor(68)
                .settle(Duration::from_millis(20))
                .move_motor(-68),
        );
        dispatcher.drain().await;

        assert_eq!(actuator.recorded(), vec![Recorded::Move(68), Recorded::Move(-68)]);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_plan() {
        let actuator = Arc::new(FakeActuator::failing());
        let dispatcher = Dispatcher::new(actuator.clone(), Handle::current());

        dispatcher.run(CommandPlan::new().move_motor(5).move_motor(-5));
        dispatcher.drain().await;

        assert_eq!(actuator.recorded(), vec![Recorded::Move(5), Recorded::Move(-5)]);
    }

    #[tokio::test]
    async fn test_display_is_dispatched() {
        let actuator = Arc::new(FakeActuator::default());
        let dispatcher = Dispatcher::new(actuator.clone(), Handle::current());

        dispatcher.display(DisplayFrame::new("Più luce?", "Sì", "No"));
        dispatcher.drain().await;

        assert_eq!(
            actuator.recorded(),
            vec![Recorded::Display("Piu' luce?".to_string())]
        );
    }
}
