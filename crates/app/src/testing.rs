//! Recording fakes shared by the app tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pollboard_actuator::{Actuator, DisplayFrame, Error, PhysicalVotes, Result};
use pollboard_core::ClosureSummary;

use crate::notify::ClosureNotifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Move(i64),
    Display(String),
}

/// Actuator that records every command and replays scripted polls
#[derive(Default)]
pub struct FakeActuator {
    log: Mutex<Vec<Recorded>>,
    polls: Mutex<VecDeque<Result<PhysicalVotes>>>,
    fail: bool,
}

impl FakeActuator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<i64> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Move(steps) => Some(steps),
                Recorded::Display(_) => None,
            })
            .collect()
    }

    pub fn displays(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Display(question) => Some(question),
                Recorded::Move(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn script_poll(&self, reply: Result<PhysicalVotes>) {
        self.polls.lock().unwrap().push_back(reply);
    }

    fn outcome(&self) -> Result<()> {
        if self.fail {
            Err(Error::Status(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Actuator for FakeActuator {
    async fn move_motor(&self, steps: i64) -> Result<()> {
        self.log.lock().unwrap().push(Recorded::Move(steps));
        self.outcome()
    }

    async fn update_display(&self, frame: &DisplayFrame) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Recorded::Display(frame.question.clone()));
        self.outcome()
    }

    async fn poll_votes(&self) -> Result<PhysicalVotes> {
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PhysicalVotes::default()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub closures: Mutex<Vec<ClosureSummary>>,
}

#[async_trait]
impl ClosureNotifier for RecordingNotifier {
    async fn notify_closure(&self, summary: &ClosureSummary) {
        self.closures.lock().unwrap().push(summary.clone());
    }
}
