//! Survey engine: the API front ends call
//!
//! Every operation runs one load-modify-save cycle while holding the store
//! lock. Actuator commands and notifications go out after the lock is
//! released and are never awaited.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use pollboard_actuator::{DisplayFrame, PhysicalVotes};
use pollboard_core::invariants;
use pollboard_core::{
    Choice, Config, Creator, Database, FillerDeck, Placement, PlacementOutcome, Promotion,
    PromotionSource, Result, StepConfig, Survey, SurveyDraft, SurveyId, SurveyRepository,
    SurveySet, SurveySummary, Tally,
};
use tracing::{debug, info, warn};

use crate::closure::{ClosurePolicy, ClosureReport};
use crate::dispatch::{CommandPlan, Dispatcher};
use crate::notify::{ClosureNotifier, LogNotifier};
use crate::state::lock_db;

/// Tunables the engine reads from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub steps: StepConfig,
    pub vote_threshold: u32,
    pub vote_settle: Duration,
    pub physical_settle: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            steps: config.step_config(),
            vote_threshold: config.closure.vote_threshold,
            vote_settle: config.schedule.vote_settle(),
            physical_settle: config.schedule.physical_settle(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of a front-end vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub survey_id: SurveyId,
    pub tally: Tally,
    /// Motor steps issued for this vote
    pub steps: i64,
    pub closure: Option<ClosureReport>,
}

/// Result of replaying one poll worth of device votes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub survey_id: SurveyId,
    pub replayed: u32,
    pub tally: Tally,
    pub closure: Option<ClosureReport>,
}

pub struct SurveyEngine {
    db: Arc<Mutex<Database>>,
    dispatcher: Dispatcher,
    notifier: Arc<dyn ClosureNotifier>,
    deck: FillerDeck,
    policy: ClosurePolicy,
    settings: EngineSettings,
}

impl SurveyEngine {
    pub fn new(db: Arc<Mutex<Database>>, dispatcher: Dispatcher, settings: EngineSettings) -> Self {
        Self {
            db,
            dispatcher,
            notifier: Arc::new(LogNotifier),
            deck: FillerDeck::standard(),
            policy: ClosurePolicy::new(settings.vote_threshold, settings.steps),
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ClosureNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_deck(mut self, deck: FillerDeck) -> Self {
        self.deck = deck;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// One serialized load-modify-save cycle
    ///
    /// Nothing is written when `apply` fails.
    fn mutate<T>(&self, apply: impl FnOnce(&mut SurveySet) -> Result<T>) -> Result<T> {
        let db = lock_db(&self.db);
        let mut set = db.load_surveys();
        let out = apply(&mut set)?;
        invariants::assert_set_invariants(&set);
        db.save_surveys(&mut set)?;
        Ok(out)
    }

    fn read<T>(&self, view: impl FnOnce(&SurveySet) -> T) -> T {
        let db = lock_db(&self.db);
        view(&db.load_surveys())
    }

    /// Create a survey and place it: live, preempting a filler, or queued
    pub fn create_survey(
        &self,
        prompt: &str,
        option_a: &str,
        option_b: &str,
        creator_id: i64,
        creator_name: &str,
    ) -> Result<Placement> {
        let draft = SurveyDraft::new(prompt, option_a, option_b)?;
        let creator = Creator::person(creator_id, creator_name);

        let (placement, frame) = self.mutate(|set| {
            let placement = set.create(draft, creator, Utc::now())?;
            let frame = placement
                .is_active()
                .then(|| set.get(placement.id).map(display_frame))
                .flatten();
            Ok((placement, frame))
        })?;

        match placement.outcome {
            PlacementOutcome::Activated => {
                info!(survey_id = %placement.id, "Survey created and activated")
            }
            PlacementOutcome::Preempted { retired } => info!(
                survey_id = %placement.id,
                retired = %retired,
                "Survey preempted automated survey"
            ),
            PlacementOutcome::Queued { position } => {
                info!(survey_id = %placement.id, position, "Survey queued")
            }
        }

        if let Some(frame) = frame {
            self.dispatcher.display(frame);
        }
        Ok(placement)
    }

    pub fn active_survey(&self) -> Option<Survey> {
        self.read(|set| set.active().cloned())
    }

    pub fn survey_by_id(&self, id: SurveyId) -> Option<Survey> {
        self.read(|set| set.get(id).cloned())
    }

    /// All surveys without their vote logs
    pub fn list_surveys(&self) -> Vec<SurveySummary> {
        self.read(SurveySet::summaries)
    }

    pub fn queued_count(&self) -> usize {
        self.read(SurveySet::queued_count)
    }

    /// Record a front-end vote, then close the survey if it hit the threshold
    pub fn cast_vote(
        &self,
        survey_id: SurveyId,
        choice: Choice,
        voter_id: Option<i64>,
    ) -> Result<VoteOutcome> {
        let (tally, closure, frame) = self.mutate(|set| {
            let now = Utc::now();
            let tally = set.cast_vote(survey_id, choice, voter_id, now)?;
            let closure = self.policy.check(set, survey_id, &self.deck, now)?;
            let frame = promoted_frame(set, closure.as_ref());
            Ok((tally, closure, frame))
        })?;

        let steps = self.settings.steps.steps_for(choice);
        debug!(survey_id = %survey_id, %choice, steps, "Vote recorded");

        let mut plan = CommandPlan::new().move_motor(steps);
        if let Some(report) = &closure {
            plan = plan
                .settle(self.settings.vote_settle)
                .move_motor(report.compensation);
        }
        self.dispatcher.run(plan);
        self.after_closure(closure.as_ref(), frame);

        Ok(VoteOutcome {
            survey_id,
            tally,
            steps,
            closure,
        })
    }

    /// Replay votes cast on the device against the live survey
    ///
    /// The device already moved for these, so only a closure compensation
    /// is sent back. Returns `None` when no survey is live.
    pub fn replay_physical_votes(&self, votes: PhysicalVotes) -> Result<Option<ReplayOutcome>> {
        if votes.is_empty() {
            return Ok(None);
        }
        let votes = capped(votes);

        let replay = self.mutate(|set| {
            let Some(survey_id) = set.active().map(|s| s.id) else {
                return Ok(None);
            };
            let now = Utc::now();

            let mut tally = Tally::default();
            let units = std::iter::repeat(Choice::A)
                .take(votes.a as usize)
                .chain(std::iter::repeat(Choice::B).take(votes.b as usize));
            for choice in units {
                tally = set.cast_vote(survey_id, choice, None, now)?;
            }

            let closure = self.policy.check(set, survey_id, &self.deck, now)?;
            let frame = promoted_frame(set, closure.as_ref());
            Ok(Some((survey_id, tally, closure, frame)))
        })?;

        let Some((survey_id, tally, closure, frame)) = replay else {
            debug!(a = votes.a, b = votes.b, "Physical votes with no active survey");
            return Ok(None);
        };

        info!(survey_id = %survey_id, a = votes.a, b = votes.b, "Physical votes recorded");

        if let Some(report) = &closure {
            self.dispatcher.run(
                CommandPlan::new()
                    .settle(self.settings.physical_settle)
                    .move_motor(report.compensation),
            );
        }
        self.after_closure(closure.as_ref(), frame);

        Ok(Some(ReplayOutcome {
            survey_id,
            replayed: votes.total(),
            tally,
            closure,
        }))
    }

    fn after_closure(&self, closure: Option<&ClosureReport>, frame: Option<DisplayFrame>) {
        if let Some(frame) = frame {
            self.dispatcher.display(frame);
        }
        if let Some(report) = closure {
            let notifier = self.notifier.clone();
            let summary = report.summary.clone();
            self.dispatcher.spawn(async move {
                notifier.notify_closure(&summary).await;
            });
        }
    }

    /// Bring a survey online if none is live
    pub fn rotate(&self) -> Result<Option<Promotion>> {
        let promoted = self.mutate(|set| {
            let promotion = set.promote_next(Utc::now(), &self.deck)?;
            Ok(promotion.and_then(|p| set.get(p.survey_id).map(|s| (p, display_frame(s)))))
        })?;

        let Some((promotion, frame)) = promoted else {
            return Ok(None);
        };
        match promotion.source {
            PromotionSource::Queue => {
                info!(survey_id = %promotion.survey_id, "Queued survey activated")
            }
            PromotionSource::Filler => {
                info!(survey_id = %promotion.survey_id, "Filler survey created")
            }
        }
        self.dispatcher.display(frame);
        Ok(Some(promotion))
    }

    /// Push the live survey to the display without rotating
    pub fn resync_display(&self) -> bool {
        match self.active_survey() {
            Some(survey) => {
                info!(survey_id = %survey.id, "Resyncing display with active survey");
                self.dispatcher.display(display_frame(&survey));
                true
            }
            None => false,
        }
    }
}

/// Most device votes replayed from a single poll, per option
pub const MAX_REPLAY_PER_OPTION: u32 = 1000;

fn capped(votes: PhysicalVotes) -> PhysicalVotes {
    if votes.a <= MAX_REPLAY_PER_OPTION && votes.b <= MAX_REPLAY_PER_OPTION {
        return votes;
    }
    warn!(
        a = votes.a,
        b = votes.b,
        max = MAX_REPLAY_PER_OPTION,
        "Implausible device vote counts, capping replay"
    );
    PhysicalVotes {
        a: votes.a.min(MAX_REPLAY_PER_OPTION),
        b: votes.b.min(MAX_REPLAY_PER_OPTION),
    }
}

fn display_frame(survey: &Survey) -> DisplayFrame {
    DisplayFrame::new(&survey.prompt, &survey.option_a, &survey.option_b)
}

fn promoted_frame(set: &SurveySet, closure: Option<&ClosureReport>) -> Option<DisplayFrame> {
    let promoted = closure?.promoted?;
    set.get(promoted.survey_id).map(display_frame)
}
