use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use furysweep_core::*;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;

use crate::{
    EnemyDecisionPolicy, PhaseClock, Result, SessionConfig, SessionError, TimerToken, TurnPhase,
};

/// Observers notified as the session moves along. All methods default to no-ops.
pub trait SessionHooks: Send {
    fn on_phase(&mut self, _phase: TurnPhase) {}
    fn on_fury(&mut self, _phase: TurnPhase, _fury: &Fury) {}
    fn on_outcome(&mut self, _outcome: LevelOutcome) {}
}

#[derive(Debug, Default)]
pub struct NoHooks;

impl SessionHooks for NoHooks {}

/// How a call to [`PhaseStateMachine::play`] ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The reveal changed nothing, still the player's turn.
    Ignored,
    /// A full cycle ran, back to the player's turn.
    Completed,
    LevelEnded(LevelOutcome),
    /// A timer went stale; the session stays put until the next level begins.
    Interrupted,
}

enum Thought {
    Target(Coord2),
    Pass,
    Cancelled,
}

/// Drives one level at a time through the turn phases.
pub struct PhaseStateMachine {
    config: SessionConfig,
    policy: Arc<dyn EnemyDecisionPolicy>,
    hooks: Box<dyn SessionHooks>,
    clock: PhaseClock,
    rng: SmallRng,
    phase: TurnPhase,
    outcome: Option<LevelOutcome>,
    level: u32,
    encounter: Encounter,
    echoes: ActiveEchoes,
    params: Option<BoardParameters>,
    loadout: Vec<FuryId>,
    next_fury: usize,
    intro_script: VecDeque<FuryId>,
    trace: Vec<TurnPhase>,
    events: Vec<GameEvent>,
}

impl PhaseStateMachine {
    pub fn new(
        config: SessionConfig,
        policy: Arc<dyn EnemyDecisionPolicy>,
        echoes: ActiveEchoes,
    ) -> Self {
        let player = Player::new_run(config.base_hp, &echoes);
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            policy,
            hooks: Box::new(NoHooks),
            clock: PhaseClock::new(),
            phase: TurnPhase::default(),
            outcome: None,
            level: 0,
            encounter: Encounter {
                player,
                ..Default::default()
            },
            echoes,
            params: None,
            loadout: Vec::new(),
            next_fury: 0,
            intro_script: VecDeque::new(),
            trace: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl SessionHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Furies used, in order, before the loadout rotation starts.
    pub fn with_intro_script(mut self, furies: impl IntoIterator<Item = FuryId>) -> Self {
        self.intro_script = furies.into_iter().collect();
        self
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn echoes(&self) -> &ActiveEchoes {
        &self.echoes
    }

    pub fn install_echo(&mut self, echo: Echo) -> InstallOutcome {
        self.echoes.install(echo)
    }

    /// Every phase entered since the level began.
    pub fn trace(&self) -> &[TurnPhase] {
        &self.trace
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Handle for cancelling pending timers from elsewhere.
    pub fn clock(&self) -> PhaseClock {
        self.clock.clone()
    }

    pub fn view(&self) -> BoardView {
        BoardView::from_board(&self.encounter.board)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::of(&self.encounter);
        snapshot.set("run.level", i64::from(self.level));
        snapshot.set(
            "run.floor",
            floor_for_level(self.level).map_or(0, i64::from),
        );
        snapshot
    }

    /// Generates the level's board and opponent and hands the turn to the
    /// player. Also the reset after a terminal phase.
    pub fn begin_level(&mut self, config: &LevelConfig) -> Result<()> {
        self.check_furies(&config.opponent)?;
        let board = RandomBoardGenerator::new(self.rng.random()).generate(&config.params)?;
        self.level = config.level;
        self.params = Some(config.params.clone());
        self.start(board, &config.opponent);
        Ok(())
    }

    /// Starts a level on a prepared board; no battlefield reduction happens.
    pub fn begin_with_board(&mut self, board: Board, opponent: &OpponentProfile) -> Result<()> {
        self.check_furies(opponent)?;
        self.params = None;
        self.start(board, opponent);
        Ok(())
    }

    /// Every fury the level could unleash must exist before play starts.
    fn check_furies(&self, opponent: &OpponentProfile) -> Result<()> {
        for &id in self.intro_script.iter().chain(&opponent.loadout) {
            Fury::by_id(id)?;
        }
        Ok(())
    }

    fn start(&mut self, board: Board, opponent: &OpponentProfile) {
        let Encounter {
            mut player,
            mut stats,
            ..
        } = mem::take(&mut self.encounter);
        if !player.is_alive() {
            log::debug!("Previous run ended in defeat, starting a new one");
            player = Player::new_run(self.config.base_hp, &self.echoes);
            stats = RunStats::default();
        }
        player.begin_level(&self.echoes);

        self.encounter = Encounter {
            board,
            player,
            opponent: opponent.spawn(),
            stats,
        };
        self.refresh_overlays();
        self.loadout = opponent.loadout.clone();
        self.next_fury = 0;
        self.outcome = None;
        self.trace.clear();
        self.events.clear();
        self.clock.cancel();
        self.enter(TurnPhase::PlayerTurn);
    }

    fn expect_phase(&self, expected: TurnPhase) -> Result<()> {
        if let Some(outcome) = self.outcome {
            return Err(SessionError::LevelEnded(outcome));
        }
        if self.phase != expected {
            return Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn enter(&mut self, phase: TurnPhase) -> TimerToken {
        log::debug!("Entering {:?}", phase);
        self.phase = phase;
        self.trace.push(phase);
        self.hooks.on_phase(phase);
        self.clock.advance(phase)
    }

    fn refresh_overlays(&mut self) {
        let overlays = Overlays::for_state(&self.echoes, &self.encounter.player);
        self.encounter.board.apply_overlays(overlays);
    }

    /// Toggles a mark on a hidden cell. Does not count as an action.
    pub fn mark(&mut self, coords: Coord2, kind: MarkKind) -> Result<MarkOutcome> {
        self.expect_phase(TurnPhase::PlayerTurn)?;
        Ok(self.encounter.board.toggle_mark(coords, kind)?)
    }

    /// Resolves a player reveal and runs the opponent's reply through to the
    /// next player turn.
    pub async fn play(&mut self, coords: Coord2) -> Result<CycleOutcome> {
        self.expect_phase(TurnPhase::PlayerTurn)?;

        let reveal = resolve_player_reveal(
            mem::take(&mut self.encounter),
            coords,
            &self.echoes,
            &mut self.rng,
        );
        let updated = reveal.has_update();
        self.encounter = reveal.encounter;
        if !updated {
            return Ok(CycleOutcome::Ignored);
        }
        self.events.extend(reveal.events);

        let token = self.enter(TurnPhase::PlayerActionResolving);
        for id in self.echoes.tick() {
            let name = ECHOES
                .iter()
                .find(|def| def.id == id)
                .map_or("Echo", |def| def.name);
            self.events.push(GameEvent::new(
                EventKind::EchoRestored,
                format!("{} restored", name),
            ));
        }
        self.refresh_overlays();
        if let Some(outcome) = self.checkpoint()? {
            return Ok(CycleOutcome::LevelEnded(outcome));
        }
        if self
            .clock
            .delay(token, self.config.player_resolve())
            .await
            .is_stale()
        {
            return Ok(CycleOutcome::Interrupted);
        }

        let token = self.enter(TurnPhase::OpponentThinking);
        let target = match self.think(token).await {
            Thought::Cancelled => return Ok(CycleOutcome::Interrupted),
            Thought::Pass => None,
            Thought::Target(target) => Some(target),
        };

        let token = self.enter(TurnPhase::OpponentActionPendingReveal);
        if self
            .clock
            .delay(token, self.config.opponent_reveal())
            .await
            .is_stale()
        {
            return Ok(CycleOutcome::Interrupted);
        }
        if let Some(target) = target {
            let reveal =
                resolve_opponent_reveal(mem::take(&mut self.encounter), target, &self.echoes);
            self.encounter = reveal.encounter;
            self.events.extend(reveal.events);
        }

        let token = self.enter(TurnPhase::OpponentActionResolving);
        if let Some(outcome) = self.settle() {
            return Ok(CycleOutcome::LevelEnded(outcome));
        }
        if self.encounter.opponent.is_charged() {
            self.unleash()?;
        }
        if let Some(outcome) = self.checkpoint()? {
            return Ok(CycleOutcome::LevelEnded(outcome));
        }
        if self
            .clock
            .delay(token, self.config.opponent_resolve())
            .await
            .is_stale()
        {
            return Ok(CycleOutcome::Interrupted);
        }

        self.enter(TurnPhase::PlayerTurn);
        Ok(CycleOutcome::Completed)
    }

    /// Asks the policy for a target while emitting thinking hints, falling back
    /// to a random hidden cell on timeout or an unusable answer.
    async fn think(&mut self, token: TimerToken) -> Thought {
        let view = self.view();
        let opponent = self.encounter.opponent.clone();
        let player = self.encounter.player.public();
        let policy = Arc::clone(&self.policy);
        let clock = self.clock.clone();

        let mut decision = policy.decide(&view, &opponent, &player);
        let ceiling = tokio::time::sleep(self.config.decision_ceiling());
        tokio::pin!(ceiling);
        let invalidated = clock.invalidated(token);
        tokio::pin!(invalidated);
        let mut hints = tokio::time::interval(self.config.hint_interval());
        hints.set_missed_tick_behavior(MissedTickBehavior::Delay);
        hints.tick().await;

        let choice = loop {
            tokio::select! {
                biased;
                () = &mut invalidated => return Thought::Cancelled,
                choice = &mut decision => break choice,
                () = &mut ceiling => {
                    log::warn!("Opponent decision timed out");
                    break None;
                }
                _ = hints.tick() => {
                    self.events.push(GameEvent::new(EventKind::Considering, "Opponent is considering"));
                }
            }
        };

        match choice {
            Some(target) if view.is_hidden(target) => Thought::Target(target),
            other => {
                if let Some(target) = other {
                    log::warn!("Opponent chose unplayable cell {:?}", target);
                }
                match view.hidden_cells().choose(&mut self.rng) {
                    Some(&target) => {
                        self.events.push(
                            GameEvent::new(EventKind::DecisionFallback, "Opponent picked at random")
                                .at(target),
                        );
                        Thought::Target(target)
                    }
                    None => Thought::Pass,
                }
            }
        }
    }

    /// Latches a terminal outcome if either side is down, player first.
    fn settle(&mut self) -> Option<LevelOutcome> {
        let outcome = self.encounter.outcome()?;
        self.latch(outcome);
        Some(outcome)
    }

    fn latch(&mut self, outcome: LevelOutcome) {
        log::debug!("Level {} ended in {:?}", self.level, outcome);
        self.outcome = Some(outcome);
        self.enter(TurnPhase::terminal(outcome));
        self.hooks.on_outcome(outcome);
    }

    /// Terminal check followed by battlefield reduction once the board has no
    /// hidden hazards left.
    fn checkpoint(&mut self) -> Result<Option<LevelOutcome>> {
        if let Some(outcome) = self.settle() {
            return Ok(Some(outcome));
        }
        if self.encounter.board.has_hidden_hazard() {
            return Ok(None);
        }
        let Some(params) = &self.params else {
            return Ok(None);
        };

        match params.reduced() {
            Some(reduced) => {
                let board = RandomBoardGenerator::new(self.rng.random()).generate(&reduced)?;
                let (rows, cols) = board.size();
                self.encounter.board = board;
                self.refresh_overlays();
                self.params = Some(reduced);
                self.events.push(GameEvent::new(
                    EventKind::BoardReduced,
                    format!("Battlefield reduced to {}x{}", rows, cols),
                ));
                Ok(None)
            }
            None => {
                // nothing left to shrink into
                self.latch(LevelOutcome::Victory);
                Ok(Some(LevelOutcome::Victory))
            }
        }
    }

    fn next_loadout_fury(&mut self) -> Option<FuryId> {
        let id = *self.loadout.get(self.next_fury)?;
        self.next_fury = (self.next_fury + 1) % self.loadout.len();
        Some(id)
    }

    fn unleash(&mut self) -> Result<()> {
        let Some(id) = self
            .intro_script
            .pop_front()
            .or_else(|| self.next_loadout_fury())
        else {
            return Ok(());
        };
        let fury = Fury::by_id(id)?;
        self.encounter.opponent.reset_charge();
        self.hooks.on_fury(self.phase, fury);

        let outcome = apply_fury(fury, mem::take(&mut self.encounter), &self.echoes, &mut self.rng);
        self.encounter = outcome.encounter;
        self.events.extend(outcome.events);
        if let Some((echo, clicks)) = outcome.suppressed {
            self.echoes.suppress(echo, clicks);
            self.refresh_overlays();
        }
        Ok(())
    }
}
