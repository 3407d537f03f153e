//! Masquerade engine - owns the world and runs the per-tick system order

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::GameConfig;
use crate::error::{EngineError, RosterError};
use crate::generation::{default_roster, spawn_guests, validate_roster, Manor};
use crate::state::{EndReason, GameEvent, GameState};
use crate::systems::*;

/// An open conversation with one guest
#[derive(Debug, Clone, Copy)]
struct Conversation {
    guest: Entity,
    /// Suspicion charged when the conversation ends
    parting_cost: f32,
    threatened: bool,
}

/// Main simulation engine
pub struct MasqueradeEngine {
    /// ECS world containing guests and corpses
    pub world: World,
    pub player: Player,
    pub state: GameState,
    config: GameConfig,
    manor: Manor,
    countdown: Countdown,
    target: Option<TargetDossier>,
    conversation: Option<Conversation>,
    /// Milliseconds left before a target kill is declared a win
    pending_victory: Option<f32>,
    rng: StdRng,
}

impl MasqueradeEngine {
    /// Build a session from a config and roster, seeding all randomness
    pub fn new(config: GameConfig, roster: Vec<GuestProfile>, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        validate_roster(&roster)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let manor = Manor::new(&config.world);
        let mut world = World::new();
        spawn_guests(&mut world, &roster, &manor, &config.behavior, &mut rng);

        let mut state = GameState::new(config.clock.game_time_seconds);
        let mut countdown = Countdown::new(&config.clock);
        countdown.start(&mut state);

        let target = select_target(&mut world, &mut state, &mut rng)
            .ok_or(RosterError::NoEligibleTarget)?;

        let player = Player::new(manor.room(RoomId::Ballroom).bounds.center());

        log::info!(
            "Party begins with {} guests, {}s on the clock",
            roster.len(),
            state.time_remaining
        );

        Ok(Self {
            world,
            player,
            state,
            config,
            manor,
            countdown,
            target: Some(target),
            conversation: None,
            pending_victory: None,
            rng,
        })
    }

    /// Session with the built-in roster
    pub fn with_default_roster(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::new(config, default_roster()?, seed)
    }

    /// Advance the simulation by `delta_ms` milliseconds
    pub fn update(&mut self, delta_ms: f32) {
        if self.state.is_game_over {
            return;
        }

        let room = self.manor.room(self.state.current_room);

        // Player
        self.player.steer(&self.config.movement);
        self.player.integrate(delta_ms, &room.bounds);

        // Guests
        behavior_system(
            &mut self.world,
            self.state.current_room,
            &room.walkable,
            self.player.position,
            &self.config,
            &mut self.rng,
            delta_ms,
        );
        guest_movement_system(&mut self.world, self.state.current_room, &room.bounds, delta_ms);
        detection_system(&mut self.world, &mut self.state, &self.player, &self.config.perception);
        corpse_discovery_system(&mut self.world, &mut self.state, &self.config.perception);

        // Meter, then clock
        suspicion_system(&self.world, &mut self.state, &self.config.suspicion, delta_ms);
        self.countdown.update(&mut self.state, delta_ms);

        if let Some(remaining) = self.pending_victory.as_mut() {
            *remaining -= delta_ms;
            if *remaining <= 0.0 {
                self.pending_victory = None;
                self.state.finish(EndReason::TargetEliminated);
            }
        }

        self.settle_game_over();
    }

    /// Set the player's directional intent for the following ticks
    pub fn steer(&mut self, input: PlayerInput) {
        self.player.intent = input;
    }

    /// Try to eliminate `guest`
    pub fn attempt_kill(&mut self, guest: Entity) -> Result<KillOutcome, EngineError> {
        let outcome = attempt_kill(&mut self.world, &mut self.state, &self.player, guest, &self.config)?;

        if let KillOutcome::Executed(report) = &outcome {
            // A loud kill can fill the meter before the target's death counts
            check_ceiling(&mut self.state);
            if self.conversation.is_some_and(|c| c.guest == guest) {
                self.end_conversation();
            }
            if report.was_target && !self.state.is_game_over {
                self.pending_victory = Some(self.config.combat.victory_grace_ms);
            }
        }

        self.settle_game_over();
        Ok(outcome)
    }

    /// Walk through the door the player stands at, if any
    pub fn use_door(&mut self) -> Option<RoomId> {
        if self.state.is_game_over || self.player.frozen {
            return None;
        }

        let door = *self
            .manor
            .room(self.state.current_room)
            .door_near(&self.player.position, self.config.interaction_range())?;
        self.enter_room(door.target_room, door.spawn_position);
        Some(door.target_room)
    }

    /// Move the player into `room` at `spawn`.
    ///
    /// Guests alarmed in the room being left calm down to idle.
    pub fn enter_room(&mut self, room: RoomId, spawn: Vec2) {
        if self.state.is_game_over {
            return;
        }

        let from = self.state.current_room;
        for (_, (pos, velocity, behavior)) in
            self.world.query_mut::<(&Position, &mut Velocity, &mut Behavior)>()
        {
            if pos.room == from && behavior.is_alarmed() {
                behavior.reset();
                velocity.0 = Vec2::ZERO;
            }
        }

        self.state.current_room = room;
        self.player.position = self.manor.room(room).bounds.clamp(spawn);
        self.player.velocity = Vec2::ZERO;

        log::info!("Entered the {}", room.display_name());
        self.state.emit(GameEvent::RoomChanged { from, to: room });
    }

    /// Nearest living guest in the current room within interaction range
    pub fn nearby_guest(&self) -> Option<Entity> {
        let range = self.config.interaction_range();
        self.world
            .query::<(&Position, &Alive)>()
            .with::<&GuestProfile>()
            .iter()
            .filter(|(_, (pos, _))| pos.room == self.state.current_room)
            .map(|(entity, (pos, _))| (entity, pos.local.distance(&self.player.position)))
            .filter(|(_, distance)| *distance < range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }

    /// Open a conversation, freezing the player.
    ///
    /// A conversation still open with someone else is closed first, settling
    /// its parting cost. Returns the topics on offer, or `None` if the guest
    /// can't talk now.
    pub fn talk_to(&mut self, guest: Entity) -> Result<Option<Vec<Topic>>, EngineError> {
        if !self.can_converse(guest)? {
            return Ok(None);
        }

        let profile = self.profile(guest)?;
        let topics = available_topics(&profile);

        if self.conversation.is_some_and(|c| c.guest != guest) {
            self.end_conversation();
            if self.state.is_game_over {
                return Ok(None);
            }
        }
        if self.conversation.is_none() {
            self.conversation = Some(Conversation {
                guest,
                parting_cost: 0.0,
                threatened: false,
            });
        }
        self.player.freeze();
        Ok(Some(topics))
    }

    /// Apply a topic's effects with `guest`, returning any clue revealed.
    ///
    /// The clue goes through the ledger, so a filled category stays as it was.
    pub fn interrogate(&mut self, guest: Entity, topic: Topic) -> Result<Option<Clue>, EngineError> {
        if !self.can_converse(guest)? {
            return Ok(None);
        }

        let profile = self.profile(guest)?;

        let current = self.conversation.as_mut().filter(|c| c.guest == guest);
        if topic == Topic::Threaten {
            if let Some(conversation) = current {
                if conversation.threatened {
                    log::debug!("{} has already been threatened", profile.name);
                    return Ok(None);
                }
                conversation.threatened = true;
            }
        }

        let cost = topic_cost(topic);
        if cost > 0.0 {
            self.add_suspicion(cost);
        }
        let parting = parting_cost(&profile, topic);
        match self.conversation.as_mut().filter(|c| c.guest == guest) {
            Some(conversation) => conversation.parting_cost += parting,
            None => self.add_suspicion(parting),
        }
        if self.state.is_game_over {
            return Ok(None);
        }

        let Some(clue) = self
            .target
            .as_ref()
            .and_then(|target| clue_for_topic(&profile, topic, target))
        else {
            return Ok(None);
        };
        discover_clue(&mut self.world, &mut self.state, self.target.as_ref(), clue.clone());
        Ok(Some(clue))
    }

    /// Close the open conversation and unfreeze the player
    pub fn end_conversation(&mut self) {
        if let Some(conversation) = self.conversation.take() {
            if conversation.parting_cost > 0.0 {
                self.add_suspicion(conversation.parting_cost);
            }
        }
        self.player.unfreeze();
    }

    /// Write path for the dialogue collaborator. Filling the meter ends the
    /// session on the spot.
    pub fn add_suspicion(&mut self, amount: f32) {
        if self.state.is_game_over {
            return;
        }
        add_suspicion(&mut self.state, amount);
        check_ceiling(&mut self.state);
        self.settle_game_over();
    }

    pub fn remove_suspicion(&mut self, amount: f32) {
        remove_suspicion(&mut self.state, amount);
    }

    /// Write path for the dialogue collaborator. Returns true if recorded.
    pub fn discover_clue(&mut self, clue: Clue) -> bool {
        discover_clue(&mut self.world, &mut self.state, self.target.as_ref(), clue)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Look up a guest entity by roster id
    pub fn guest(&self, id: &str) -> Option<Entity> {
        self.world
            .query::<&GuestProfile>()
            .iter()
            .find(|(_, profile)| profile.id == id)
            .map(|(entity, _)| entity)
    }

    /// Roster profile of a guest entity
    pub fn profile(&self, guest: Entity) -> Result<GuestProfile, EngineError> {
        self.world
            .get::<&GuestProfile>(guest)
            .map(|profile| (*profile).clone())
            .map_err(|_| EngineError::UnknownGuest(guest))
    }

    pub fn is_alive(&self, guest: Entity) -> bool {
        self.world.get::<&Alive>(guest).is_ok()
    }

    /// Living guests in the current room
    pub fn guests_in_room(&self) -> Vec<Entity> {
        let mut guests: Vec<Entity> = self
            .world
            .query::<(&Position, &Alive)>()
            .with::<&GuestProfile>()
            .iter()
            .filter(|(_, (pos, _))| pos.room == self.state.current_room)
            .map(|(entity, _)| entity)
            .collect();
        guests.sort_by_key(|entity| entity.id());
        guests
    }

    pub fn target(&self) -> Option<&TargetDossier> {
        self.target.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn manor(&self) -> &Manor {
        &self.manor
    }

    pub fn formatted_time(&self) -> String {
        format_clock(self.state.time_remaining)
    }

    pub fn time_progress(&self) -> f32 {
        self.countdown.progress(&self.state)
    }

    pub fn is_high_alert(&self) -> bool {
        is_high_alert(&self.state, &self.config.suspicion)
    }

    pub fn suspicion_percentage(&self) -> f32 {
        suspicion_percentage(&self.state)
    }

    pub fn is_victory_pending(&self) -> bool {
        self.pending_victory.is_some()
    }

    pub fn is_conversing(&self) -> bool {
        self.conversation.is_some()
    }

    /// Guest must be alive, here, and within reach, with the session running
    fn can_converse(&self, guest: Entity) -> Result<bool, EngineError> {
        let mut query = self
            .world
            .query_one::<(&GuestProfile, &Position, Option<&Alive>)>(guest)
            .map_err(|_| EngineError::UnknownGuest(guest))?;
        let Some((profile, pos, alive)) = query.get() else {
            return Err(EngineError::UnknownGuest(guest));
        };

        let reachable = !self.state.is_game_over
            && alive.is_some()
            && pos.room == self.state.current_room
            && pos.local.distance(&self.player.position) <= self.config.interaction_range();
        if !reachable {
            log::debug!("{} can't be spoken to right now", profile.name);
        }
        Ok(reachable)
    }

    fn settle_game_over(&mut self) {
        if self.state.is_game_over {
            self.countdown.stop();
            self.pending_victory = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(seed: u64) -> MasqueradeEngine {
        MasqueradeEngine::with_default_roster(GameConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_new_session() {
        let engine = engine(42);
        assert_eq!(engine.state.current_room, RoomId::Ballroom);
        assert_eq!(engine.state.time_remaining, 300.0);
        assert_eq!(engine.formatted_time(), "5:00");
        assert!(engine.state.target_id.is_some());
        assert_eq!(engine.world.query::<&GuestProfile>().iter().count(), 17);
        assert_eq!(engine.guests_in_room().len(), 6);
        assert_eq!(engine.player.position, Vec2::new(400.0, 304.0));
    }

    #[test]
    fn test_target_is_deterministic_per_seed() {
        assert_eq!(engine(9).state.target_id, engine(9).state.target_id);
    }

    #[test]
    fn test_rejects_bad_roster() {
        let result = MasqueradeEngine::new(GameConfig::default(), Vec::new(), 1);
        assert!(matches!(result, Err(EngineError::Roster(RosterError::Empty))));
    }

    #[test]
    fn test_door_round_trip() {
        let mut engine = engine(1);
        engine.player.position = Vec2::new(400.0, 60.0);
        assert_eq!(engine.use_door(), Some(RoomId::Garden));
        assert_eq!(engine.state.current_room, RoomId::Garden);
        assert_eq!(engine.player.position, Vec2::new(400.0, 544.0));

        assert_eq!(engine.use_door(), Some(RoomId::Ballroom));
        assert_eq!(engine.player.position, Vec2::new(400.0, 64.0));
        assert_eq!(
            engine.drain_events(),
            vec![
                GameEvent::RoomChanged { from: RoomId::Ballroom, to: RoomId::Garden },
                GameEvent::RoomChanged { from: RoomId::Garden, to: RoomId::Ballroom },
            ]
        );
    }

    #[test]
    fn test_no_door_in_the_middle_of_the_room() {
        let mut engine = engine(1);
        assert_eq!(engine.use_door(), None);
        assert_eq!(engine.state.current_room, RoomId::Ballroom);
    }

    #[test]
    fn test_leaving_calms_alarmed_guests() {
        let mut engine = engine(1);
        let guest = engine.guests_in_room()[0];
        engine.world.get::<&mut Behavior>(guest).unwrap().become_alarmed();
        engine.world.get::<&mut LocalSuspicion>(guest).unwrap().0 = 80.0;

        engine.enter_room(RoomId::Library, Vec2::new(64.0, 304.0));
        assert_eq!(engine.world.get::<&Behavior>(guest).unwrap().state, BehaviorState::Idle);
        assert_eq!(engine.world.get::<&LocalSuspicion>(guest).unwrap().0, 80.0);
    }

    #[test]
    fn test_guests_elsewhere_are_frozen_in_time() {
        let mut engine = engine(5);
        let cellar_guest = engine.guest("wine_merchant").unwrap();
        let before = (*engine.world.get::<&Behavior>(cellar_guest).unwrap()).clone();

        for _ in 0..100 {
            engine.update(50.0);
        }
        let after = (*engine.world.get::<&Behavior>(cellar_guest).unwrap()).clone();
        assert_eq!(before.state_timer, after.state_timer);
        assert_eq!(before.idle_time, after.idle_time);
    }

    #[test]
    fn test_conversation_freezes_player() {
        let mut engine = engine(3);
        let guest = engine.guests_in_room()[0];
        let spot = engine.world.get::<&Position>(guest).unwrap().local;
        engine.player.position = spot + Vec2::new(20.0, 0.0);

        let topics = engine.talk_to(guest).unwrap();
        assert!(topics.is_some());
        assert!(engine.player.frozen);

        engine.steer(PlayerInput::walk(1, 0));
        engine.update(100.0);
        assert_eq!(engine.player.velocity, Vec2::ZERO);

        engine.end_conversation();
        assert!(!engine.player.frozen);
        assert!(!engine.is_conversing());
    }

    #[test]
    fn test_threaten_charges_on_parting() {
        let mut engine = engine(3);
        let guest = engine.guest("lord_vermillion").unwrap();
        let spot = engine.world.get::<&Position>(guest).unwrap().local;
        engine.player.position = spot + Vec2::new(0.0, 20.0);

        engine.talk_to(guest).unwrap();
        assert_eq!(engine.interrogate(guest, Topic::Threaten).unwrap(), None);
        assert_eq!(engine.state.suspicion_level, 10.0);
        engine.end_conversation();
        // Lord Vermillion is nervous
        assert_eq!(engine.state.suspicion_level, 15.0);
    }

    #[test]
    fn test_switching_conversations_settles_the_first() {
        let mut engine = engine(3);
        let vermillion = engine.guest("lord_vermillion").unwrap();
        let ashford = engine.guest("lord_ashford").unwrap();

        let spot = engine.world.get::<&Position>(vermillion).unwrap().local;
        engine.player.position = spot + Vec2::new(0.0, 20.0);
        engine.talk_to(vermillion).unwrap();
        engine.interrogate(vermillion, Topic::Threaten).unwrap();
        assert_eq!(engine.state.suspicion_level, 10.0);

        let spot = engine.world.get::<&Position>(ashford).unwrap().local;
        engine.player.position = spot + Vec2::new(0.0, 20.0);
        assert!(engine.talk_to(ashford).unwrap().is_some());
        assert_eq!(engine.state.suspicion_level, 15.0);
        assert!(engine.player.frozen);

        engine.end_conversation();
        assert_eq!(engine.state.suspicion_level, 15.0);
        assert!(!engine.player.frozen);
    }

    #[test]
    fn test_threaten_once_per_conversation() {
        let mut engine = engine(3);
        let guest = engine.guest("lord_vermillion").unwrap();
        let spot = engine.world.get::<&Position>(guest).unwrap().local;
        engine.player.position = spot + Vec2::new(0.0, 20.0);

        engine.talk_to(guest).unwrap();
        engine.interrogate(guest, Topic::Threaten).unwrap();
        engine.interrogate(guest, Topic::Threaten).unwrap();
        // Reopening with the same guest keeps the conversation going
        engine.talk_to(guest).unwrap();
        engine.interrogate(guest, Topic::Threaten).unwrap();
        assert_eq!(engine.state.suspicion_level, 10.0);

        engine.end_conversation();
        assert_eq!(engine.state.suspicion_level, 15.0);
    }

    #[test]
    fn test_unknown_guest_errors() {
        let mut engine = engine(3);
        let stray = engine.world.spawn((Alive,));
        assert!(matches!(engine.talk_to(stray), Err(EngineError::UnknownGuest(_))));
        assert!(matches!(engine.attempt_kill(stray), Err(EngineError::UnknownGuest(_))));
    }

    #[test]
    fn test_update_is_noop_after_game_over() {
        let mut engine = engine(3);
        engine.state.finish(EndReason::Apprehended);
        let time = engine.state.time_remaining;
        engine.update(5_000.0);
        assert_eq!(engine.state.time_remaining, time);
    }
}
