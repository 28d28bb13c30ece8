//! Playback controller: owner of one avatar's queue, knobs and skeleton
//!
//! Core operations take explicit `&mut self`; the browser bindings are thin
//! wrappers that look the controller up in global state and forward here.

use crate::animation::{self, Host, PlaybackState, PlayerPhase};
use crate::compiler;
use crate::config::PlaybackConfig;
use crate::error::SequencerError;
use crate::gesture::{Dictionary, GestureScript};
use crate::scheduler::{FrameOutcome, LoopToken};
use crate::skeleton::{Skeleton, apply_rest_pose};

pub struct PlaybackController<S> {
    state: PlaybackState,
    dictionary: Dictionary,
    skeleton: Option<S>,
}

impl<S: Skeleton> PlaybackController<S> {
    /// Controller with no avatar attached. Fails if any sign in
    /// `dictionary` holds an invalid instruction.
    pub fn new(dictionary: Dictionary, config: PlaybackConfig) -> Result<Self, SequencerError> {
        dictionary.validate()?;
        Ok(Self {
            state: PlaybackState::new(config),
            dictionary,
            skeleton: None,
        })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Swap the sign dictionary. Already queued scripts are kept.
    pub fn replace_dictionary(&mut self, dictionary: Dictionary) -> Result<(), SequencerError> {
        dictionary.validate()?;
        self.dictionary = dictionary;
        Ok(())
    }

    /// Parse a dictionary from JSON and swap it in
    pub fn load_dictionary(&mut self, json: &str) -> Result<(), SequencerError> {
        let dictionary = Dictionary::from_json(json)?;
        self.replace_dictionary(dictionary)
    }

    pub fn skeleton(&self) -> Option<&S> {
        self.skeleton.as_ref()
    }

    /// Attach a new avatar skeleton, returning the previous one.
    ///
    /// All playback state is reset first: queued instructions name joints of
    /// the old skeleton and must never reach the new one.
    pub fn attach_skeleton(&mut self, mut skeleton: S) -> Option<S> {
        let dropped = self.state.queue.len();
        self.state.reset();
        if dropped > 0 {
            log::info!("Avatar swapped, dropped {} pending scripts", dropped);
        }

        let applied = apply_rest_pose(&mut skeleton, self.dictionary.rest_pose());
        log::info!("Avatar attached, rest pose applied to {} channels", applied);

        self.skeleton.replace(skeleton)
    }

    pub fn detach_skeleton(&mut self) -> Option<S> {
        self.state.reset();
        self.skeleton.take()
    }

    /// Append scripts and start playback if no loop is running.
    ///
    /// Returns the token of a newly started loop, which the caller must drive.
    pub fn enqueue<I>(&mut self, scripts: I) -> Option<LoopToken>
    where
        I: IntoIterator<Item = GestureScript>,
    {
        self.state.queue.extend(scripts);
        self.start()
    }

    /// Start the playback loop. Idempotent: `None` while a loop is already
    /// running, when the queue is empty or when no skeleton is attached.
    pub fn start(&mut self) -> Option<LoopToken> {
        if self.skeleton.is_none() {
            return None;
        }
        self.state.begin_loop()
    }

    /// Stop re-scheduling frames. Pending scripts stay queued.
    pub fn stop(&mut self) {
        self.state.halt();
    }

    /// Drop every pending script and reset all flags
    pub fn clear(&mut self) {
        self.state.reset();
    }

    pub fn config(&self) -> PlaybackConfig {
        self.state.config
    }

    pub fn set_config(&mut self, config: PlaybackConfig) {
        config.warn_if_out_of_range();
        self.state.config = config.sanitized();
    }

    pub fn speed(&self) -> f32 {
        self.state.config.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.state.config.set_speed(speed);
    }

    pub fn pause_ms(&self) -> u32 {
        self.state.config.pause_ms
    }

    pub fn set_pause_ms(&mut self, pause_ms: u32) {
        self.state.config.set_pause_ms(pause_ms);
    }

    /// Compile text and queue its gestures (free-text input)
    pub fn sign_text(&mut self, input: &str) -> Result<Option<LoopToken>, SequencerError> {
        if self.skeleton.is_none() {
            return Err(SequencerError::NoSkeleton);
        }
        compiler::compile_into(&self.dictionary, input, &mut self.state.queue);
        Ok(self.start())
    }

    /// Play a single letter or word chosen directly by the user.
    ///
    /// Only accepted while nothing else is queued, so manual triggers never
    /// interleave with a running sequence.
    pub fn trigger_symbol(&mut self, symbol: &str) -> Result<Option<LoopToken>, SequencerError> {
        if self.skeleton.is_none() {
            return Err(SequencerError::NoSkeleton);
        }
        if !self.state.queue.is_empty() {
            return Err(SequencerError::Busy(self.state.queue.len()));
        }
        let entry = self
            .dictionary
            .symbol(symbol)
            .ok_or_else(|| SequencerError::UnknownSymbol(symbol.to_string()))?;
        let scripts: Vec<GestureScript> = entry.scripts().collect();
        Ok(self.enqueue(scripts))
    }

    /// Run one frame for the loop identified by `token`.
    ///
    /// Frames of a loop that is no longer the active one are ignored.
    pub fn tick<H: Host + ?Sized>(
        &mut self,
        token: LoopToken,
        now_ms: f64,
        host: &mut H,
    ) -> FrameOutcome {
        if !self.state.owns_loop(token) {
            log::debug!("Ignoring frame for stale loop {}", token.id());
            return FrameOutcome::Stopped;
        }
        let Some(skeleton) = self.skeleton.as_mut() else {
            self.state.halt();
            return FrameOutcome::Stopped;
        };
        animation::step(&mut self.state, skeleton, host, now_ms)
    }

    pub fn phase(&self, now_ms: f64) -> PlayerPhase {
        self.state.phase(now_ms)
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_running()
    }

    pub fn pending_scripts(&self) -> usize {
        self.state.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TextBufferHost;
    use crate::error::DictionaryError;
    use crate::gesture::{Axis, ChannelValue, Direction, JointInstruction, Property, SignEntry};
    use crate::scheduler::FixedStepDriver;
    use crate::skeleton::Rig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const HAND: &str = "mixamorigRightHand";
    const ARM: &str = "mixamorigRightArm";
    const NECK: &str = "mixamorigNeck";

    fn raise(joint: &str, axis: Axis, limit: f32) -> JointInstruction {
        JointInstruction::rotate(joint, axis, limit, Direction::Increase)
    }

    fn dictionary() -> Dictionary {
        Dictionary::new()
            .with_letter('H', SignEntry::single(vec![raise(HAND, Axis::X, 0.25)]))
            .with_letter('I', SignEntry::single(vec![raise(ARM, Axis::Z, 0.3)]))
            .with_word(
                "yes",
                SignEntry::new(vec![
                    vec![raise(NECK, Axis::X, 0.4)],
                    vec![JointInstruction::rotate(NECK, Axis::X, 0.0, Direction::Decrease)],
                ]),
            )
            .with_rest_pose(vec![ChannelValue {
                joint: ARM.to_string(),
                property: Property::Rotation,
                axis: Axis::Y,
                value: 0.5,
            }])
    }

    fn rig() -> Rig {
        Rig::with_joints([HAND, ARM, NECK])
    }

    fn controller(speed: f32, pause_ms: u32) -> PlaybackController<Rig> {
        let mut controller =
            PlaybackController::new(dictionary(), PlaybackConfig::new(speed, pause_ms)).unwrap();
        controller.attach_skeleton(rig());
        controller
    }

    fn channel(controller: &PlaybackController<Rig>, joint: &str, axis: Axis) -> f32 {
        controller
            .skeleton()
            .unwrap()
            .channel(joint, Property::Rotation, axis)
            .unwrap()
    }

    #[test]
    fn test_hi_plays_to_completion() {
        let mut controller = controller(0.1, 0);
        let mut host = TextBufferHost::default();

        let token = controller.sign_text("HI").unwrap().unwrap();
        assert_eq!(controller.pending_scripts(), 4);

        let mut driver = FixedStepDriver::sixty_hz();
        let frames = driver
            .run_until_stopped(&mut controller, token, &mut host, 100)
            .unwrap();

        assert_eq!(host.text, "HI ");
        assert_eq!(channel(&controller, HAND, Axis::X), 0.25);
        assert!((channel(&controller, ARM, Axis::Z) - 0.3).abs() < 1e-6);
        assert_eq!(controller.phase(driver.now_ms()), PlayerPhase::Idle);
        // marker + 3 moves + retire, twice, plus the stopping frame
        assert_eq!(frames, 11);
    }

    #[test]
    fn test_attach_applies_rest_pose() {
        let controller = controller(0.1, 0);
        assert_eq!(channel(&controller, ARM, Axis::Y), 0.5);
    }

    #[test]
    fn test_start_twice_yields_one_loop() {
        let mut controller = controller(0.1, 0);
        let mut host = TextBufferHost::default();

        let token = controller
            .enqueue([GestureScript::motion(vec![raise(HAND, Axis::Z, 1.0)])])
            .unwrap();
        assert_eq!(controller.start(), None);
        assert_eq!(controller.enqueue(std::iter::empty()), None);

        let mut driver = FixedStepDriver::sixty_hz();
        driver.frame(&mut controller, token, &mut host);
        driver.frame(&mut controller, token, &mut host);
        assert!((channel(&controller, HAND, Axis::Z) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_sign_text_while_playing_appends_to_running_loop() {
        let mut controller = controller(0.1, 0);
        let mut host = TextBufferHost::default();
        let mut driver = FixedStepDriver::sixty_hz();

        let token = controller.sign_text("H").unwrap().unwrap();
        driver.frame(&mut controller, token, &mut host);
        driver.frame(&mut controller, token, &mut host);
        assert_eq!(controller.pending_scripts(), 1);

        assert_eq!(controller.sign_text("i").unwrap(), None);
        assert_eq!(controller.pending_scripts(), 3);
        assert_eq!(controller.state().active_loop(), Some(token));
        assert_eq!(controller.start(), None);

        driver
            .run_until_stopped(&mut controller, token, &mut host, 100)
            .unwrap();
        assert_eq!(host.text, "H I ");
        assert!((channel(&controller, ARM, Axis::Z) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_dictionaries_are_rejected() {
        let bad = Dictionary::new().with_letter('X', SignEntry::single(vec![raise("", Axis::X, 1.0)]));
        assert!(matches!(
            PlaybackController::<Rig>::new(bad.clone(), PlaybackConfig::default()),
            Err(SequencerError::InvalidInstruction { .. })
        ));

        let mut controller = controller(0.1, 0);
        assert!(controller.replace_dictionary(bad).is_err());
        assert!(controller.dictionary().letter('H').is_some());

        assert!(matches!(
            controller.load_dictionary("{ letters: "),
            Err(SequencerError::Dictionary(DictionaryError::Parse(_)))
        ));
        controller
            .load_dictionary(r#"{ "words": { "no": [[]] } }"#)
            .unwrap();
        assert!(controller.dictionary().word("NO").is_some());
        assert!(controller.dictionary().letter('H').is_none());
    }

    #[test]
    fn test_stale_loop_cannot_step() {
        let mut controller = controller(0.1, 0);
        let mut host = TextBufferHost::default();
        let old = controller.sign_text("H").unwrap().unwrap();

        controller.stop();
        let new = controller.start().unwrap();
        assert_ne!(old, new);

        assert_eq!(controller.tick(old, 0.0, &mut host), FrameOutcome::Stopped);
        assert!(controller.is_playing());
        assert_eq!(host.renders, 0);
        assert_eq!(
            controller.tick(new, 0.0, &mut host),
            FrameOutcome::SurfacedText
        );
    }

    #[test]
    fn test_avatar_swap_discards_pending_instructions() {
        let mut controller = controller(0.1, 0);
        let mut host = TextBufferHost::default();
        let mut driver = FixedStepDriver::sixty_hz();

        let token = controller.sign_text("H I").unwrap().unwrap();
        driver.frame(&mut controller, token, &mut host);
        driver.frame(&mut controller, token, &mut host);
        assert!(channel(&controller, HAND, Axis::X) > 0.0);

        let old = controller.attach_skeleton(rig()).unwrap();
        assert!(old.channel(HAND, Property::Rotation, Axis::X).unwrap() > 0.0);
        assert_eq!(controller.pending_scripts(), 0);
        assert!(!controller.is_playing());

        // The old loop's queued frame must not touch the new skeleton
        assert_eq!(
            driver.frame(&mut controller, token, &mut host),
            FrameOutcome::Stopped
        );
        assert_eq!(channel(&controller, HAND, Axis::X), 0.0);
        assert_eq!(channel(&controller, ARM, Axis::Z), 0.0);
        assert!(controller.state().dwell_until().is_none());
    }

    #[test]
    fn test_pause_blocks_mutation_for_pause_window() {
        let mut controller = controller(0.1, 800);
        let mut host = TextBufferHost::default();
        let mut driver = FixedStepDriver::sixty_hz();

        let token = controller.sign_text("HI").unwrap().unwrap();
        let mut completed_at = None;
        while completed_at.is_none() {
            let now = driver.now_ms();
            if driver.frame(&mut controller, token, &mut host) == FrameOutcome::Completed {
                completed_at = Some(now);
            }
        }
        let completed_at = completed_at.unwrap();

        loop {
            let now = driver.now_ms();
            let outcome = driver.frame(&mut controller, token, &mut host);
            if now < completed_at + 800.0 {
                assert_eq!(outcome, FrameOutcome::Dwelling);
                assert_eq!(channel(&controller, ARM, Axis::Z), 0.0);
            } else {
                assert_eq!(outcome, FrameOutcome::SurfacedText);
                break;
            }
        }
        assert_eq!(host.text, "HI ");
    }

    #[test]
    fn test_trigger_symbol_only_when_idle() {
        let mut controller = controller(0.1, 0);

        let token = controller.trigger_symbol("yes").unwrap();
        assert!(token.is_some());
        assert_eq!(controller.pending_scripts(), 2);
        assert!(matches!(
            controller.trigger_symbol("h"),
            Err(SequencerError::Busy(2))
        ));

        controller.clear();
        assert!(matches!(
            controller.trigger_symbol("Q"),
            Err(SequencerError::UnknownSymbol(_))
        ));
        assert!(controller.trigger_symbol("h").unwrap().is_some());
        // Manual triggers carry no text marker
        assert!(controller.state().queue.text_markers().next().is_none());
    }

    #[test]
    fn test_requires_skeleton() {
        let mut controller: PlaybackController<Rig> =
            PlaybackController::new(dictionary(), PlaybackConfig::default()).unwrap();

        assert!(matches!(
            controller.sign_text("hi"),
            Err(SequencerError::NoSkeleton)
        ));
        assert_eq!(controller.enqueue([GestureScript::text("x")]), None);

        controller.attach_skeleton(rig());
        assert!(controller.detach_skeleton().is_some());
        assert_eq!(controller.pending_scripts(), 0);
    }

    #[test]
    fn test_live_knobs_are_clamped() {
        let mut controller = controller(0.1, 800);
        controller.set_speed(-1.0);
        assert!(controller.speed() > 0.0);
        controller.set_pause_ms(0);
        assert_eq!(controller.pause_ms(), 0);

        controller.set_config(PlaybackConfig {
            speed: 0.0,
            pause_ms: 300,
        });
        assert_eq!(controller.config(), PlaybackConfig::new(0.0, 300));
    }

    #[test]
    fn test_random_sequences_drain_and_respect_limits() {
        let mut rng = StdRng::seed_from_u64(0x5167);

        for _ in 0..50 {
            let speed = rng.random_range(0.05..0.5);
            let mut controller = controller(speed, 0);
            let mut host = TextBufferHost::default();

            let mut scripts = Vec::new();
            let mut bound = 0;
            let mut limits = Vec::new();
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                let limit: f32 = rng.random_range(-2.0..2.0);
                let direction = if limit >= 0.0 {
                    Direction::Increase
                } else {
                    Direction::Decrease
                };
                let ins = JointInstruction::rotate(NECK, axis, limit, direction);
                bound += ins.frames_to_reach(0.0, speed) + 2;
                limits.push((axis, limit));
                scripts.push(GestureScript::motion(vec![ins]));
            }

            let token = controller.enqueue(scripts).unwrap();
            let mut driver = FixedStepDriver::sixty_hz();
            let mut used = 0;
            loop {
                let outcome = driver.frame(&mut controller, token, &mut host);
                used += 1;
                for &(axis, limit) in &limits {
                    let value = channel(&controller, NECK, axis);
                    assert!(value.abs() <= limit.abs() + 1e-6);
                }
                if !outcome.reschedules() {
                    break;
                }
                assert!(used <= bound, "queue did not drain within {} frames", bound);
            }

            for (axis, limit) in limits {
                assert_eq!(channel(&controller, NECK, axis), limit);
            }
        }
    }
}
