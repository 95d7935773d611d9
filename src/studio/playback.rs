/// A running playback that can be stopped.
pub trait PlaybackHandle {
    fn stop(&mut self);
}

/// Holds at most one active playback.
///
/// Starting a new playback always releases the current one first, so two
/// takes never play over each other.
pub struct PlaybackSlot<H: PlaybackHandle> {
    active: Option<(String, H)>,
}

impl<H: PlaybackHandle> Default for PlaybackSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PlaybackHandle> PlaybackSlot<H> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Start playing `take_id` with `handle`, stopping anything already playing.
    pub fn play(&mut self, take_id: impl Into<String>, handle: H) {
        self.release();
        let take_id = take_id.into();
        log::debug!("Playback started for {take_id}");
        self.active = Some((take_id, handle));
    }

    /// Stop and drop the active handle, if any.
    pub fn release(&mut self) {
        if let Some((take_id, mut handle)) = self.active.take() {
            handle.stop();
            log::debug!("Playback stopped for {take_id}");
        }
    }

    /// Called when playback of `take_id` ended on its own.
    ///
    /// Ignored if another take has started since.
    pub fn finished(&mut self, take_id: &str) {
        if self.playing_id() == Some(take_id) {
            self.active = None;
        }
    }

    pub fn playing_id(&self) -> Option<&str> {
        self.active.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }
}

impl<H: PlaybackHandle> Drop for PlaybackSlot<H> {
    fn drop(&mut self) {
        self.release();
    }
}
