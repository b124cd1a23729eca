//! Media element abstraction and event plumbing.
//!
//! The engine never touches a decoder directly: hosts provide elements that
//! implement [`MediaElement`] and forward their asynchronous notifications
//! through an [`EventQueue`]. Every call that depends on an async outcome
//! (`load`, `play`, `seek`) returns immediately; the outcome arrives later
//! as a [`MediaEvent`].

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use reelsync_core::Seconds;
use reelsync_timeline::MediaSource;

/// Which engine-side slot an element occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// The element whose reported time is authoritative for the clock.
    Driver,
    /// An element kept in sync with the driver but not itself authoritative.
    Follower,
    /// A detached element owned by the preloader.
    Preload,
}

/// Asynchronous notification from a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Source metadata (duration) is known.
    MetadataReady { duration: Seconds },
    /// Enough data is buffered that seeking and playing are safe.
    DataReady,
    /// Periodic position report while playing. High frequency.
    TimeUpdate(Seconds),
    /// A previously requested seek has settled at this position.
    Seeked(Seconds),
    /// A `play()` call was accepted and playback started.
    PlayResolved,
    /// A `play()` call was rejected (e.g. autoplay policy).
    PlayRejected(String),
    /// Playback ran off the end of the loaded source.
    Ended,
    /// The source failed to load or decode.
    Error(String),
}

/// A playable media surface (video or audio element).
///
/// All methods are non-blocking. Completion and failure of `load`, `play`
/// and `seek` are reported through the element's [`EventSender`].
pub trait MediaElement {
    /// Point the element at a new source and begin loading it.
    /// Any in-flight load is superseded.
    fn load(&mut self, source: &MediaSource);

    /// Request playback. The deferred outcome arrives as
    /// [`MediaEvent::PlayResolved`] or [`MediaEvent::PlayRejected`].
    fn play(&mut self);

    /// Halt playback immediately.
    fn pause(&mut self);

    /// Whether the element is currently paused.
    fn is_paused(&self) -> bool;

    /// Last known playback position within the loaded source.
    fn current_time(&self) -> Seconds;

    /// Request a position change. Only valid once the current source has
    /// signaled [`MediaEvent::DataReady`].
    fn seek(&mut self, position: Seconds);

    /// Duration of the loaded source, once metadata is known.
    fn duration(&self) -> Option<Seconds>;

    /// The source currently loaded (or loading), if any.
    /// Owned: source handles are cheap and swap decisions only compare them.
    fn current_source(&self) -> Option<MediaSource>;

    /// Mute or unmute the element's own audio.
    fn set_muted(&mut self, muted: bool);

    /// Set the element's own audio gain (0.0 to 1.0).
    fn set_volume(&mut self, volume: f64);

    /// Detach the current source, aborting any in-flight load.
    fn clear_source(&mut self);
}

// ── Event queue ─────────────────────────────────────────────────

/// Channel carrying `(role, event)` pairs from media elements into the
/// engine. Unbounded: elements emit from callbacks and must never block.
pub struct EventQueue {
    tx: Sender<(ElementRole, MediaEvent)>,
    rx: Receiver<(ElementRole, MediaEvent)>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Create a sender handle for an element in the given role.
    pub fn sender(&self, role: ElementRole) -> EventSender {
        EventSender {
            role,
            tx: self.tx.clone(),
        }
    }

    /// Drain one pending event, if any.
    pub fn try_recv(&self) -> Option<(ElementRole, MediaEvent)> {
        match self.rx.try_recv() {
            Ok(pair) => Some(pair),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle an element uses to report its events.
#[derive(Clone)]
pub struct EventSender {
    role: ElementRole,
    tx: Sender<(ElementRole, MediaEvent)>,
}

impl EventSender {
    /// Report an event. Never blocks; a disconnected engine drops it.
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.tx.send((self.role, event));
    }
}

// ── Test support ────────────────────────────────────────────────

/// Scripted media element for tests.
///
/// Records every call and lets tests mutate the element's observable state
/// between engine steps. Cloning shares the underlying state, so a test can
/// hand a clone to the engine and keep one for inspection.
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Observable state of a [`ScriptedElement`].
    #[derive(Debug, Clone)]
    pub struct ScriptedState {
        pub source: Option<MediaSource>,
        pub time: Seconds,
        pub paused: bool,
        pub muted: bool,
        pub volume: f64,
        pub duration: Option<Seconds>,
        pub loads: Vec<MediaSource>,
        pub seeks: Vec<Seconds>,
        pub play_calls: u32,
        pub pause_calls: u32,
        pub clear_calls: u32,
    }

    impl Default for ScriptedState {
        fn default() -> Self {
            Self {
                source: None,
                time: Seconds::ZERO,
                paused: true,
                muted: false,
                volume: 1.0,
                duration: None,
                loads: Vec::new(),
                seeks: Vec::new(),
                play_calls: 0,
                pause_calls: 0,
                clear_calls: 0,
            }
        }
    }

    /// A media element whose behavior is driven entirely by the test.
    #[derive(Clone, Default)]
    pub struct ScriptedElement {
        state: Rc<RefCell<ScriptedState>>,
    }

    impl ScriptedElement {
        pub fn new() -> Self {
            Self::default()
        }

        /// Element already holding a loaded source with known duration.
        pub fn with_source(source: MediaSource, duration: Seconds) -> Self {
            let elem = Self::new();
            {
                let mut s = elem.state.borrow_mut();
                s.source = Some(source);
                s.duration = Some(duration);
            }
            elem
        }

        /// Copy of the current state for assertions.
        pub fn snapshot(&self) -> ScriptedState {
            self.state.borrow().clone()
        }

        /// Script the element's reported position.
        pub fn set_time(&self, time: Seconds) {
            self.state.borrow_mut().time = time;
        }

        /// Script the source duration (as if metadata loaded).
        pub fn set_duration(&self, duration: Seconds) {
            self.state.borrow_mut().duration = Some(duration);
        }
    }

    impl MediaElement for ScriptedElement {
        fn load(&mut self, source: &MediaSource) {
            let mut s = self.state.borrow_mut();
            s.source = Some(source.clone());
            s.duration = None;
            s.loads.push(source.clone());
        }

        fn play(&mut self) {
            let mut s = self.state.borrow_mut();
            s.paused = false;
            s.play_calls += 1;
        }

        fn pause(&mut self) {
            let mut s = self.state.borrow_mut();
            s.paused = true;
            s.pause_calls += 1;
        }

        fn is_paused(&self) -> bool {
            self.state.borrow().paused
        }

        fn current_time(&self) -> Seconds {
            self.state.borrow().time
        }

        fn seek(&mut self, position: Seconds) {
            let mut s = self.state.borrow_mut();
            s.time = position;
            s.seeks.push(position);
        }

        fn duration(&self) -> Option<Seconds> {
            self.state.borrow().duration
        }

        fn current_source(&self) -> Option<MediaSource> {
            self.state.borrow().source.clone()
        }

        fn set_muted(&mut self, muted: bool) {
            self.state.borrow_mut().muted = muted;
        }

        fn set_volume(&mut self, volume: f64) {
            self.state.borrow_mut().volume = volume;
        }

        fn clear_source(&mut self) {
            let mut s = self.state.borrow_mut();
            s.source = None;
            s.duration = None;
            s.clear_calls += 1;
        }
    }
}
