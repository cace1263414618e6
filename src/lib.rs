//! Hit detection for a two-zone (head and rim) drum pad.
//!
//! The [`detector`] turns a stream of raw sensor readings into one
//! classified [`Hit`](detector::Hit) per physical strike. [`Pad`] wraps the
//! detector state of a single pad together with its configuration and an
//! [`Observer`].
use crate::config::Config;
use crate::detector::{Hit, State};
use crate::trace::Sample;
use bon::bon;

/// Tuning parameters.
pub mod config;
/// The hit detection state machine.
pub mod detector;
/// Errors from the text formats of this crate.
pub mod parse;
/// Fixed-point arithmetic.
pub mod ratio;
/// Keyboard reports for detected hits.
pub mod report;
/// Wraparound-safe timestamp arithmetic.
pub mod time;
/// Recorded sensor readings.
pub mod trace;

/// A trait that defines the interface for an observer of a [`Pad`].
///
/// The default implementation of all methods is a no-op. Users are expected to
/// override the methods they are interested in.
#[allow(unused_variables)]
pub trait Observer {
    /// Called for every sample, before it goes into the detector.
    fn on_sample(&mut self, sample: &Sample) {}
    /// Called when a sample opens a strike window.
    fn on_window_open(&mut self, sample: &Sample) {}
    /// Called when a strike window closes with a reported hit.
    fn on_hit(&mut self, hit: &Hit) {}
    /// Called when a strike window closes without a reported hit.
    fn on_window_discarded(&mut self, hit: &Hit) {}
}

impl Observer for () {}

/// A single drum pad: detector state, configuration and an [`Observer`].
pub struct Pad<O> {
    config: Config,
    state: State,
    observer: O,
}

#[bon]
impl<O> Pad<O> {
    #[builder]
    pub fn new(#[builder(default)] config: Config, observer: O) -> Self {
        if !config.is_sane() {
            log::warn!("thresholds are not ordered as 0 < low <= high: {config:?}");
        }

        Self {
            config,
            state: State::new(),
            observer,
        }
    }
}

impl<O> Pad<O> {
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Replace the configuration. Takes effect on the next sample, also for
    /// a window that is already open.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }
    pub fn state(&self) -> &State {
        &self.state
    }
    pub fn observer(&self) -> &O {
        &self.observer
    }
    pub fn into_observer(self) -> O {
        self.observer
    }
}

impl<O> Pad<O>
where
    O: Observer,
{
    /// Feed one sample through the detector, notifying the observer.
    pub fn process(&mut self, sample: Sample) -> Hit {
        self.observer.on_sample(&sample);

        let was_active = self.state.is_active();
        let hit = detector::update(
            &mut self.state,
            &self.config,
            sample.head,
            sample.rim,
            sample.t_ms,
        );

        match (was_active, self.state.is_active()) {
            (false, true) => self.observer.on_window_open(&sample),
            (true, false) if hit.kind.is_none() => self.observer.on_window_discarded(&hit),
            (true, false) => self.observer.on_hit(&hit),
            _ => {}
        }

        hit
    }
    /// Process all samples and return the observer.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::detector::{Hit, HitKind};
    /// use drum_trigger::trace::Sample;
    /// use drum_trigger::{Observer, Pad};
    ///
    /// #[derive(Default)]
    /// struct Hits(Vec<Hit>);
    ///
    /// impl Observer for Hits {
    ///     fn on_hit(&mut self, hit: &Hit) {
    ///         self.0.push(*hit);
    ///     }
    /// }
    ///
    /// let samples = (100..110).map(|t_ms| Sample {
    ///     t_ms,
    ///     head: if t_ms == 100 { 500 } else { 0 },
    ///     rim: if t_ms == 100 { 490 } else { 0 },
    /// });
    /// let hits = Pad::builder().observer(Hits::default()).build().run(samples);
    ///
    /// assert_eq!(hits.0.len(), 1);
    /// assert_eq!(hits.0[0].kind, HitKind::Both);
    /// ```
    pub fn run<I>(mut self, samples: I) -> O
    where
        I: IntoIterator<Item = Sample>,
    {
        for sample in samples {
            self.process(sample);
        }

        self.observer
    }
}
