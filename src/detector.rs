use crate::config::{ChannelConfig, Config};
use crate::ratio::Q15;
use crate::time::{elapsed, latest};
use std::fmt;

/// One of the two pickups of a pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Piezo under the drum head.
    Head,
    /// Piezo (or switch) on the rim.
    Rim,
}

/// Classification of a strike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HitKind {
    /// No strike was reported.
    #[default]
    None,
    /// Head only.
    Head,
    /// Rim only.
    Rim,
    /// Head and rim together (rimshot).
    Both,
}

impl HitKind {
    /// Builds the kind that reports exactly the given channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::detector::HitKind;
    ///
    /// assert_eq!(HitKind::from_channels(true, true), HitKind::Both);
    /// assert_eq!(HitKind::from_channels(false, true), HitKind::Rim);
    /// ```
    pub fn from_channels(head: bool, rim: bool) -> Self {
        match (head, rim) {
            (false, false) => Self::None,
            (true, false) => Self::Head,
            (false, true) => Self::Rim,
            (true, true) => Self::Both,
        }
    }
    /// Returns `true` if `channel` is part of this classification.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::detector::{Channel, HitKind};
    ///
    /// assert!(HitKind::Both.contains(Channel::Rim));
    /// assert!(!HitKind::Head.contains(Channel::Rim));
    /// ```
    pub fn contains(self, channel: Channel) -> bool {
        match channel {
            Channel::Head => matches!(self, Self::Head | Self::Both),
            Channel::Rim => matches!(self, Self::Rim | Self::Both),
        }
    }
    pub fn is_none(self) -> bool {
        self == Self::None
    }
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Head => "head",
            Self::Rim => "rim",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for HitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single [`update`] call.
///
/// Peaks are only meaningful when `kind` is not [`HitKind::None`]; they are
/// zero on calls that did not close a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub kind: HitKind,
    pub peak_head: u16,
    pub peak_rim: u16,
    /// Timestamp of the call that produced this value.
    pub t_ms: u32,
}

impl Hit {
    fn none(t_ms: u32) -> Self {
        Self {
            kind: HitKind::None,
            peak_head: 0,
            peak_rim: 0,
            t_ms,
        }
    }
}

// Per-channel bookkeeping while a window is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Track {
    peak: u16,
    last_above_low_ms: u32,
    seen_high: bool,
}

impl Track {
    // The opening sample counts as "above low" for release timing regardless
    // of its value.
    fn open(reading: u16, config: ChannelConfig, now_ms: u32) -> Self {
        Self {
            peak: reading,
            last_above_low_ms: now_ms,
            seen_high: reading >= config.high,
        }
    }

    fn observe(&mut self, reading: u16, config: ChannelConfig, now_ms: u32) {
        self.peak = self.peak.max(reading);
        if reading >= config.high {
            self.seen_high = true;
        }
        if reading >= config.low {
            self.last_above_low_ms = now_ms;
        }
    }

    fn is_hit(&self, config: ChannelConfig) -> bool {
        self.seen_high && self.peak >= config.high
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    start_ms: u32,
    head: Track,
    rim: Track,
}

impl Window {
    fn track(&self, channel: Channel) -> &Track {
        match channel {
            Channel::Head => &self.head,
            Channel::Rim => &self.rim,
        }
    }

    fn should_close(&self, config: &Config, now_ms: u32) -> bool {
        let last_above_low_ms = latest(
            now_ms,
            self.head.last_above_low_ms,
            self.rim.last_above_low_ms,
        );

        let min_scan_ok = elapsed(now_ms, self.start_ms, config.scan_min_ms);
        let released = elapsed(now_ms, last_above_low_ms, config.release_ms);
        let timeout = elapsed(now_ms, self.start_ms, config.max_group_ms);

        (min_scan_ok && released) || timeout
    }

    fn classify(&self, config: &Config) -> HitKind {
        let head_hit = self.head.is_hit(config.channel(Channel::Head));
        let rim_hit = self.rim.is_hit(config.channel(Channel::Rim));
        if !(head_hit && rim_hit) {
            return HitKind::from_channels(head_hit, rim_hit);
        }

        let (head, rim) = (self.head.peak, self.rim.peak);
        let dominant = head.max(rim);
        let secondary = head.min(rim);
        let ratio = Q15::ratio(dominant, secondary);
        // A saturated ratio (zero secondary) never counts as close enough,
        // even against a saturated threshold.
        let close_enough = ratio != Q15::MAX && ratio <= config.both_ratio_threshold;

        if secondary >= config.min_secondary_for_both && close_enough {
            HitKind::Both
        } else if head >= rim {
            HitKind::Head
        } else {
            HitKind::Rim
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Active(Window),
}

/// Persistent detector state of one pad.
///
/// Must be kept by the caller between [`update`] calls. The default value is
/// the power-on state: no window open and both retrigger locks at `t = 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct State {
    phase: Phase,
    last_hit_head_ms: u32,
    last_hit_rim_ms: u32,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns `true` while a strike window is open.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }
    /// Timestamp at which the current window opened.
    pub fn window_start_ms(&self) -> Option<u32> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Active(window) => Some(window.start_ms),
        }
    }
    /// Largest reading of `channel` in the current window. Zero when no
    /// window is open.
    pub fn peak(&self, channel: Channel) -> u16 {
        match &self.phase {
            Phase::Idle => 0,
            Phase::Active(window) => window.track(channel).peak,
        }
    }
    /// Whether `channel` reached its high threshold in the current window.
    pub fn seen_high(&self, channel: Channel) -> bool {
        match &self.phase {
            Phase::Idle => false,
            Phase::Active(window) => window.track(channel).seen_high,
        }
    }
    /// Timestamp of the last reported hit that included `channel`.
    pub fn last_hit_ms(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Head => self.last_hit_head_ms,
            Channel::Rim => self.last_hit_rim_ms,
        }
    }

    fn is_ready(&self, channel: Channel, config: ChannelConfig, now_ms: u32) -> bool {
        elapsed(now_ms, self.last_hit_ms(channel), config.retrigger_ms)
    }
}

/// Feed one pair of readings taken at `now_ms` into the detector.
///
/// Returns a [`Hit`] on every call. Its kind is [`HitKind::None`] unless
/// this call is the one that closes a strike window, in which case it holds
/// the classification and the peaks of the whole window. At most one
/// non-`None` hit is produced per window.
///
/// A window opens when a channel that is out of its retrigger lock reaches
/// its high threshold. It closes once it has been open for `scan_min_ms` and
/// both channels have stayed below their low threshold for `release_ms`, or
/// unconditionally after `max_group_ms`.
///
/// `now_ms` must not go backwards (modulo `2^32`); rollover of the
/// millisecond counter is handled.
///
/// # Examples
///
/// ```
/// use drum_trigger::config::Config;
/// use drum_trigger::detector::{update, HitKind, State};
///
/// let config = Config::default();
/// let mut state = State::new();
///
/// let mut hits = Vec::new();
/// for (t, head) in (100..).zip([400, 350, 200, 0, 0, 0, 0, 0]) {
///     let hit = update(&mut state, &config, head, 0, t);
///     if !hit.kind.is_none() {
///         hits.push(hit);
///     }
/// }
///
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].kind, HitKind::Head);
/// assert_eq!(hits[0].peak_head, 400);
/// ```
pub fn update(state: &mut State, config: &Config, head: u16, rim: u16, now_ms: u32) -> Hit {
    let head_config = config.channel(Channel::Head);
    let rim_config = config.channel(Channel::Rim);

    match std::mem::take(&mut state.phase) {
        Phase::Idle => {
            let head_start =
                state.is_ready(Channel::Head, head_config, now_ms) && head >= head_config.high;
            let rim_start =
                state.is_ready(Channel::Rim, rim_config, now_ms) && rim >= rim_config.high;

            if head_start || rim_start {
                log::trace!("window opened at {now_ms} ms (head {head}, rim {rim})");
                state.phase = Phase::Active(Window {
                    start_ms: now_ms,
                    head: Track::open(head, head_config, now_ms),
                    rim: Track::open(rim, rim_config, now_ms),
                });
            }

            Hit::none(now_ms)
        }
        Phase::Active(mut window) => {
            window.head.observe(head, head_config, now_ms);
            window.rim.observe(rim, rim_config, now_ms);

            if !window.should_close(config, now_ms) {
                state.phase = Phase::Active(window);
                return Hit::none(now_ms);
            }

            let kind = window.classify(config);
            if kind.contains(Channel::Head) {
                state.last_hit_head_ms = now_ms;
            }
            if kind.contains(Channel::Rim) {
                state.last_hit_rim_ms = now_ms;
            }
            log::debug!(
                "window {}..{now_ms} ms closed as {kind} (head {}, rim {})",
                window.start_ms,
                window.head.peak,
                window.rim.peak
            );

            Hit {
                kind,
                peak_head: window.head.peak,
                peak_rim: window.rim.peak,
                t_ms: now_ms,
            }
        }
    }
}
