use crate::detector::Channel;
use crate::parse::ParseError;
use crate::ratio::Q15;
use bon::Builder;
use std::fmt;
use winnow::ascii::{dec_uint, digit1, newline, space0};
use winnow::combinator::{dispatch, fail, opt, preceded, separated, terminated};
use winnow::token::take_while;
use winnow::Parser;

/// Tuning parameters of a single pad.
///
/// Thresholds are in raw sensor units, durations in milliseconds. Every field
/// has a default; the defaults are tuned for a pad sampled at 5 kHz with a
/// 12-bit ADC. See [`Config::preset_10khz`] for faster sampling.
///
/// # Examples
///
/// ```
/// use drum_trigger::config::Config;
///
/// let config = Config::builder()
///     .th_high_head(300)
///     .retrigger_head_ms(25)
///     .build();
///
/// assert_eq!(config.th_high_head, 300);
/// assert_eq!(config.th_low_head, Config::default().th_low_head);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct Config {
    /// Head reading at or above which a strike starts.
    #[builder(default = 250)]
    pub th_high_head: u16,
    /// Head reading at or above which a strike is still ringing.
    #[builder(default = 120)]
    pub th_low_head: u16,
    /// Rim reading at or above which a strike starts.
    #[builder(default = 250)]
    pub th_high_rim: u16,
    /// Rim reading at or above which a strike is still ringing.
    #[builder(default = 120)]
    pub th_low_rim: u16,
    /// Minimum time a window stays open.
    #[builder(default = 2)]
    pub scan_min_ms: u32,
    /// Time every channel must stay below its low threshold to end a window.
    #[builder(default = 4)]
    pub release_ms: u32,
    /// A window is closed unconditionally after this long.
    #[builder(default = 30)]
    pub max_group_ms: u32,
    /// Head lockout after a reported head hit.
    #[builder(default = 18)]
    pub retrigger_head_ms: u32,
    /// Rim lockout after a reported rim hit.
    #[builder(default = 18)]
    pub retrigger_rim_ms: u32,
    /// Largest dominant/secondary peak ratio still reported as a combined hit.
    #[builder(default = Q15::from_raw(49_152))]
    pub both_ratio_threshold: Q15,
    /// Smallest secondary peak that may take part in a combined hit.
    #[builder(default = 300)]
    pub min_secondary_for_both: u16,
}

/// Per-channel view of a [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChannelConfig {
    pub(crate) high: u16,
    pub(crate) low: u16,
    pub(crate) retrigger_ms: u32,
}

impl Config {
    /// Tuning for a pad sampled at 10 kHz: the faster sampling allows a
    /// shorter release and retrigger lock. Same as [`Config::default`]
    /// otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::config::Config;
    ///
    /// let config = Config::preset_10khz();
    /// assert_eq!(config.release_ms, 3);
    /// assert_eq!(config.retrigger_rim_ms, 15);
    /// ```
    pub fn preset_10khz() -> Self {
        Self::builder()
            .release_ms(3)
            .retrigger_head_ms(15)
            .retrigger_rim_ms(15)
            .build()
    }
    pub(crate) fn channel(&self, channel: Channel) -> ChannelConfig {
        match channel {
            Channel::Head => ChannelConfig {
                high: self.th_high_head,
                low: self.th_low_head,
                retrigger_ms: self.retrigger_head_ms,
            },
            Channel::Rim => ChannelConfig {
                high: self.th_high_rim,
                low: self.th_low_rim,
                retrigger_ms: self.retrigger_rim_ms,
            },
        }
    }
    /// Returns `true` if both channels satisfy `0 < low <= high`.
    ///
    /// The detector accepts any configuration; this is only a hint for
    /// callers that load thresholds from somewhere untrusted.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::config::Config;
    ///
    /// assert!(Config::default().is_sane());
    /// assert!(!Config::builder().th_low_rim(400).build().is_sane());
    /// ```
    pub fn is_sane(&self) -> bool {
        [Channel::Head, Channel::Rim].into_iter().all(|channel| {
            let ChannelConfig { high, low, .. } = self.channel(channel);
            0 < low && low <= high
        })
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::ThHighHead(v) => self.th_high_head = v,
            Setting::ThLowHead(v) => self.th_low_head = v,
            Setting::ThHighRim(v) => self.th_high_rim = v,
            Setting::ThLowRim(v) => self.th_low_rim = v,
            Setting::ScanMinMs(v) => self.scan_min_ms = v,
            Setting::ReleaseMs(v) => self.release_ms = v,
            Setting::MaxGroupMs(v) => self.max_group_ms = v,
            Setting::RetriggerHeadMs(v) => self.retrigger_head_ms = v,
            Setting::RetriggerRimMs(v) => self.retrigger_rim_ms = v,
            Setting::BothRatioThreshold(v) => self.both_ratio_threshold = v,
            Setting::MinSecondaryForBoth(v) => self.min_secondary_for_both = v,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "th_high_head = {}", self.th_high_head)?;
        writeln!(f, "th_low_head = {}", self.th_low_head)?;
        writeln!(f, "th_high_rim = {}", self.th_high_rim)?;
        writeln!(f, "th_low_rim = {}", self.th_low_rim)?;
        writeln!(f, "scan_min_ms = {}", self.scan_min_ms)?;
        writeln!(f, "release_ms = {}", self.release_ms)?;
        writeln!(f, "max_group_ms = {}", self.max_group_ms)?;
        writeln!(f, "retrigger_head_ms = {}", self.retrigger_head_ms)?;
        writeln!(f, "retrigger_rim_ms = {}", self.retrigger_rim_ms)?;
        writeln!(f, "both_ratio_threshold = {}", self.both_ratio_threshold)?;
        write!(f, "min_secondary_for_both = {}", self.min_secondary_for_both)
    }
}

#[derive(Clone, Copy, Debug)]
enum Setting {
    ThHighHead(u16),
    ThLowHead(u16),
    ThHighRim(u16),
    ThLowRim(u16),
    ScanMinMs(u32),
    ReleaseMs(u32),
    MaxGroupMs(u32),
    RetriggerHeadMs(u32),
    RetriggerRimMs(u32),
    BothRatioThreshold(Q15),
    MinSecondaryForBoth(u16),
}

fn parse_key<'a>(input: &mut &'a str) -> winnow::Result<&'a str> {
    terminated(
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        (space0, '=', space0),
    )
    .parse_next(input)
}

// Unsigned decimal, e.g. `1` or `1.5`, converted without going through
// floating point.
fn parse_ratio(input: &mut &str) -> winnow::Result<Q15> {
    (dec_uint, opt(preceded('.', digit1)))
        .verify_map(|(int, frac): (u32, Option<&str>)| {
            Q15::from_decimal(int, frac.unwrap_or(""))
        })
        .parse_next(input)
}

fn parse_line(input: &mut &str) -> winnow::Result<Setting> {
    let setting = dispatch! {parse_key;
        "th_high_head" => dec_uint.map(Setting::ThHighHead),
        "th_low_head" => dec_uint.map(Setting::ThLowHead),
        "th_high_rim" => dec_uint.map(Setting::ThHighRim),
        "th_low_rim" => dec_uint.map(Setting::ThLowRim),
        "scan_min_ms" => dec_uint.map(Setting::ScanMinMs),
        "release_ms" => dec_uint.map(Setting::ReleaseMs),
        "max_group_ms" => dec_uint.map(Setting::MaxGroupMs),
        "retrigger_head_ms" => dec_uint.map(Setting::RetriggerHeadMs),
        "retrigger_rim_ms" => dec_uint.map(Setting::RetriggerRimMs),
        "both_ratio_threshold" => parse_ratio.map(Setting::BothRatioThreshold),
        "min_secondary_for_both" => dec_uint.map(Setting::MinSecondaryForBoth),
        _ => fail,
    };

    terminated(setting, space0).parse_next(input)
}

impl std::str::FromStr for Config {
    type Err = ParseError;

    /// Parse a [`Config`] from `key = value` lines. Keys that are not present
    /// keep their default value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drum_trigger::config::Config;
    /// # use std::str::FromStr;
    /// let config = Config::from_str("release_ms = 3\nboth_ratio_threshold = 1.25")?;
    ///
    /// assert_eq!(config.release_ms, 3);
    /// assert_eq!(config.both_ratio_threshold.raw(), 40960);
    /// # Ok::<(), drum_trigger::parse::ParseError>(())
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();

        let () = terminated(
            separated(0.., parse_line.map(|setting| config.apply(setting)), newline),
            opt(newline),
        )
        .parse(input)
        .map_err(|e| ParseError::from_parse(e, "config"))?;

        Ok(config)
    }
}
