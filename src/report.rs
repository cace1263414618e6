use crate::detector::HitKind;
use crate::time::elapsed;

/// Keyboard keys sent to the host, as USB HID usage IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Key {
    /// Board button.
    A = 0x04,
    /// Head hit.
    B = 0x05,
    /// Rim hit.
    C = 0x06,
    /// Rimshot.
    D = 0x07,
}

impl Key {
    pub fn usage_id(self) -> u8 {
        self as u8
    }
    /// Key reporting a classified hit, if any.
    pub fn for_hit(kind: HitKind) -> Option<Self> {
        match kind {
            HitKind::None => None,
            HitKind::Head => Some(Self::B),
            HitKind::Rim => Some(Self::C),
            HitKind::Both => Some(Self::D),
        }
    }
}

/// A boot-protocol keyboard report with at most one key pressed.
///
/// A report without a key releases whatever was pressed before.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyReport {
    pub key: Option<Key>,
}

impl KeyReport {
    /// The six keycode slots of the report.
    pub fn keycodes(&self) -> [u8; 6] {
        let mut keycodes = [0; 6];
        if let Some(key) = self.key {
            keycodes[0] = key.usage_id();
        }
        keycodes
    }
    /// Returns `true` if a suspended host should be woken up to receive this
    /// report.
    pub fn wakes_host(&self) -> bool {
        self.key.is_some()
    }
}

/// Decides when a keyboard report must go out.
///
/// The detector runs much faster than the host polls the keyboard. A report
/// is produced right away whenever the hit classification changes, and
/// otherwise at most once every `interval_ms`. Consecutive empty reports are
/// only sent once.
///
/// # Examples
///
/// ```
/// use drum_trigger::detector::HitKind;
/// use drum_trigger::report::{Key, ReportScheduler};
///
/// let mut scheduler = ReportScheduler::new(10);
///
/// let report = scheduler.poll(HitKind::Both, false, 100).unwrap();
/// assert_eq!(report.key, Some(Key::D));
/// // The next tick releases the key.
/// assert_eq!(scheduler.poll(HitKind::None, false, 101).unwrap().key, None);
/// assert_eq!(scheduler.poll(HitKind::None, false, 120), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ReportScheduler {
    interval_ms: u32,
    previous: HitKind,
    last_poll_ms: u32,
    empty_sent: bool,
}

impl ReportScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            previous: HitKind::None,
            last_poll_ms: 0,
            empty_sent: false,
        }
    }
    /// Call once per detector tick with the latest classification and the
    /// state of the board button.
    pub fn poll(&mut self, kind: HitKind, button: bool, now_ms: u32) -> Option<KeyReport> {
        if kind == self.previous && !elapsed(now_ms, self.last_poll_ms, self.interval_ms) {
            return None;
        }
        self.last_poll_ms = now_ms;
        self.previous = kind;

        // A hit overrides the button.
        let key = Key::for_hit(kind).or(button.then_some(Key::A));
        if key.is_none() {
            if self.empty_sent {
                return None;
            }
            self.empty_sent = true;
        } else {
            self.empty_sent = false;
        }

        Some(KeyReport { key })
    }
}

impl Default for ReportScheduler {
    /// Ten millisecond report interval.
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_for_hit() {
        assert_eq!(Key::for_hit(HitKind::None), None);
        assert_eq!(Key::for_hit(HitKind::Head), Some(Key::B));
        assert_eq!(Key::for_hit(HitKind::Rim), Some(Key::C));
        assert_eq!(Key::for_hit(HitKind::Both), Some(Key::D));
        assert_eq!(Key::A.usage_id(), 0x04);
    }

    #[test]
    fn key_report_keycodes() {
        assert_eq!(KeyReport { key: None }.keycodes(), [0; 6]);
        assert_eq!(
            KeyReport { key: Some(Key::C) }.keycodes(),
            [0x06, 0, 0, 0, 0, 0]
        );
        assert!(KeyReport { key: Some(Key::A) }.wakes_host());
        assert!(!KeyReport { key: None }.wakes_host());
    }

    #[test]
    fn scheduler_waits_for_interval() {
        let mut scheduler = ReportScheduler::new(10);

        assert_eq!(scheduler.poll(HitKind::None, true, 5), None);
        assert_eq!(
            scheduler.poll(HitKind::None, true, 10),
            Some(KeyReport { key: Some(Key::A) })
        );
        assert_eq!(scheduler.poll(HitKind::None, true, 19), None);
        assert_eq!(
            scheduler.poll(HitKind::None, true, 20),
            Some(KeyReport { key: Some(Key::A) })
        );
    }

    #[test]
    fn scheduler_sends_hits_immediately() {
        let mut scheduler = ReportScheduler::new(10);

        assert_eq!(
            scheduler.poll(HitKind::Head, false, 3),
            Some(KeyReport { key: Some(Key::B) })
        );
        assert_eq!(
            scheduler.poll(HitKind::None, false, 4),
            Some(KeyReport { key: None })
        );
        assert_eq!(
            scheduler.poll(HitKind::Rim, true, 5),
            Some(KeyReport { key: Some(Key::C) })
        );
    }

    #[test]
    fn scheduler_deduplicates_empty_reports() {
        let mut scheduler = ReportScheduler::new(10);

        assert_eq!(
            scheduler.poll(HitKind::None, false, 10),
            Some(KeyReport { key: None })
        );
        for t in (20..200).step_by(10) {
            assert_eq!(scheduler.poll(HitKind::None, false, t), None);
        }
        assert_eq!(
            scheduler.poll(HitKind::None, true, 200),
            Some(KeyReport { key: Some(Key::A) })
        );
        assert_eq!(
            scheduler.poll(HitKind::None, false, 210),
            Some(KeyReport { key: None })
        );
    }
}
