use crate::parse::ParseError;
use std::fmt;
use winnow::ascii::{dec_uint, newline};
use winnow::combinator::{opt, separated, terminated};
use winnow::Parser;

/// A pair of readings taken at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Millisecond timestamp of the readings.
    pub t_ms: u32,
    pub head: u16,
    pub rim: u16,
}

/// A recording of consecutive [`Sample`]s of one pad.
///
/// The text form has one sample per line, as `t_ms head rim` in decimal:
///
/// ```text
/// 100 0 0
/// 101 412 37
/// 102 388 29
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl FromIterator<Sample> for Trace {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Sample>,
    {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Trace {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .samples
            .iter()
            .map(|s| format!("{} {} {}", s.t_ms, s.head, s.rim))
            .collect::<Vec<_>>()
            .join("\n");

        write!(f, "{text}")
    }
}

fn parse_sample(input: &mut &str) -> winnow::Result<Sample> {
    (dec_uint, ' ', dec_uint, ' ', dec_uint)
        .map(|(t_ms, _, head, _, rim)| Sample { t_ms, head, rim })
        .parse_next(input)
}

impl std::str::FromStr for Trace {
    type Err = ParseError;

    /// Parse a [`Trace`] from its text form.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drum_trigger::trace::{Sample, Trace};
    /// # use std::str::FromStr;
    /// let trace = Trace::from_str("100 0 0\n101 412 37\n")?;
    ///
    /// assert_eq!(trace.len(), 2);
    /// assert_eq!(
    ///     trace.iter().nth(1),
    ///     Some(&Sample { t_ms: 101, head: 412, rim: 37 })
    /// );
    /// # Ok::<(), drum_trigger::parse::ParseError>(())
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let samples = terminated(separated(0.., parse_sample, newline), opt(newline))
            .parse(input)
            .map_err(|e| ParseError::from_parse(e, "trace"))?;

        Ok(Self { samples })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trace_from_str_empty() {
        assert!(Trace::from_str("").unwrap().is_empty());
        assert!(Trace::from_str("\n").unwrap().is_empty());
    }

    #[test]
    fn trace_to_string() {
        let mut trace = Trace::new();
        assert_eq!(trace.to_string(), "");

        trace.push(Sample {
            t_ms: 4294967295,
            head: 4095,
            rim: 0,
        });
        trace.push(Sample {
            t_ms: 0,
            head: 12,
            rim: 13,
        });
        assert_eq!(trace.to_string(), "4294967295 4095 0\n0 12 13");
        assert_eq!(Trace::from_str(&trace.to_string()).unwrap(), trace);
    }

    #[test]
    fn trace_from_str_rejects_garbage() {
        let err = Trace::from_str("1 2 3\n4 5\n").unwrap_err();
        assert_eq!(err.span().start, 6);
        assert!(err.to_string().contains("invalid trace line starting here"));

        assert!(Trace::from_str("1 2 70000").is_err());
        assert!(Trace::from_str("1  2 3").is_err());
        assert!(Trace::from_str("1 2 3 4").is_err());
    }

    #[test]
    fn trace_collect() {
        let trace: Trace = (0..3)
            .map(|t| Sample {
                t_ms: t,
                head: 0,
                rim: 0,
            })
            .collect();

        assert_eq!(trace.len(), 3);
        assert_eq!(
            trace.into_iter().map(|s| s.t_ms).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}
