//! Metric kinds and protocol line formatting.

use std::fmt;


/// Enum of metric types
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Set,
    Timer,
}

impl MetricKind {
    /// The protocol type tag for this kind.
    pub fn tag(&self) -> &'static str {
        match *self {
            MetricKind::Counter => "c",
            MetricKind::Gauge   => "g",
            MetricKind::Set     => "s",
            MetricKind::Timer   => "ms",
        }
    }
}

impl fmt::Debug for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MetricKind::Counter => write!(f, "Counter"),
            MetricKind::Gauge   => write!(f, "Gauge"),
            MetricKind::Set     => write!(f, "Set"),
            MetricKind::Timer   => write!(f, "Timer"),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}


/// Build a single protocol line.
///
/// Valid output formats are:
///
/// - `<name>:<value>|<tag>`
/// - `<name>:<value>|<tag>|@<rate>` when `rate` is below 1.0
///
/// The rate is not validated; the server decides what to make of it.
pub fn format_line(name: &str, value: &str, tag: &str, rate: Option<f64>) -> String {
    match rate {
        Some(rate) if rate < 1.0 => format!("{}:{}|{}|@{}", name, value, tag, rate),
        _ => format!("{}:{}|{}", name, value, tag),
    }
}


//
// Tests
//
#[cfg(test)]
mod test {
    use super::{format_line, MetricKind};

    #[test]
    fn test_metric_kind_debug_fmt() {
        assert_eq!("Gauge", format!("{:?}", MetricKind::Gauge));
        assert_eq!("Timer", format!("{:?}", MetricKind::Timer));
        assert_eq!("Counter", format!("{:?}", MetricKind::Counter));
        assert_eq!("Set", format!("{:?}", MetricKind::Set));
    }

    #[test]
    fn test_metric_kind_tags() {
        assert_eq!("c", MetricKind::Counter.tag());
        assert_eq!("g", MetricKind::Gauge.tag());
        assert_eq!("s", MetricKind::Set.tag());
        assert_eq!("ms", MetricKind::Timer.to_string());
    }

    #[test]
    fn test_format_line_without_rate() {
        assert_eq!("foo.test:12|ms", format_line("foo.test", "12", "ms", None));
        assert_eq!("test:18.123|g", format_line("test", "18.123", "g", Some(1.0)));
        assert_eq!("test:1|c", format_line("test", "1", "c", Some(2.5)));
    }

    #[test]
    fn test_format_line_with_rate() {
        assert_eq!(
            "thing.total:5|c|@0.5",
            format_line("thing.total", "5", "c", Some(0.5))
        );
        assert_eq!("x:1|c|@0", format_line("x", "1", "c", Some(0.0)));
        assert_eq!("x:1|c|@-1", format_line("x", "1", "c", Some(-1.0)));
    }

    #[test]
    fn test_format_line_arbitrary_tag() {
        assert_eq!("latency:42|h", format_line("latency", "42", "h", None));
    }
}
