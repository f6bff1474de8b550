//! Conversion of metric values to their wire representation.

use std::time::Duration;


/// Types that can be sent as a metric value.
///
/// Integers render in decimal, floats with their shortest round-trip
/// form and durations as whole milliseconds.
pub trait ToMetricValue {
    fn to_metric_value(&self) -> String;
}

macro_rules! display_value {
    ($($t:ty),*) => {
        $(
            impl ToMetricValue for $t {
                fn to_metric_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, str, String);

impl ToMetricValue for Duration {
    fn to_metric_value(&self) -> String {
        duration_millis(*self).to_string()
    }
}

impl<T: ToMetricValue + ?Sized> ToMetricValue for &T {
    fn to_metric_value(&self) -> String {
        (**self).to_metric_value()
    }
}


/// Milliseconds in `d`, rounded half up.
pub fn duration_millis(d: Duration) -> u128 {
    (d.as_nanos() + 500_000) / 1_000_000
}


#[cfg(test)]
mod test {
    use super::{duration_millis, ToMetricValue};
    use std::time::Duration;

    #[test]
    fn test_integer_values() {
        assert_eq!("5", 5i64.to_metric_value());
        assert_eq!("-12", (-12i32).to_metric_value());
        assert_eq!("18446744073709551615", u64::MAX.to_metric_value());
    }

    #[test]
    fn test_float_values() {
        assert_eq!("18.123", 18.123f64.to_metric_value());
        assert_eq!("0.5", 0.5f32.to_metric_value());
        assert_eq!("3", 3.0f64.to_metric_value());
    }

    #[test]
    fn test_duration_rounds_to_millis() {
        assert_eq!(32, duration_millis(Duration::from_millis(32)));
        assert_eq!(1, duration_millis(Duration::from_micros(1_499)));
        assert_eq!(2, duration_millis(Duration::from_micros(1_500)));
        assert_eq!(0, duration_millis(Duration::from_micros(499)));
        assert_eq!("1500", Duration::from_secs_f64(1.5).to_metric_value());
    }

    #[test]
    fn test_string_values() {
        assert_eq!("user-42", "user-42".to_metric_value());
        assert_eq!("abc", String::from("abc").to_metric_value());
    }
}
