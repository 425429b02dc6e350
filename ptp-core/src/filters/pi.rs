use super::{Filter, FilterUpdate};
use crate::{clock::Timer, port::Measurement, time::TimeInterval};

/// Configuration of the [`PiFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServoConfig {
    /// Offsets larger than this are corrected by stepping the clock
    pub step_threshold: TimeInterval,
    /// Proportional gain, in thousandths of a ppb per nanosecond of offset
    pub kp: u32,
    /// Integral gain, in thousandths of a ppb per nanosecond of summed offset
    pub ki: u32,
    /// Largest frequency adjustment ever requested
    pub max_frequency_ppb: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            step_threshold: TimeInterval::from_nanos(1_000_000),
            kp: 700,
            ki: 300,
            max_frequency_ppb: 500_000,
        }
    }
}

/// A proportional-integral clock servo.
///
/// Large offsets step the clock. Smaller ones steer its frequency by
/// `-(kp * offset + ki * sum of offsets) / 1000` ppb. The sum is kept in
/// scaled nanoseconds and only grows while the output is not clamped.
#[derive(Debug, Clone)]
pub struct PiFilter {
    config: ServoConfig,
    integral: TimeInterval,
}

impl PiFilter {
    /// Sum of the offsets seen since the last reset
    pub fn integral(&self) -> TimeInterval {
        self.integral
    }

    /// The frequency correction for an offset with the given integral, in
    /// scaled ppb. Returns whether the output had to be clamped.
    fn correction(&self, offset: TimeInterval, integral: TimeInterval) -> (i128, bool) {
        let proportional = self.config.kp as i128 * offset.scaled_nanos() as i128;
        let integral = self.config.ki as i128 * integral.scaled_nanos() as i128;
        let output = -(proportional + integral) / 1000;

        let max = (self.config.max_frequency_ppb as i128) << 16;
        let clamped = output.clamp(-max, max);

        (clamped, clamped != output)
    }
}

impl Filter for PiFilter {
    type Config = ServoConfig;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            integral: TimeInterval::ZERO,
        }
    }

    fn measurement<C: Timer>(
        &mut self,
        measurement: Measurement,
        timer: &C,
    ) -> Result<FilterUpdate, C::Error> {
        let offset = measurement.offset;

        if offset.abs() > self.config.step_threshold {
            log::info!("stepping clock by {}ns", -offset.nanos());
            timer.step_clock(-offset)?;
            self.integral = TimeInterval::ZERO;
            return Ok(FilterUpdate::Stepped(-offset));
        }

        let integral = self.integral + offset;
        let (scaled_ppb, clamped) = self.correction(offset, integral);
        if !clamped {
            self.integral = integral;
        }

        let ppb = scaled_ppb as f64 / 65536.0;
        log::debug!("offset {}ns, steering frequency to {:.3}ppb", offset.nanos(), ppb);
        timer.adjust_frequency(ppb)?;

        Ok(FilterUpdate::Steered(ppb))
    }

    fn demobilize(&mut self) {
        self.integral = TimeInterval::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::test::FakeTimer, time::Timestamp};

    fn measurement(offset_nanos: i64) -> Measurement {
        Measurement {
            event_time: Timestamp::new(100, 0).unwrap(),
            offset: TimeInterval::from_nanos(offset_nanos),
            delay: None,
        }
    }

    #[test]
    fn large_offset_steps() {
        let timer = FakeTimer::new(100);
        let mut filter = PiFilter::new(ServoConfig::default());

        let update = filter.measurement(measurement(5_000_000), &timer).unwrap();
        assert_eq!(update, FilterUpdate::Stepped(TimeInterval::from_nanos(-5_000_000)));
        assert_eq!(timer.last_step.get(), Some(TimeInterval::from_nanos(-5_000_000)));
        assert_eq!(timer.frequency.get(), None);
    }

    #[test]
    fn small_offset_steers() {
        let timer = FakeTimer::new(100);
        let mut filter = PiFilter::new(ServoConfig::default());

        // -(700 * 100 + 300 * 100) / 1000
        let update = filter.measurement(measurement(100), &timer).unwrap();
        assert_eq!(update, FilterUpdate::Steered(-100.0));
        assert_eq!(timer.frequency.get(), Some(-100.0));
        assert_eq!(filter.integral(), TimeInterval::from_nanos(100));

        // -(700 * -50 + 300 * 50) / 1000
        let update = filter.measurement(measurement(-50), &timer).unwrap();
        assert_eq!(update, FilterUpdate::Steered(20.0));

        filter.demobilize();
        assert_eq!(filter.integral(), TimeInterval::ZERO);
    }

    #[test]
    fn output_is_clamped_without_windup() {
        let timer = FakeTimer::new(100);
        let mut filter = PiFilter::new(ServoConfig {
            max_frequency_ppb: 10,
            ..Default::default()
        });

        let update = filter.measurement(measurement(-1000), &timer).unwrap();
        assert_eq!(update, FilterUpdate::Steered(10.0));
        assert_eq!(filter.integral(), TimeInterval::ZERO);
    }

    #[test]
    fn timer_errors_are_returned() {
        let timer = FakeTimer::new(100);
        timer.fail.set(true);
        let mut filter = PiFilter::new(ServoConfig::default());

        assert!(filter.measurement(measurement(10), &timer).is_err());
    }
}
