//! Command-line logger
use super::{Event, LogError, Loggable, Logger};
use crate::utils::stats::OnlineMeanVariance;
use enum_map::{enum_map, EnumMap};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Logger that periodically prints summaries to stdout.
///
/// Scalars are summarized by their mean and standard deviation,
/// index samples by the empirical distribution.
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Number of completed instances of an event.
    pub fn event_count(&self, event: Event) -> u64 {
        self.events[event].index
    }

    /// Mean of the scalar values logged under `name` since the last display.
    pub fn mean(&self, event: Event, name: &str) -> Option<f64> {
        match self.events[event].aggregators.get(name)? {
            Aggregator::ScalarMean(stats) if stats.count() > 0 => Some(stats.mean()),
            _ => None,
        }
    }

    /// Display the summary and clear all stored data.
    pub fn display(&mut self) {
        for (event, event_log) in self.events.iter_mut() {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }
            println!(
                "==== {:?}s {} - {} ====",
                event,
                event_log.summary_start_index,
                event_log.index - 1
            );
            for (name, aggregator) in &mut event_log.aggregators {
                println!("{}: {}", name, aggregator);
                aggregator.clear()
            }
            event_log.summary_start_index = event_log.index;
        }
        self.last_display_time = Instant::now();
    }
}

impl Default for CLILogger {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Logger for CLILogger {
    fn log(&mut self, event: Event, name: &'static str, value: Loggable) -> Result<(), LogError> {
        self.events[event]
            .aggregators
            .entry(name)
            .or_insert_with(|| Aggregator::empty(&value))
            .update(value)
            .map_err(|(value, expected)| LogError::new(name, value, expected))
    }

    fn done(&mut self, event: Event) {
        self.events[event].index += 1;
        if self.last_display_time.elapsed() >= self.display_period {
            self.display();
        }
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Ensure everything is flushed.
        self.display();
    }
}

struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    /// An aggregator for each log entry.
    aggregators: BTreeMap<&'static str, Aggregator>,
}

impl EventLog {
    const fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            aggregators: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
enum Aggregator {
    /// Aggregates nothing
    Nothing,
    ScalarMean(OnlineMeanVariance<f64>),
    IndexDistribution(Vec<u64>),
}

impl Aggregator {
    /// Create an empty aggregator for values structured like `value`.
    fn empty(value: &Loggable) -> Self {
        match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::Scalar(_) => Self::ScalarMean(OnlineMeanVariance::default()),
            Loggable::IndexSample { size, .. } => Self::IndexDistribution(vec![0; *size]),
        }
    }

    /// Update an aggregator with a logged value.
    ///
    /// Returns Err((value, expected)) if the value is incompatible with this aggregator.
    fn update(&mut self, value: Loggable) -> Result<(), (Loggable, String)> {
        match (self, value) {
            (Self::Nothing, Loggable::Nothing) => {}
            (Self::ScalarMean(stats), Loggable::Scalar(x)) => stats.push(x),
            (Self::IndexDistribution(counts), Loggable::IndexSample { value, size })
                if counts.len() == size && value < size =>
            {
                counts[value] += 1
            }
            (aggregator, value) => return Err((value, aggregator.expected())),
        }
        Ok(())
    }

    fn expected(&self) -> String {
        match self {
            Self::Nothing => "Nothing".into(),
            Self::ScalarMean(_) => "Scalar".into(),
            Self::IndexDistribution(counts) => format!("IndexSample{{size: {}}}", counts.len()),
        }
    }

    /// Clear the aggregated values
    fn clear(&mut self) {
        match self {
            Self::Nothing => {}
            Self::ScalarMean(stats) => *stats = OnlineMeanVariance::default(),
            Self::IndexDistribution(counts) => counts.iter_mut().for_each(|c| *c = 0),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::ScalarMean(stats) if stats.count() == 0 => write!(f, "None"),
            Self::ScalarMean(stats) => write!(f, "{:.4} ± {:.4}", stats.mean(), stats.stddev()),
            Self::IndexDistribution(counts) => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "[")?;
                for (i, c) in counts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.3}", (*c as f64) / (total as f64))?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> CLILogger {
        CLILogger::new(Duration::from_secs(3600))
    }

    #[test]
    fn scalar_mean() {
        let mut logger = logger();
        for x in [1.0, 2.0, 6.0] {
            logger.log(Event::Step, "reward", x.into()).unwrap();
            logger.done(Event::Step);
        }
        assert_eq!(logger.event_count(Event::Step), 3);
        assert_eq!(logger.mean(Event::Step, "reward"), Some(3.0));
        assert_eq!(logger.mean(Event::Episode, "reward"), None);
    }

    #[test]
    fn incompatible_value() {
        let mut logger = logger();
        logger.log(Event::Step, "x", Loggable::Scalar(1.0)).unwrap();
        let err = logger
            .log(Event::Step, "x", Loggable::IndexSample { value: 0, size: 2 })
            .unwrap_err();
        assert_eq!(err.name, "x");
        assert_eq!(err.expected, "Scalar");
    }

    #[test]
    fn index_sample_size_mismatch() {
        let mut logger = logger();
        logger
            .log(Event::Step, "a", Loggable::IndexSample { value: 1, size: 3 })
            .unwrap();
        assert!(logger
            .log(Event::Step, "a", Loggable::IndexSample { value: 1, size: 4 })
            .is_err());
    }

    #[test]
    fn out_of_range_first_index_sample() {
        let mut logger = logger();
        let err = logger
            .log(Event::Step, "a", Loggable::IndexSample { value: 3, size: 3 })
            .unwrap_err();
        assert_eq!(err.expected, "IndexSample{size: 3}");
        // The name keeps its structure for later values
        logger
            .log(Event::Step, "a", Loggable::IndexSample { value: 2, size: 3 })
            .unwrap();
    }

    #[test]
    fn display_clears() {
        let mut logger = logger();
        logger.log(Event::Episode, "len", 10.0.into()).unwrap();
        logger.done(Event::Episode);
        logger.display();
        assert_eq!(logger.mean(Event::Episode, "len"), None);
        assert_eq!(logger.event_count(Event::Episode), 1);
    }

    #[test]
    fn aggregator_display() {
        let mut agg = Aggregator::empty(&Loggable::IndexSample { value: 0, size: 2 });
        agg.update(Loggable::IndexSample { value: 0, size: 2 }).unwrap();
        agg.update(Loggable::IndexSample { value: 0, size: 2 }).unwrap();
        agg.update(Loggable::IndexSample { value: 1, size: 2 }).unwrap();
        assert_eq!(agg.to_string(), "[0.667, 0.333]");
    }
}
