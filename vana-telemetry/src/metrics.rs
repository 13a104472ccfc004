//! Prometheus metrics for index operations.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub habits_inserted: prometheus::Counter,
    pub entries_appended: prometheus::Counter,
    pub lookups: prometheus::Counter,
    pub lookup_latency: prometheus::Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let habits_inserted =
            Counter::new("vana_habits_inserted_total", "Total habit records inserted").unwrap();
        let entries_appended =
            Counter::new("vana_entries_appended_total", "Total completion entries appended")
                .unwrap();
        let lookups = Counter::new("vana_lookups_total", "Total habit lookups").unwrap();

        let lookup_latency = Histogram::with_opts(
            HistogramOpts::new("vana_lookup_latency_ns", "Habit lookup duration")
                .buckets(vec![100.0, 1_000.0, 10_000.0, 100_000.0]),
        )
        .unwrap();

        registry.register(Box::new(habits_inserted.clone())).unwrap();
        registry.register(Box::new(entries_appended.clone())).unwrap();
        registry.register(Box::new(lookups.clone())).unwrap();
        registry.register(Box::new(lookup_latency.clone())).unwrap();

        Self {
            registry,
            habits_inserted,
            entries_appended,
            lookups,
            lookup_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_gathered_output() {
        let metrics = MetricsRecorder::new();
        metrics.habits_inserted.inc();
        metrics.entries_appended.inc_by(3.0);
        metrics.lookups.inc();
        metrics.lookup_latency.observe(500.0);

        let output = metrics.gather_metrics().unwrap();
        assert!(output.contains("vana_habits_inserted_total 1"));
        assert!(output.contains("vana_entries_appended_total 3"));
        assert!(output.contains("vana_lookups_total 1"));
        assert!(output.contains("vana_lookup_latency_ns"));
    }
}
