//! Wall-clock timing of benchmark stages.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Elapsed time of one named stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub name: String,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl Timing {
    pub fn new(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            elapsed,
        }
    }

    /// Elapsed milliseconds with sub-millisecond precision
    pub fn millis(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1_000_000.0
    }

    /// `[name] took about ms # 12.34567`
    pub fn line(&self) -> String {
        format!("[{}] took about ms # {:.5}", self.name, self.millis())
    }
}

/// A started stopwatch; no nesting, one name per run
#[derive(Debug)]
pub struct Stopwatch {
    name: String,
    started: Instant,
}

impl Stopwatch {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
        }
    }

    pub fn stop(self) -> Timing {
        Timing::new(self.name, self.started.elapsed())
    }
}

/// Await `fut` and measure how long it took
pub async fn timed<F, T>(name: impl Into<String>, fut: F) -> (T, Timing)
where
    F: Future<Output = T>,
{
    let watch = Stopwatch::start(name);
    let output = fut.await;
    (output, watch.stop())
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(millis.max(0.0) / 1000.0))
    }
}
