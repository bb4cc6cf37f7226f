/// One telemetry reading: two series values stamped with the producer's
/// elapsed time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub elapsed_time: f64,
    pub series_a: f64,
    pub series_b: f64,
}

impl Sample {
    pub fn new(elapsed_time: f64, series_a: f64, series_b: f64) -> Self {
        Self {
            elapsed_time,
            series_a,
            series_b,
        }
    }
}
