/// Exponentially weighted frame-time statistics.
///
/// Samples are weighted by age in seconds, not by count: a sample is worth
/// half as much after `half_life` seconds of later frames. The 99th percentile
/// is a running estimate that steps by `std / 100`, up 99 times faster than
/// down, so it settles where 1% of samples exceed it.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    half_life: f32,
    mean: f32,
    variance: f32,
    percentile_99: f32,
}

impl FrameStats {
    const INITIAL_FRAME_TIME: f32 = 1.0 / 60.0;

    pub fn new(half_life: f32) -> Self {
        debug_assert!(half_life > 0.0);
        Self {
            half_life,
            mean: Self::INITIAL_FRAME_TIME,
            variance: 0.0,
            percentile_99: Self::INITIAL_FRAME_TIME,
        }
    }

    /// Folds in one frame time (seconds). Non-finite or negative samples are ignored.
    pub fn update(&mut self, frame_time: f32) {
        if !frame_time.is_finite() || frame_time < 0.0 {
            return;
        }

        let alpha = 2.0_f32.powf(-frame_time / self.half_life);
        self.mean = alpha * self.mean + (1.0 - alpha) * frame_time;
        self.variance = alpha * self.variance + (1.0 - alpha) * (self.mean - frame_time).powi(2);

        // Both steps may apply when the downward one overshoots the sample.
        let step = self.std() / 100.0;
        if frame_time < self.percentile_99 {
            self.percentile_99 -= step / 0.99;
        }
        if frame_time > self.percentile_99 {
            self.percentile_99 += step / (1.0 - 0.99);
        }
    }

    #[inline]
    pub fn mean(&self) -> f32 {
        self.mean
    }

    #[inline]
    pub fn variance(&self) -> f32 {
        self.variance
    }

    /// Standard deviation.
    #[inline]
    pub fn std(&self) -> f32 {
        self.variance.sqrt()
    }

    #[inline]
    pub fn percentile_99(&self) -> f32 {
        self.percentile_99
    }

    /// Frames per second implied by the mean frame time.
    #[inline]
    pub fn fps(&self) -> f32 {
        if self.mean > 0.0 { 1.0 / self.mean } else { 0.0 }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(1.0)
    }
}
