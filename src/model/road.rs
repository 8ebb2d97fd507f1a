use crate::config::RoadConfig;

/// Pool of road tiles that scroll toward the camera and get recycled.
pub struct RoadTrack {
    /// Forward (z) position of each segment center
    segments: Vec<f32>,
    segment_length: f32,
    wrap_threshold: f32,
    scroll_scale: f32,
}

impl RoadTrack {
    pub fn new(config: &RoadConfig) -> Self {
        let segments = (0..config.segment_count)
            .map(|i| i as f32 * config.segment_length)
            .collect();
        Self {
            segments,
            segment_length: config.segment_length,
            wrap_threshold: config.wrap_threshold,
            scroll_scale: config.scroll_scale,
        }
    }

    pub fn segments(&self) -> &[f32] {
        &self.segments
    }

    /// Distance covered by the whole pool; a recycled segment jumps back by this much
    pub fn span(&self) -> f32 {
        self.segments.len() as f32 * self.segment_length
    }

    /// Move every segment by `forward_speed * scroll_scale` and recycle those
    /// that passed the threshold.
    pub fn advance(&mut self, forward_speed: f32) {
        let step = forward_speed * self.scroll_scale;
        let span = self.span();
        for (i, z) in self.segments.iter_mut().enumerate() {
            *z += step;
            if *z > self.wrap_threshold {
                *z -= span;
                tracing::debug!(segment = i, z = *z, "road segment recycled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_laid_end_to_end() {
        let road = RoadTrack::new(&RoadConfig::default());
        assert_eq!(road.segments(), &[0.0, 60.0, 120.0, 180.0, 240.0, 300.0]);
        assert_eq!(road.span(), 360.0);
    }

    #[test]
    fn standing_still_does_not_scroll() {
        let mut road = RoadTrack::new(&RoadConfig::default());
        road.advance(0.0);
        assert_eq!(road.segments()[0], 0.0);
    }

    #[test]
    fn segment_past_threshold_wraps_back() {
        let mut road = RoadTrack::new(&RoadConfig::default());
        // 0.5 * 60 = 30 units per frame
        road.advance(0.5);
        let z = road.segments();
        assert_eq!(z[0], 30.0);
        assert_eq!(z[1], 90.0);
        // 120 + 30 = 150 > 120, so 150 - 360
        assert_eq!(z[2], -210.0);
        assert_eq!(z[5], -30.0);
    }

    #[test]
    fn pool_stays_bounded_over_long_drives() {
        let config = RoadConfig::default();
        let mut road = RoadTrack::new(&config);
        for _ in 0..10_000 {
            road.advance(0.85 * 1.9);
            for &z in road.segments() {
                assert!(z <= config.wrap_threshold);
                assert!(z > config.wrap_threshold - road.span() - 1e-3);
            }
        }
    }
}
