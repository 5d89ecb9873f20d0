/// Decides which frames the pipeline actually analyzes.
///
/// Detection dominates runtime, so only every Nth frame is looked at.
/// Interval 1 means every frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameSampler {
    interval: usize,
}

impl FrameSampler {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Frame 0 is always sampled, so short videos still yield output.
    pub fn should_sample(&self, frame_index: usize) -> bool {
        frame_index % self.interval == 0
    }

    /// Presentation time of a frame, in seconds. Unknown fps maps to 0.0
    /// rather than infinity so downstream timestamps stay well formed.
    pub fn timestamp_secs(&self, frame_index: usize, fps: f64) -> f64 {
        if fps > 0.0 {
            frame_index as f64 / fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1, &[0, 1, 2, 3, 4])]
    #[case(2, &[0, 2, 4, 6])]
    #[case(10, &[0, 10, 20, 100])]
    fn test_samples_every_nth_frame(#[case] interval: usize, #[case] sampled: &[usize]) {
        let sampler = FrameSampler::new(interval);
        for &index in sampled {
            assert!(sampler.should_sample(index), "frame {index}");
        }
    }

    #[test]
    fn test_skips_between_samples() {
        let sampler = FrameSampler::new(10);
        for index in [1, 5, 9, 11, 19, 99] {
            assert!(!sampler.should_sample(index), "frame {index}");
        }
    }

    #[test]
    fn test_first_frame_always_sampled() {
        for interval in [1, 7, 100] {
            assert!(FrameSampler::new(interval).should_sample(0));
        }
    }

    #[test]
    fn test_zero_interval_clamps_to_one() {
        let sampler = FrameSampler::new(0);
        assert_eq!(sampler.interval(), 1);
        assert!(sampler.should_sample(3));
    }

    #[rstest]
    #[case(0, 30.0, 0.0)]
    #[case(30, 30.0, 1.0)]
    #[case(45, 30.0, 1.5)]
    #[case(100, 25.0, 4.0)]
    fn test_timestamp_from_index_and_fps(
        #[case] index: usize,
        #[case] fps: f64,
        #[case] expected: f64,
    ) {
        let sampler = FrameSampler::new(1);
        assert_relative_eq!(sampler.timestamp_secs(index, fps), expected);
    }

    #[test]
    fn test_unknown_fps_maps_to_zero() {
        let sampler = FrameSampler::new(1);
        assert_relative_eq!(sampler.timestamp_secs(42, 0.0), 0.0);
    }
}
