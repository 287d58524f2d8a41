use rand::Rng;

/// Number of samples needed to hold `duration` seconds (truncated).
pub fn buffer_len(duration: f32, sample_rate: f32) -> usize {
    (duration.max(0.0) * sample_rate) as usize
}

/// Fill a fresh buffer with independent uniform samples in [-1, 1].
///
/// Every call draws new values; nothing here is seeded or cached.
pub fn white_noise(len: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_follows_duration() {
        assert_eq!(buffer_len(0.2, 48_000.0), 9_600);
        assert_eq!(buffer_len(0.0, 48_000.0), 0);
        assert_eq!(buffer_len(-1.0, 48_000.0), 0);
    }

    #[test]
    fn samples_are_bounded_and_not_silent() {
        let noise = white_noise(4_096);
        assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(noise.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn each_call_draws_a_new_buffer() {
        assert_ne!(white_noise(256), white_noise(256));
    }
}
