use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::*;
use rand::Rng;

const CONFETTI: [&str; 6] = ["*", "+", "o", "~", "•", "✦"];

/// Confetti shown after a win. Runs detached; nothing waits on it.
#[derive(Debug, Clone, Copy)]
pub struct Celebration {
    duration: Duration,
    frame_interval: Duration,
}

impl Celebration {
    pub const DURATION: Duration = Duration::from_secs(3);

    pub fn new(frame_interval: Duration) -> Self {
        Self::with_duration(Self::DURATION, frame_interval)
    }

    pub fn with_duration(duration: Duration, frame_interval: Duration) -> Self {
        Self {
            duration,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn frame_count(&self) -> usize {
        let frames = self.duration.as_millis() / self.frame_interval.as_millis();
        (frames as usize).max(1)
    }

    /// Spawn the animation; `draw` is called once per frame with the frame index.
    /// Drawing ends early once the returned handle is stopped.
    pub fn launch<F>(self, mut draw: F) -> CelebrationHandle
    where
        F: FnMut(usize) + Send + 'static,
    {
        let frames = self.frame_count();
        let handle = CelebrationHandle::default();
        let stopped = handle.stopped.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.frame_interval);
            for frame in 0..frames {
                ticker.tick().await;
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                draw(frame);
            }
        });
        handle
    }
}

/// Silences a running celebration. Dropping it lets the animation finish.
#[derive(Debug, Clone, Default)]
pub struct CelebrationHandle {
    stopped: Arc<AtomicBool>,
}

impl CelebrationHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// One line of randomly colored confetti.
pub fn confetti_line<R: Rng>(width: usize, rng: &mut R) -> String {
    (0..width)
        .map(|_| {
            if rng.random_bool(0.7) {
                return " ".to_string();
            }
            let piece = CONFETTI[rng.random_range(0..CONFETTI.len())];
            match rng.random_range(0..5) {
                0 => piece.bright_magenta().to_string(),
                1 => piece.bright_yellow().to_string(),
                2 => piece.bright_cyan().to_string(),
                3 => piece.bright_green().to_string(),
                _ => piece.bright_red().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_frame_count() {
        assert_eq!(Celebration::new(Duration::from_millis(100)).frame_count(), 30);
        assert_eq!(
            Celebration::with_duration(Duration::from_millis(50), Duration::from_secs(1)).frame_count(),
            1
        );
        assert_eq!(
            Celebration::with_duration(Duration::from_millis(5), Duration::ZERO).frame_count(),
            5
        );
    }

    #[tokio::test]
    async fn test_launch_draws_every_frame_then_stops() {
        let drawn = Arc::new(AtomicUsize::new(0));
        let counter = drawn.clone();
        let celebration =
            Celebration::with_duration(Duration::from_millis(60), Duration::from_millis(10));

        let _handle = celebration.launch(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(drawn.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_stopped_celebration_draws_no_more() {
        let drawn = Arc::new(AtomicUsize::new(0));
        let counter = drawn.clone();
        let celebration =
            Celebration::with_duration(Duration::from_millis(400), Duration::from_millis(20));

        let handle = celebration.launch(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();
        let at_stop = drawn.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(at_stop >= 1);
        assert!(drawn.load(Ordering::SeqCst) <= at_stop + 1);
        assert!(drawn.load(Ordering::SeqCst) < 20);
    }

    #[test]
    fn test_confetti_line_width() {
        colored::control::set_override(false);
        let mut rng = StdRng::seed_from_u64(3);
        let line = confetti_line(40, &mut rng);
        assert_eq!(line.chars().count(), 40);
    }
}
