//! Counters of a run.
use std::time::Duration;

/// Counts timesteps and episodes and accumulates time spent in training and
/// evaluation.
///
/// All mutation goes through methods of this struct, called by
/// [`ExperimentController`](super::ExperimentController) and the runners it drives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Clock {
    timesteps_elapsed: usize,
    train_episodes: usize,
    timesteps_since_last_eval: usize,
    last_checkpoint_timestep: usize,
    train_time: Duration,
    eval_time: Duration,
    contradictory_terminations: usize,
}

impl Clock {
    /// A clock at timestep 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment steps taken in training.
    pub fn timesteps_elapsed(&self) -> usize {
        self.timesteps_elapsed
    }

    /// Completed training episodes.
    pub fn train_episodes(&self) -> usize {
        self.train_episodes
    }

    /// Training steps since the last evaluation session.
    pub fn timesteps_since_last_eval(&self) -> usize {
        self.timesteps_since_last_eval
    }

    /// Timestep of the last checkpoint, 0 before the first one.
    pub fn last_checkpoint_timestep(&self) -> usize {
        self.last_checkpoint_timestep
    }

    /// Accumulated training time.
    pub fn train_time(&self) -> Duration {
        self.train_time
    }

    /// Accumulated evaluation time.
    pub fn eval_time(&self) -> Duration {
        self.eval_time
    }

    /// Number of steps that reported both a terminal state and a step-limit truncation.
    pub fn contradictory_terminations(&self) -> usize {
        self.contradictory_terminations
    }

    /// Counts one training step.
    pub fn tick(&mut self) {
        self.timesteps_elapsed += 1;
        self.timesteps_since_last_eval += 1;
    }

    /// Counts a completed training episode and its wall time.
    pub fn finish_episode(&mut self, wall_time: Duration) {
        self.train_episodes += 1;
        self.train_time += wall_time;
    }

    /// Counts a completed evaluation session and resets the evaluation interval.
    pub fn finish_eval(&mut self, wall_time: Duration) {
        self.eval_time += wall_time;
        self.timesteps_since_last_eval = 0;
    }

    /// Marks a checkpoint at the current timestep.
    pub fn mark_checkpoint(&mut self) {
        self.last_checkpoint_timestep = self.timesteps_elapsed;
    }

    /// Counts a contradictory termination signal.
    pub fn count_contradiction(&mut self) {
        self.contradictory_terminations += 1;
    }

    /// `true` while the timestep budget is not exhausted.
    pub fn has_budget(&self, total_timesteps: usize) -> bool {
        self.timesteps_elapsed < total_timesteps
    }

    /// `true` if another training episode may start.
    pub fn may_start_episode(&self, total_timesteps: usize, episode_cap: Option<usize>) -> bool {
        self.has_budget(total_timesteps)
            && episode_cap.map_or(true, |cap| self.train_episodes < cap)
    }

    /// `true` if an evaluation session is due.
    pub fn eval_due(&self, eval_interval_timesteps: usize) -> bool {
        self.timesteps_since_last_eval >= eval_interval_timesteps
    }

    /// `true` if a checkpoint is due.
    pub fn checkpoint_due(&self, checkpoint_interval: usize) -> bool {
        self.timesteps_elapsed - self.last_checkpoint_timestep >= checkpoint_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_due_after_crossing_interval() {
        let mut clock = Clock::new();
        for _ in 0..4 {
            clock.tick();
        }
        assert!(!clock.eval_due(5));
        clock.tick();
        assert!(clock.eval_due(5));
        clock.finish_eval(Duration::from_millis(3));
        assert_eq!(clock.timesteps_since_last_eval(), 0);
        assert_eq!(clock.timesteps_elapsed(), 5);
        assert_eq!(clock.eval_time(), Duration::from_millis(3));
    }

    #[test]
    fn test_checkpoint_due() {
        let mut clock = Clock::new();
        for _ in 0..7 {
            clock.tick();
        }
        assert!(clock.checkpoint_due(7));
        clock.mark_checkpoint();
        assert!(!clock.checkpoint_due(7));
        assert!(clock.checkpoint_due(0));
    }

    #[test]
    fn test_episode_cap() {
        let mut clock = Clock::new();
        clock.tick();
        clock.finish_episode(Duration::from_secs(1));
        assert!(clock.may_start_episode(10, None));
        assert!(clock.may_start_episode(10, Some(2)));
        assert!(!clock.may_start_episode(10, Some(1)));
        assert!(!clock.may_start_episode(1, None));
        assert_eq!(clock.train_time(), Duration::from_secs(1));
    }
}
