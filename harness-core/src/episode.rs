//! Runs a single training episode.
use crate::{
    error::HarnessError,
    experiment::{BudgetPolicy, Clock, ContradictionPolicy, EpisodeRecord},
    Agent, Env, Step, Transition,
};
use anyhow::Result;
use log::{trace, warn};
use std::time::SystemTime;

/// How the last step of an episode ended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepEnd {
    Continue,
    Terminated,
    Truncated,
}

/// Runs training episodes of an agent on the training environment.
///
/// Every transition is passed to [`Agent::update`]. An episode ends when
///
/// * the environment reaches a terminal state,
/// * the environment reports its own step limit,
/// * the episode reaches [`Env::max_episode_steps`], or
/// * the global timestep budget is exhausted under [`BudgetPolicy::CutEpisode`].
///
/// Only the first case is handed to the agent with `is_terminated`, all others
/// are truncations.
pub struct TrainEpisodeRunner<E: Env> {
    env: E,
    budget_policy: BudgetPolicy,
    contradiction_policy: ContradictionPolicy,
}

impl<E: Env> TrainEpisodeRunner<E> {
    /// Creates a runner on the given training environment.
    pub fn new(
        env: E,
        budget_policy: BudgetPolicy,
        contradiction_policy: ContradictionPolicy,
    ) -> Self {
        Self {
            env,
            budget_policy,
            contradiction_policy,
        }
    }

    /// The training environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    fn classify(
        &self,
        step: &Step<E>,
        steps: usize,
        clock: &mut Clock,
        total_timesteps: usize,
    ) -> Result<StepEnd> {
        if step.is_contradictory() {
            let episode = clock.train_episodes();
            match self.contradiction_policy {
                ContradictionPolicy::Fail => {
                    return Err(HarnessError::ContradictoryTermination { episode, step: steps }.into());
                }
                ContradictionPolicy::Warn => {
                    warn!(
                        "Training episode {} step {}: environment reported terminal and step limit; passed as truncation",
                        episode, steps
                    );
                    clock.count_contradiction();
                    return Ok(StepEnd::Truncated);
                }
            }
        }

        if step.is_terminated {
            return Ok(StepEnd::Terminated);
        }
        if step.is_truncated {
            return Ok(StepEnd::Truncated);
        }
        if self.env.max_episode_steps().map_or(false, |cap| steps >= cap) {
            return Ok(StepEnd::Truncated);
        }
        if self.budget_policy == BudgetPolicy::CutEpisode && !clock.has_budget(total_timesteps) {
            return Ok(StepEnd::Truncated);
        }
        Ok(StepEnd::Continue)
    }

    /// Runs one training episode.
    ///
    /// `clock` is advanced by one timestep per environment step. Errors of the
    /// agent or the environment are returned as is.
    pub fn run_episode<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        clock: &mut Clock,
        total_timesteps: usize,
    ) -> Result<EpisodeRecord> {
        let timer = SystemTime::now();
        agent.reset();

        let (mut obs, _) = self.env.reset()?;
        let mut ret = 0f32;
        let mut steps = 0;

        loop {
            let act = agent.sample(&obs)?;
            let (step, _) = self.env.step(&act)?;
            steps += 1;
            clock.tick();
            ret += step.reward;

            let end = self.classify(&step, steps, clock, total_timesteps)?;
            trace!("step {}: reward = {}, end = {:?}", steps, step.reward, end);

            let next_obs = step.obs;
            agent.update(Transition {
                obs,
                act,
                reward: step.reward,
                next_obs: next_obs.clone(),
                is_terminated: end == StepEnd::Terminated,
                is_truncated: end == StepEnd::Truncated,
            })?;

            if end != StepEnd::Continue {
                break;
            }
            obs = next_obs;
        }

        Ok(EpisodeRecord {
            ret,
            steps,
            wall_time: timer.elapsed()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};

    fn runner(config: DummyEnvConfig, budget_policy: BudgetPolicy) -> TrainEpisodeRunner<DummyEnv> {
        TrainEpisodeRunner::new(
            DummyEnv::new(config, 0),
            budget_policy,
            ContradictionPolicy::Warn,
        )
    }

    #[test]
    fn test_step_cap_is_truncation() -> Result<()> {
        let mut runner = runner(
            DummyEnvConfig::default().max_episode_steps(3),
            BudgetPolicy::CutEpisode,
        );
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();

        let episode = runner.run_episode(&mut agent, &mut clock, 100)?;
        assert_eq!(episode.steps, 3);
        assert_eq!(episode.ret, 3.0);
        assert_eq!(clock.timesteps_elapsed(), 3);

        let updates = agent.updates();
        assert_eq!(updates.len(), 3);
        assert!(updates[..2].iter().all(|u| !u.is_terminated && !u.is_truncated));
        assert!(updates[2].is_truncated && !updates[2].is_terminated);
        assert!(updates.iter().all(|u| u.bootstrap_mask == 1.0));
        Ok(())
    }

    #[test]
    fn test_terminal_masks_bootstrap() -> Result<()> {
        let mut runner = runner(
            DummyEnvConfig::default().max_episode_steps(5).terminal_at(2),
            BudgetPolicy::CutEpisode,
        );
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();

        let episode = runner.run_episode(&mut agent, &mut clock, 100)?;
        assert_eq!(episode.steps, 2);

        let last = agent.updates().last().unwrap();
        assert!(last.is_terminated && !last.is_truncated);
        assert_eq!(last.bootstrap_mask, 0.0);
        Ok(())
    }

    #[test]
    fn test_budget_cut_and_finish() -> Result<()> {
        let config = DummyEnvConfig::default().max_episode_steps(4);

        let mut cut = runner(config.clone(), BudgetPolicy::CutEpisode);
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();
        let episode = cut.run_episode(&mut agent, &mut clock, 2)?;
        assert_eq!(episode.steps, 2);
        assert!(agent.updates()[1].is_truncated);

        let mut finish = runner(config, BudgetPolicy::FinishEpisode);
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();
        let episode = finish.run_episode(&mut agent, &mut clock, 2)?;
        assert_eq!(episode.steps, 4);
        assert_eq!(clock.timesteps_elapsed(), 4);
        Ok(())
    }

    #[test]
    fn test_env_step_limit_flag_is_truncation() -> Result<()> {
        let mut runner = runner(
            DummyEnvConfig::default().step_limit_flag_at(2),
            BudgetPolicy::CutEpisode,
        );
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();

        let episode = runner.run_episode(&mut agent, &mut clock, 100)?;
        assert_eq!(episode.steps, 2);
        let last = agent.updates().last().unwrap();
        assert!(last.is_truncated && !last.is_terminated);
        assert_eq!(clock.contradictory_terminations(), 0);
        Ok(())
    }

    #[test]
    fn test_contradiction_warn_and_fail() -> Result<()> {
        let config = DummyEnvConfig::default().terminal_at(2).step_limit_flag_at(2);

        let mut lenient = runner(config.clone(), BudgetPolicy::CutEpisode);
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();
        lenient.run_episode(&mut agent, &mut clock, 100)?;
        assert_eq!(clock.contradictory_terminations(), 1);
        assert!(agent.updates().last().unwrap().is_truncated);

        let mut strict = TrainEpisodeRunner::new(
            DummyEnv::new(config, 0),
            BudgetPolicy::CutEpisode,
            ContradictionPolicy::Fail,
        );
        let mut agent = DummyAgent::default();
        let mut clock = Clock::new();
        let err = strict.run_episode(&mut agent, &mut clock, 100).unwrap_err();
        match err.downcast_ref::<HarnessError>() {
            Some(HarnessError::ContradictoryTermination { episode, step }) => {
                assert_eq!((*episode, *step), (0, 2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }
}
