use super::trajectory::sample_trajectory;
use crate::{Agent, Env};
use anyhow::Result;
use log::{info, warn};
use std::time::{Duration, SystemTime};

/// Result of an evaluation session.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalSession {
    /// Return of each episode.
    pub returns: Vec<f32>,

    /// Length of each episode.
    pub steps: Vec<usize>,

    /// Wall time of the whole session.
    pub wall_time: Duration,
}

/// Runs evaluation sessions on its own environment instance.
///
/// The agent only samples actions; [`Agent::update`] is never called.
/// The caller is responsible for switching the agent to evaluation mode.
pub struct EvalRunner<E: Env> {
    env: E,
}

impl<E: Env> EvalRunner<E> {
    /// Creates a runner on the given evaluation environment.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// The evaluation environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    fn run_episode<A: Agent<E>>(&mut self, agent: &mut A) -> Result<(f32, usize)> {
        let (mut obs, _) = self.env.reset()?;
        let cap = self.env.max_episode_steps();
        let mut ret = 0f32;
        let mut steps = 0;

        loop {
            let act = agent.sample(&obs)?;
            let (step, _) = self.env.step(&act)?;
            ret += step.reward;
            steps += 1;

            if step.is_done() || cap.map_or(false, |cap| steps >= cap) {
                break;
            }
            obs = step.obs;
        }

        Ok((ret, steps))
    }

    /// Runs `n_episodes` evaluation episodes.
    ///
    /// If the agent asks for it with [`Agent::eval_trajectory_steps`], visited
    /// observations are sampled afterwards. Failures of that sampling are
    /// logged and do not affect the session.
    pub fn run<A: Agent<E>>(&mut self, agent: &mut A, n_episodes: usize) -> Result<EvalSession> {
        let timer = SystemTime::now();
        let mut returns = Vec::with_capacity(n_episodes);
        let mut steps = Vec::with_capacity(n_episodes);

        for ix in 0..n_episodes {
            let (ret, n_steps) = self.run_episode(agent)?;
            info!("Eval episode {}: return = {}, steps = {}", ix, ret, n_steps);
            returns.push(ret);
            steps.push(n_steps);
        }

        if let Some(n) = agent.eval_trajectory_steps() {
            if let Err(e) = sample_trajectory(&mut self.env, agent, n) {
                warn!("Sampling of the evaluation trajectory failed: {:?}", e);
            }
        }

        Ok(EvalSession {
            returns,
            steps,
            wall_time: timer.elapsed()?,
        })
    }
}
