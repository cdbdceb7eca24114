//! Sampling of observations visited by the evaluation policy.
use crate::{Agent, Env};
use anyhow::Result;

/// Runs the policy on `env` until `n` observations have been visited and hands
/// them to the agent at once.
///
/// The initial observation of every episode counts as visited. Episodes are
/// restarted as needed; the last one is cut once the buffer is full.
pub(super) fn sample_trajectory<E, A>(env: &mut E, agent: &mut A, n: usize) -> Result<()>
where
    E: Env,
    A: Agent<E>,
{
    if n == 0 {
        return Ok(());
    }

    let cap = env.max_episode_steps();
    let mut states = Vec::with_capacity(n);

    while states.len() < n {
        let (mut obs, _) = env.reset()?;
        states.push(obs.clone());
        let mut steps = 0;

        while states.len() < n {
            let act = agent.sample(&obs)?;
            let (step, _) = env.step(&act)?;
            steps += 1;
            let done = step.is_done() || cap.map_or(false, |cap| steps >= cap);
            states.push(step.obs.clone());
            if done {
                break;
            }
            obs = step.obs;
        }
    }

    agent.push_eval_trajectory(states)
}
