//! Frame loop driving the dispatcher against a scenario world.
use std::time::Duration;

use anyhow::Result;
use quest_runtime::{Dispatcher, EngineConfig, RunEvent, RunState, Topic};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ClientConfig;
use crate::scenario::Scenario;

/// How a headless run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub state: RunState,
    pub ticks: u64,
    /// Simulated time covered by the run.
    pub elapsed: Duration,
}

/// Runs `scenario` to completion, one dispatcher tick per `config.tick`.
///
/// Returns an error if the run aborted. Ctrl-C stops the run cleanly.
pub async fn run_scenario(
    scenario: Scenario,
    engine: EngineConfig,
    config: &ClientConfig,
) -> Result<RunSummary> {
    let (mut world, mut quest) = scenario.into_run();
    let first_step = quest.next_tasks();

    let mut dispatcher = Dispatcher::builder().config(engine).hooks(quest).build();
    let loggers = spawn_event_loggers(&dispatcher);
    let signals = dispatcher.signals();
    dispatcher.start_run(first_step)?;

    let mut interval = tokio::time::interval(config.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut ticks = 0u64;
    let state = loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut ctrl_c => {
                result?;
                tracing::warn!("Ctrl-C received, stopping run");
                signals.stop()?;
            }
        }

        world.advance(config.tick);
        let state = dispatcher.tick(&mut world);
        ticks += 1;

        if state != RunState::Running {
            break state;
        }
        if dispatcher.is_idle() {
            tracing::warn!("Script ran out of tasks without ending the run");
            dispatcher.stop(&mut world);
            break dispatcher.state();
        }
        if ticks >= config.max_ticks {
            tracing::warn!("Giving up after {} ticks", ticks);
            dispatcher.stop(&mut world);
            break dispatcher.state();
        }
    };

    let outcome = dispatcher.outcome();
    // Dropping the dispatcher closes the event channels and lets the loggers drain.
    drop(dispatcher);
    for logger in loggers {
        let _ = logger.await;
    }
    outcome?;

    let summary = RunSummary {
        state,
        ticks,
        elapsed: world.elapsed(),
    };
    tracing::info!(
        "Run finished: state={}, ticks={}, simulated={:?}",
        summary.state,
        summary.ticks,
        summary.elapsed
    );
    Ok(summary)
}

fn spawn_event_loggers(dispatcher: &Dispatcher) -> Vec<JoinHandle<()>> {
    dispatcher
        .events()
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, rx)| tokio::spawn(log_events(topic, rx)))
        .collect()
}

async fn log_events(topic: Topic, mut rx: broadcast::Receiver<RunEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::debug!(?topic, ?event, "run event"),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(?topic, skipped, "event logger fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
