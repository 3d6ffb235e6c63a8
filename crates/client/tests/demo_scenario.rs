use std::path::PathBuf;
use std::time::Duration;

use quest_client::{Scenario, config::load_engine_config};
use quest_core::{AetheryteId, DataId, QuestId};
use quest_runtime::{Dispatcher, RunState, World};

fn scenario_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

#[test]
fn demo_scenario_runs_to_the_end() {
    let scenario =
        Scenario::load_from_file(&scenario_dir().join("demo.ron")).expect("demo should parse");
    let engine = load_engine_config(&scenario_dir().join("engine.toml")).expect("engine config");

    let (mut world, mut quest) = scenario.into_run();
    let first_step = quest.next_tasks();
    let mut dispatcher = Dispatcher::builder().config(engine).hooks(quest).build();
    dispatcher.start_run(first_step).expect("run should start");

    let mut state = RunState::Running;
    for _ in 0..2_000 {
        world.advance(Duration::from_millis(100));
        state = dispatcher.tick(&mut world);
        if state != RunState::Running {
            break;
        }
    }

    assert_eq!(state, RunState::Ended, "aborted: {:?}", dispatcher.last_abort());
    assert!(world.is_attuned(AetheryteId(8)));
    assert_eq!(
        world.quest_progress(QuestId(70)).map(|progress| progress.variables[0]),
        Some(0x30)
    );
    assert!(
        world
            .objects()
            .iter()
            .filter(|object| object.data_id == DataId(500))
            .all(|object| object.is_dead)
    );
}
