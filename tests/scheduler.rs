use std::cell::Cell;
use std::rc::Rc;

use tickmask_sched::{SchedError, Scheduler, SchedulerConfig, SoftClock, Step, Task, TickMask};

const MAX_TIME: u32 = 255;
const TICK_PERIOD: u32 = 1;

fn counted_task(
    sched: &Scheduler<SoftClock>,
    name: &str,
    mask: TickMask,
) -> (Rc<Cell<u32>>, Task) {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    let task = sched
        .add_task(name, mask, move || c.set(c.get() + 1))
        .expect("task allocation");
    (count, task)
}

#[test]
fn context_and_task_lifecycle() {
    let clock = SoftClock::new(MAX_TIME);
    let sched = Scheduler::new(clock, SchedulerConfig::new(MAX_TIME, TICK_PERIOD))
        .expect("context allocation");

    let task = sched
        .add_task("mock_task", TickMask::IDLE, || {})
        .expect("task allocation");
    assert_eq!(task.name(), "mock_task");
    assert_eq!(sched.task_count(), 1);

    task.free();
    assert_eq!(sched.task_count(), 0);
    drop(sched);
}

#[test]
fn context_rejects_invalid_time_base() {
    let clock = SoftClock::new(MAX_TIME);
    assert!(matches!(
        Scheduler::new(clock.clone(), SchedulerConfig::new(2, 1)),
        Err(SchedError::MaxTimeTooSmall { .. })
    ));
    assert!(matches!(
        Scheduler::new(clock, SchedulerConfig::new(MAX_TIME, MAX_TIME)),
        Err(SchedError::InvalidTickPeriod { .. })
    ));
}

#[test]
fn standard_masks_over_one_cycle() {
    let clock = SoftClock::new(MAX_TIME);
    let mut sched = Scheduler::new(clock.clone(), SchedulerConfig::new(MAX_TIME, TICK_PERIOD))
        .expect("context allocation");

    let (idle, task_idle) = counted_task(&sched, "", TickMask::IDLE);
    let (t1, task_1) = counted_task(&sched, "", TickMask::EVERY_1);
    let (t2, task_2) = counted_task(&sched, "", TickMask::EVERY_2);
    let (t4, task_4) = counted_task(&sched, "", TickMask::EVERY_4);
    let (t8, task_8) = counted_task(&sched, "", TickMask::EVERY_8);
    let (t16, task_16) = counted_task(&sched, "", TickMask::EVERY_16);
    let (t32, task_32) = counted_task(&sched, "", TickMask::EVERY_32);

    for _ in 0..32 {
        clock.advance(1);
        assert!(matches!(sched.run(), Step::Tick { .. }));
    }

    assert_eq!(idle.get(), 0);
    assert_eq!(t1.get(), 32);
    assert_eq!(t2.get(), 16);
    assert_eq!(t4.get(), 8);
    assert_eq!(t8.get(), 4);
    assert_eq!(t16.get(), 2);
    assert_eq!(t32.get(), 1);

    // No time passes: the next call is an idle step
    assert_eq!(sched.run(), Step::Idle);
    assert_eq!(idle.get(), 1);
    assert_eq!(t1.get(), 32);

    // Context can be freed before the tasks
    drop(sched);
    for task in [task_idle, task_1, task_2, task_4, task_8, task_16, task_32] {
        assert!(!task.is_attached());
        task.free();
    }
}

#[test]
fn introspection_reports_names_and_stats() {
    let clock = SoftClock::new(u32::MAX);
    let mut sched = Scheduler::new(clock.clone(), SchedulerConfig::for_u32_counter(100))
        .expect("context allocation");

    let c = clock.clone();
    let _fast = sched
        .add_task("fast", TickMask::EVERY_1, move || c.advance(2))
        .expect("task allocation");
    let c = clock.clone();
    let _slow = sched
        .add_task("a_task_with_a_long_name", TickMask::EVERY_1, move || c.advance(20))
        .expect("task allocation");

    sched.run();

    let mut seen = Vec::new();
    let mut info = sched.first_task_info();
    while let Some(i) = info {
        seen.push((i.name().to_string(), i.average_time, i.max_time));
        info = i.advance();
    }
    assert_eq!(
        seen,
        [
            ("fast".to_string(), 1, 2),
            ("a_task_with_a_long_name".to_string(), 10, 20),
        ]
    );

    sched.reset_stats();
    assert!(sched
        .task_infos()
        .all(|i| i.average_time == 0 && i.max_time == 0));
}

#[test]
fn freeing_middle_task_keeps_order() {
    let clock = SoftClock::new(MAX_TIME);
    let sched = Scheduler::new(clock, SchedulerConfig::new(MAX_TIME, TICK_PERIOD))
        .expect("context allocation");

    let a = sched.add_task("A", TickMask::EVERY_1, || {}).unwrap();
    let b = sched.add_task("B", TickMask::EVERY_1, || {}).unwrap();
    let c = sched.add_task("C", TickMask::EVERY_1, || {}).unwrap();

    let names: Vec<String> = sched.task_infos().map(|i| i.name().to_string()).collect();
    assert_eq!(names, ["A", "B", "C"]);

    drop(b);
    let names: Vec<String> = sched.task_infos().map(|i| i.name().to_string()).collect();
    assert_eq!(names, ["A", "C"]);

    let d = sched.add_task("D", TickMask::IDLE, || {}).unwrap();
    let names: Vec<String> = sched.task_infos().map(|i| i.name().to_string()).collect();
    assert_eq!(names, ["A", "C", "D"]);

    drop((a, c, d));
    assert_eq!(sched.task_count(), 0);
}

#[test]
fn resync_after_sleep() {
    let clock = SoftClock::new(MAX_TIME);
    let mut sched = Scheduler::new(clock.clone(), SchedulerConfig::new(MAX_TIME, 10))
        .expect("context allocation");
    let (runs, _task) = counted_task(&sched, "periodic", TickMask::EVERY_1);

    sched.run();
    clock.advance(10);
    sched.run();
    assert_eq!(runs.get(), 2);

    // Simulated low-power sleep; the loop was not driven
    clock.advance(97);
    sched.reset();
    assert_eq!(sched.run(), Step::Tick { slot: 0 });
    clock.advance(9);
    assert_eq!(sched.run(), Step::Idle);
    clock.advance(1);
    assert_eq!(sched.run(), Step::Tick { slot: 1 });
    assert_eq!(runs.get(), 4);
}
