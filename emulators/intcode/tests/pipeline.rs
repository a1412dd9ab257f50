use intcode::{
    max_signal, run_chain, run_ring, Error, Event, MachineConfig, Pipeline, Program, Topology,
    Word,
};

fn program(text: &str) -> Program {
    text.parse().expect("valid program")
}

const CHAIN_A: &str = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0";
const CHAIN_B: &str = "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0";
const CHAIN_C: &str = "3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,\
1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0";

const RING_A: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,\
27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5";
const RING_B: &str = "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,\
-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,\
53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10";

#[test]
fn chain_reference_signals() {
    let cases = [
        (CHAIN_A, [4, 3, 2, 1, 0], 43210),
        (CHAIN_B, [0, 1, 2, 3, 4], 54321),
        (CHAIN_C, [1, 0, 4, 3, 2], 65210),
    ];
    for (text, phases, expected) in cases {
        assert_eq!(run_chain(&program(text), &phases, 0).unwrap(), expected);
    }
}

#[test]
fn ring_reference_signals() {
    assert_eq!(
        run_ring(&program(RING_A), &[9, 8, 7, 6, 5], 0).unwrap(),
        139629729
    );
    assert_eq!(run_ring(&program(RING_B), &[9, 7, 8, 5, 6], 0).unwrap(), 18216);
}

#[test]
fn chain_search_finds_best_ordering() {
    let phases: Vec<Word> = (0..=4).collect();
    let (best, signal) = max_signal(&program(CHAIN_A), &phases, Topology::Chain).unwrap();
    assert_eq!(best, vec![4, 3, 2, 1, 0]);
    assert_eq!(signal, 43210);

    let (best, signal) = max_signal(&program(CHAIN_C), &phases, Topology::Chain).unwrap();
    assert_eq!(best, vec![1, 0, 4, 3, 2]);
    assert_eq!(signal, 65210);
}

#[test]
fn ring_search_finds_best_ordering() {
    let phases: Vec<Word> = (5..=9).collect();
    let (best, signal) = max_signal(&program(RING_A), &phases, Topology::Ring).unwrap();
    assert_eq!(best, vec![9, 8, 7, 6, 5]);
    assert_eq!(signal, 139629729);

    let (best, signal) = max_signal(&program(RING_B), &phases, Topology::Ring).unwrap();
    assert_eq!(best, vec![9, 7, 8, 5, 6]);
    assert_eq!(signal, 18216);
}

#[test]
fn ring_runs_are_deterministic() {
    let program = program(RING_A);
    let run = || {
        let mut pipeline = Pipeline::ring(&program, &[9, 8, 7, 6, 5]).with_trace(true);
        pipeline.seed(0);
        let signal = pipeline.run().unwrap();
        (signal, pipeline.trace().to_vec())
    };
    let (first_signal, first_trace) = run();
    let (second_signal, second_trace) = run();
    assert_eq!(first_signal, second_signal);
    assert_eq!(first_trace, second_trace);

    let order: Vec<usize> = first_trace.iter().take(10).map(|e| e.machine).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    let last = first_trace.last().unwrap();
    assert_eq!((last.machine, last.event), (4, Event::Halted));
}

#[test]
fn waiting_on_halted_producer_deadlocks() {
    // Phase 0 halts straight away; phase 1 then waits on it forever.
    let program = [3, 12, 1006, 12, 9, 3, 13, 4, 13, 99];
    let mut pipeline = Pipeline::ring(&program, &[0, 1]);
    assert!(matches!(
        pipeline.run(),
        Err(Error::PipelineDeadlock { machine: 1 })
    ));
}

#[test]
fn unseeded_ring_deadlocks() {
    let program = [3, 9, 3, 10, 4, 9, 99];
    let mut pipeline = Pipeline::ring(&program, &[1, 2]);
    assert!(matches!(
        pipeline.run(),
        Err(Error::PipelineDeadlock { machine: 0 })
    ));
    assert!(!pipeline.is_finished());
}

#[test]
fn finished_pipeline_cannot_run_again() {
    let mut pipeline = Pipeline::chain(&program(CHAIN_A), &[4, 3, 2, 1, 0]);
    pipeline.seed(0);
    assert_eq!(pipeline.run().unwrap(), 43210);
    assert!(pipeline.is_finished());
    assert_eq!(pipeline.last_output(), Some(43210));
    assert!(matches!(pipeline.run(), Err(Error::MachineHalted)));

    let mut member = pipeline.machines()[0].clone();
    assert!(matches!(member.resume(), Err(Error::MachineHalted)));
}

#[test]
fn finished_ring_cannot_run_again() {
    let mut pipeline = Pipeline::ring(&program(RING_A), &[9, 8, 7, 6, 5]);
    pipeline.seed(0);
    assert_eq!(pipeline.run().unwrap(), 139629729);
    assert!(pipeline.is_finished());
    assert!(matches!(pipeline.run(), Err(Error::MachineHalted)));
    assert!(!pipeline.round().unwrap());
    assert_eq!(pipeline.last_output(), Some(139629729));

    for member in pipeline.machines() {
        let mut member = member.clone();
        assert!(matches!(member.resume(), Err(Error::MachineHalted)));
        assert!(member.outputs().next().is_none());
    }
}

#[test]
fn memory_limit_applies_to_every_member() {
    let config = MachineConfig::new().with_memory_limit(16);
    let mut pipeline = Pipeline::chain(&program(CHAIN_A), &[0, 1]).with_config(config);
    pipeline.seed(0);
    match pipeline.run().unwrap_err() {
        Error::Pipeline { machine, source } => {
            assert_eq!(machine, 0);
            assert!(matches!(*source, Error::MemoryLimit { limit: 16, .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
