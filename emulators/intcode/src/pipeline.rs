//! Amplifier pipelines: several machines running copies of one program, each
//! machine's outputs feeding the next machine's input.
//!
//! Scheduling is strictly cooperative round-robin. Each round resumes every live
//! machine once, in index order, until it emits one output, halts, or asks for
//! input that is not there yet. An output is forwarded to the downstream machine
//! before the next machine runs, which makes the final result deterministic.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MachineConfig;
use crate::machine::{Event, Machine};
use crate::{Error, Result, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Machine `i` feeds machine `i + 1`; the last machine's outputs leave the pipeline.
    Chain,
    /// Like a chain, but the last machine also feeds the first.
    Ring,
}

impl Topology {
    fn downstream(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Topology::Chain if index + 1 < len => Some(index + 1),
            Topology::Chain => None,
            Topology::Ring => Some((index + 1) % len),
        }
    }

    fn upstream(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Topology::Chain => index.checked_sub(1),
            Topology::Ring => Some((index + len - 1) % len),
        }
    }
}

/// One scheduling decision, recorded when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub machine: usize,
    pub event: Event,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    machines: Vec<Machine>,
    topology: Topology,
    last_output: Option<Word>,
    trace: Option<Vec<ScheduleEntry>>,
}

impl Pipeline {
    /// One streaming machine per phase setting, each seeded with its phase as
    /// its first input.
    pub fn new(program: &[Word], phases: &[Word], topology: Topology) -> Self {
        let machines = phases
            .iter()
            .map(|&phase| {
                let mut machine = Machine::streaming(program);
                machine.push_input(phase);
                machine
            })
            .collect();
        Self {
            machines,
            topology,
            last_output: None,
            trace: None,
        }
    }

    pub fn chain(program: &[Word], phases: &[Word]) -> Self {
        Self::new(program, phases, Topology::Chain)
    }

    pub fn ring(program: &[Word], phases: &[Word]) -> Self {
        Self::new(program, phases, Topology::Ring)
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.machines = self
            .machines
            .into_iter()
            .map(|machine| machine.with_config(config))
            .collect();
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled.then(Vec::new);
        self
    }

    /// Queue a value on the first machine's input, after its phase setting.
    pub fn seed(&mut self, value: Word) {
        if let Some(first) = self.machines.first_mut() {
            first.push_input(value);
        }
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn last_output(&self) -> Option<Word> {
        self.last_output
    }

    pub fn trace(&self) -> &[ScheduleEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        self.machines.iter().all(Machine::is_halted)
    }

    /// Resume every live machine once, in order. Returns whether any machine
    /// produced an output or halted.
    pub fn round(&mut self) -> Result<bool> {
        let len = self.machines.len();
        let mut progressed = false;
        for index in 0..len {
            if self.machines[index].is_halted() {
                continue;
            }
            let event = self.machines[index]
                .resume()
                .map_err(|source| Error::Pipeline {
                    machine: index,
                    source: Box::new(source),
                })?;
            if let Some(trace) = self.trace.as_mut() {
                trace.push(ScheduleEntry {
                    machine: index,
                    event,
                });
            }
            match event {
                Event::Output(value) => {
                    progressed = true;
                    if index + 1 == len {
                        self.last_output = Some(value);
                    }
                    if let Some(next) = self.topology.downstream(index, len) {
                        self.machines[next].push_input(value);
                    }
                }
                Event::Halted => progressed = true,
                Event::AwaitingInput => {
                    let producer_halted = self
                        .topology
                        .upstream(index, len)
                        .map_or(true, |up| self.machines[up].is_halted());
                    if producer_halted {
                        warn!(machine = index, "input requested from a halted producer");
                        return Err(Error::PipelineDeadlock { machine: index });
                    }
                }
            }
        }
        Ok(progressed)
    }

    /// Run rounds until every machine has halted and return the last value the
    /// last machine emitted.
    pub fn run(&mut self) -> Result<Word> {
        if self.machines.is_empty() {
            return Err(Error::NoOutput);
        }
        if self.is_finished() {
            return Err(Error::MachineHalted);
        }
        let mut rounds = 0usize;
        while !self.is_finished() {
            if !self.round()? {
                let machine = self
                    .machines
                    .iter()
                    .position(|m| !m.is_halted())
                    .unwrap_or_default();
                warn!(machine, rounds, "no machine can make progress");
                return Err(Error::PipelineDeadlock { machine });
            }
            rounds += 1;
            debug!(rounds, last_output = ?self.last_output, "round complete");
        }
        self.last_output.ok_or(Error::NoOutput)
    }
}

/// Run the program through a chain of machines, one per phase, feeding `input`
/// to the first.
pub fn run_chain(program: &[Word], phases: &[Word], input: Word) -> Result<Word> {
    let mut pipeline = Pipeline::chain(program, phases);
    pipeline.seed(input);
    pipeline.run()
}

/// Run the program through a feedback ring, bootstrapping the first machine with
/// `bootstrap`.
pub fn run_ring(program: &[Word], phases: &[Word], bootstrap: Word) -> Result<Word> {
    let mut pipeline = Pipeline::ring(program, phases);
    pipeline.seed(bootstrap);
    pipeline.run()
}

/// Try every ordering of `phases` with a bootstrap input of 0 and return the
/// ordering that yields the highest signal.
pub fn max_signal(
    program: &[Word],
    phases: &[Word],
    topology: Topology,
) -> Result<(Vec<Word>, Word)> {
    max_signal_with(program, phases, topology, MachineConfig::default())
}

pub fn max_signal_with(
    program: &[Word],
    phases: &[Word],
    topology: Topology,
    config: MachineConfig,
) -> Result<(Vec<Word>, Word)> {
    let mut best: Option<(Vec<Word>, Word)> = None;
    for ordering in phases.iter().copied().permutations(phases.len()) {
        let mut pipeline = Pipeline::new(program, &ordering, topology).with_config(config);
        pipeline.seed(0);
        let signal = pipeline.run()?;
        debug!(?ordering, signal, "phase setting evaluated");
        if best.as_ref().map_or(true, |(_, top)| signal > *top) {
            best = Some((ordering, signal));
        }
    }
    best.ok_or(Error::NoOutput)
}
