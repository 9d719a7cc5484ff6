//! Process descriptor model: identity, lifecycle state, and the simulated
//! instruction set interpreted by execution units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process identifier.
pub type Pid = u64;

/// Number of general-purpose registers in every descriptor.
pub const REGISTER_COUNT: usize = 8;

/// Register file of a simulated process.
pub type Registers = [i64; REGISTER_COUNT];

/// Lifecycle state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Waiting in the ready queue and memory pool.
    Ready,
    /// Owned by a dispatcher and executing.
    Running,
    /// Hit an execution fault; terminal.
    Blocked,
}

impl ProcessState {
    /// Upper-case name used in audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated instruction. Register operands index into [`Registers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// `dst <- value`
    Load {
        /// Destination register.
        dst: usize,
        /// Immediate value.
        value: i64,
    },
    /// `dst <- src`
    Mov {
        /// Destination register.
        dst: usize,
        /// Source register.
        src: usize,
    },
    /// `dst <- lhs + rhs`
    Add {
        /// Destination register.
        dst: usize,
        /// Left operand register.
        lhs: usize,
        /// Right operand register.
        rhs: usize,
    },
    /// `dst <- lhs - rhs`
    Sub {
        /// Destination register.
        dst: usize,
        /// Left operand register.
        lhs: usize,
        /// Right operand register.
        rhs: usize,
    },
    /// `dst <- lhs * rhs`
    Mul {
        /// Destination register.
        dst: usize,
        /// Left operand register.
        lhs: usize,
        /// Right operand register.
        rhs: usize,
    },
    /// `dst <- lhs / rhs`, faults when `rhs` holds zero.
    Div {
        /// Destination register.
        dst: usize,
        /// Left operand register.
        lhs: usize,
        /// Right operand register.
        rhs: usize,
    },
    /// Burns one quantum unit without touching registers.
    Nop,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Load { dst, value } => write!(f, "LOAD r{dst}, {value}"),
            Self::Mov { dst, src } => write!(f, "MOV r{dst}, r{src}"),
            Self::Add { dst, lhs, rhs } => write!(f, "ADD r{dst}, r{lhs}, r{rhs}"),
            Self::Sub { dst, lhs, rhs } => write!(f, "SUB r{dst}, r{lhs}, r{rhs}"),
            Self::Mul { dst, lhs, rhs } => write!(f, "MUL r{dst}, r{lhs}, r{rhs}"),
            Self::Div { dst, lhs, rhs } => write!(f, "DIV r{dst}, r{lhs}, r{rhs}"),
            Self::Nop => f.write_str("NOP"),
        }
    }
}

/// Full state of one simulated process (the PCB).
///
/// Identity, priority, time slice and instruction list are fixed at creation.
/// The rest is mutated only by the dispatcher that currently owns the
/// descriptor, or by the execution unit it calls.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessDescriptor {
    id: Pid,
    pub(crate) state: ProcessState,
    pub(crate) quantum: u32,
    time_slice: u32,
    priority: i32,
    pub(crate) registers: Registers,
    instructions: Vec<Instruction>,
    pub(crate) pc: usize,
    pub(crate) timestamp: u64,
    pub(crate) result: i64,
}

impl ProcessDescriptor {
    /// Create a `READY` descriptor whose quantum is also its refill time slice.
    #[must_use]
    pub fn new(id: Pid, priority: i32, quantum: u32, instructions: Vec<Instruction>) -> Self {
        Self {
            id,
            state: ProcessState::Ready,
            quantum,
            time_slice: quantum,
            priority,
            registers: [0; REGISTER_COUNT],
            instructions,
            pc: 0,
            timestamp: 0,
            result: 0,
        }
    }

    /// Seed the register file.
    #[must_use]
    pub fn with_registers(mut self, registers: Registers) -> Self {
        self.registers = registers;
        self
    }

    /// Process identifier.
    #[must_use]
    pub const fn id(&self) -> Pid {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ProcessState {
        self.state
    }

    /// Remaining execution budget for the current slice.
    #[must_use]
    pub const fn quantum(&self) -> u32 {
        self.quantum
    }

    /// Budget restored when the process is preempted.
    #[must_use]
    pub const fn time_slice(&self) -> u32 {
        self.time_slice
    }

    /// Scheduling priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Complete instruction list, executed or not.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instructions not yet executed, in order.
    #[must_use]
    pub fn remaining_instructions(&self) -> &[Instruction] {
        &self.instructions[self.pc.min(self.instructions.len())..]
    }

    /// Index of the next instruction to execute.
    #[must_use]
    pub const fn program_counter(&self) -> usize {
        self.pc
    }

    /// Total quantum consumed across all slices.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Last value produced by the execution unit.
    #[must_use]
    pub const fn result(&self) -> i64 {
        self.result
    }

    /// True once every instruction has executed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pc >= self.instructions.len()
    }

    /// Restore the quantum to the full time slice.
    pub(crate) fn refill_quantum(&mut self) {
        self.quantum = self.time_slice;
    }
}
