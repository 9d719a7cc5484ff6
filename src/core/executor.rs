//! Execution-unit abstraction and the reference ALU.

use crate::core::process::{Instruction, Registers, REGISTER_COUNT};
use crate::core::ExecutionFault;

/// Interprets one instruction against a register file and a quantum budget.
///
/// The dispatcher owns the descriptor while calling this, so implementations
/// get exclusive access to the registers and quantum without locking. An
/// implementation must charge the quantum for every instruction it accepts and
/// must never drive it below zero; returning a fault moves the process to
/// `BLOCKED`.
///
/// # Example
///
/// ```rust
/// use prometheus_cpu_scheduler::core::{Alu, ExecutionUnit, Instruction};
///
/// let mut regs = [0; 8];
/// let mut quantum = 2;
/// let out = Alu.execute(&mut regs, &Instruction::Load { dst: 1, value: 40 }, &mut quantum);
/// assert_eq!(out, Ok(40));
/// assert_eq!(quantum, 1);
/// ```
pub trait ExecutionUnit: Send + Sync + 'static {
    /// Execute `instruction`, returning the value it produced.
    ///
    /// # Errors
    ///
    /// Any [`ExecutionFault`] the instruction raises.
    fn execute(
        &self,
        registers: &mut Registers,
        instruction: &Instruction,
        quantum: &mut u32,
    ) -> Result<i64, ExecutionFault>;
}

/// Reference execution unit: one quantum unit per instruction, checked
/// arithmetic on `i64` registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alu;

impl Alu {
    fn reg(idx: usize) -> Result<usize, ExecutionFault> {
        if idx < REGISTER_COUNT {
            Ok(idx)
        } else {
            Err(ExecutionFault::InvalidRegister(idx))
        }
    }

    fn binary(
        registers: &mut Registers,
        dst: usize,
        lhs: usize,
        rhs: usize,
        op: impl FnOnce(i64, i64) -> Result<i64, ExecutionFault>,
    ) -> Result<i64, ExecutionFault> {
        let (dst, lhs, rhs) = (Self::reg(dst)?, Self::reg(lhs)?, Self::reg(rhs)?);
        let value = op(registers[lhs], registers[rhs])?;
        registers[dst] = value;
        Ok(value)
    }
}

impl ExecutionUnit for Alu {
    fn execute(
        &self,
        registers: &mut Registers,
        instruction: &Instruction,
        quantum: &mut u32,
    ) -> Result<i64, ExecutionFault> {
        if *quantum == 0 {
            return Err(ExecutionFault::QuantumExhausted);
        }
        // Charged up front: a faulting instruction still used its cycle.
        *quantum -= 1;

        match *instruction {
            Instruction::Load { dst, value } => {
                registers[Self::reg(dst)?] = value;
                Ok(value)
            }
            Instruction::Mov { dst, src } => {
                let value = registers[Self::reg(src)?];
                registers[Self::reg(dst)?] = value;
                Ok(value)
            }
            Instruction::Add { dst, lhs, rhs } => Self::binary(registers, dst, lhs, rhs, |a, b| {
                a.checked_add(b).ok_or(ExecutionFault::Overflow)
            }),
            Instruction::Sub { dst, lhs, rhs } => Self::binary(registers, dst, lhs, rhs, |a, b| {
                a.checked_sub(b).ok_or(ExecutionFault::Overflow)
            }),
            Instruction::Mul { dst, lhs, rhs } => Self::binary(registers, dst, lhs, rhs, |a, b| {
                a.checked_mul(b).ok_or(ExecutionFault::Overflow)
            }),
            Instruction::Div { dst, lhs, rhs } => Self::binary(registers, dst, lhs, rhs, |a, b| {
                if b == 0 {
                    return Err(ExecutionFault::DivisionByZero);
                }
                a.checked_div(b).ok_or(ExecutionFault::Overflow)
            }),
            Instruction::Nop => Ok(0),
        }
    }
}
