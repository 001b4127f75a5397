// Copyright 2016 Walter Kuppens.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The timing governor: paces the CPU to 2MHz wall-clock time and fires the
//! alternating mid-frame/end-of-frame RST interrupts. Each call drains
//! whatever cycle budget the wall-clock delta since the last call allows,
//! rather than stepping once per call, so a front-end can call `run`
//! once per host frame instead of once per instruction.

use std::time::{Duration, Instant};

use crate::bridge::{IoRequest, PortIo};
use crate::cpu::{interrupt, Cpu};
use crate::memory::Memory;

/// Cycles in one half of a 60Hz video frame at the 8080's 2MHz clock.
pub const CYCLES_PER_HALF_FRAME: u64 = 16_666;

const CYCLES_PER_MICROSECOND: u64 = 2;

/// Why a run loop stopped. `Halted` is returned by `Governor::run` itself;
/// `Quit` is never produced here but shares this type so run mode and
/// step mode's CLI front-ends report a stop the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The guest executed HLT.
    Halted,
    /// The human asked the step-mode prompt to quit.
    Quit,
}

/// Drives `Cpu::step` at a 2MHz target rate and raises RST 1 / RST 2 once
/// per half-frame, alternating 1, 2, 1, 2, ... starting with vector 1.
pub struct Governor {
    last_tick: Option<Instant>,
    pending_vector: u8,
    frame_cycles: u64,
}

impl Governor {
    pub fn new() -> Self {
        Governor {
            last_tick: None,
            pending_vector: 1,
            frame_cycles: 0,
        }
    }

    /// Runs for roughly one real-time slice, then returns so a front-end can
    /// redraw and poll input. Returns `Some(StopReason::Halted)` if the CPU
    /// executed HLT during the slice.
    pub fn run(
        &mut self,
        cpu: &mut Cpu,
        memory: &mut Memory,
        io: &mut IoRequest,
        ports: &mut dyn PortIo,
        sleep: Duration,
    ) -> Option<StopReason> {
        let now = Instant::now();
        let last_tick = self.last_tick.unwrap_or(now);
        self.last_tick = Some(now);

        let elapsed_us = now.duration_since(last_tick).as_micros() as u64;
        let cycles_to_run = elapsed_us * CYCLES_PER_MICROSECOND;

        let mut stop = None;
        let mut cycles_run = 0u64;
        while cycles_run < cycles_to_run {
            let cycles = cpu.step(memory, io, ports) as u64;
            cycles_run += cycles;
            self.frame_cycles += cycles;

            if self.frame_cycles >= CYCLES_PER_HALF_FRAME {
                interrupt::request(cpu, memory, self.pending_vector);
                self.pending_vector = if self.pending_vector == 1 { 2 } else { 1 };
                self.frame_cycles -= CYCLES_PER_HALF_FRAME;
            }

            if cpu.halted {
                stop = Some(StopReason::Halted);
                break;
            }
        }

        std::thread::sleep(sleep);
        stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cabinet::Cabinet;

    #[test]
    fn first_call_only_primes_the_clock_and_runs_nothing() {
        let mut governor = Governor::new();
        let mut cpu = Cpu::new();
        let mut memory = Memory::new();
        let mut io = IoRequest::new();
        let mut cabinet = Cabinet::new();
        memory.write(0x2000, 0x00); // NOP, so an accidental step is cheap.
        cpu.pc = 0x2000;

        governor.run(&mut cpu, &mut memory, &mut io, &mut cabinet, Duration::from_micros(0));
        assert_eq!(cpu.pc, 0x2000);
    }

    #[test]
    fn ordering_is_vector_one_then_vector_two() {
        let mut governor = Governor::new();
        assert_eq!(governor.pending_vector, 1);
        governor.frame_cycles = CYCLES_PER_HALF_FRAME;

        let mut cpu = Cpu::new();
        let mut memory = Memory::new();
        cpu.sp = 0x2400;
        cpu.interrupts_enabled = true;
        interrupt::request(&mut cpu, &mut memory, governor.pending_vector);
        assert_eq!(cpu.pc, 0x0008); // RST 1

        governor.pending_vector = 2;
        cpu.interrupts_enabled = true;
        interrupt::request(&mut cpu, &mut memory, governor.pending_vector);
        assert_eq!(cpu.pc, 0x0010); // RST 2
    }

    #[test]
    fn halt_stops_the_slice() {
        let mut governor = Governor::new();
        let mut cpu = Cpu::new();
        let mut memory = Memory::new();
        let mut io = IoRequest::new();
        let mut cabinet = Cabinet::new();
        memory.write(0x2000, 0x76); // HLT
        cpu.pc = 0x2000;

        // Prime the clock on a first call (runs nothing), then sleep past
        // the cycle budget boundary so the second call actually steps.
        governor.run(&mut cpu, &mut memory, &mut io, &mut cabinet, Duration::from_micros(0));
        std::thread::sleep(Duration::from_micros(50));
        let stop = governor.run(&mut cpu, &mut memory, &mut io, &mut cabinet, Duration::from_micros(0));
        assert_eq!(stop, Some(StopReason::Halted));
        assert!(cpu.halted);
    }
}
