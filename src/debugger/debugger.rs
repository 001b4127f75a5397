// Copyright 2016 Walter Kuppens.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step-mode REPL: blank line = 1 step, a positive integer N = N steps, `q`
//! = quit. A plain synchronous prompt: step mode's entire point is to block
//! until the human presses enter, so there is no need for a background
//! input thread here.

use rustyline::error::ReadlineError;
use rustyline::Editor;

use super::parser;
use crate::bridge::{IoRequest, PortIo};
use crate::cpu::Cpu;
use crate::memory::Memory;

/// What the human asked for at the step-mode prompt.
pub enum StepCommand {
    Step(u32),
    Quit,
}

pub struct Debugger {
    editor: Editor<()>,
}

impl Debugger {
    pub fn new() -> Self {
        Debugger {
            editor: Editor::<()>::new(),
        }
    }

    /// Blocks for one line of input and interprets it as a step-mode
    /// command.
    pub fn prompt(&mut self) -> Result<StepCommand, ReadlineError> {
        let line = self.editor.readline("(invaders8080) ")?;
        self.editor.add_history_entry(line.as_str());
        Ok(Self::interpret(&line))
    }

    /// Unparsable input is reported and returned as a no-op step so the
    /// caller just re-prompts.
    fn interpret(line: &str) -> StepCommand {
        let args = match parser::input_to_arguments(line.to_string()) {
            Ok(args) => args,
            Err(_) => return StepCommand::Step(0),
        };

        if args.is_empty() {
            return StepCommand::Step(1);
        }

        if args[0].eq_ignore_ascii_case("q") {
            return StepCommand::Quit;
        }

        match args[0].parse::<u32>() {
            Ok(n) if n > 0 => StepCommand::Step(n),
            _ => {
                eprintln!("invaders8080: expected a blank line, a positive integer, or 'q'");
                StepCommand::Step(0)
            }
        }
    }

    /// Executes exactly one CPU instruction and prints the resulting state,
    /// for use from the step-mode loop between prompts.
    pub fn single_step(cpu: &mut Cpu, memory: &mut Memory, io: &mut IoRequest, ports: &mut dyn PortIo) {
        cpu.step(memory, io, ports);
        println!("{}", cpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_a_single_step() {
        assert!(matches!(Debugger::interpret(""), StepCommand::Step(1)));
    }

    #[test]
    fn positive_integer_is_n_steps() {
        assert!(matches!(Debugger::interpret("42"), StepCommand::Step(42)));
    }

    #[test]
    fn q_quits() {
        assert!(matches!(Debugger::interpret("q"), StepCommand::Quit));
        assert!(matches!(Debugger::interpret("Q"), StepCommand::Quit));
    }

    #[test]
    fn garbage_is_a_no_op_step() {
        assert!(matches!(Debugger::interpret("banana"), StepCommand::Step(0)));
    }
}
