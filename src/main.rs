// Copyright 2016 Walter Kuppens.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod bridge;
mod cabinet;
mod cpu;
mod debugger;
mod framebuffer;
mod governor;
mod io;
mod memory;

use std::env;
use std::io::Write;
use std::panic;
use std::time::Duration;

use getopts::Options;
use rustyline::error::ReadlineError;

use bridge::IoRequest;
use cabinet::Cabinet;
use cpu::Cpu;
use debugger::{Debugger, StepCommand};
use governor::{Governor, StopReason};
use io::errors::*;
use memory::Memory;

/// Flags set through command-line arguments, threaded through to
/// `io::log::log`.
#[derive(Clone)]
pub struct RuntimeOptions {
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Run,
    Step,
    Disassemble,
}

/// Prints the application name alongside the cargo version.
fn print_version() {
    println!("invaders8080 {}", env!("CARGO_PKG_VERSION"));
}

/// Prints usage information with an optional reason.
fn print_usage(opts: Options, reason: Option<&str>) {
    let mut stderr = std::io::stderr();
    if let Some(r) = reason {
        writeln!(stderr, "{}", r).unwrap();
    }
    writeln!(stderr, "invaders8080 emulates the Space Invaders arcade cabinet's 8080 hardware.").unwrap();
    writeln!(stderr, "").unwrap();
    writeln!(stderr, "{}", opts.usage("Usage: invaders8080 [OPTION]... [ROM-DIR]")).unwrap();
}

/// Runs until HLT, pacing the CPU at 2MHz and firing the alternating
/// half-frame interrupts. Dumps a final framebuffer PPM on a
/// clean HLT exit when verbose logging is on, since there is no GPU/SDL
/// front-end in this crate to have already shown it on screen.
fn run_mode(cpu: &mut Cpu, memory: &mut Memory, io: &mut IoRequest, cabinet: &mut Cabinet, runtime_options: &RuntimeOptions) -> StopReason {
    let mut governor = Governor::new();
    loop {
        if let Some(stop) = governor.run(cpu, memory, io, cabinet, Duration::from_millis(1)) {
            io::log::log("cpu", "HLT executed, shutting down", runtime_options);
            if runtime_options.verbose {
                let fb = framebuffer::Framebuffer::new(memory);
                if let Err(e) = fb.write_ppm_file("invaders8080.ppm") {
                    eprintln!("invaders8080: could not write framebuffer dump: {}", e);
                }
            }
            return stop;
        }
    }
}

/// Step mode: a synchronous prompt blocks between instructions. Blank line
/// steps once, a positive integer steps N times, `q` (or EOF/Ctrl-C) quits.
fn step_mode(cpu: &mut Cpu, memory: &mut Memory, io: &mut IoRequest, cabinet: &mut Cabinet) -> StopReason {
    let mut debugger = Debugger::new();
    println!("invaders8080 step mode: blank line = 1 step, N = N steps, q = quit");
    loop {
        match debugger.prompt() {
            Ok(StepCommand::Quit) => return StopReason::Quit,
            Ok(StepCommand::Step(n)) => {
                for _ in 0..n {
                    Debugger::single_step(cpu, memory, io, cabinet);
                    if cpu.halted {
                        return StopReason::Halted;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return StopReason::Quit,
            Err(e) => {
                eprintln!("invaders8080: {}", e);
                return StopReason::Quit;
            }
        }
    }
}

/// Initializes and starts the emulator. Returns an exit code after which the
/// program unwinds and stops executing.
fn init() -> i32 {
    let args: Vec<String> = env::args().collect();

    let mut opts = Options::new();
    opts.optflag("r", "run", "run mode (default): execute at 60Hz with interrupts");
    opts.optflag("s", "step", "step mode: pause between instructions");
    opts.optflag("d", "disassemble", "disassembly mode (not implemented)");
    opts.optflag("v", "verbose", "display CPU/cabinet state while running");
    opts.optflag("", "version", "print version information");
    opts.optflag("h", "help", "print this message");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            println!("{}", f.to_string());
            print_usage(opts, None);
            return EXIT_INVALID_ARG;
        }
    };

    if matches.opt_present("version") {
        print_version();
        return EXIT_SUCCESS;
    }
    if matches.opt_present("help") {
        print_usage(opts, None);
        return EXIT_SUCCESS;
    }

    let mode = if matches.opt_present("d") {
        Mode::Disassemble
    } else if matches.opt_present("s") {
        Mode::Step
    } else {
        Mode::Run
    };

    let rom_dir = if !matches.free.is_empty() {
        matches.free[0].clone()
    } else {
        print_usage(opts, Some("invaders8080: no rom folder passed, cannot start emulation"));
        return EXIT_INVALID_ARG;
    };

    // Disassembly mode is reported as unimplemented rather than silently
    // doing nothing.
    if mode == Mode::Disassemble {
        eprintln!("invaders8080: disassembly mode is not implemented");
        return EXIT_NOT_IMPLEMENTED;
    }

    let runtime_options = RuntimeOptions {
        verbose: matches.opt_present("verbose"),
    };

    let rom = match cabinet::load_rom_dir(&rom_dir) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("invaders8080: {}", e);
            return EXIT_INVALID_ROM;
        }
    };
    io::log::log("init", format!("loaded {} bytes of rom from {}", rom.len(), rom_dir), &runtime_options);

    let mut memory = Memory::new();
    memory.load_bytes(0, &rom);

    let mut cpu = Cpu::new();
    let mut cabinet = Cabinet::new();
    let mut io_request = IoRequest::new();

    // A ROM write is an unrecoverable hardware fault: the memory bus
    // panics, and this is the only place that fault is allowed to unwind to.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| match mode {
        Mode::Run => run_mode(&mut cpu, &mut memory, &mut io_request, &mut cabinet, &runtime_options),
        Mode::Step => step_mode(&mut cpu, &mut memory, &mut io_request, &mut cabinet),
        Mode::Disassemble => unreachable!("handled above"),
    }));

    match result {
        Ok(StopReason::Halted) => {
            println!("invaders8080: shutting down (HLT)");
            EXIT_SUCCESS
        }
        Ok(StopReason::Quit) => {
            println!("invaders8080: shutting down");
            EXIT_SUCCESS
        }
        Err(_) => {
            println!("{}", cpu);
            EXIT_RUNTIME_FAILURE
        }
    }
}

/// Entry point of the program and wrapper of init. Takes the exit code
/// returned from init and exits with it.
fn main() {
    let exit_code = init();
    std::process::exit(exit_code);
}
