use colored::*;
use std::io::Write;

/// Non-fatal warning on the error channel. The scan keeps going.
pub fn warn(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

/// Progress indicator capability. The report pipeline drives whichever
/// implementation it is handed; `NoProgress` keeps quiet runs allocation-free.
pub trait Progress {
    fn start(&mut self, total: usize);
    fn advance(&mut self, n: usize);
    fn finish(&mut self);
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _total: usize) {}
    fn advance(&mut self, _n: usize) {}
    fn finish(&mut self) {}
}

/// Carriage-return counter on stderr, so it never pollutes captured stdout.
pub struct ConsoleProgress {
    label: &'static str,
    total: usize,
    done: usize,
}

impl ConsoleProgress {
    pub fn new(label: &'static str) -> Self {
        ConsoleProgress {
            label,
            total: 0,
            done: 0,
        }
    }

    fn draw(&self) {
        let mut err = std::io::stderr();
        let _ = write!(err, "\r{}: {}/{} files", self.label, self.done, self.total);
        let _ = err.flush();
    }
}

impl Progress for ConsoleProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.draw();
    }

    fn advance(&mut self, n: usize) {
        self.done += n;
        self.draw();
    }

    fn finish(&mut self) {
        eprintln!();
    }
}
