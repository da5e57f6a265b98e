use crate::config::Id;
use crate::simulation::Time;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum LogEntry {
    CounterOpened {
        time: Time,
        counter: Id,
    },
    ClientAssigned {
        time: Time,
        client: Id,
        counter: Id,
        duration: Time,
    },
    ClientFinished {
        time: Time,
        client: Id,
        wait: Time,
        payment: f64,
    },
    AllAssigned,
    AllProcessed,
    TotalSales {
        amount: f64,
    },
}

/// Two decimal digits, ties rounded away from zero on the shortest decimal
/// form of `amount` (`0.125` gives `0.13`)
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let shortest = amount.abs().to_string();
    let (whole, fraction) = match shortest.find('.') {
        Some(dot) => (&shortest[..dot], &shortest[dot + 1..]),
        None => (shortest.as_str(), ""),
    };

    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|digit| digit - b'0')
        .collect();

    if fraction.as_bytes().get(2).map_or(false, |digit| *digit >= b'5') {
        let mut carry = true;

        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }

        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - 2;
    let render = |digits: &[u8]| -> String {
        digits.iter().map(|digit| char::from(b'0' + digit)).collect()
    };

    let sign = if amount < 0.0 && digits.iter().any(|digit| *digit != 0) {
        "-"
    } else {
        ""
    };

    format!("{}{}.{}", sign, render(&digits[..split]), render(&digits[split..]))
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogEntry::CounterOpened { time, counter } => {
                write!(f, "[TS {}] Counter {} open.", time, counter)
            }
            LogEntry::ClientAssigned {
                time,
                client,
                counter,
                duration,
            } => write!(
                f,
                "[TS {}] Client {} assigned to counter {}, processing will take {}.",
                time, client, counter, duration
            ),
            LogEntry::ClientFinished {
                time,
                client,
                wait,
                payment,
            } => write!(
                f,
                "[TS {}] Client {} has finished processing. Total wait time: {}. Payment: {}€.",
                time,
                client,
                wait,
                format_money(*payment)
            ),
            LogEntry::AllAssigned => write!(f, "All clients have been assigned to a counter!"),
            LogEntry::AllProcessed => write!(f, "All clients have been processed!"),
            LogEntry::TotalSales { amount } => {
                write!(f, "Total sales: {}€.", format_money(*amount))
            }
        }
    }
}

impl LogEntry {
    /// Console rendering, colored by kind. Identical text to `Display` when
    /// coloring is switched off through `colored::control`.
    pub fn colored(&self) -> ColoredString {
        let line = self.to_string();

        match self {
            LogEntry::CounterOpened { .. } => line.green(),
            LogEntry::ClientAssigned { .. } => line.cyan(),
            LogEntry::ClientFinished { .. } => line.normal(),
            LogEntry::AllAssigned | LogEntry::AllProcessed => line.yellow(),
            LogEntry::TotalSales { .. } => line.bold(),
        }
    }
}

/// Append-only activity trail shared by the store and all of its counters
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> ActivityLog {
        ActivityLog {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries appended after the log had `mark` entries
    pub fn since(&self, mark: usize) -> &[LogEntry] {
        &self.entries[mark.min(self.entries.len())..]
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}
