use crate::config::StoreConfig;
use crate::log::{ActivityLog, LogEntry};
use crate::simulation::event::Event;
use crate::store::{Report, Store};
use failure::{Error, Fail};
use serde::Serialize;
use std::collections::VecDeque;

pub mod event;

pub type Time = u32;

#[derive(Debug, Fail)]
#[fail(display = "{} does not fit into a tick count", what)]
pub struct OverflowError {
    pub what: String,
}

/// `a + b`, failing with an `OverflowError` naming `what`
pub fn add_time(a: Time, b: Time, what: &str) -> Result<Time, Error> {
    a.checked_add(b).ok_or_else(|| {
        OverflowError {
            what: what.to_string(),
        }
        .into()
    })
}

/// 1. Simulation when
///     * `Setup`
///         * Counters from the config are open, nothing has been fed yet
///         * First `tick` moves to `Assigning`
///     * `Assigning`
///         * Every `tick` feeds the next event to the store, in input order
///         * When no event is left, logs that every client was assigned and moves
///           to `Draining`
///     * `Draining`
///         * Every `tick` finishes one front client
///         * When every counter is empty, logs the processed and total sales lines
///           and moves to `Done`
///     * `Done`
///         * Terminal, `tick` does nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Phase {
    Setup,
    Assigning,
    Draining,
    Done,
}

#[derive(Debug, Fail)]
#[fail(display = "cannot accept events while {:?}", phase)]
pub struct SimulationError {
    phase: Phase,
}

#[derive(Debug)]
pub struct Simulation {
    phase: Phase,
    store: Store,
    events: VecDeque<Event>,
    log: ActivityLog,
}

impl Simulation {
    pub fn new(config: StoreConfig, events: Vec<Event>) -> Simulation {
        let mut log = ActivityLog::new();
        let store = Store::new(config, &mut log);

        Simulation {
            phase: Phase::Setup,
            store,
            events: VecDeque::from(events),
            log,
        }
    }

    /// Queues an event behind the ones not yet fed to the store
    pub fn push_event(&mut self, event: Event) -> Result<(), Error> {
        match self.phase {
            Phase::Setup | Phase::Assigning => {
                self.events.push_back(event);

                Ok(())
            }
            phase => Err(SimulationError { phase }.into()),
        }
    }

    fn handle(&mut self, event: Event) -> Result<(), Error> {
        match event {
            Event::Client {
                time,
                code,
                products,
            } => {
                let client = self.store.create_client(code, time, &products)?;

                self.store.assign(client, &mut self.log)?;
            }
            Event::Counter { time } => {
                self.store.open_counter(time, &mut self.log);
            }
        }

        Ok(())
    }

    /// Performs one step and returns the log entries it produced
    pub fn tick(&mut self) -> Result<Vec<LogEntry>, Error> {
        let mark = self.log.len();

        match self.phase {
            Phase::Setup => {
                self.phase = Phase::Assigning;

                return self.tick();
            }
            Phase::Assigning => match self.events.pop_front() {
                Some(event) => self.handle(event)?,
                None => {
                    self.log.append(LogEntry::AllAssigned);
                    self.phase = Phase::Draining;
                }
            },
            Phase::Draining => {
                if !self.store.drain_step(&mut self.log)? {
                    self.log.append(LogEntry::AllProcessed);
                    self.log.append(LogEntry::TotalSales {
                        amount: self.store.total_sales(),
                    });
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => {}
        }

        Ok(self.log.since(mark).to_vec())
    }

    pub fn has_work(&self) -> bool {
        self.phase != Phase::Done
    }

    pub fn run(&mut self) -> Result<&ActivityLog, Error> {
        while self.has_work() {
            self.tick()?;
        }

        Ok(&self.log)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn report(&self) -> Report {
        self.store.report()
    }
}
