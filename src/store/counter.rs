use crate::config::Id;
use crate::log::{ActivityLog, LogEntry};
use crate::simulation::{add_time, Time};
use crate::store::client::Client;
use failure::Error;
use serde::Serialize;
use std::collections::vec_deque::VecDeque;

/// 1. Counter keeps its own clock and a FIFO of assigned clients
///     * `enqueue` puts the client at the tail and adds its duration to `queued_duration`
///     * `advance_by_duration(d)` moves the clock by `d` and spends `d` on the queue
///         * If the front client needs `<= d` it is finished and the rest of `d` goes on
///         * Else the front client is shortened by `d` and the budget is exhausted
///     * `advance_until_time(t)` is `advance_by_duration(t - current_time)`,
///       a no-op for `t` in the past
///     * `queued_duration` always equals the sum of remaining durations in the queue
///     * `current_time + queued_duration` always fits into `Time`
#[derive(Debug)]
pub struct Counter {
    id: Id,
    current_time: Time,
    sales_amount: f64,
    queued_duration: Time,
    clients_served: u32,
    processed_duration: Time,
    queue: VecDeque<Client>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterReport {
    pub id: Id,
    pub current_time: Time,
    pub sales_amount: f64,
    pub clients_served: u32,
    pub processed_duration: Time,
}

impl Counter {
    pub fn new(id: Id, current_time: Time, log: &mut ActivityLog) -> Counter {
        log.append(LogEntry::CounterOpened {
            time: current_time,
            counter: id,
        });

        Counter {
            id,
            current_time,
            sales_amount: 0.0,
            queued_duration: 0,
            clients_served: 0,
            processed_duration: 0,
            queue: VecDeque::new(),
        }
    }

    /// Fails when the counter would finish its queue past the last representable tick
    pub fn enqueue(&mut self, client: Client, log: &mut ActivityLog) -> Result<(), Error> {
        let queued_duration = add_time(
            self.queued_duration,
            client.remaining_duration,
            "queued processing duration",
        )?;
        add_time(self.current_time, queued_duration, "counter finish time")?;

        log.append(LogEntry::ClientAssigned {
            time: client.arrival_time,
            client: client.code,
            counter: self.id,
            duration: client.remaining_duration,
        });

        self.queued_duration = queued_duration;
        self.queue.push_back(client);

        Ok(())
    }

    /// Panics on an empty queue
    pub fn peek_front(&self) -> &Client {
        self.queue
            .front()
            .expect("peek_front called on a counter with an empty queue")
    }

    /// Finishes the front client at the counter's current time. Panics on an
    /// empty queue.
    pub fn pop_front(&mut self, log: &mut ActivityLog) {
        let client = self
            .queue
            .pop_front()
            .expect("pop_front called on a counter with an empty queue");

        let payment = client.cart_total();

        self.sales_amount += payment;
        self.queued_duration -= client.remaining_duration;
        self.processed_duration += client.remaining_duration;
        self.clients_served += 1;

        log.append(LogEntry::ClientFinished {
            time: self.current_time,
            client: client.code,
            wait: self.current_time.saturating_sub(client.arrival_time),
            payment,
        });
    }

    pub fn advance_by_duration(
        &mut self,
        duration: Time,
        log: &mut ActivityLog,
    ) -> Result<(), Error> {
        let mut budget = duration;

        self.current_time = add_time(self.current_time, duration, "counter time")?;

        while !self.queue.is_empty() && budget > 0 {
            let front = self.peek_front().remaining_duration;

            if front <= budget {
                budget -= front;
                self.pop_front(log);
            } else {
                if let Some(client) = self.queue.front_mut() {
                    client.remaining_duration -= budget;
                }

                self.queued_duration -= budget;
                self.processed_duration += budget;
                budget = 0;
            }
        }

        Ok(())
    }

    pub fn advance_until_time(&mut self, time: Time, log: &mut ActivityLog) -> Result<(), Error> {
        self.advance_by_duration(time.saturating_sub(self.current_time), log)
    }

    /// Advances by the front client's remaining duration, finishing it. A
    /// front client with nothing left is finished in place, advancing by zero
    /// does nothing.
    pub fn serve_front(&mut self, log: &mut ActivityLog) -> Result<(), Error> {
        let remaining = self.peek_front().remaining_duration;

        if remaining == 0 {
            self.pop_front(log);

            Ok(())
        } else {
            self.advance_by_duration(remaining, log)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn outstanding_load(&self) -> Time {
        if self.is_empty() {
            0
        } else {
            self.queued_duration
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn sales_amount(&self) -> f64 {
        self.sales_amount
    }

    pub fn clients_served(&self) -> u32 {
        self.clients_served
    }

    pub fn processed_duration(&self) -> Time {
        self.processed_duration
    }

    pub fn report(&self) -> CounterReport {
        CounterReport {
            id: self.id,
            current_time: self.current_time,
            sales_amount: self.sales_amount,
            clients_served: self.clients_served,
            processed_duration: self.processed_duration,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    fn queue_sum(&self) -> Time {
        self.queue.iter().map(|client| client.remaining_duration).sum()
    }
}
