use crate::config::{Id, StoreConfig};
use crate::log::ActivityLog;
use crate::simulation::Time;
use crate::store::client::Client;
use crate::store::counter::{Counter, CounterReport};
use crate::store::product::Product;
use failure::Error;
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

pub mod client;
pub mod counter;
pub mod product;

#[derive(Debug, Serialize)]
pub struct Report {
    pub counters: Vec<CounterReport>,
    pub total_sales: f64,
}

/// `Store` routes arriving clients to counters and drains them once no more
/// clients are coming.
///
/// Sales are booked twice: the store total grows when a client is created
/// (arrival), each counter's total grows when the client finishes.
#[derive(Debug)]
pub struct Store {
    counters: Vec<Counter>,
    catalog: HashMap<String, Rc<Product>>,
    total_sales: f64,
}

impl Store {
    /// Opens `config.counters` counters at time 0
    pub fn new(config: StoreConfig, log: &mut ActivityLog) -> Store {
        let catalog = config
            .products
            .into_iter()
            .map(|product| (product.code.clone(), Rc::new(Product::from(product))))
            .collect();

        let counters = (0..config.counters)
            .map(|id| Counter::new(id, 0, log))
            .collect();

        Store {
            counters,
            catalog,
            total_sales: 0.0,
        }
    }

    pub fn product(&self, code: &str) -> Option<&Rc<Product>> {
        self.catalog.get(code)
    }

    /// Builds a client out of the known product codes, unknown ones are
    /// dropped from the cart. The cart total is booked right away.
    pub fn create_client<S: AsRef<str>>(
        &mut self,
        code: Id,
        arrival_time: Time,
        products: &[S],
    ) -> Result<Client, Error> {
        let cart: Vec<Rc<Product>> = products
            .iter()
            .filter_map(|product| self.product(product.as_ref()).cloned())
            .collect();

        let client = Client::new(code, cart, arrival_time)?;

        self.total_sales += client.cart_total();

        Ok(client)
    }

    /// Catches every counter up to the arrival time and queues the client at
    /// the counter with the least outstanding load. Returns the chosen index.
    pub fn assign(&mut self, client: Client, log: &mut ActivityLog) -> Result<usize, Error> {
        for counter in self.counters.iter_mut() {
            counter.advance_until_time(client.arrival_time, log)?;
        }

        let index = self.least_loaded_counter();

        self.counters[index].enqueue(client, log)?;

        Ok(index)
    }

    pub fn open_counter(&mut self, time: Time, log: &mut ActivityLog) -> Id {
        let id = self.counters.len() as Id;

        self.counters.push(Counter::new(id, time, log));

        id
    }

    /// First counter with the smallest outstanding load
    fn least_loaded_counter(&self) -> usize {
        let mut min = 0;

        for (index, counter) in self.counters.iter().enumerate().skip(1) {
            if counter.outstanding_load() < self.counters[min].outstanding_load() {
                min = index;
            }
        }

        min
    }

    /// First non-empty counter whose front client has the least remaining
    /// duration, `None` when every counter is empty
    fn first_counter_to_finish_client(&self) -> Option<usize> {
        let mut min: Option<usize> = None;

        for (index, counter) in self.counters.iter().enumerate() {
            if counter.is_empty() {
                continue;
            }

            let remaining = counter.peek_front().remaining_duration;
            let current =
                min.map(|current| self.counters[current].peek_front().remaining_duration);

            match current {
                Some(current) if current <= remaining => {}
                _ => min = Some(index),
            }
        }

        min
    }

    /// Finishes one front client. Returns `false` when there was nothing left.
    pub fn drain_step(&mut self, log: &mut ActivityLog) -> Result<bool, Error> {
        match self.first_counter_to_finish_client() {
            Some(index) => {
                self.counters[index].serve_front(log)?;

                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.counters.iter().all(|counter| counter.is_empty())
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn total_sales(&self) -> f64 {
        self.total_sales
    }

    pub fn report(&self) -> Report {
        Report {
            counters: self.counters.iter().map(|counter| counter.report()).collect(),
            total_sales: self.total_sales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductConfig;

    fn product(code: &str, price: f64, processing_duration: Time) -> ProductConfig {
        ProductConfig {
            code: code.to_string(),
            price,
            processing_duration,
        }
    }

    fn store(counters: u32, log: &mut ActivityLog) -> Store {
        Store::new(
            StoreConfig {
                counters,
                products: vec![
                    product("P1", 10.0, 2),
                    product("P3", 1.0, 3),
                    product("P5", 2.5, 5),
                    product("FREE", 0.0, 0),
                ],
            },
            log,
        )
    }

    fn drain(store: &mut Store, log: &mut ActivityLog) {
        while store.drain_step(log).unwrap() {}
    }

    #[test]
    fn counters_open_at_zero() {
        let mut log = ActivityLog::new();
        let store = store(3, &mut log);

        assert_eq!(store.counters().len(), 3);
        assert_eq!(
            log.lines(),
            vec![
                "[TS 0] Counter 0 open.",
                "[TS 0] Counter 1 open.",
                "[TS 0] Counter 2 open.",
            ]
        );
        assert!(store.is_finished());
    }

    #[test]
    fn unknown_products_are_skipped() {
        let mut log = ActivityLog::new();
        let mut store = store(1, &mut log);

        let client = store.create_client(1, 0, &["P1", "NOPE", "P3"]).unwrap();

        assert!(store.product("NOPE").is_none());
        assert_eq!(store.product("P3").map(|p| p.price), Some(1.0));
        assert_eq!(client.cart.len(), 2);
        assert_eq!(client.remaining_duration, 5);
        assert_eq!(store.total_sales(), 11.0);
    }

    #[test]
    fn sales_are_booked_at_arrival() {
        let mut log = ActivityLog::new();
        let mut store = store(1, &mut log);

        let client = store.create_client(1, 0, &["P1"]).unwrap();
        store.assign(client, &mut log).unwrap();

        assert_eq!(store.total_sales(), 10.0);
        assert_eq!(store.counters()[0].sales_amount(), 0.0);

        drain(&mut store, &mut log);

        assert_eq!(store.total_sales(), 10.0);
        assert_eq!(store.counters()[0].sales_amount(), 10.0);
    }

    #[test]
    fn assigns_to_first_least_loaded_counter() {
        let mut log = ActivityLog::new();
        let mut store = store(3, &mut log);

        for (index, cart) in [vec!["P5"], vec!["P3"], vec!["P3"]].iter().enumerate() {
            let client = store.create_client(index as Id, 0, cart).unwrap();
            let counter = store.assign(client, &mut log).unwrap();

            assert_eq!(counter, index);
        }

        let loads: Vec<Time> = store.counters().iter().map(|c| c.outstanding_load()).collect();
        assert_eq!(loads, vec![5, 3, 3]);

        let client = store.create_client(9, 0, &["P1"]).unwrap();

        assert_eq!(store.assign(client, &mut log).unwrap(), 1);
    }

    #[test]
    fn counters_catch_up_before_routing() {
        let mut log = ActivityLog::new();
        let mut store = store(2, &mut log);

        let first = store.create_client(1, 0, &["P5"]).unwrap();
        let second = store.create_client(2, 0, &["P3"]).unwrap();
        store.assign(first, &mut log).unwrap();
        store.assign(second, &mut log).unwrap();

        // At 4 counter 0 has 1 tick left and counter 1 is done
        let third = store.create_client(3, 4, &["P1"]).unwrap();

        assert_eq!(store.assign(third, &mut log).unwrap(), 1);
        assert_eq!(store.counters()[0].outstanding_load(), 1);
        assert_eq!(store.counters()[0].current_time(), 4);
        assert_eq!(store.counters()[1].clients_served(), 1);
    }

    #[test]
    fn opened_counter_takes_next_client() {
        let mut log = ActivityLog::new();
        let mut store = store(1, &mut log);

        let first = store.create_client(1, 0, &["P1"]).unwrap();
        store.assign(first, &mut log).unwrap();

        assert_eq!(store.open_counter(1, &mut log), 1);
        assert_eq!(store.counters()[1].current_time(), 1);

        let second = store.create_client(2, 1, &["P1"]).unwrap();

        assert_eq!(store.assign(second, &mut log).unwrap(), 1);
        assert_eq!(store.counters()[0].outstanding_load(), 1);
        assert_eq!(
            log.lines()[2..].to_vec(),
            vec![
                "[TS 1] Counter 1 open.",
                "[TS 1] Client 2 assigned to counter 1, processing will take 2.",
            ]
        );
    }

    #[test]
    fn drain_picks_shortest_front_client() {
        let mut log = ActivityLog::new();
        let mut store = store(2, &mut log);

        let first = store.create_client(1, 0, &["P5"]).unwrap();
        let second = store.create_client(2, 0, &["P3"]).unwrap();
        store.assign(first, &mut log).unwrap();
        store.assign(second, &mut log).unwrap();

        assert!(store.drain_step(&mut log).unwrap());
        assert!(store.counters()[1].is_empty());
        assert!(!store.counters()[0].is_empty());

        assert!(store.drain_step(&mut log).unwrap());
        assert!(store.is_finished());
        assert!(!store.drain_step(&mut log).unwrap());

        let finished: Vec<String> = log.lines().into_iter().skip(4).collect();
        assert_eq!(
            finished,
            vec![
                "[TS 3] Client 2 has finished processing. Total wait time: 3. Payment: 1.00€.",
                "[TS 5] Client 1 has finished processing. Total wait time: 5. Payment: 2.50€.",
            ]
        );
    }

    #[test]
    fn drain_ties_go_to_lowest_index() {
        let mut log = ActivityLog::new();
        let mut store = store(2, &mut log);

        let first = store.create_client(1, 0, &["P3"]).unwrap();
        let second = store.create_client(2, 0, &["P3"]).unwrap();
        store.assign(first, &mut log).unwrap();
        store.assign(second, &mut log).unwrap();

        store.drain_step(&mut log).unwrap();

        assert!(store.counters()[0].is_empty());
        assert!(!store.counters()[1].is_empty());
    }

    #[test]
    fn zero_duration_client_drains() {
        let mut log = ActivityLog::new();
        let mut store = store(1, &mut log);

        let busy = store.create_client(1, 0, &["P3"]).unwrap();
        let free = store.create_client(2, 0, &["FREE", "NOPE"]).unwrap();
        assert_eq!(free.remaining_duration, 0);

        store.assign(busy, &mut log).unwrap();
        store.assign(free, &mut log).unwrap();

        drain(&mut store, &mut log);

        assert!(store.is_finished());
        assert_eq!(store.counters()[0].clients_served(), 2);
        assert_eq!(
            log.lines().last().unwrap(),
            "[TS 3] Client 2 has finished processing. Total wait time: 3. Payment: 0.00€."
        );
    }

    #[test]
    fn oversized_cart_is_not_booked() {
        let mut log = ActivityLog::new();
        let mut store = Store::new(
            StoreConfig {
                counters: 1,
                products: vec![product("BIG", 1.0, 3_000_000_000)],
            },
            &mut log,
        );

        assert!(store.create_client(1, 0, &["BIG", "BIG"]).is_err());
        assert_eq!(store.total_sales(), 0.0);
    }

    #[test]
    fn overloaded_counter_is_an_error() {
        let mut log = ActivityLog::new();
        let mut store = Store::new(
            StoreConfig {
                counters: 1,
                products: vec![product("BIG", 1.0, 3_000_000_000)],
            },
            &mut log,
        );

        let first = store.create_client(1, 0, &["BIG"]).unwrap();
        let second = store.create_client(2, 0, &["BIG"]).unwrap();

        store.assign(first, &mut log).unwrap();

        assert!(store.assign(second, &mut log).is_err());
        assert_eq!(store.counters()[0].outstanding_load(), 3_000_000_000);

        drain(&mut store, &mut log);

        assert!(store.is_finished());
    }

    #[test]
    fn served_duration_matches_enqueued_duration() {
        let mut log = ActivityLog::new();
        let mut store = store(2, &mut log);
        let mut enqueued = 0;

        let arrivals: Vec<(Time, Vec<&str>)> = vec![
            (0, vec!["P5", "P3"]),
            (1, vec!["P1"]),
            (2, vec!["FREE"]),
            (2, vec!["P5", "P5", "P1"]),
            (7, vec!["P3"]),
        ];

        for (code, (time, cart)) in arrivals.iter().enumerate() {
            let client = store.create_client(code as Id, *time, cart).unwrap();
            enqueued += client.remaining_duration;
            store.assign(client, &mut log).unwrap();

            for counter in store.counters() {
                assert!(counter.current_time() >= *time);
            }
        }

        store.open_counter(8, &mut log);
        drain(&mut store, &mut log);

        let processed: Time = store.counters().iter().map(|c| c.processed_duration()).sum();
        let served: u32 = store.counters().iter().map(|c| c.clients_served()).sum();
        let counter_sales: f64 = store.counters().iter().map(|c| c.sales_amount()).sum();

        assert_eq!(processed, enqueued);
        assert_eq!(served, 5);
        assert!((counter_sales - store.total_sales()).abs() < 1e-9);
    }
}
