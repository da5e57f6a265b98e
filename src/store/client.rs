use crate::config::Id;
use crate::simulation::{add_time, Time};
use crate::store::product::Product;
use failure::Error;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Client {
    pub code: Id,
    pub cart: Vec<Rc<Product>>,
    pub arrival_time: Time,
    pub remaining_duration: Time,
}

impl Client {
    /// Remaining duration starts as the sum of the cart's processing durations
    pub fn new(code: Id, cart: Vec<Rc<Product>>, arrival_time: Time) -> Result<Client, Error> {
        let mut remaining_duration = 0;

        for product in cart.iter() {
            remaining_duration = add_time(
                remaining_duration,
                product.processing_duration,
                "cart processing duration",
            )?;
        }

        Ok(Client {
            code,
            cart,
            arrival_time,
            remaining_duration,
        })
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.iter().map(|product| product.price).sum()
    }
}
