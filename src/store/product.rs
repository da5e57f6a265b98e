use crate::config::ProductConfig;
use crate::simulation::Time;

pub type Code = String;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub code: Code,
    pub price: f64,
    pub processing_duration: Time,
}

impl Product {
    pub fn new(code: Code, price: f64, processing_duration: Time) -> Product {
        Product {
            code,
            price,
            processing_duration,
        }
    }
}

impl From<ProductConfig> for Product {
    fn from(config: ProductConfig) -> Product {
        Product::new(config.code, config.price, config.processing_duration)
    }
}
