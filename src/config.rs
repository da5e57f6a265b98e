use crate::simulation::Time;
use failure::{Error, Fail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub type Id = u32;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProductConfig {
    pub code: String,
    pub price: f64,
    pub processing_duration: Time, // Ticks a counter spends on one unit of this product
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    pub counters: u32, // Counters open at time 0
    pub products: Vec<ProductConfig>,
}

#[derive(Debug, Fail)]
#[fail(display = "{}:{}: {}", source, line, reason)]
pub struct ParseError {
    pub source: String,
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(source: &str, line: usize, reason: String) -> ParseError {
        ParseError {
            source: source.to_string(),
            line,
            reason,
        }
    }
}

#[derive(Debug, Fail)]
#[fail(display = "validation failed because of \"{}\"", error)]
pub struct ValidationError {
    pub error: String,
}

/// Parses a single whitespace separated token, `what` names it in the error
pub fn parse_token<T: FromStr>(
    source: &str,
    line: usize,
    token: &str,
    what: &str,
) -> Result<T, Error> {
    token.parse::<T>().map_err(|_| {
        ParseError::new(source, line, format!("invalid {} \"{}\"", what, token)).into()
    })
}

/// Text form: `<counters> <products>` followed by one `<code> <price> <duration>`
/// line per product
pub fn parse_config(source: &str, text: &str) -> Result<StoreConfig, Error> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (number, header) = lines
        .next()
        .ok_or_else(|| ParseError::new(source, 1, "missing header line".to_string()))?;

    let header: Vec<&str> = header.split_whitespace().collect();

    if header.len() != 2 {
        return Err(ParseError::new(
            source,
            number,
            format!("expected \"<counters> <products>\", found {} tokens", header.len()),
        )
        .into());
    }

    let counters: u32 = parse_token(source, number, header[0], "counter count")?;
    let product_count: usize = parse_token(source, number, header[1], "product count")?;

    let mut products = Vec::with_capacity(product_count);

    for index in 0..product_count {
        let (number, line) = lines.next().ok_or_else(|| {
            ParseError::new(
                source,
                number,
                format!("expected {} products, found {}", product_count, index),
            )
        })?;

        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() != 3 {
            return Err(ParseError::new(
                source,
                number,
                format!("expected \"<code> <price> <duration>\", found {} tokens", tokens.len()),
            )
            .into());
        }

        products.push(ProductConfig {
            code: tokens[0].to_string(),
            price: parse_token(source, number, tokens[1], "price")?,
            processing_duration: parse_token(source, number, tokens[2], "processing duration")?,
        });
    }

    Ok(StoreConfig { counters, products })
}

pub fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |extension| extension == "json")
}

pub fn get_config(path: &Path) -> Result<StoreConfig, Error> {
    let config = if is_json(path) {
        let file = File::open(path)?;

        serde_json::from_reader(file)?
    } else {
        let text = std::fs::read_to_string(path)?;

        parse_config(&path.display().to_string(), &text)?
    };

    Ok(config)
}

pub fn validate_config(config: &StoreConfig) -> Result<(), Error> {
    if config.counters == 0 {
        return Err(ValidationError {
            error: "There has to be at least one counter".to_string(),
        }
        .into());
    }

    let mut s = HashSet::new();

    for product in config.products.iter() {
        if !s.insert(product.code.as_str()) {
            return Err(ValidationError {
                error: format!("There is product code \"{}\" collision", product.code),
            }
            .into());
        }

        if !product.price.is_finite() || product.price < 0.0 {
            return Err(ValidationError {
                error: format!("There is product \"{}\" with invalid price", product.code),
            }
            .into());
        }
    }

    Ok(())
}
