use crate::config::{is_json, parse_token, Id, ParseError};
use crate::simulation::Time;
use failure::Error;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Event {
    Client {
        time: Time,
        code: Id,
        products: Vec<String>,
    },
    Counter {
        time: Time,
    },
}

/// `<time> CLIENT <code> <product>...` or `<time> COUNTER`, one per line
pub fn parse_event(source: &str, line: usize, text: &str) -> Result<Event, Error> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.len() < 2 {
        let reason = format!("expected an event, found \"{}\"", text);

        return Err(ParseError::new(source, line, reason).into());
    }

    let time: Time = parse_token(source, line, tokens[0], "time")?;

    match tokens[1] {
        "CLIENT" => {
            if tokens.len() < 4 {
                return Err(ParseError::new(
                    source,
                    line,
                    "expected \"<time> CLIENT <code> <product>...\"".to_string(),
                )
                .into());
            }

            Ok(Event::Client {
                time,
                code: parse_token(source, line, tokens[2], "client code")?,
                products: tokens[3..].iter().map(|code| code.to_string()).collect(),
            })
        }
        "COUNTER" => {
            if tokens.len() != 2 {
                let reason = "expected \"<time> COUNTER\"".to_string();

                return Err(ParseError::new(source, line, reason).into());
            }

            Ok(Event::Counter { time })
        }
        kind => Err(ParseError::new(source, line, format!("unknown event \"{}\"", kind)).into()),
    }
}

pub fn parse_events(source: &str, text: &str) -> Result<Vec<Event>, Error> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_event(source, index + 1, line))
        .collect()
}

pub fn get_events(path: &Path) -> Result<Vec<Event>, Error> {
    let events = if is_json(path) {
        let file = File::open(path)?;

        serde_json::from_reader(file)?
    } else {
        let text = std::fs::read_to_string(path)?;

        parse_events(&path.display().to_string(), &text)?
    };

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_kinds() {
        let events = parse_events("events.txt", "0 CLIENT 1 P1 P2\n\n1 COUNTER\n").unwrap();

        assert_eq!(
            events,
            vec![
                Event::Client {
                    time: 0,
                    code: 1,
                    products: vec!["P1".to_string(), "P2".to_string()],
                },
                Event::Counter { time: 1 },
            ]
        );
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_event("e", 1, "x CLIENT 1 P1").is_err());
        assert!(parse_event("e", 1, "0 CLIENT 1").is_err());
        assert!(parse_event("e", 1, "0 CLIENT one P1").is_err());
        assert!(parse_event("e", 1, "0 COUNTER 2").is_err());
        assert!(parse_event("e", 1, "0 REFUND 1").is_err());
        assert!(parse_event("e", 1, "0").is_err());
    }

    #[test]
    fn error_names_line() {
        let error = parse_events("events.txt", "0 CLIENT 1 P1\n3 SHELF\n").unwrap_err();

        assert_eq!(error.to_string(), "events.txt:2: unknown event \"SHELF\"");
    }

    #[test]
    fn parses_json_events() {
        let events: Vec<Event> = serde_json::from_str(
            r#"[{"Client": {"time": 0, "code": 1, "products": ["P1"]}}, {"Counter": {"time": 1}}]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1], Event::Counter { time: 1 });
    }
}
