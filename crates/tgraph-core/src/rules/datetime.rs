use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::rule::{Mutation, RuleContext, ValidationRule, Verdict};

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[A-Z]?$").expect("valid date regex"));

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?[A-Z]?$")
        .expect("valid date-time regex")
});

static DATE_TIME_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?[A-Z]?([+|-][0-9]{2}:[0-9]{2})?$")
        .expect("valid date-time offset regex")
});

/// XML Schema style date-times: `2016-03-16`, `2016-03-16T20:12:00Z`, or
/// `2016-03-16T20:12:00.5-05:00`. An empty value leaves the time unset and
/// passes.
pub struct DateTimeFormat;

impl DateTimeFormat {
    pub fn is_valid(value: &str) -> bool {
        value.is_empty()
            || DATE.is_match(value) || DATE_TIME.is_match(value) || DATE_TIME_OFFSET.is_match(value)
    }
}

impl ValidationRule for DateTimeFormat {
    fn name(&self) -> &str {
        "date-time-format"
    }

    fn check(&self, _ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        match mutation.value() {
            Some(value) if !Self::is_valid(value.lexical()) => Err(ValidationError::InvalidDateTimeFormat {
                value: value.lexical().to_string(),
            }),
            _ => Ok(Verdict::Pass),
        }
    }
}
