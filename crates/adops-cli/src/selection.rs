//! Command-line selection flags → filter and sort specs.

use std::fmt;

use adops_query::{FilterSpec, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub flag: &'static str,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    fn new(flag: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            flag,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{} `{}`: {}", self.flag, self.value, self.reason)
    }
}

impl std::error::Error for ParseError {}

fn split_assignment<'a>(flag: &'static str, raw: &'a str) -> Result<(&'a str, &'a str), ParseError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| ParseError::new(flag, raw, "expected field=value"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(ParseError::new(flag, raw, "field name is empty"));
    }
    Ok((field, value.trim()))
}

/// `field=v1,v2`: the field matches any listed value.
pub fn any_of(raw: &str) -> Result<FilterSpec, ParseError> {
    let (field, values) = split_assignment("filter", raw)?;
    Ok(FilterSpec::any_of(
        field,
        values.split(',').map(str::trim).filter(|v| !v.is_empty()),
    ))
}

/// `field=value`; `all` or an empty value clears the constraint.
pub fn equals(raw: &str) -> Result<FilterSpec, ParseError> {
    let (field, value) = split_assignment("equals", raw)?;
    Ok(FilterSpec::equals(field, Some(value)))
}

/// `field=START..END`, either bound may be left out.
pub fn date_range(raw: &str) -> Result<FilterSpec, ParseError> {
    let (field, range) = split_assignment("date-range", raw)?;
    let (start, end) = range
        .split_once("..")
        .ok_or_else(|| ParseError::new("date-range", raw, "expected START..END"))?;
    let bound = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    let (start, end) = (bound(start), bound(end));
    Ok(FilterSpec::date_range(field, start.as_deref(), end.as_deref()))
}

/// `field=true|false|any`.
pub fn toggle(raw: &str) -> Result<FilterSpec, ParseError> {
    let (field, value) = split_assignment("toggle", raw)?;
    let state = match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        "any" | "" => None,
        _ => return Err(ParseError::new("toggle", raw, "expected true, false or any")),
    };
    Ok(FilterSpec::toggle(field, state))
}

pub fn sort(raw: &str) -> Result<SortSpec, ParseError> {
    raw.parse::<SortSpec>()
        .map_err(|err| ParseError::new("sort", raw, err.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adops_query::{Selection, SortDirection};

    #[test]
    fn any_of_splits_and_trims_values() {
        let spec = any_of("status = Active, Paused ,").expect("spec");
        assert_eq!(spec.fields, vec!["status".to_string()]);
        match spec.selection {
            Selection::AnyOf { values } => {
                assert_eq!(values.into_iter().collect::<Vec<_>>(), vec!["Active", "Paused"]);
            }
            other => panic!("unexpected selection {other:?}"),
        }
    }

    #[test]
    fn open_ended_date_ranges_are_accepted() {
        let spec = date_range("start_date=2024-01-01..").expect("spec");
        assert_eq!(
            spec.selection,
            Selection::DateRange {
                start: Some("2024-01-01".to_string()),
                end: None
            }
        );
        assert!(date_range("start_date=2024-01-01").is_err());
    }

    #[test]
    fn malformed_flags_name_the_flag() {
        let err = toggle("urgent=maybe").expect_err("bad toggle");
        assert_eq!(err.flag, "toggle");
        assert!(equals("=x").is_err());
        assert_eq!(
            sort("budget:desc").expect("sort").direction,
            SortDirection::Desc
        );
        assert!(sort("budget:sideways").is_err());
    }
}
