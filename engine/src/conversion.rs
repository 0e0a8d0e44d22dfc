//! FILENAME: engine/src/conversion.rs
//! PURPOSE: Coerces text cells into typed values.
//! CONTEXT: Readers load every cell as text and call `convert` once. Each
//! column is tried against the converters in precedence order; the first one
//! that accepts every non-null cell rewrites the column. A column nothing
//! accepts stays as text.

use chrono::{NaiveDate, NaiveDateTime};

use crate::definition::{ConvertOptions, NumberDefault};
use crate::logging::log_debug;
use crate::table::Table;
use crate::value::{CellKind, Value};

/// Date layouts tried in order.
const DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y",
];

/// Target of a single-column conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Converter {
    Int,
    Float,
    Bool,
    Date,
    Text,
}

impl Converter {
    /// Converts one non-null cell, or `None` if it does not parse.
    pub fn convert(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Converter::Text, Value::Text(_)) => Some(value.clone()),
            (Converter::Text, other) => Some(Value::Text(other.to_string())),
            (_, Value::Text(s)) => self.parse(s.trim()),
            (Converter::Int, Value::Int(_)) => Some(value.clone()),
            (Converter::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (Converter::Float, Value::Float(_)) => Some(value.clone()),
            (Converter::Bool, Value::Bool(_)) => Some(value.clone()),
            (Converter::Date, Value::Date(_)) => Some(value.clone()),
            _ => None,
        }
    }

    fn parse(&self, text: &str) -> Option<Value> {
        match self {
            Converter::Int => text.parse::<i64>().ok().map(Value::Int),
            Converter::Float => text.parse::<f64>().ok().map(Value::Float),
            Converter::Bool => parse_bool(text).map(Value::Bool),
            Converter::Date => parse_date(text).map(Value::Date),
            Converter::Text => Some(Value::from(text)),
        }
    }

    fn precedence(number_default: NumberDefault) -> [Converter; 4] {
        match number_default {
            NumberDefault::Int => [
                Converter::Int,
                Converter::Float,
                Converter::Bool,
                Converter::Date,
            ],
            NumberDefault::Float => [
                Converter::Float,
                Converter::Int,
                Converter::Bool,
                Converter::Date,
            ],
        }
    }

    /// Converter producing values of `kind`.
    pub fn for_kind(kind: CellKind, number_default: NumberDefault) -> Converter {
        match kind {
            CellKind::Number => match number_default {
                NumberDefault::Int => Converter::Int,
                NumberDefault::Float => Converter::Float,
            },
            CellKind::Boolean => Converter::Bool,
            CellKind::Date => Converter::Date,
            CellKind::Text | CellKind::Null => Converter::Text,
        }
    }
}

pub fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
    })
}

fn is_na(value: &Value, options: &ConvertOptions) -> bool {
    match (&options.na, value) {
        (Some(na), Value::Text(s)) => s == na,
        _ => false,
    }
}

/// Converts every cell of `column`, or `None` if any non-null cell is
/// rejected. NA markers become null first.
fn convert_column(
    column: &[Value],
    converter: Converter,
    options: &ConvertOptions,
) -> Option<Vec<Value>> {
    column
        .iter()
        .map(|value| {
            if value.is_null() || is_na(value, options) {
                Some(Value::Null)
            } else {
                converter.convert(value)
            }
        })
        .collect()
}

/// Infers and applies a converter for every column, in place.
pub fn convert(table: &mut Table, options: &ConvertOptions) {
    for col in 0..table.size() {
        let column = &table.data.columns()[col];
        let converted = Converter::precedence(options.number_default)
            .into_iter()
            .find_map(|converter| {
                convert_column(column, converter, options).map(|values| (converter, values))
            });

        match converted {
            Some((converter, values)) => {
                log_debug!("CONVERT", "column {} -> {:?}", col, converter);
                table.replace_column(col, values);
            }
            None => {
                // Still strip NA markers from text columns.
                if let Some(values) = convert_column(column, Converter::Text, options) {
                    table.replace_column(col, values);
                }
            }
        }
    }
}

/// Forces the columns at `targets` to the given converters. Cells that do not
/// parse become null.
pub fn convert_columns(table: &mut Table, targets: &[(usize, Converter)], options: &ConvertOptions) {
    for &(col, converter) in targets {
        let values: Vec<Value> = table.data.columns()[col]
            .iter()
            .map(|value| {
                if value.is_null() || is_na(value, options) {
                    Value::Null
                } else {
                    converter.convert(value).unwrap_or_default()
                }
            })
            .collect();
        log_debug!("CONVERT", "column {} forced to {:?}", col, converter);
        table.replace_column(col, values);
    }
}
