//! Input validation and text sanitization.
//!
//! Values arriving from the UI or from persisted storage are untyped, so every
//! function here accepts anything with a string form and coerces it first. A
//! number like `5.5_f64`, a string like `"5.5"` and a JSON number all validate
//! the same way.

use std::fmt::Display;
use std::str::FromStr;

use askama::filters::{Escaper, Html};
use rust_decimal::Decimal;

use crate::types::{Price, Quantity};

/// Entities produced by askama's HTML escaper. An `&` that already starts one
/// of these is left alone, which keeps sanitization idempotent.
const ESCAPED_ENTITIES: [&str; 5] = ["&#34;", "&#38;", "&#39;", "&#60;", "&#62;"];

/// Errors that can occur when validating user or persisted input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input was empty.
    #[error("a value is required")]
    Missing,
    /// The input could not be parsed as a decimal number.
    #[error("'{0}' is not a number")]
    NotANumber(String),
    /// The input parsed as a number but has a fractional part.
    #[error("{0} is not a whole number")]
    NotAnInteger(Decimal),
    /// The input is outside the accepted range.
    #[error("{value} is outside the allowed range {}", format_range(.min, .max))]
    OutOfRange {
        /// The parsed value.
        value: Decimal,
        /// Inclusive lower bound.
        min: Decimal,
        /// Inclusive upper bound, `None` when unbounded.
        max: Option<Decimal>,
    },
}

fn format_range(min: &Decimal, max: &Option<Decimal>) -> String {
    match max {
        Some(max) => format!("[{min}, {max}]"),
        None => format!("[{min}, ∞)"),
    }
}

/// Parse a value as a decimal and check it against `[min, max]`.
///
/// `max = None` means no upper bound. Plain (`"12.50"`) and scientific
/// (`"1.2e3"`) notation are accepted.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] for blank input,
/// [`ValidationError::NotANumber`] when parsing fails and
/// [`ValidationError::OutOfRange`] when the value is outside the range.
///
/// # Examples
///
/// ```
/// use parfum_core::validate_number;
/// use rust_decimal::Decimal;
///
/// assert!(validate_number("12.50", Decimal::ZERO, None).is_ok());
/// assert!(validate_number("-1", Decimal::ZERO, None).is_err());
/// assert!(validate_number("abc", Decimal::ZERO, None).is_err());
/// ```
pub fn validate_number(
    value: impl Display,
    min: Decimal,
    max: Option<Decimal>,
) -> Result<Decimal, ValidationError> {
    let number = parse_decimal(&value.to_string())?;
    let above_max = max.is_some_and(|max| number > max);
    if number < min || above_max {
        return Err(ValidationError::OutOfRange {
            value: number,
            min,
            max,
        });
    }
    Ok(number)
}

/// Parse a value as a whole number and check it against `[min, max]`.
///
/// # Errors
///
/// Returns [`ValidationError::NotAnInteger`] for values with a fractional
/// part, otherwise the same errors as [`validate_number`].
///
/// # Examples
///
/// ```
/// use parfum_core::validate_integer;
///
/// assert_eq!(validate_integer(5, 1, 99), Ok(5));
/// assert!(validate_integer(0, 1, 99).is_err());
/// assert!(validate_integer(100, 1, 99).is_err());
/// assert!(validate_integer(5.5, 1, 99).is_err());
/// ```
pub fn validate_integer(value: impl Display, min: i64, max: i64) -> Result<i64, ValidationError> {
    let number = parse_decimal(&value.to_string())?;
    if !number.fract().is_zero() {
        return Err(ValidationError::NotAnInteger(number));
    }

    let out_of_range = || ValidationError::OutOfRange {
        value: number,
        min: Decimal::from(min),
        max: Some(Decimal::from(max)),
    };
    let integer = i64::try_from(number).map_err(|_| out_of_range())?;
    if !(min..=max).contains(&integer) {
        return Err(out_of_range());
    }
    Ok(integer)
}

/// Validate a unit price: a non-negative decimal below `10^13`, rounded to
/// 15 significant digits.
///
/// # Errors
///
/// Returns an error if the value is blank, not a number, negative or too
/// large.
pub fn validate_price(value: impl Display) -> Result<Price, ValidationError> {
    validate_number(value, Decimal::ZERO, None).and_then(Price::new)
}

/// Validate a line quantity (a whole number in `[1, 99]`).
///
/// # Errors
///
/// Returns an error if the value is blank, not a whole number, or out of range.
pub fn validate_quantity(value: impl Display) -> Result<Quantity, ValidationError> {
    let quantity = validate_integer(
        value,
        i64::from(Quantity::MIN),
        i64::from(Quantity::MAX),
    )?;
    // The range check above guarantees the value fits.
    Quantity::new(u32::try_from(quantity).unwrap_or(Quantity::MIN))
}

/// Escape markup-significant characters so the text displays literally.
///
/// Escaping is askama's HTML escaper, the same one templates apply to
/// ordinary fields: `"`, `&`, `'`, `<` and `>` become `&#34;`, `&#38;`,
/// `&#39;`, `&#60;` and `&#62;`. Those five entities are kept as they are when
/// they already appear in the input, so
/// `sanitize_text(sanitize_text(x)) == sanitize_text(x)`.
///
/// The flip side is that text typed literally as one of the five entities,
/// such as `&#60;`, is stored unchanged and later displays as the character
/// it names. Every other `&`, including named entities like `&lt;`, is
/// escaped.
///
/// # Examples
///
/// ```
/// use parfum_core::sanitize_text;
///
/// assert_eq!(sanitize_text("<b>Oud & Rose</b>"), "&#60;b&#62;Oud &#38; Rose&#60;/b&#62;");
/// assert_eq!(sanitize_text(42), "42");
/// ```
pub fn sanitize_text(value: impl Display) -> String {
    let text = value.to_string();
    let mut sanitized = String::with_capacity(text.len());
    let mut rest = text.as_str();

    while let Some(start) = rest.find('&') {
        let (plain, tail) = rest.split_at(start);
        escape_html(&mut sanitized, plain);
        let kept = ESCAPED_ENTITIES
            .iter()
            .find(|entity| tail.starts_with(**entity));
        let consumed = match kept {
            Some(entity) => {
                sanitized.push_str(entity);
                entity.len()
            }
            None => {
                escape_html(&mut sanitized, "&");
                1
            }
        };
        rest = tail.get(consumed..).unwrap_or_default();
    }
    escape_html(&mut sanitized, rest);

    sanitized
}

fn escape_html(out: &mut String, text: &str) {
    // Writing into a String cannot fail.
    let _ = Html.write_escaped_str(&mut *out, text);
}

/// Whether the text is already in sanitized form.
#[must_use]
pub fn is_sanitized(text: &str) -> bool {
    sanitize_text(text) == text
}

fn parse_decimal(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::NotANumber(trimmed.to_owned()))
}
