//! Conversions between caller values and stored text
//!
//! Every partition stores text. Booleans and numbers are rendered to their
//! natural string form on the way in and parsed back on the way out.

/// A value that can be written through `store`/`store2`
///
/// `None` means "no value" and turns the write into a removal.
pub trait StorableValue {
    fn into_stored_text(self) -> Option<String>;
}

impl StorableValue for &str {
    fn into_stored_text(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl StorableValue for String {
    fn into_stored_text(self) -> Option<String> {
        Some(self)
    }
}

impl StorableValue for &String {
    fn into_stored_text(self) -> Option<String> {
        Some(self.clone())
    }
}

impl StorableValue for bool {
    fn into_stored_text(self) -> Option<String> {
        Some(self.to_string())
    }
}

macro_rules! storable_via_display {
    ($($ty:ty),+) => {
        $(
            impl StorableValue for $ty {
                fn into_stored_text(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )+
    };
}

// f64 Display already prints integral values without a fraction ("14")
storable_via_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: StorableValue> StorableValue for Option<T> {
    fn into_stored_text(self) -> Option<String> {
        self.and_then(StorableValue::into_stored_text)
    }
}

/// Only the exact text "true" reads as true
pub(crate) fn parse_bool(text: &str) -> bool {
    text == "true"
}

/// Parse the leading base-10 integer of `text`
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit ("14px" is 14, "3.9" is 3). Text without leading digits yields
/// NaN instead of an error.
pub(crate) fn parse_leading_int(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };

    let digit_count = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digit_count == 0 {
        return f64::NAN;
    }

    rest[..digit_count]
        .parse::<f64>()
        .map(|magnitude| sign * magnitude)
        .unwrap_or(f64::NAN)
}
