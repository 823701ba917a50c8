use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::EuiDialect;

lazy_static! {
    // (shape, bits per group); the alternations keep one separator per address.
    static ref EUI48_SHAPES: Vec<(Regex, u32)> = vec![
        (shape(r"[0-9a-f]{1,2}(?::[0-9a-f]{1,2}){5}|[0-9a-f]{1,2}(?:-[0-9a-f]{1,2}){5}"), 8),
        (
            shape(r"[0-9a-f]{1,4}(?:\.[0-9a-f]{1,4}){2}|[0-9a-f]{1,4}(?::[0-9a-f]{1,4}){2}|[0-9a-f]{1,4}(?:-[0-9a-f]{1,4}){2}"),
            16,
        ),
        (shape(r"[0-9a-f]{1,6}:[0-9a-f]{1,6}|[0-9a-f]{1,6}-[0-9a-f]{1,6}"), 24),
        (shape(r"[0-9a-f]{11,12}"), 48),
    ];
    static ref EUI64_SHAPES: Vec<(Regex, u32)> = vec![
        (shape(r"[0-9a-f]{1,2}(?::[0-9a-f]{1,2}){7}|[0-9a-f]{1,2}(?:-[0-9a-f]{1,2}){7}"), 8),
        (
            shape(r"[0-9a-f]{1,4}(?:\.[0-9a-f]{1,4}){3}|[0-9a-f]{1,4}(?::[0-9a-f]{1,4}){3}|[0-9a-f]{1,4}(?:-[0-9a-f]{1,4}){3}"),
            16,
        ),
        (shape(r"[0-9a-f]{15,16}"), 64),
    ];
}

fn shape(body: &str) -> Regex {
    Regex::new(&format!("(?i)^(?:{})$", body)).expect("static regex")
}

/// Parses any supported text dialect of `family` (EUI-48 or EUI-64).
pub fn parse(family: Family, text: &str) -> Result<u128> {
    let shapes: &[(Regex, u32)] = match family {
        Family::Eui48 => &EUI48_SHAPES,
        Family::Eui64 => &EUI64_SHAPES,
        other => return Err(AddrError::TypeMismatch(Family::Eui48, other)),
    };
    let bits = shapes
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, bits)| *bits)
        .ok_or_else(|| AddrError::format(family, text))?;

    text.split(|c: char| c == ':' || c == '-' || c == '.')
        .try_fold(0u128, |acc, group| {
            u128::from_str_radix(group, 16).map(|word| (acc << bits) | word)
        })
        .map_err(|_| AddrError::format(family, text))
}

pub fn format(family: Family, value: u128, dialect: &EuiDialect) -> Result<String> {
    let width = family.width();
    let size = dialect.word_size;
    if size == 0 || size > width || width % size != 0 {
        return Err(AddrError::Conversion(format!(
            "{}-bit words cannot express a {} address",
            size, family
        )));
    }
    let mask = if size == 128 { u128::MAX } else { (1u128 << size) - 1 };
    let digits = if dialect.zero_pad { (size / 4) as usize } else { 1 };
    let words: Vec<String> = (1..=width / size)
        .map(|i| {
            let word = (value >> (width - i * size)) & mask;
            if dialect.uppercase {
                format!("{:0digits$X}", word, digits = digits)
            } else {
                format!("{:0digits$x}", word, digits = digits)
            }
        })
        .collect();
    Ok(words.join(dialect.separator))
}
