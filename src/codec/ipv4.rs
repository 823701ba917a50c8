use lazy_static::lazy_static;
use regex::Captures;
use regex::Regex;

use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::ParseOptions;

lazy_static! {
    static ref DOTTED_QUAD: Regex = Regex::new(
        r"^(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$"
    )
    .expect("static regex");
}

/// Parses dotted-quad text. Without options this follows `inet_pton`: four
/// decimal octets, no leading zeros.
pub fn parse(text: &str, options: &ParseOptions) -> Result<u128> {
    if options.zerofill {
        let stripped = strip_zeros(text);
        return parse(&stripped, &options.zerofill(false));
    }
    if options.inet_aton {
        return parse_aton(text);
    }
    parse_strict(text)
}

fn parse_strict(text: &str) -> Result<u128> {
    fn octet(ind: usize, v: &Captures) -> Result<u128> {
        v.get(ind)
            .map(|r| r.as_str().parse::<u128>())
            .ok_or_else(|| AddrError::Format("missing octet".to_owned()))?
            .map_err(|e| AddrError::Format(e.to_string()))
    }

    match DOTTED_QUAD.captures(text) {
        Some(ref v) => Ok((octet(1, v)? << 24) | (octet(2, v)? << 16) | (octet(3, v)? << 8) | octet(4, v)?),
        None => Err(AddrError::format(Family::Ipv4, text)),
    }
}

fn strip_zeros(text: &str) -> String {
    text.split('.')
        .map(|part| {
            let trimmed = part.trim_start_matches('0');
            if trimmed.is_empty() && !part.is_empty() {
                "0"
            } else {
                trimmed
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Legacy `inet_aton` forms: one to four parts, each decimal, octal (`0` prefix)
/// or hex (`0x` prefix); the last part fills all remaining bytes.
fn parse_aton(text: &str) -> Result<u128> {
    let parts: Vec<&str> = text.split('.').collect();
    if text.is_empty() || parts.len() > 4 {
        return Err(AddrError::format(Family::Ipv4, text));
    }
    let mut value: u128 = 0;
    for (i, part) in parts.iter().enumerate() {
        let n = aton_part(part).ok_or_else(|| AddrError::format(Family::Ipv4, text))?;
        if i + 1 < parts.len() {
            if n > 0xff {
                return Err(AddrError::format(Family::Ipv4, text));
            }
            value |= n << (24 - 8 * i);
        } else {
            let room = 8 * (4 - i) as u32;
            if n >> room != 0 {
                return Err(AddrError::format(Family::Ipv4, text));
            }
            value |= n;
        }
    }
    Ok(value)
}

fn aton_part(part: &str) -> Option<u128> {
    let (digits, radix) = if let Some(hex) = part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")) {
        (hex, 16)
    } else if part.len() > 1 && part.starts_with('0') {
        (&part[1..], 8)
    } else {
        (part, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok().map(u128::from)
}

pub fn format(value: u128) -> String {
    format!(
        "{}.{}.{}.{}",
        (value >> 24) & 0xff,
        (value >> 16) & 0xff,
        (value >> 8) & 0xff,
        value & 0xff
    )
}

pub fn reverse_dns(value: u128) -> String {
    format!(
        "{}.{}.{}.{}.in-addr.arpa.",
        value & 0xff,
        (value >> 8) & 0xff,
        (value >> 16) & 0xff,
        (value >> 24) & 0xff
    )
}
