//! Exact conversions between text, integers, packed bytes and word tuples.
//!
//! Every function is pure and parameterised by a [`Family`]; each parse entry
//! point fails closed with [`AddrError::Format`].

pub mod eui;
pub mod ipv4;
pub mod ipv6;

use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::{EuiDialect, Ipv6Format, ParseOptions, EUI64_BASE, MAC_EUI48};

pub fn parse(family: Family, text: &str, options: &ParseOptions) -> Result<u128> {
    match family {
        Family::Ipv4 => ipv4::parse(text, options),
        Family::Ipv6 => ipv6::parse(text),
        Family::Eui48 | Family::Eui64 => eui::parse(family, text),
    }
}

pub fn valid(family: Family, text: &str) -> bool {
    parse(family, text, &ParseOptions::default()).is_ok()
}

/// Canonical text of `value`.
pub fn format(family: Family, value: u128) -> String {
    match family {
        Family::Ipv4 => ipv4::format(value),
        Family::Ipv6 => ipv6::format(value, Ipv6Format::Compact),
        Family::Eui48 => format_eui(family, value, &MAC_EUI48),
        Family::Eui64 => format_eui(family, value, &EUI64_BASE),
    }
}

fn format_eui(family: Family, value: u128, dialect: &EuiDialect) -> String {
    // the default dialects always divide the width
    eui::format(family, value, dialect).expect("Not possible")
}

pub fn to_words(family: Family, value: u128) -> Vec<u16> {
    let size = family.word_size();
    let mask = family.max_word() as u128;
    (1..=family.num_words() as u8)
        .map(|i| ((value >> (family.width() - i * size)) & mask) as u16)
        .collect()
}

pub fn from_words(family: Family, words: &[u16]) -> Result<u128> {
    if words.len() != family.num_words() {
        return Err(AddrError::Format(format!(
            "{} expects {} words, got {}",
            family,
            family.num_words(),
            words.len()
        )));
    }
    words.iter().try_fold(0u128, |acc, &word| {
        if word > family.max_word() {
            Err(AddrError::Format(format!("word {:#x} too large for {}", word, family)))
        } else {
            Ok((acc << family.word_size()) | word as u128)
        }
    })
}

/// Big-endian encoding, `width / 8` bytes.
pub fn to_packed(family: Family, value: u128) -> Vec<u8> {
    value.to_be_bytes()[16 - family.packed_len()..].to_vec()
}

pub fn from_packed(family: Family, bytes: &[u8]) -> Result<u128> {
    if bytes.len() != family.packed_len() {
        return Err(AddrError::Format(format!(
            "{} expects {} packed bytes, got {}",
            family,
            family.packed_len(),
            bytes.len()
        )));
    }
    let mut buf = [0u8; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Ok(u128::from_be_bytes(buf))
}

/// Binary digits of each word, joined by the family separator.
pub fn to_bits(family: Family, value: u128) -> String {
    let size = family.word_size() as usize;
    to_words(family, value)
        .iter()
        .map(|w| format!("{:0size$b}", w, size = size))
        .collect::<Vec<_>>()
        .join(&family.separator().to_string())
}

pub fn reverse_dns(family: Family, value: u128) -> Result<String> {
    match family {
        Family::Ipv4 => Ok(ipv4::reverse_dns(value)),
        Family::Ipv6 => Ok(ipv6::reverse_dns(value)),
        other => Err(AddrError::Conversion(format!(
            "{} addresses have no reverse DNS name",
            other
        ))),
    }
}
