use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::{Ipv6Format, ParseOptions};

use super::ipv4;

/// Parses RFC 4291 text: eight hex words, at most one `::`, and an optional
/// dotted-quad tail standing in for the last two words.
pub fn parse(text: &str) -> Result<u128> {
    let invalid = || AddrError::format(Family::Ipv6, text);
    if text.is_empty() {
        return Err(invalid());
    }
    let words = match text.find("::") {
        Some(at) => {
            let (head, tail) = (&text[..at], &text[at + 2..]);
            if tail.contains("::") {
                return Err(invalid());
            }
            let head = groups(head, false).ok_or_else(invalid)?;
            let tail = groups(tail, true).ok_or_else(invalid)?;
            if head.len() + tail.len() > 7 {
                return Err(invalid());
            }
            let mut words = head;
            words.resize(8 - tail.len(), 0);
            words.extend(tail);
            words
        }
        None => {
            let words = groups(text, true).ok_or_else(invalid)?;
            if words.len() != 8 {
                return Err(invalid());
            }
            words
        }
    };
    Ok(words.iter().fold(0u128, |acc, &w| (acc << 16) | w as u128))
}

fn groups(text: &str, ipv4_tail: bool) -> Option<Vec<u16>> {
    let mut words = Vec::with_capacity(8);
    if text.is_empty() {
        return Some(words);
    }
    let parts: Vec<&str> = text.split(':').collect();
    for (i, part) in parts.iter().enumerate() {
        if ipv4_tail && i + 1 == parts.len() && part.contains('.') {
            let v4 = ipv4::parse(part, &ParseOptions::default()).ok()?;
            words.push((v4 >> 16) as u16);
            words.push(v4 as u16);
        } else if (1..=4).contains(&part.len()) && part.chars().all(|c| c.is_ascii_hexdigit()) {
            words.push(u16::from_str_radix(part, 16).ok()?);
        } else {
            return None;
        }
        if words.len() > 8 {
            return None;
        }
    }
    Some(words)
}

fn words(value: u128) -> [u16; 8] {
    let mut words = [0u16; 8];
    for (i, word) in words.iter_mut().enumerate() {
        *word = (value >> (112 - 16 * i)) as u16;
    }
    words
}

pub fn format(value: u128, dialect: Ipv6Format) -> String {
    let words = words(value);
    match dialect {
        Ipv6Format::Full => join(&words, |w| format!("{:x}", w)),
        Ipv6Format::Verbose => join(&words, |w| format!("{:04x}", w)),
        Ipv6Format::Compact => compact(value, &words),
    }
}

fn join(words: &[u16], word: impl Fn(u16) -> String) -> String {
    words.iter().map(|&w| word(w)).collect::<Vec<_>>().join(":")
}

/// Leftmost longest run of at least two zero words, as `(start, len)`.
fn longest_zero_run(words: &[u16; 8]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < words.len() {
        if words[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < words.len() && words[i] == 0 {
            i += 1;
        }
        let len = i - start;
        if len >= 2 && best.map_or(true, |(_, l)| len > l) {
            best = Some((start, len));
        }
    }
    best
}

// Matches glibc inet_ntop, including the embedded IPv4 forms.
fn compact(value: u128, words: &[u16; 8]) -> String {
    let run = longest_zero_run(words);
    match run {
        Some((0, 6)) => return format!("::{}", ipv4::format(value & 0xffff_ffff)),
        Some((0, 5)) if words[5] == 0xffff => {
            return format!("::ffff:{}", ipv4::format(value & 0xffff_ffff))
        }
        _ => {}
    }
    let hex = |ws: &[u16]| join(ws, |w| format!("{:x}", w));
    match run {
        Some((start, len)) => format!("{}::{}", hex(&words[..start]), hex(&words[start + len..])),
        None => hex(words),
    }
}

pub fn reverse_dns(value: u128) -> String {
    let mut labels: Vec<String> = (0..32).map(|i| format!("{:x}", (value >> (4 * i)) & 0xf)).collect();
    labels.push("ip6.arpa.".to_owned());
    labels.join(".")
}
