//! IPv4 wildcard globs such as `192.0.2.*` or `192.0.2-3.*`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::address::Address;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::network::Network;
use crate::range::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Octet {
    Exact(u8),
    Span(u8, u8),
    Any,
}

impl Octet {
    fn bounds(self) -> (u8, u8) {
        match self {
            Octet::Exact(v) => (v, v),
            Octet::Span(lo, hi) => (lo, hi),
            Octet::Any => (0, 255),
        }
    }

    fn from_bounds(lo: u8, hi: u8) -> Octet {
        match (lo, hi) {
            _ if lo == hi => Octet::Exact(lo),
            (0, 255) => Octet::Any,
            _ => Octet::Span(lo, hi),
        }
    }
}

impl Display for Octet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Octet::Exact(v) => write!(f, "{}", v),
            Octet::Span(lo, hi) => write!(f, "{}-{}", lo, hi),
            Octet::Any => write!(f, "*"),
        }
    }
}

/// An IPv4 pattern of four octets, each a number, `*` or `lo-hi`.
///
/// At most one octet may be a span, and once an octet is a span or a
/// wildcard every later octet must be `*`. Every glob is therefore one
/// contiguous range. A full `0-255` span is stored as `*`, so two globs are
/// equal exactly when they match the same addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glob {
    octets: [Octet; 4],
}

impl Glob {
    pub fn parse(text: &str) -> Result<Self> {
        lazy_static! {
            static ref OCTET: Regex =
                Regex::new(r"^(?:(\*)|(\d{1,3})-(\d{1,3})|(\d{1,3}))$").expect("Not possible");
        }
        let invalid = || AddrError::Format(format!("{:?} is not a valid IPv4 glob", text));
        let number = |digits: &str| digits.parse::<u8>().map_err(|_| invalid());

        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }
        let mut octets = [Octet::Any; 4];
        for (slot, part) in octets.iter_mut().zip(parts) {
            let caps = OCTET.captures(part).ok_or_else(invalid)?;
            *slot = if caps.get(1).is_some() {
                Octet::Any
            } else if let (Some(lo), Some(hi)) = (caps.get(2), caps.get(3)) {
                let (lo, hi) = (number(lo.as_str())?, number(hi.as_str())?);
                if lo >= hi {
                    return Err(invalid());
                }
                Octet::from_bounds(lo, hi)
            } else {
                let digits = caps.get(4).ok_or_else(invalid)?;
                Octet::Exact(number(digits.as_str())?)
            };
        }
        Glob::from_octets(octets).ok_or_else(invalid)
    }

    /// `None` unless only `*` follows the first span or wildcard, and at
    /// most one span is present.
    fn from_octets(octets: [Octet; 4]) -> Option<Self> {
        let mut open = false;
        for octet in octets.iter() {
            match octet {
                Octet::Any => open = true,
                Octet::Span(..) if !open => open = true,
                Octet::Exact(_) if !open => {}
                _ => return None,
            }
        }
        Some(Glob { octets })
    }

    pub fn to_range(&self) -> Range {
        let (first, last) = self.octets.iter().fold((0u128, 0u128), |(first, last), octet| {
            let (lo, hi) = octet.bounds();
            ((first << 8) | lo as u128, (last << 8) | hi as u128)
        });
        Range::from_raw(Family::Ipv4, first, last)
    }

    pub fn networks(&self) -> Vec<Network> {
        self.to_range().networks()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.to_range().contains(address)
    }

    /// The single glob matching exactly `[first, last]`, if there is one.
    fn exact(first: u128, last: u128) -> Option<Glob> {
        let mut octets = [Octet::Any; 4];
        for (i, slot) in octets.iter_mut().enumerate() {
            let shift = 24 - 8 * i;
            *slot = Octet::from_bounds((first >> shift) as u8, (last >> shift) as u8);
        }
        Glob::from_octets(octets).filter(|glob| {
            let range = glob.to_range();
            range.first_value() == first && range.last_value() == last
        })
    }
}

impl Display for Glob {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let [a, b, c, d] = self.octets;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl FromStr for Glob {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self> {
        Glob::parse(s)
    }
}

impl TryFrom<Range> for Glob {
    type Error = AddrError;

    fn try_from(range: Range) -> Result<Self> {
        AddrError::check_family(Family::Ipv4, range.family())?;
        Glob::exact(range.first_value(), range.last_value())
            .ok_or_else(|| AddrError::Conversion(format!("{} is not a single glob", range)))
    }
}

pub fn valid_glob(text: &str) -> bool {
    Glob::parse(text).is_ok()
}

/// Globs matching exactly the range: one when the range has a glob form,
/// otherwise one per network of its decomposition.
pub fn range_to_globs(range: &Range) -> Result<Vec<Glob>> {
    AddrError::check_family(Family::Ipv4, range.family())?;
    if let Some(glob) = Glob::exact(range.first_value(), range.last_value()) {
        return Ok(vec![glob]);
    }
    range
        .networks()
        .iter()
        .map(|n| {
            Glob::exact(n.first_value(), n.last_value())
                .ok_or_else(|| AddrError::Conversion(format!("{} has no glob form", n)))
        })
        .collect()
}

pub fn network_to_glob(network: &Network) -> Result<Glob> {
    Glob::try_from(network.to_range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn glob(s: &str) -> Glob {
        s.parse().unwrap()
    }

    #[test]
    fn validity() {
        for ok in ["192.0.2.1", "192.0.2.*", "192.0.2-3.*", "*.*.*.*", "192.0.2.1-10", "0-255.*.*.*"] {
            assert!(valid_glob(ok), "{}", ok);
        }
        for bad in [
            "192.0.2",
            "192.0.2.1.5",
            "192.0.*.1",
            "192.0.*.1-5",
            "192.0-1.2-3.*",
            "192.0-1.2.*",
            "192.0.2.5-1",
            "192.0.2.5-5",
            "192.0.2.256",
            "192.0.2.-1",
            "192.0.2.",
            "a.b.c.d",
        ] {
            assert!(!valid_glob(bad), "{}", bad);
        }
    }

    #[test]
    fn ranges_and_networks() {
        let g = glob("192.0.2.*");
        assert_eq!("192.0.2.0-192.0.2.255", g.to_range().to_string());
        assert_eq!(vec!["192.0.2.0/24".parse::<Network>().unwrap()], g.networks());
        let g = glob("192.0.2-3.*");
        assert_eq!("192.0.2.0-192.0.3.255", g.to_range().to_string());
        assert_eq!(vec!["192.0.2.0/23".parse::<Network>().unwrap()], g.networks());
        assert!(g.contains("192.0.3.7".parse().unwrap()));
        assert!(!g.contains("192.0.4.0".parse().unwrap()));
        assert_eq!("192.0.2.1-10", glob("192.0.2.1-10").to_string());
    }

    #[test]
    fn from_ranges() {
        let r: Range = "192.0.2.0-192.0.3.255".parse().unwrap();
        assert_eq!(glob("192.0.2-3.*"), Glob::try_from(r).unwrap());
        let r: Range = "192.0.2.1-192.0.2.10".parse().unwrap();
        assert_eq!(vec![glob("192.0.2.1-10")], range_to_globs(&r).unwrap());
        let r: Range = "192.0.2.250-192.0.3.5".parse().unwrap();
        assert!(Glob::try_from(r).is_err());
        let globs: Vec<String> = range_to_globs(&r).unwrap().iter().map(|g| g.to_string()).collect();
        assert_eq!(
            vec!["192.0.2.250-251", "192.0.2.252-255", "192.0.3.0-3", "192.0.3.4-5"],
            globs
        );
        let net: Network = "10.0.0.0/8".parse().unwrap();
        assert_eq!(glob("10.*.*.*"), network_to_glob(&net).unwrap());
        let v6: Range = "::1-::2".parse().unwrap();
        assert!(range_to_globs(&v6).is_err());
    }

    #[test]
    fn equality_follows_addresses() {
        use std::collections::HashSet;

        assert_eq!(glob("*.*.*.*"), glob("0-255.*.*.*"));
        assert_eq!(glob("192.0.2.*"), glob("192.0.2.0-255"));
        assert_eq!("192.0.2.*", glob("192.0.2.0-255").to_string());
        assert_ne!(glob("192.0.2.*"), glob("192.0.2.0-254"));

        let r: Range = "192.0.2.0-192.0.2.255".parse().unwrap();
        assert_eq!(glob("192.0.2.0-255"), Glob::try_from(r).unwrap());

        let globs: HashSet<Glob> = ["192.0.2.*", "192.0.2.0-255", "0-255.*.*.*", "*.*.*.*"]
            .iter()
            .map(|s| glob(s))
            .collect();
        assert_eq!(2, globs.len());
    }

    #[quickcheck]
    fn spelled_span_equals_written(ip: u32, len: u8) -> bool {
        let n = Network::from_raw(Family::Ipv4, ip as u128, 24 + len % 9);
        let (first, last) = (n.first_value(), n.last_value());
        let spelled = format!(
            "{}.{}.{}.{}-{}",
            first >> 24,
            (first >> 16) & 0xff,
            (first >> 8) & 0xff,
            first & 0xff,
            last & 0xff
        );
        match Glob::parse(&spelled) {
            Ok(g) => g == network_to_glob(&n).unwrap(),
            Err(_) => first == last,
        }
    }

    #[quickcheck]
    fn globs_cover_range(a: u32, b: u32) -> bool {
        let r = Range::from_raw(Family::Ipv4, a.min(b) as u128, a.max(b) as u128);
        let globs = range_to_globs(&r).unwrap();
        let mut next = r.first_value();
        for g in globs.iter() {
            let gr = g.to_range();
            if gr.first_value() != next {
                return false;
            }
            next = gr.last_value() + 1;
        }
        next == r.last_value() + 1 && globs.iter().all(|g| glob(&g.to_string()) == *g)
    }

    #[quickcheck]
    fn network_globs(ip: u32, len: u8) -> bool {
        let n = Network::from_raw(Family::Ipv4, ip as u128, len % 33);
        network_to_glob(&n).map(|g| g.to_range() == n.to_range()).unwrap_or(false)
    }
}
