use std::fmt::{self, Debug, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::codec;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::{EuiDialect, Ipv6Format, ParseOptions};
use crate::special::{self, Class};

/// An immutable address of one family.
///
/// Equality and ordering are `(family, value)` lexicographic. Arithmetic never
/// mutates; it returns a new address, wrapping at `2^width`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    family: Family,
    value: u128,
}

impl Address {
    pub fn new(family: Family, value: u128) -> Result<Self> {
        if value > family.max_value() {
            return Err(AddrError::Range(format!(
                "{:#x} does not fit in {} bits",
                value,
                family.width()
            )));
        }
        Ok(Address { family, value })
    }

    /// Caller guarantees `value <= family.max_value()`.
    pub(crate) const fn from_raw(family: Family, value: u128) -> Self {
        Address { family, value }
    }

    pub fn parse_as(family: Family, text: &str) -> Result<Self> {
        Self::parse_with(family, text, &ParseOptions::default())
    }

    pub fn parse_with(family: Family, text: &str, options: &ParseOptions) -> Result<Self> {
        codec::parse(family, text, options).map(|value| Address { family, value })
    }

    /// Parses IPv4 or IPv6 text, whichever matches.
    pub fn parse_ip(text: &str) -> Result<Self> {
        Self::parse_ip_with(text, &ParseOptions::default())
    }

    pub fn parse_ip_with(text: &str, options: &ParseOptions) -> Result<Self> {
        Self::parse_with(Family::Ipv4, text, options)
            .or_else(|_| Self::parse_with(Family::Ipv6, text, options))
            .map_err(|_| AddrError::Format(format!("{:?} is not a valid IP address", text)))
    }

    /// Parses EUI-48 or EUI-64 text, whichever matches.
    pub fn parse_eui(text: &str) -> Result<Self> {
        Self::parse_as(Family::Eui48, text)
            .or_else(|_| Self::parse_as(Family::Eui64, text))
            .map_err(|_| AddrError::Format(format!("{:?} is not a valid EUI address", text)))
    }

    pub fn from_words(family: Family, words: &[u16]) -> Result<Self> {
        codec::from_words(family, words).map(|value| Address { family, value })
    }

    pub fn from_packed(family: Family, bytes: &[u8]) -> Result<Self> {
        codec::from_packed(family, bytes).map(|value| Address { family, value })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    /// 4 or 6 for IP addresses.
    pub fn version(&self) -> Option<u8> {
        self.family.version()
    }

    pub fn words(&self) -> Vec<u16> {
        codec::to_words(self.family, self.value)
    }

    /// Word at `index`; negative indices count from the end.
    pub fn word(&self, index: isize) -> Result<u16> {
        let at = self.word_index(index)?;
        Ok(self.words()[at])
    }

    /// A copy with the word at `index` replaced.
    pub fn with_word(&self, index: isize, word: u16) -> Result<Self> {
        let at = self.word_index(index)?;
        let mut words = self.words();
        words[at] = word;
        Self::from_words(self.family, &words)
    }

    fn word_index(&self, index: isize) -> Result<usize> {
        let len = self.family.num_words();
        let at = if index < 0 { index + len as isize } else { index };
        if at < 0 || at >= len as isize {
            return Err(AddrError::Index { index, len });
        }
        Ok(at as usize)
    }

    pub fn packed(&self) -> Vec<u8> {
        codec::to_packed(self.family, self.value)
    }

    /// Binary digits, one group per word.
    pub fn bits(&self) -> String {
        codec::to_bits(self.family, self.value)
    }

    pub fn reverse_dns(&self) -> Result<String> {
        codec::reverse_dns(self.family, self.value)
    }

    pub fn increment(&self, n: u128) -> Self {
        Address {
            family: self.family,
            value: self.value.wrapping_add(n) & self.family.max_value(),
        }
    }

    pub fn decrement(&self, n: u128) -> Self {
        Address {
            family: self.family,
            value: self.value.wrapping_sub(n) & self.family.max_value(),
        }
    }

    pub fn to_ipv6_string(&self, dialect: Ipv6Format) -> Result<String> {
        AddrError::check_family(Family::Ipv6, self.family)?;
        Ok(codec::ipv6::format(self.value, dialect))
    }

    pub fn to_eui_string(&self, dialect: &EuiDialect) -> Result<String> {
        match self.family {
            Family::Eui48 | Family::Eui64 => codec::eui::format(self.family, self.value, dialect),
            other => Err(AddrError::TypeMismatch(Family::Eui48, other)),
        }
    }

    /// The IPv4 form of an IPv4, IPv4-mapped or IPv4-compatible address.
    pub fn ipv4(&self) -> Result<Self> {
        match self.family {
            Family::Ipv4 => Ok(*self),
            Family::Ipv6 if self.value >> 32 == 0xffff || self.value >> 32 == 0 => {
                Ok(Address::from_raw(Family::Ipv4, self.value & 0xffff_ffff))
            }
            _ => Err(AddrError::Conversion(format!("{} has no IPv4 form", self))),
        }
    }

    /// The IPv6 form: `::ffff:a.b.c.d` for IPv4 addresses, or `::a.b.c.d`
    /// when `compatible` is set.
    pub fn ipv6(&self, compatible: bool) -> Result<Self> {
        match self.family {
            Family::Ipv4 if compatible => Ok(Address::from_raw(Family::Ipv6, self.value)),
            Family::Ipv4 => Ok(Address::from_raw(Family::Ipv6, 0xffff_0000_0000 | self.value)),
            Family::Ipv6 => Ok(*self),
            _ => Err(AddrError::Conversion(format!("{} has no IPv6 form", self))),
        }
    }

    pub fn is_loopback(&self) -> bool {
        special::is_in(self.family, self.value, Class::Loopback)
    }

    /// RFC 1918 for IPv4, unique local `fc00::/7` for IPv6.
    pub fn is_private(&self) -> bool {
        special::is_in(self.family, self.value, Class::Private)
    }

    pub fn is_link_local(&self) -> bool {
        special::is_in(self.family, self.value, Class::LinkLocal)
    }

    pub fn is_multicast(&self) -> bool {
        special::is_in(self.family, self.value, Class::Multicast)
    }

    pub fn is_unicast(&self) -> bool {
        self.family.is_ip() && !self.is_multicast()
    }

    pub fn is_reserved(&self) -> bool {
        special::is_in(self.family, self.value, Class::Reserved)
    }

    pub fn is_ipv4_mapped(&self) -> bool {
        self.family == Family::Ipv6 && self.value >> 32 == 0xffff
    }

    /// `::a.b.c.d`, excluding `::` and `::1`.
    pub fn is_ipv4_compat(&self) -> bool {
        self.family == Family::Ipv6 && self.value >> 32 == 0 && self.value > 1
    }

    /// A run of ones followed by a run of zeros.
    pub fn is_netmask(&self) -> bool {
        let host = self.family.max_value() ^ self.value;
        host & host.wrapping_add(1) == 0
    }

    /// A run of zeros followed by a run of ones.
    pub fn is_hostmask(&self) -> bool {
        self.value & self.value.wrapping_add(1) == 0
    }

    /// Prefix length of a netmask; the full width for anything else.
    pub fn netmask_bits(&self) -> u8 {
        if self.is_netmask() {
            self.value.count_ones() as u8
        } else {
            self.family.width()
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&codec::format(self.family, self.value))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Address({} {})", self.family, self)
    }
}

impl FromStr for Address {
    type Err = AddrError;

    /// Tries IPv4, IPv6, EUI-48 and EUI-64 in turn.
    fn from_str(s: &str) -> Result<Self> {
        Family::ALL
            .iter()
            .find_map(|&family| Self::parse_as(family, s).ok())
            .ok_or_else(|| AddrError::Format(format!("{:?} is not a valid address", s)))
    }
}

impl Add<u128> for Address {
    type Output = Address;

    fn add(self, n: u128) -> Address {
        self.increment(n)
    }
}

impl Sub<u128> for Address {
    type Output = Address;

    fn sub(self, n: u128) -> Address {
        self.decrement(n)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::from_raw(Family::Ipv4, u32::from(ip) as u128)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address::from_raw(Family::Ipv6, u128::from(ip))
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl TryFrom<Address> for IpAddr {
    type Error = AddrError;

    fn try_from(address: Address) -> Result<IpAddr> {
        match address.family {
            Family::Ipv4 => Ok(IpAddr::V4(Ipv4Addr::from(address.value as u32))),
            Family::Ipv6 => Ok(IpAddr::V6(Ipv6Addr::from(address.value))),
            other => Err(AddrError::Conversion(format!("{} is not an IP family", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MAC_CISCO;
    use quickcheck_macros::quickcheck;

    fn ip(s: &str) -> Address {
        Address::parse_ip(s).unwrap()
    }

    #[test]
    fn parse_and_format() {
        let a = ip("192.0.2.1");
        assert_eq!("192.0.2.1", a.to_string());
        assert_eq!(3221225985, a.value());
        assert_eq!(Some(4), a.version());
        assert_eq!(Family::Ipv6, ip("::1").family());
        assert!(Address::parse_ip("00-90-96-AF-CC-39").is_err());
        assert_eq!(
            Family::Eui48,
            "00-90-96-AF-CC-39".parse::<Address>().unwrap().family()
        );
        assert_eq!(
            Family::Eui64,
            "00-1B-77-FF-FE-49-54-FD".parse::<Address>().unwrap().family()
        );
        assert!("not an address".parse::<Address>().is_err());
        assert!(Address::new(Family::Ipv4, 1 << 32).is_err());
    }

    #[test]
    fn words() {
        let a = ip("192.0.2.1");
        assert_eq!(Ok(192), a.word(0));
        assert_eq!(Ok(1), a.word(-1));
        assert_eq!(Ok(192), a.word(-4));
        assert_eq!(Err(AddrError::Index { index: 4, len: 4 }), a.word(4));
        assert!(a.word(-5).is_err());
        assert_eq!(ip("192.0.2.254"), a.with_word(-1, 254).unwrap());
        assert!(a.with_word(0, 256).is_err());
        assert_eq!(Ok(0xfe80), ip("fe80::1").word(0));
    }

    #[test]
    fn wraparound() {
        assert_eq!(ip("0.0.0.0"), ip("255.255.255.255") + 1);
        assert_eq!(ip("255.255.255.255"), ip("0.0.0.0") - 1);
        assert_eq!(ip("::"), ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff").increment(1));
        assert_eq!(ip("192.0.3.0"), ip("192.0.2.255").increment(1));
        assert_eq!(ip("192.0.2.0"), ip("192.0.2.10").decrement(10));
    }

    #[test]
    fn conversions() {
        let v4 = ip("192.0.2.1");
        assert_eq!(ip("::ffff:192.0.2.1"), v4.ipv6(false).unwrap());
        assert_eq!(ip("::192.0.2.1"), v4.ipv6(true).unwrap());
        assert_eq!(v4, ip("::ffff:192.0.2.1").ipv4().unwrap());
        assert_eq!(v4, ip("::192.0.2.1").ipv4().unwrap());
        assert!(ip("2001:db8::1").ipv4().is_err());
        assert!(ip("::ffff:192.0.2.1").is_ipv4_mapped());
        assert!(ip("::192.0.2.1").is_ipv4_compat());
        assert!(!ip("::1").is_ipv4_compat());

        let std: IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(v4, Address::from(std));
        assert_eq!(std, IpAddr::try_from(v4).unwrap());
        let mac = Address::parse_eui("00-90-96-AF-CC-39").unwrap();
        assert!(IpAddr::try_from(mac).is_err());
        assert!(mac.ipv6(false).is_err());
    }

    #[test]
    fn dialects() {
        let a = ip("2001:db8::1");
        assert_eq!(Ok("2001:db8:0:0:0:0:0:1".to_owned()), a.to_ipv6_string(Ipv6Format::Full));
        assert!(ip("192.0.2.1").to_ipv6_string(Ipv6Format::Full).is_err());
        let mac = Address::parse_eui("00-90-96-AF-CC-39").unwrap();
        assert_eq!(Ok("0090.96af.cc39".to_owned()), mac.to_eui_string(&MAC_CISCO));
        assert!(a.to_eui_string(&MAC_CISCO).is_err());
    }

    #[test]
    fn classification() {
        assert!(ip("127.0.0.1").is_loopback());
        assert!(ip("::1").is_loopback());
        assert!(ip("10.1.2.3").is_private());
        assert!(ip("172.31.255.255").is_private());
        assert!(!ip("172.32.0.0").is_private());
        assert!(ip("fd00::1").is_private());
        assert!(ip("169.254.1.1").is_link_local());
        assert!(ip("fe80::1").is_link_local());
        assert!(ip("224.0.0.1").is_multicast());
        assert!(ip("ff02::1").is_multicast());
        assert!(ip("192.0.2.1").is_unicast());
        assert!(ip("192.0.2.1").is_reserved());
        assert!(!ip("8.8.8.8").is_reserved());
    }

    #[test]
    fn masks() {
        assert!(ip("255.255.255.0").is_netmask());
        assert!(ip("0.0.0.0").is_netmask());
        assert!(!ip("255.0.255.0").is_netmask());
        assert!(ip("0.0.0.255").is_hostmask());
        assert!(ip("255.255.255.255").is_hostmask());
        assert_eq!(24, ip("255.255.255.0").netmask_bits());
        assert_eq!(32, ip("255.0.255.0").netmask_bits());
        assert_eq!(64, ip("ffff:ffff:ffff:ffff::").netmask_bits());
    }

    #[test]
    fn reverse_and_bits() {
        assert_eq!(Ok("1.2.0.192.in-addr.arpa.".to_owned()), ip("192.0.2.1").reverse_dns());
        assert_eq!(vec![192, 0, 2, 1], ip("192.0.2.1").packed());
        assert_eq!(
            "11111111.11111111.11111111.00000000",
            ip("255.255.255.0").bits()
        );
    }

    #[quickcheck]
    fn ordering_matches_values(a: u32, b: u32) -> bool {
        let (x, y) = (Address::from(Ipv4Addr::from(a)), Address::from(Ipv4Addr::from(b)));
        (x < y) == (a < b)
    }

    #[quickcheck]
    fn increment_then_decrement(a: u128, n: u128) -> bool {
        let x = Address::from(Ipv6Addr::from(a));
        x.increment(n).decrement(n) == x
    }
}
