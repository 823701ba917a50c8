use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::address::Address;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::options::ParseOptions;
use crate::range::{AddressIter, Range};

/// A CIDR block: an address plus a prefix length.
///
/// The address is kept as given, so `192.0.2.1/24` remembers its host bits in
/// [`Network::ip`]. Equality, hashing and ordering only look at the block
/// itself: `(family, network, prefixlen)`.
#[derive(Clone, Copy)]
pub struct Network {
    ip: Address,
    prefixlen: u8,
}

impl Network {
    pub fn new(ip: Address, prefixlen: u8) -> Result<Self> {
        if prefixlen > ip.family().width() {
            return Err(AddrError::Range(format!(
                "prefix length {} exceeds {} bits",
                prefixlen,
                ip.family().width()
            )));
        }
        Ok(Network { ip, prefixlen })
    }

    /// Like [`Network::new`], but host bits must be zero.
    pub fn new_strict(ip: Address, prefixlen: u8) -> Result<Self> {
        let network = Self::new(ip, prefixlen)?;
        if network.ip.value() != network.first_value() {
            return Err(AddrError::Format(format!(
                "{} has host bits set (expected {})",
                network,
                network.cidr()
            )));
        }
        Ok(network)
    }

    /// Caller guarantees `prefixlen <= width` and an in-range `value`.
    pub(crate) const fn from_raw(family: Family, value: u128, prefixlen: u8) -> Self {
        Network {
            ip: Address::from_raw(family, value),
            prefixlen,
        }
    }

    /// Parses `addr`, `addr/len`, `addr/netmask` or `addr/hostmask`.
    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Self> {
        let expanded = if options.implicit_prefix {
            expand_abbreviated_cidr(text)
        } else {
            None
        };
        let text = expanded.as_deref().unwrap_or(text);

        let (addr_text, mask_text) = match text.split_once('/') {
            Some((addr, mask)) => (addr, Some(mask)),
            None => (text, None),
        };
        let ip = Address::parse_ip_with(addr_text, options)?;
        let family = ip.family();
        let prefixlen = match mask_text {
            None => family.width(),
            Some(mask) if is_prefix_length(mask) => mask
                .parse::<u8>()
                .map_err(|e| AddrError::Format(format!("bad prefix length {:?}: {}", mask, e)))?,
            Some(mask) => {
                let mask = Address::parse_as(family, mask)?;
                if mask.is_netmask() {
                    mask.netmask_bits()
                } else if mask.is_hostmask() {
                    family.width() - mask.value().count_ones() as u8
                } else {
                    return Err(AddrError::Format(format!(
                        "{} is neither a netmask nor a hostmask",
                        mask
                    )));
                }
            }
        };
        if options.strict {
            Self::new_strict(ip, prefixlen)
        } else {
            Self::new(ip, prefixlen)
        }
    }

    pub fn parse_strict(text: &str) -> Result<Self> {
        Self::parse_with(text, &ParseOptions::new().strict(true))
    }

    pub fn ip(&self) -> Address {
        self.ip
    }

    pub fn prefixlen(&self) -> u8 {
        self.prefixlen
    }

    pub fn family(&self) -> Family {
        self.ip.family()
    }

    pub(crate) fn first_value(&self) -> u128 {
        self.ip.value() & self.family().netmask(self.prefixlen)
    }

    pub(crate) fn last_value(&self) -> u128 {
        self.ip.value() | self.family().hostmask(self.prefixlen)
    }

    /// Lowest address of the block.
    pub fn network(&self) -> Address {
        Address::from_raw(self.family(), self.first_value())
    }

    /// Highest address of the block.
    pub fn broadcast(&self) -> Address {
        Address::from_raw(self.family(), self.last_value())
    }

    pub fn first(&self) -> Address {
        self.network()
    }

    pub fn last(&self) -> Address {
        self.broadcast()
    }

    pub fn netmask(&self) -> Address {
        Address::from_raw(self.family(), self.family().netmask(self.prefixlen))
    }

    pub fn hostmask(&self) -> Address {
        Address::from_raw(self.family(), self.family().hostmask(self.prefixlen))
    }

    /// `2^(width - prefixlen)`; `None` for `::/0`.
    pub fn size(&self) -> Option<u128> {
        1u128.checked_shl((self.family().width() - self.prefixlen) as u32)
    }

    /// The same block with host bits cleared.
    pub fn cidr(&self) -> Network {
        Network::from_raw(self.family(), self.first_value(), self.prefixlen)
    }

    /// A copy with a new prefix length, keeping [`Network::ip`].
    pub fn with_prefixlen(&self, prefixlen: u8) -> Result<Network> {
        Network::new(self.ip, prefixlen)
    }

    /// The block `step` positions above this one, same prefix length.
    pub fn next(&self, step: u128) -> Result<Network> {
        let offset = self.block_offset(step)?;
        self.first_value()
            .checked_add(offset)
            .filter(|first| *first <= self.family().netmask(self.prefixlen))
            .map(|first| Network::from_raw(self.family(), first, self.prefixlen))
            .ok_or_else(|| AddrError::Range(format!("{} + {} blocks overflows", self, step)))
    }

    /// The block `step` positions below this one, same prefix length.
    pub fn previous(&self, step: u128) -> Result<Network> {
        let offset = self.block_offset(step)?;
        self.first_value()
            .checked_sub(offset)
            .map(|first| Network::from_raw(self.family(), first, self.prefixlen))
            .ok_or_else(|| AddrError::Range(format!("{} - {} blocks underflows", self, step)))
    }

    fn block_offset(&self, step: u128) -> Result<u128> {
        match self.size() {
            Some(size) => step
                .checked_mul(size)
                .ok_or_else(|| AddrError::Range(format!("step {} too large for {}", step, self))),
            None if step == 0 => Ok(0),
            None => Err(AddrError::Range(format!("{} has no neighbours", self))),
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        address.family() == self.family()
            && address.value() & self.family().netmask(self.prefixlen) == self.first_value()
    }

    pub fn contains_network(&self, other: &Network) -> bool {
        other.prefixlen >= self.prefixlen && self.contains(other.network())
    }

    pub fn overlaps(&self, other: &Network) -> bool {
        self.contains_network(other) || other.contains_network(self)
    }

    /// Every address in the block.
    pub fn iter(&self) -> AddressIter {
        AddressIter::new(self.family(), self.first_value(), self.last_value())
    }

    /// Usable host addresses: IPv4 blocks wider than /31 drop the network and
    /// broadcast addresses, IPv6 blocks wider than /127 drop the
    /// subnet-router anycast address.
    pub fn hosts(&self) -> AddressIter {
        let (first, last) = (self.first_value(), self.last_value());
        match self.family() {
            Family::Ipv4 if self.prefixlen < 31 => AddressIter::new(Family::Ipv4, first + 1, last - 1),
            Family::Ipv6 if self.prefixlen < 127 => AddressIter::new(Family::Ipv6, first + 1, last),
            family => AddressIter::new(family, first, last),
        }
    }

    pub fn to_range(&self) -> Range {
        Range::from(*self)
    }

    /// Consecutive blocks of `new_prefixlen` starting at the network address,
    /// at most `count` of them (all of them when `None`).
    pub fn subnets(&self, new_prefixlen: u8, count: Option<u128>) -> Result<Subnets> {
        let family = self.family();
        if new_prefixlen < self.prefixlen || new_prefixlen > family.width() {
            return Err(AddrError::Range(format!(
                "/{} is not a subnet prefix of {}",
                new_prefixlen, self
            )));
        }
        let available = 1u128.checked_shl((new_prefixlen - self.prefixlen) as u32);
        let step = 1u128.checked_shl((family.width() - new_prefixlen) as u32).unwrap_or(0);
        let first = self.first_value();
        let last = match count {
            Some(0) => return Ok(Subnets::empty(family, new_prefixlen)),
            Some(count) => {
                if available.map_or(false, |available| count > available) {
                    return Err(AddrError::Range(format!(
                        "{} has fewer than {} /{} subnets",
                        self, count, new_prefixlen
                    )));
                }
                first + (count - 1) * step
            }
            None => self.last_value() & family.netmask(new_prefixlen),
        };
        Ok(Subnets {
            family,
            prefixlen: new_prefixlen,
            next: first,
            last,
            step,
            done: false,
        })
    }

    /// Enclosing blocks from `/prefixlen-1` down to `/min_prefixlen`.
    pub fn supernets(&self, min_prefixlen: u8) -> Result<Vec<Network>> {
        if min_prefixlen > self.family().width() {
            return Err(AddrError::Range(format!(
                "prefix length {} exceeds {} bits",
                min_prefixlen,
                self.family().width()
            )));
        }
        Ok((min_prefixlen..self.prefixlen)
            .rev()
            .map(|prefixlen| {
                let value = self.ip.value() & self.family().netmask(prefixlen);
                Network::from_raw(self.family(), value, prefixlen)
            })
            .collect())
    }

    /// IPv4 form of an IPv4-mapped or compatible IPv6 block.
    pub fn ipv4(&self) -> Result<Network> {
        match self.family() {
            Family::Ipv4 => Ok(*self),
            Family::Ipv6 if self.prefixlen >= 96 => Network::new(self.ip.ipv4()?, self.prefixlen - 96),
            _ => Err(AddrError::Conversion(format!("{} has no IPv4 form", self))),
        }
    }

    pub fn ipv6(&self, compatible: bool) -> Result<Network> {
        match self.family() {
            Family::Ipv4 => Network::new(self.ip.ipv6(compatible)?, self.prefixlen + 96),
            _ => Network::new(self.ip.ipv6(compatible)?, self.prefixlen),
        }
    }

    fn key(&self) -> (Family, u128, u8) {
        (self.family(), self.first_value(), self.prefixlen)
    }
}

impl PartialEq for Network {
    fn eq(&self, other: &Network) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Network {}

impl Hash for Network {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialOrd for Network {
    fn partial_cmp(&self, other: &Network) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Network {
    fn cmp(&self, other: &Network) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefixlen)
    }
}

impl Debug for Network {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Network({})", self)
    }
}

impl FromStr for Network {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with(s, &ParseOptions::default())
    }
}

impl From<Address> for Network {
    fn from(address: Address) -> Self {
        Network {
            ip: address,
            prefixlen: address.family().width(),
        }
    }
}

/// Restartable iterator over equal-sized subnets; clone it to start over.
#[derive(Debug, Clone)]
pub struct Subnets {
    family: Family,
    prefixlen: u8,
    next: u128,
    last: u128,
    step: u128,
    done: bool,
}

impl Subnets {
    fn empty(family: Family, prefixlen: u8) -> Self {
        Subnets {
            family,
            prefixlen,
            next: 0,
            last: 0,
            step: 0,
            done: true,
        }
    }
}

impl Iterator for Subnets {
    type Item = Network;

    fn next(&mut self) -> Option<Network> {
        if self.done {
            return None;
        }
        let value = self.next;
        if value == self.last {
            self.done = true;
        } else {
            self.next += self.step;
        }
        Some(Network::from_raw(self.family, value, self.prefixlen))
    }
}

fn is_prefix_length(mask: &str) -> bool {
    (1..=3).contains(&mask.len()) && mask.bytes().all(|b| b.is_ascii_digit())
}

/// Expands classful abbreviations (`10`, `192.168`, `172.16/12`) to a full
/// IPv4 CIDR string. Returns `None` for anything that is not an abbreviation.
///
/// Implicit prefixes follow the old class boundaries: 0-127 is /8, 128-191
/// is /16, 192-223 is /24, 224-239 is /4 and the rest /32.
pub fn expand_abbreviated_cidr(text: &str) -> Option<String> {
    fn classful_prefix(octet: u32) -> u8 {
        match octet {
            0..=127 => 8,
            128..=191 => 16,
            192..=223 => 24,
            224..=239 => 4,
            _ => 32,
        }
    }

    if text.is_empty() || text.contains(':') {
        return None;
    }
    let (addr, prefix) = match text.split_once('/') {
        Some((addr, prefix)) => {
            let prefix = prefix.parse::<u8>().ok().filter(|p| *p <= 32)?;
            (addr, Some(prefix))
        }
        None => (text, None),
    };
    let mut octets = addr
        .split('.')
        .map(|octet| {
            if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            octet.parse::<u32>().ok().filter(|o| *o <= 255)
        })
        .collect::<Option<Vec<u32>>>()?;
    if octets.len() > 4 {
        return None;
    }
    let prefix = prefix.unwrap_or_else(|| classful_prefix(octets[0]));
    octets.resize(4, 0);
    let dotted: Vec<String> = octets.iter().map(|o| o.to_string()).collect();
    Some(format!("{}/{}", dotted.join("."), prefix))
}
