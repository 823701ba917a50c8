use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use crate::address::Address;
use crate::cidr;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::network::Network;

/// An arbitrary inclusive `[first, last]` span of one family, not
/// necessarily aligned on a power of two.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    family: Family,
    first: u128,
    last: u128,
}

impl Range {
    pub fn new(first: Address, last: Address) -> Result<Self> {
        AddrError::check_family(first.family(), last.family())?;
        if first > last {
            return Err(AddrError::Range(format!(
                "lower bound {} is above upper bound {}",
                first, last
            )));
        }
        Ok(Range::from_raw(first.family(), first.value(), last.value()))
    }

    pub(crate) const fn from_raw(family: Family, first: u128, last: u128) -> Self {
        Range { family, first, last }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn first(&self) -> Address {
        Address::from_raw(self.family, self.first)
    }

    pub fn last(&self) -> Address {
        Address::from_raw(self.family, self.last)
    }

    pub(crate) fn first_value(&self) -> u128 {
        self.first
    }

    pub(crate) fn last_value(&self) -> u128 {
        self.last
    }

    /// Number of addresses; `None` when it is `2^128`.
    pub fn size(&self) -> Option<u128> {
        (self.last - self.first).checked_add(1)
    }

    pub fn contains(&self, address: Address) -> bool {
        address.family() == self.family && (self.first..=self.last).contains(&address.value())
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        other.family == self.family && self.first <= other.first && other.last <= self.last
    }

    pub fn contains_network(&self, network: &Network) -> bool {
        self.contains_range(&Range::from(*network))
    }

    /// Minimal ordered list of networks covering exactly this range.
    pub fn networks(&self) -> Vec<Network> {
        cidr::range_networks(self.family, self.first, self.last)
    }

    pub fn iter(&self) -> AddressIter {
        AddressIter::new(self.family, self.first, self.last)
    }

    /// `(family, first, width - bitlength(size), last)`: at the same start,
    /// larger ranges sort first.
    fn sort_key(&self) -> (Family, u128, i16, u128) {
        let span = self.last - self.first;
        let bit_length = match span.checked_add(1) {
            Some(size) => 128 - size.leading_zeros() as i16,
            None => 129,
        };
        (self.family, self.first, self.family.width() as i16 - bit_length, self.last)
    }
}

impl From<Network> for Range {
    fn from(network: Network) -> Self {
        Range::from_raw(network.family(), network.first_value(), network.last_value())
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Range) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Range {
    fn cmp(&self, other: &Range) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.first(), self.last())
    }
}

impl Debug for Range {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Range({})", self)
    }
}

impl FromStr for Range {
    type Err = AddrError;

    /// `"first-last"`. Link-layer addresses may contain `-` themselves, so
    /// every split point is tried.
    fn from_str(s: &str) -> Result<Self> {
        s.match_indices('-')
            .find_map(|(at, _)| {
                let first = s[..at].parse::<Address>().ok()?;
                let last = s[at + 1..].parse::<Address>().ok()?;
                Range::new(first, last).ok()
            })
            .ok_or_else(|| AddrError::Format(format!("{:?} is not a valid address range", s)))
    }
}

impl<'a> TryFrom<&'a str> for Range {
    type Error = AddrError;

    fn try_from(s: &'a str) -> Result<Self> {
        s.parse()
    }
}

/// Ascending iterator over the addresses of an inclusive span.
#[derive(Debug, Clone)]
pub struct AddressIter {
    family: Family,
    next: u128,
    last: u128,
    done: bool,
}

impl AddressIter {
    pub(crate) fn new(family: Family, first: u128, last: u128) -> Self {
        AddressIter {
            family,
            next: first,
            last,
            done: first > last,
        }
    }
}

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        if self.done {
            return None;
        }
        let value = self.next;
        if value == self.last {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(Address::from_raw(self.family, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match usize::try_from(self.last - self.next).ok().and_then(|n| n.checked_add(1)) {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for AddressIter {
    fn next_back(&mut self) -> Option<Address> {
        if self.done {
            return None;
        }
        let value = self.last;
        if value == self.next {
            self.done = true;
        } else {
            self.last -= 1;
        }
        Some(Address::from_raw(self.family, value))
    }
}
