//! Mutable sets of addresses, stored as a compacted list of networks.

use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::ops::{BitAnd, BitOr, BitXor, Sub};

use crate::address::Address;
use crate::cidr;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::glob::Glob;
use crate::interval::IntervalSet;
use crate::merge;
use crate::network::Network;
use crate::range::Range;

/// Interval bound able to express the exclusive end of the full IPv6 space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    At(u128),
    End,
}

impl Edge {
    fn after(last: u128) -> Edge {
        last.checked_add(1).map_or(Edge::End, Edge::At)
    }

    fn before(self) -> u128 {
        match self {
            Edge::At(value) => value - 1,
            Edge::End => u128::MAX,
        }
    }

    fn value(self) -> u128 {
        match self {
            Edge::At(value) => value,
            Edge::End => u128::MAX,
        }
    }
}

/// Anything that denotes a set of addresses of one family.
pub trait ToNetworks {
    fn to_networks(&self) -> Vec<Network>;
}

impl ToNetworks for Address {
    fn to_networks(&self) -> Vec<Network> {
        vec![Network::from(*self)]
    }
}

impl ToNetworks for Network {
    fn to_networks(&self) -> Vec<Network> {
        vec![self.cidr()]
    }
}

impl ToNetworks for Range {
    fn to_networks(&self) -> Vec<Network> {
        self.networks()
    }
}

impl ToNetworks for Glob {
    fn to_networks(&self) -> Vec<Network> {
        self.networks()
    }
}

impl ToNetworks for IpSet {
    fn to_networks(&self) -> Vec<Network> {
        self.members.iter().copied().collect()
    }
}

impl<T: ToNetworks + ?Sized> ToNetworks for &T {
    fn to_networks(&self) -> Vec<Network> {
        (**self).to_networks()
    }
}

/// A set of addresses of any families.
///
/// Members are kept as the minimal prefix-free cover, so two sets holding
/// the same addresses compare equal whatever way they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IpSet {
    members: BTreeSet<Network>,
}

impl IpSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_networks(networks: Vec<Network>) -> Self {
        IpSet {
            members: merge::summarize(networks).into_iter().collect(),
        }
    }

    pub fn add<T: ToNetworks>(&mut self, item: T) {
        *self = self.union(&Self::from_networks(item.to_networks()));
    }

    pub fn remove<T: ToNetworks>(&mut self, item: T) {
        *self = self.difference(&Self::from_networks(item.to_networks()));
    }

    /// Adds every item of `items` in one compaction.
    pub fn update<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: ToNetworks,
    {
        let networks = items.into_iter().flat_map(|item| item.to_networks()).collect();
        *self = self.union(&Self::from_networks(networks));
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn contains(&self, address: Address) -> bool {
        self.contains_network(&Network::from(address))
    }

    /// Whether every address of `network` is in the set.
    pub fn contains_network(&self, network: &Network) -> bool {
        // members are prefix-free, so only the greatest one not above the
        // probe can cover it
        let probe = network.cidr();
        self.members
            .range(..=probe)
            .next_back()
            .map_or(false, |member| member.contains_network(&probe))
    }

    /// Removes and returns the lowest member.
    pub fn pop(&mut self) -> Option<Network> {
        self.members.pop_first()
    }

    pub fn union(&self, other: &IpSet) -> IpSet {
        self.combine(other, IntervalSet::union)
    }

    pub fn intersection(&self, other: &IpSet) -> IpSet {
        self.combine(other, IntervalSet::intersection)
    }

    pub fn difference(&self, other: &IpSet) -> IpSet {
        self.combine(other, IntervalSet::difference)
    }

    pub fn symmetric_difference(&self, other: &IpSet) -> IpSet {
        self.combine(other, IntervalSet::symmetric_difference)
    }

    pub fn is_subset(&self, other: &IpSet) -> bool {
        self.members.iter().all(|n| other.contains_network(n))
    }

    pub fn is_superset(&self, other: &IpSet) -> bool {
        other.is_subset(self)
    }

    pub fn is_disjoint(&self, other: &IpSet) -> bool {
        self.intersection(other).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of member networks.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Number of addresses; `None` when it does not fit in a `u128`.
    pub fn size(&self) -> Option<u128> {
        self.members
            .iter()
            .try_fold(0u128, |total, n| total.checked_add(n.size()?))
    }

    /// Members in ascending order.
    pub fn networks(&self) -> btree_set::Iter<'_, Network> {
        self.members.iter()
    }

    /// Members joined into maximal contiguous ranges.
    pub fn ranges(&self) -> Vec<Range> {
        let mut ranges: Vec<Range> = Vec::new();
        for network in self.members.iter() {
            if let Some(last) = ranges.last_mut() {
                if last.family() == network.family()
                    && last.last_value().checked_add(1) == Some(network.first_value())
                {
                    *last = Range::from_raw(last.family(), last.first_value(), network.last_value());
                    continue;
                }
            }
            ranges.push(network.to_range());
        }
        ranges
    }

    pub fn is_contiguous(&self) -> bool {
        self.ranges().len() <= 1
    }

    /// The set as one range; fails unless it is non-empty and contiguous.
    pub fn to_range(&self) -> Result<Range> {
        match self.ranges().as_slice() {
            [range] => Ok(*range),
            [] => Err(AddrError::Conversion("an empty set has no range".to_owned())),
            _ => Err(AddrError::Conversion(format!("{} is not contiguous", self))),
        }
    }

    /// Every address, ascending.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.members.iter().flat_map(|n| n.iter())
    }

    /// Splits both operands by family, combines each family's intervals and
    /// decomposes the result back into networks.
    fn combine<F>(&self, other: &IpSet, op: F) -> IpSet
    where
        F: Fn(&IntervalSet<Edge>, &IntervalSet<Edge>) -> IntervalSet<Edge>,
    {
        let mut lhs = self.intervals();
        let mut rhs = other.intervals();
        let mut networks = Vec::new();
        for family in Family::ALL {
            let a = lhs.remove(&family).unwrap_or_default();
            let b = rhs.remove(&family).unwrap_or_default();
            if a.is_empty() && b.is_empty() {
                continue;
            }
            for &(start, end) in op(&a, &b).intervals() {
                networks.extend(cidr::range_networks(family, start.value(), end.before()));
            }
        }
        let result = Self::from_networks(networks);
        log::debug!(
            "set operation on {} and {} networks compacted to {}",
            self.len(),
            other.len(),
            result.len()
        );
        result
    }

    fn intervals(&self) -> BTreeMap<Family, IntervalSet<Edge>> {
        let mut by_family: BTreeMap<Family, Vec<(Edge, Edge)>> = BTreeMap::new();
        for n in self.members.iter() {
            by_family
                .entry(n.family())
                .or_insert_with(Vec::new)
                .push((Edge::At(n.first_value()), Edge::after(n.last_value())));
        }
        by_family
            .into_iter()
            .map(|(family, intervals)| (family, IntervalSet::from_intervals(intervals)))
            .collect()
    }
}

impl<T: ToNetworks> FromIterator<T> for IpSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_networks(iter.into_iter().flat_map(|item| item.to_networks()).collect())
    }
}

impl<T: ToNetworks> Extend<T> for IpSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<'a> IntoIterator for &'a IpSet {
    type Item = &'a Network;
    type IntoIter = btree_set::Iter<'a, Network>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl Display for IpSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, n) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", n)?;
        }
        write!(f, "}}")
    }
}

impl BitOr for &IpSet {
    type Output = IpSet;

    fn bitor(self, other: &IpSet) -> IpSet {
        self.union(other)
    }
}

impl BitAnd for &IpSet {
    type Output = IpSet;

    fn bitand(self, other: &IpSet) -> IpSet {
        self.intersection(other)
    }
}

impl Sub for &IpSet {
    type Output = IpSet;

    fn sub(self, other: &IpSet) -> IpSet {
        self.difference(other)
    }
}

impl BitXor for &IpSet {
    type Output = IpSet;

    fn bitxor(self, other: &IpSet) -> IpSet {
        self.symmetric_difference(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn set(list: &[&str]) -> IpSet {
        list.iter().map(|s| s.parse::<Network>().unwrap()).collect()
    }

    fn ip(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn compaction() {
        let s = set(&["192.0.2.0/25", "192.0.2.128/25", "192.0.2.7/32"]);
        assert_eq!(set(&["192.0.2.0/24"]), s);
        assert_eq!(1, s.len());
        assert_eq!(Some(256), s.size());
        assert_eq!("{192.0.2.0/24}", s.to_string());
        assert_eq!("{}", IpSet::new().to_string());
    }

    #[test]
    fn intersection() {
        let a = set(&["192.0.2.0/24"]);
        let b = set(&["192.0.2.128/25"]);
        assert_eq!(b, a.intersection(&b));
        assert_eq!(b, &a & &b);
        assert_eq!(set(&["192.0.2.0/25"]), &a - &b);
        assert_eq!(set(&["192.0.2.0/25"]), &a ^ &b);
        assert_eq!(a, &a | &b);
    }

    #[test]
    fn add_and_remove() {
        let mut s = IpSet::new();
        s.add("192.0.2.0/24".parse::<Network>().unwrap());
        s.remove(ip("192.0.2.128"));
        assert_eq!(
            vec!["192.0.2.0/25", "192.0.2.129/32", "192.0.2.130/31", "192.0.2.132/30",
                 "192.0.2.136/29", "192.0.2.144/28", "192.0.2.160/27", "192.0.2.192/26"],
            s.networks().map(|n| n.to_string()).collect::<Vec<_>>()
        );
        assert!(!s.contains(ip("192.0.2.128")));
        assert!(s.contains(ip("192.0.2.129")));
        s.add(ip("192.0.2.128"));
        assert_eq!(set(&["192.0.2.0/24"]), s);
        s.add("10.0.0.0-10.0.0.2".parse::<Range>().unwrap());
        assert_eq!(Some(259), s.size());
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn mixed_families() {
        let mut s = set(&["192.0.2.0/24", "2001:db8::/32"]);
        assert!(s.contains(ip("192.0.2.1")));
        assert!(s.contains(ip("2001:db8::1")));
        assert!(!s.contains(ip("::ffff:192.0.2.1")));
        s.update(vec![ip("00-1B-77-49-54-FD")]);
        assert_eq!(3, s.len());
        assert_eq!(3, s.ranges().len());
        assert!(!s.is_contiguous());
        assert!(s.to_range().is_err());
        assert_eq!(Some("192.0.2.0/24".parse().unwrap()), s.pop());
        assert_eq!(2, s.len());
    }

    #[test]
    fn whole_ipv6_space() {
        let all = set(&["::/0"]);
        assert_eq!(None, all.size());
        let rest = &all - &set(&["::/1"]);
        assert_eq!(set(&["8000::/1"]), rest);
        assert_eq!(all, &rest | &set(&["::/1"]));
        assert_eq!("::-ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff", all.to_range().unwrap().to_string());
    }

    #[test]
    fn ranges_and_contiguity() {
        let s = set(&["192.0.2.0/25", "192.0.2.128/26", "192.0.3.0/24"]);
        assert_eq!(
            vec!["192.0.2.0-192.0.2.191", "192.0.3.0-192.0.3.255"],
            s.ranges().iter().map(|r| r.to_string()).collect::<Vec<_>>()
        );
        let t = set(&["192.0.2.0/25", "192.0.2.128/26"]);
        assert!(t.is_contiguous());
        assert_eq!("192.0.2.0-192.0.2.191", t.to_range().unwrap().to_string());
        let u = set(&["192.0.2.254/31"]);
        let all: Vec<String> = u.addresses().map(|a| a.to_string()).collect();
        assert_eq!(vec!["192.0.2.254", "192.0.2.255"], all);
        assert!(IpSet::new().to_range().is_err());
    }

    #[test]
    fn relations() {
        let a = set(&["192.0.2.0/24"]);
        let b = set(&["192.0.2.64/26", "192.0.2.200/32"]);
        assert!(b.is_subset(&a));
        assert!(a.is_superset(&b));
        assert!(!a.is_subset(&b));
        assert!(a.is_disjoint(&set(&["192.0.3.0/24"])));
        assert!(!a.is_disjoint(&b));
        assert!(a.contains_network(&"192.0.2.128/25".parse().unwrap()));
        assert!(!a.contains_network(&"192.0.2.0/23".parse().unwrap()));
        assert!(IpSet::new().is_subset(&a));
    }

    fn arbitrary_set(raw: Vec<(u32, u8)>) -> IpSet {
        raw.into_iter()
            .map(|(ip, len)| Network::from_raw(Family::Ipv4, (ip & 0xffff) as u128 | 10 << 24, 16 + len % 17))
            .collect()
    }

    #[quickcheck]
    fn set_laws(a: Vec<(u32, u8)>, b: Vec<(u32, u8)>) -> bool {
        let (a, b) = (arbitrary_set(a), arbitrary_set(b));
        a.union(&b) == b.union(&a)
            && a.intersection(&a) == a
            && a.difference(&a).is_empty()
            && (&a - &b) == (&a - &(&a & &b))
            && (&a ^ &b) == (&(&a | &b) - &(&a & &b))
            && (&a | &b).size() == Some(a.size().unwrap() + (&b - &a).size().unwrap())
    }

    #[quickcheck]
    fn membership_matches_members(a: Vec<(u32, u8)>, probe: u16) -> bool {
        let s = arbitrary_set(a);
        let address = Address::from_raw(Family::Ipv4, probe as u128 | 10 << 24);
        s.contains(address) == s.networks().any(|n| n.contains(address))
    }
}
