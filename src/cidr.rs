//! CIDR arithmetic over ranges: spanning networks, range decomposition and
//! exclusion.

use crate::address::Address;
use crate::error::{AddrError, Result};
use crate::family::Family;
use crate::network::Network;

/// Smallest network containing every given address.
pub fn spanning_network<I: IntoIterator<Item = Address>>(addresses: I) -> Result<Network> {
    let mut iter = addresses.into_iter();
    let seed = iter
        .next()
        .ok_or_else(|| AddrError::Range("a spanning network needs at least one address".to_owned()))?;
    let (mut lo, mut hi) = (seed.value(), seed.value());
    for address in iter {
        AddrError::check_family(seed.family(), address.family())?;
        lo = lo.min(address.value());
        hi = hi.max(address.value());
    }
    Ok(span(seed.family(), lo, hi))
}

/// Widens the prefix until `lo` and `hi` fall in the same block, i.e. keeps
/// the bits the two endpoints share.
pub(crate) fn span(family: Family, lo: u128, hi: u128) -> Network {
    let differing = 128 - (lo ^ hi).leading_zeros() as u8;
    let prefixlen = family.width() - differing;
    Network::from_raw(family, lo & family.netmask(prefixlen), prefixlen)
}

/// Minimal ordered list of networks covering exactly `[first, last]`.
pub fn range_to_networks(first: Address, last: Address) -> Result<Vec<Network>> {
    AddrError::check_family(first.family(), last.family())?;
    if first > last {
        return Err(AddrError::Range(format!(
            "lower bound {} is above upper bound {}",
            first, last
        )));
    }
    Ok(range_networks(first.family(), first.value(), last.value()))
}

/// Caller guarantees `first <= last`.
pub(crate) fn range_networks(family: Family, first: u128, last: u128) -> Vec<Network> {
    let width = family.width();
    let mut networks = Vec::new();
    let mut span = span(family, first, last);

    if span.first_value() < first {
        let hole = Network::from_raw(family, first - 1, width);
        let (_, mut above) = split(&span, &hole);
        match above.pop() {
            Some(top) => {
                networks = above;
                span = top;
            }
            None => return networks,
        }
    }
    if span.last_value() > last {
        let hole = Network::from_raw(family, last + 1, width);
        let (below, _) = split(&span, &hole);
        networks.extend(below);
    } else {
        networks.push(span);
    }

    log::trace!(
        "{}-{} decomposed into {} networks",
        crate::codec::format(family, first),
        crate::codec::format(family, last),
        networks.len()
    );
    networks
}

/// Bisects `target` until the half holding `hole` is `hole` itself. Returns
/// the halves left below and above it, each in ascending order. The caller
/// guarantees that `target` contains `hole`.
fn split(target: &Network, hole: &Network) -> (Vec<Network>, Vec<Network>) {
    let family = target.family();
    let width = family.width();
    let hole_first = hole.first_value();
    let (mut base, mut prefixlen) = (target.first_value(), target.prefixlen());
    let mut below = Vec::new();
    let mut above = Vec::new();

    while prefixlen < hole.prefixlen() {
        prefixlen += 1;
        let upper = base | (1u128 << (width - prefixlen));
        if hole_first >= upper {
            below.push(Network::from_raw(family, base, prefixlen));
            base = upper;
        } else {
            above.push(Network::from_raw(family, upper, prefixlen));
        }
    }
    above.reverse();
    (below, above)
}

/// `target` minus `hole`, as the networks lying below the hole and those
/// lying above it.
pub fn partition(target: &Network, hole: &Network) -> Result<(Vec<Network>, Vec<Network>)> {
    AddrError::check_family(target.family(), hole.family())?;
    if hole.contains_network(target) {
        return Ok((Vec::new(), Vec::new()));
    }
    if !target.contains_network(hole) {
        return Ok(if hole.first_value() > target.last_value() {
            (vec![target.cidr()], Vec::new())
        } else {
            (Vec::new(), vec![target.cidr()])
        });
    }
    Ok(split(target, hole))
}

/// `target` minus `hole`, ascending.
pub fn exclude(target: &Network, hole: &Network) -> Result<Vec<Network>> {
    let (mut below, above) = partition(target, hole)?;
    below.extend(above);
    Ok(below)
}

/// Every network in `networks` containing `address`, sorted.
pub fn all_matching_networks(address: Address, networks: &[Network]) -> Vec<Network> {
    let mut matches: Vec<Network> = networks.iter().filter(|n| n.contains(address)).copied().collect();
    matches.sort();
    matches
}

/// The most specific network containing `address`.
pub fn smallest_matching_network(address: Address, networks: &[Network]) -> Option<Network> {
    all_matching_networks(address, networks).pop()
}

/// The least specific network containing `address`.
pub fn largest_matching_network(address: Address, networks: &[Network]) -> Option<Network> {
    all_matching_networks(address, networks).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn net(s: &str) -> Network {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> Address {
        Address::parse_ip(s).unwrap()
    }

    fn strings(networks: &[Network]) -> Vec<String> {
        networks.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn spanning() {
        let span = spanning_network(vec![ip("192.0.2.1"), ip("192.0.2.14")]).unwrap();
        assert_eq!(net("192.0.2.0/28"), span);
        assert_eq!(net("192.0.2.7/32"), spanning_network(vec![ip("192.0.2.7")]).unwrap());
        assert_eq!(net("0.0.0.0/0"), spanning_network(vec![ip("0.0.0.0"), ip("255.255.255.255")]).unwrap());
        assert_eq!(net("::/0"), spanning_network(vec![ip("::"), ip("8000::")]).unwrap());
        assert!(spanning_network(vec![ip("192.0.2.1"), ip("::1")]).is_err());
        assert!(spanning_network(Vec::new()).is_err());
    }

    #[test]
    fn decomposition() {
        let networks = range_to_networks(ip("192.0.2.1"), ip("192.0.2.14")).unwrap();
        assert_eq!(
            vec![
                "192.0.2.1/32",
                "192.0.2.2/31",
                "192.0.2.4/30",
                "192.0.2.8/29",
                "192.0.2.12/31",
                "192.0.2.14/32"
            ],
            strings(&networks)
        );
        assert_eq!(
            vec!["192.0.2.0/24"],
            strings(&range_to_networks(ip("192.0.2.0"), ip("192.0.2.255")).unwrap())
        );
        assert_eq!(
            vec!["192.0.2.255/32", "192.0.3.0/32"],
            strings(&range_to_networks(ip("192.0.2.255"), ip("192.0.3.0")).unwrap())
        );
        assert_eq!(
            vec!["::/1", "8000::/2", "c000::/3"],
            strings(&range_to_networks(ip("::"), ip("dfff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")).unwrap())
        );
        assert!(range_to_networks(ip("192.0.2.14"), ip("192.0.2.1")).is_err());
        assert!(range_to_networks(ip("192.0.2.1"), ip("::1")).is_err());
    }

    #[test]
    fn exclusion() {
        assert_eq!(
            vec!["192.0.2.0/25"],
            strings(&exclude(&net("192.0.2.0/24"), &net("192.0.2.128/25")).unwrap())
        );
        assert_eq!(
            vec![
                "192.0.2.0/26",
                "192.0.2.64/27",
                "192.0.2.97/32",
                "192.0.2.98/31",
                "192.0.2.100/30",
                "192.0.2.104/29",
                "192.0.2.112/28",
                "192.0.2.128/25"
            ],
            strings(&exclude(&net("192.0.2.0/24"), &net("192.0.2.96/32")).unwrap())
        );
        assert_eq!(
            vec!["192.0.2.0/24"],
            strings(&exclude(&net("192.0.2.0/24"), &net("192.0.3.0/24")).unwrap())
        );
        assert!(exclude(&net("192.0.2.0/24"), &net("192.0.0.0/16")).unwrap().is_empty());
        assert!(exclude(&net("192.0.2.0/24"), &net("192.0.2.0/24")).unwrap().is_empty());
        assert!(exclude(&net("192.0.2.0/24"), &net("::/0")).is_err());
    }

    #[test]
    fn partitioning() {
        let (below, above) = partition(&net("192.0.2.0/24"), &net("192.0.2.64/26")).unwrap();
        assert_eq!(vec!["192.0.2.0/26"], strings(&below));
        assert_eq!(vec!["192.0.2.128/25"], strings(&above));
        let (below, above) = partition(&net("192.0.2.0/24"), &net("10.0.0.0/8")).unwrap();
        assert!(below.is_empty());
        assert_eq!(vec!["192.0.2.0/24"], strings(&above));
    }

    #[test]
    fn matching() {
        let networks = vec![net("192.0.2.0/24"), net("192.0.0.0/16"), net("192.0.2.0/28"), net("10.0.0.0/8")];
        let a = ip("192.0.2.1");
        assert_eq!(
            vec!["192.0.0.0/16", "192.0.2.0/24", "192.0.2.0/28"],
            strings(&all_matching_networks(a, &networks))
        );
        assert_eq!(Some(net("192.0.2.0/28")), smallest_matching_network(a, &networks));
        assert_eq!(Some(net("192.0.0.0/16")), largest_matching_network(a, &networks));
        assert_eq!(None, smallest_matching_network(ip("172.16.0.1"), &networks));
    }

    /// Covered addresses are exactly the range, pieces are ascending and
    /// disjoint, and no two neighbours could merge into one block.
    fn check_decomposition(family: Family, first: u128, last: u128) -> bool {
        let networks = range_networks(family, first, last);
        let mut expected = first;
        for n in networks.iter() {
            if n.first_value() != expected {
                return false;
            }
            expected = n.last_value().wrapping_add(1);
        }
        let contiguous = networks.last().map(|n| n.last_value()) == Some(last);
        let minimal = networks.windows(2).all(|pair| {
            let (a, b) = (pair[0], pair[1]);
            !(a.prefixlen() == b.prefixlen()
                && a.prefixlen() > 0
                && a.first_value() & (1u128 << (family.width() - a.prefixlen())) == 0
                && b.first_value() == a.first_value() | (1u128 << (family.width() - a.prefixlen())))
        });
        contiguous && minimal
    }

    #[quickcheck]
    fn decomposition_is_exact_ipv4(a: u32, b: u32) -> bool {
        let (first, last) = (a.min(b) as u128, a.max(b) as u128);
        check_decomposition(Family::Ipv4, first, last)
    }

    #[quickcheck]
    fn decomposition_is_exact_ipv6(a: u128, b: u128) -> bool {
        check_decomposition(Family::Ipv6, a.min(b), a.max(b))
    }

    #[quickcheck]
    fn exclusion_is_exact(ip: u32, outer: u8, inner: u8) -> bool {
        let outer = outer % 33;
        let inner = outer + inner % (33 - outer);
        let target = Network::from_raw(Family::Ipv4, ip as u128, outer).cidr();
        let hole = Network::from_raw(Family::Ipv4, ip as u128, inner).cidr();
        let rest = exclude(&target, &hole).unwrap();
        let covered: u128 = rest.iter().map(|n| n.size().unwrap()).sum();
        covered + hole.size().unwrap() == target.size().unwrap()
            && rest.iter().all(|n| target.contains_network(n) && !n.overlaps(&hole))
            && rest.windows(2).all(|pair| pair[0].last_value() < pair[1].first_value())
    }
}
