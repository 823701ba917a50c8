//! Prefix merging: collapses any collection of networks into the minimal
//! prefix-free cover of the same addresses.
//!
//! Networks are handled as bit prefixes. Ordering networks by
//! `(family, network address, prefix length)` is the lexicographic order of
//! their prefix strings, so one sorted scan sees every covered network right
//! after its cover, and every sibling right after its twin.

use crate::network::Network;

/// Minimal sorted list of networks covering exactly the union of the inputs.
///
/// Families are never combined: the output lists IPv4 blocks first, then
/// IPv6, then the link-layer families.
pub fn summarize<I: IntoIterator<Item = Network>>(networks: I) -> Vec<Network> {
    let mut prefixes: Vec<Network> = networks.into_iter().map(|n| n.cidr()).collect();
    prefixes.sort();
    prefixes.dedup();
    let input = prefixes.len();

    let mut passes = 0;
    loop {
        passes += 1;
        let (next, changed) = fold(prefixes);
        prefixes = next;
        if !changed {
            break;
        }
    }

    log::trace!(
        "summarized {} networks into {} in {} passes",
        input,
        prefixes.len(),
        passes
    );
    prefixes
}

/// One left-to-right pass. A candidate either merges with the last output
/// into their parent, is dropped because the last output covers it, or is
/// appended. The output stays sorted.
fn fold(prefixes: Vec<Network>) -> (Vec<Network>, bool) {
    let mut out: Vec<Network> = Vec::with_capacity(prefixes.len());
    let mut changed = false;
    for candidate in prefixes {
        if let Some(last) = out.last_mut() {
            if let Some(parent) = parent_of_siblings(last, &candidate) {
                *last = parent;
                changed = true;
                continue;
            }
            if last.contains_network(&candidate) {
                changed = true;
                continue;
            }
        }
        out.push(candidate);
    }
    (out, changed)
}

/// `P` when `left` is `P0` and `right` is `P1`.
fn parent_of_siblings(left: &Network, right: &Network) -> Option<Network> {
    let family = left.family();
    let prefixlen = left.prefixlen();
    if family != right.family() || prefixlen != right.prefixlen() || prefixlen == 0 {
        return None;
    }
    let bit = 1u128 << (family.width() - prefixlen);
    if left.first_value() & bit == 0 && right.first_value() == left.first_value() | bit {
        Some(Network::from_raw(family, left.first_value(), prefixlen - 1))
    } else {
        None
    }
}
