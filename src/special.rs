//! Well-known address blocks used by `Address` classification.

use crate::family::Family;

/// (network, prefixlen) pairs.
type Blocks = &'static [(u128, u8)];

const V4_LOOPBACK: Blocks = &[(0x7f00_0000, 8)];
const V6_LOOPBACK: Blocks = &[(1, 128)];

const V4_PRIVATE: Blocks = &[(0x0a00_0000, 8), (0xac10_0000, 12), (0xc0a8_0000, 16)];
const V6_PRIVATE: Blocks = &[(0xfc00 << 112, 7)];

const V4_LINK_LOCAL: Blocks = &[(0xa9fe_0000, 16)];
const V6_LINK_LOCAL: Blocks = &[(0xfe80 << 112, 10)];

const V4_MULTICAST: Blocks = &[(0xe000_0000, 4)];
const V6_MULTICAST: Blocks = &[(0xff00 << 112, 8)];

const V4_RESERVED: Blocks = &[
    (0x0000_0000, 8),
    (0xc000_0200, 24),
    (0xc633_6400, 24),
    (0xcb00_7100, 24),
    (0xf000_0000, 4),
];
const V6_RESERVED: Blocks = &[
    (0xff00 << 112, 12),
    (0x0000 << 112, 8),
    (0x0100 << 112, 8),
    (0x0200 << 112, 7),
    (0x0400 << 112, 6),
    (0x0800 << 112, 5),
    (0x1000 << 112, 4),
    (0x4000 << 112, 3),
    (0x6000 << 112, 3),
    (0x8000 << 112, 3),
    (0xa000 << 112, 3),
    (0xc000 << 112, 3),
    (0xe000 << 112, 4),
    (0xf000 << 112, 5),
    (0xf800 << 112, 6),
    (0xfe00 << 112, 9),
];

#[derive(Debug, Clone, Copy)]
pub(crate) enum Class {
    Loopback,
    Private,
    LinkLocal,
    Multicast,
    Reserved,
}

fn blocks(family: Family, class: Class) -> Blocks {
    match (family, class) {
        (Family::Ipv4, Class::Loopback) => V4_LOOPBACK,
        (Family::Ipv6, Class::Loopback) => V6_LOOPBACK,
        (Family::Ipv4, Class::Private) => V4_PRIVATE,
        (Family::Ipv6, Class::Private) => V6_PRIVATE,
        (Family::Ipv4, Class::LinkLocal) => V4_LINK_LOCAL,
        (Family::Ipv6, Class::LinkLocal) => V6_LINK_LOCAL,
        (Family::Ipv4, Class::Multicast) => V4_MULTICAST,
        (Family::Ipv6, Class::Multicast) => V6_MULTICAST,
        (Family::Ipv4, Class::Reserved) => V4_RESERVED,
        (Family::Ipv6, Class::Reserved) => V6_RESERVED,
        _ => &[],
    }
}

pub(crate) fn is_in(family: Family, value: u128, class: Class) -> bool {
    blocks(family, class)
        .iter()
        .any(|&(net, prefixlen)| value & family.netmask(prefixlen) == net)
}
