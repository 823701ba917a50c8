use std::fmt::{self, Display, Formatter};

/// Address family: the static description of one address width.
///
/// Ordering follows declaration order, so mixed collections sort IPv4 before
/// IPv6 before the link-layer families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Ipv4,
    Ipv6,
    Eui48,
    Eui64,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Ipv4, Family::Ipv6, Family::Eui48, Family::Eui64];

    /// Number of bits in an address.
    pub const fn width(self) -> u8 {
        match self {
            Family::Ipv4 => 32,
            Family::Ipv6 => 128,
            Family::Eui48 => 48,
            Family::Eui64 => 64,
        }
    }

    /// Bits per word of the canonical word tuple.
    pub const fn word_size(self) -> u8 {
        match self {
            Family::Ipv6 => 16,
            _ => 8,
        }
    }

    pub const fn num_words(self) -> usize {
        (self.width() / self.word_size()) as usize
    }

    /// Word separator of the default textual form.
    pub const fn separator(self) -> char {
        match self {
            Family::Ipv4 => '.',
            Family::Ipv6 => ':',
            Family::Eui48 | Family::Eui64 => '-',
        }
    }

    /// Radix words are written in.
    pub const fn numeric_base(self) -> u32 {
        match self {
            Family::Ipv4 => 10,
            _ => 16,
        }
    }

    /// Largest address value, `2^width - 1`.
    pub const fn max_value(self) -> u128 {
        match self.width() {
            128 => u128::MAX,
            w => (1u128 << w) - 1,
        }
    }

    pub const fn max_word(self) -> u16 {
        match self.word_size() {
            16 => u16::MAX,
            w => (1u16 << w) - 1,
        }
    }

    /// Length of the packed big-endian encoding.
    pub const fn packed_len(self) -> usize {
        (self.width() / 8) as usize
    }

    pub const fn is_ip(self) -> bool {
        matches!(self, Family::Ipv4 | Family::Ipv6)
    }

    pub const fn version(self) -> Option<u8> {
        match self {
            Family::Ipv4 => Some(4),
            Family::Ipv6 => Some(6),
            _ => None,
        }
    }

    /// Mask with the low `width - prefixlen` bits set; `None` when
    /// `prefixlen` exceeds the width.
    pub const fn checked_hostmask(self, prefixlen: u8) -> Option<u128> {
        if prefixlen > self.width() {
            None
        } else {
            Some(self.hostmask(prefixlen))
        }
    }

    /// Mask with the high `prefixlen` bits of the family's width set; `None`
    /// when `prefixlen` exceeds the width.
    pub const fn checked_netmask(self, prefixlen: u8) -> Option<u128> {
        if prefixlen > self.width() {
            None
        } else {
            Some(self.netmask(prefixlen))
        }
    }

    /// Caller guarantees `prefixlen <= width`.
    pub(crate) const fn hostmask(self, prefixlen: u8) -> u128 {
        match self.width() - prefixlen {
            128 => u128::MAX,
            bits => (1u128 << bits) - 1,
        }
    }

    /// Caller guarantees `prefixlen <= width`.
    pub(crate) const fn netmask(self, prefixlen: u8) -> u128 {
        self.max_value() & !self.hostmask(prefixlen)
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            Family::Ipv4 => "IPv4",
            Family::Ipv6 => "IPv6",
            Family::Eui48 => "EUI-48",
            Family::Eui64 => "EUI-64",
        };
        f.write_str(name)
    }
}
