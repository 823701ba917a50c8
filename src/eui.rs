//! IEEE link-layer identifiers: OUI/IAB extraction, EUI-64 expansion and the
//! registry contract used by OUI lookups.

use std::collections::HashMap;

use crate::address::Address;
use crate::error::{AddrError, Result};
use crate::family::Family;

/// IAB blocks are carved out of these two OUIs.
const IAB_OUIS: [u128; 2] = [0x0050c2, 0x40d855];

const LINK_LOCAL: u128 = 0xfe80 << 112;

impl Address {
    fn require_eui(&self) -> Result<()> {
        match self.family() {
            Family::Eui48 | Family::Eui64 => Ok(()),
            other => Err(AddrError::TypeMismatch(Family::Eui48, other)),
        }
    }

    /// Organisationally unique identifier, the top 24 bits.
    pub fn oui(&self) -> Result<u32> {
        self.require_eui()?;
        Ok((self.value() >> (self.family().width() - 24)) as u32)
    }

    /// Extension identifier, the bits after the OUI.
    pub fn ei(&self) -> Result<u64> {
        self.require_eui()?;
        Ok((self.value() & self.family().hostmask(24)) as u64)
    }

    pub fn is_iab(&self) -> bool {
        self.family() == Family::Eui48 && IAB_OUIS.contains(&(self.value() >> 24))
    }

    /// The 36-bit IAB prefix of an EUI-48 inside an IAB block.
    pub fn iab(&self) -> Result<u64> {
        if !self.is_iab() {
            return Err(AddrError::Conversion(format!("{} is not an IAB address", self)));
        }
        Ok((self.value() >> 12) as u64)
    }

    /// EUI-64 form: `FF-FE` inserted after the OUI of an EUI-48.
    pub fn eui64(&self) -> Result<Address> {
        match self.family() {
            Family::Eui48 => {
                let v = self.value();
                Ok(Address::from_raw(
                    Family::Eui64,
                    ((v >> 24) << 40) | (0xfffe << 24) | (v & 0xff_ffff),
                ))
            }
            Family::Eui64 => Ok(*self),
            other => Err(AddrError::TypeMismatch(Family::Eui48, other)),
        }
    }

    /// EUI-64 with the universal/local bit inverted, as used in IPv6
    /// interface identifiers.
    pub fn modified_eui64(&self) -> Result<Address> {
        let eui = self.eui64()?;
        Ok(Address::from_raw(Family::Eui64, eui.value() ^ (1 << 57)))
    }

    /// IPv6 address formed from the top 64 bits of `prefix` and the modified
    /// EUI-64 interface identifier.
    pub fn ipv6_from_prefix(&self, prefix: Address) -> Result<Address> {
        AddrError::check_family(Family::Ipv6, prefix.family())?;
        let interface = self.modified_eui64()?.value();
        Ok(Address::from_raw(
            Family::Ipv6,
            (prefix.value() & Family::Ipv6.netmask(64)) | interface,
        ))
    }

    /// `fe80::/64` plus the modified EUI-64.
    pub fn ipv6_link_local(&self) -> Result<Address> {
        self.ipv6_from_prefix(Address::from_raw(Family::Ipv6, LINK_LOCAL))
    }
}

/// One organisation entry of an OUI/IAB registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organisation {
    pub org: String,
    pub address: Vec<String>,
}

/// Lookup by integer OUI or IAB prefix. Loading the registry is the
/// implementor's business.
pub trait OuiRegistry {
    fn lookup(&self, prefix: u64) -> &[Organisation];

    fn organisations(&self, address: &Address) -> Result<&[Organisation]> {
        let prefix = match address.iab() {
            Ok(iab) => iab,
            Err(_) => address.oui()? as u64,
        };
        Ok(self.lookup(prefix))
    }
}

/// In-memory registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    entries: HashMap<u64, Vec<Organisation>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: u64, organisation: Organisation) {
        self.entries.entry(prefix).or_insert_with(Vec::new).push(organisation);
    }
}

impl OuiRegistry for MemoryRegistry {
    fn lookup(&self, prefix: u64) -> &[Organisation] {
        self.entries.get(&prefix).map(Vec::as_slice).unwrap_or(&[])
    }
}
