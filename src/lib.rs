//! Network address manipulation for IPv4, IPv6, EUI-48 and EUI-64.
//!
//! Every address is a `(Family, u128)` pair, so one set of algorithms serves
//! all four families:
//!
//! ```
//! use netaddr::{summarize, Address, IpSet, Network};
//!
//! let ip: Address = "192.0.2.1".parse().unwrap();
//! assert_eq!(3221225985, ip.value());
//!
//! let merged = summarize(vec![
//!     "192.0.2.0/23".parse::<Network>().unwrap(),
//!     "192.0.3.0/24".parse::<Network>().unwrap(),
//! ]);
//! assert_eq!("192.0.2.0/23", merged[0].to_string());
//!
//! let set: IpSet = merged.into_iter().collect();
//! assert!(set.contains("192.0.3.7".parse().unwrap()));
//! ```

pub mod address;
pub mod cidr;
pub mod codec;
pub mod error;
pub mod eui;
pub mod family;
pub mod glob;
pub mod interval;
pub mod ipset;
pub mod merge;
pub mod network;
pub mod options;
pub mod range;
mod special;

pub use address::Address;
pub use cidr::{
    all_matching_networks, exclude, largest_matching_network, partition, range_to_networks,
    smallest_matching_network, spanning_network,
};
pub use error::{AddrError, Result};
pub use eui::{MemoryRegistry, Organisation, OuiRegistry};
pub use family::Family;
pub use glob::{network_to_glob, range_to_globs, valid_glob, Glob};
pub use interval::IntervalSet;
pub use ipset::{IpSet, ToNetworks};
pub use merge::summarize;
pub use network::{expand_abbreviated_cidr, Network, Subnets};
pub use options::{EuiDialect, Ipv6Format, ParseOptions};
pub use range::{AddressIter, Range};
