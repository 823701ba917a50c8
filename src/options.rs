//! Parsing and formatting options.
//!
//! Every lenient behaviour is an explicit opt-in: `ParseOptions::default()` is
//! the strictest mode.

/// Options accepted by the `*_with` parsing entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Accept legacy `inet_aton` IPv4 forms such as `127.1` or `0x7f.0.0.1`.
    pub inet_aton: bool,
    /// Strip leading zeros from IPv4 octets (`192.000.002.001`).
    pub zerofill: bool,
    /// Accept classful abbreviated IPv4 networks such as `10` or `192.168/16`.
    pub implicit_prefix: bool,
    /// Reject networks whose address has host bits set.
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inet_aton(mut self, on: bool) -> Self {
        self.inet_aton = on;
        self
    }

    pub fn zerofill(mut self, on: bool) -> Self {
        self.zerofill = on;
        self
    }

    pub fn implicit_prefix(mut self, on: bool) -> Self {
        self.implicit_prefix = on;
        self
    }

    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }
}

/// IPv6 text dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv6Format {
    /// Longest zero run replaced by `::`, IPv4 suffix for mapped/compatible
    /// addresses.
    Compact,
    /// Eight unpadded words, no `::`.
    Full,
    /// Eight words zero padded to four digits.
    Verbose,
}

impl Default for Ipv6Format {
    fn default() -> Self {
        Ipv6Format::Compact
    }
}

/// Link-layer text dialect.
///
/// The address is cut into `width / word_size` words, each written in hex and
/// joined by `separator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EuiDialect {
    pub word_size: u8,
    pub separator: &'static str,
    pub uppercase: bool,
    pub zero_pad: bool,
}

impl EuiDialect {
    const fn new(word_size: u8, separator: &'static str, uppercase: bool, zero_pad: bool) -> Self {
        EuiDialect {
            word_size,
            separator,
            uppercase,
            zero_pad,
        }
    }
}

/// `00-1B-77-49-54-FD`
pub const MAC_EUI48: EuiDialect = EuiDialect::new(8, "-", true, true);
/// `0:1b:77:49:54:fd`
pub const MAC_UNIX: EuiDialect = EuiDialect::new(8, ":", false, false);
/// `00:1b:77:49:54:fd`
pub const MAC_UNIX_EXPANDED: EuiDialect = EuiDialect::new(8, ":", false, true);
/// `001b.7749.54fd`
pub const MAC_CISCO: EuiDialect = EuiDialect::new(16, ".", false, true);
/// `001B774954FD`
pub const MAC_BARE: EuiDialect = EuiDialect::new(48, "", true, true);
/// `001b77:4954fd`
pub const MAC_PGSQL: EuiDialect = EuiDialect::new(24, ":", false, true);

/// `00-1B-77-FF-FE-49-54-FD`
pub const EUI64_BASE: EuiDialect = EuiDialect::new(8, "-", true, true);
pub const EUI64_UNIX: EuiDialect = EuiDialect::new(8, ":", false, false);
pub const EUI64_UNIX_EXPANDED: EuiDialect = EuiDialect::new(8, ":", false, true);
pub const EUI64_CISCO: EuiDialect = EuiDialect::new(16, ".", false, true);
pub const EUI64_BARE: EuiDialect = EuiDialect::new(64, "", true, true);
