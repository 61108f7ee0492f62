use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::{Error, ErrorKind};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

pub(crate) fn parse_ipv4(s: &str) -> Result<Ipv4Addr, Error> {
    let s = s.trim();
    Ipv4Addr::from_str(s).map_err(|_| Error::invalid_lexical("ip-v4-address", s))
}

pub(crate) fn parse_ipv6(s: &str) -> Result<Ipv6Addr, Error> {
    let s = s.trim();
    Ipv6Addr::from_str(s).map_err(|_| Error::invalid_lexical("ip-v6-address", s))
}

/// Parse either address family, IPv6 first.
pub(crate) fn parse_ip_address(s: &str) -> Result<AtomicItem, Error> {
    let v6 = match parse_ipv6(s) {
        Ok(ip) => return Ok(AtomicItem::Ipv6Address(ip)),
        Err(e) => e,
    };
    parse_ipv4(s).map(AtomicItem::Ipv4Address).map_err(|v4| {
        Error::combined(ErrorKind::InvalidLexicalValue, format!("'{}' is not an IP address", s.trim()), [v6, v4])
    })
}

pub(crate) fn cast_to_ipv4(item: &AtomicItem) -> Result<Ipv4Addr, Error> {
    match item {
        AtomicItem::Ipv4Address(ip) => Ok(*ip),
        other if other.is_string_like() => parse_ipv4(&other.as_string()),
        other => Err(cannot_cast(other, "ip-v4-address")),
    }
}

pub(crate) fn cast_to_ipv6(item: &AtomicItem) -> Result<Ipv6Addr, Error> {
    match item {
        AtomicItem::Ipv6Address(ip) => Ok(*ip),
        other if other.is_string_like() => parse_ipv6(&other.as_string()),
        other => Err(cannot_cast(other, "ip-v6-address")),
    }
}

pub(crate) fn cast_to_ip_address(item: &AtomicItem) -> Result<AtomicItem, Error> {
    match item {
        AtomicItem::Ipv4Address(_) | AtomicItem::Ipv6Address(_) => Ok(item.clone()),
        other if other.is_string_like() => parse_ip_address(&other.as_string()),
        other => Err(cannot_cast(other, "ip-address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("192.168.0.1", true)]
    #[case("256.0.0.1", false)]
    #[case("::1", false)]
    fn ipv4_lexical_space(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_ipv4(input).is_ok(), valid);
    }

    #[rstest]
    fn ip_address_tries_both_families() {
        assert!(matches!(parse_ip_address("2001:db8::1").unwrap(), AtomicItem::Ipv6Address(_)));
        assert!(matches!(parse_ip_address("10.0.0.1").unwrap(), AtomicItem::Ipv4Address(_)));
        let err = parse_ip_address("not-an-ip").unwrap_err();
        assert_eq!(err.causes.len(), 2);
    }
}
