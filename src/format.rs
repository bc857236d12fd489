//! The six draft-04 `format` checks.
//!
//! Each check is syntactic only: no DNS lookups, no deliverability probing.
//! Unknown format names always fail, which is how draft-04 schemas surface a
//! typo in `format`.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::errors::Error;
use crate::schema::Format;

pub fn check(format: &Format, s: &str) -> Result<(), Error> {
    match format {
        Format::DateTime => match chrono::DateTime::parse_from_rfc3339(s) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::InvalidFormat),
        },
        Format::Email => {
            if is_email(s) {
                Ok(())
            } else {
                Err(Error::InvalidFormat)
            }
        }
        Format::Hostname => {
            if is_hostname(s) {
                Ok(())
            } else {
                Err(Error::InvalidHostname)
            }
        }
        Format::Ipv4 => check_ipv4(s),
        Format::Ipv6 => check_ipv6(s),
        Format::Uri => match url::Url::parse(s) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::InvalidFormat),
        },
        Format::Other(_) => Err(Error::InvalidFormat),
    }
}

/// RFC 1035 host name: dot-separated labels of letters, digits, and interior
/// hyphens; labels at most 63 octets, the whole name at most 255; at least
/// one letter somewhere.
pub fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 255 {
        return false;
    }
    let mut last = b'.';
    let mut seen_letter = false;
    let mut label_len = 0usize;
    for &c in s.as_bytes() {
        match c {
            b'a'..=b'z' | b'A'..=b'Z' => {
                seen_letter = true;
                label_len += 1;
            }
            b'0'..=b'9' => {
                label_len += 1;
            }
            b'-' => {
                // A label cannot start with a hyphen.
                if last == b'.' {
                    return false;
                }
                label_len += 1;
            }
            b'.' => {
                if last == b'.' || last == b'-' {
                    return false;
                }
                if label_len == 0 || label_len > 63 {
                    return false;
                }
                label_len = 0;
            }
            _ => return false,
        }
        last = c;
    }
    if last == b'-' || label_len > 63 {
        return false;
    }
    seen_letter
}

fn check_ipv4(s: &str) -> Result<(), Error> {
    // Dotted quad only: digits and dots, then a real parse.
    if !s.bytes().all(|b| b == b'.' || b.is_ascii_digit()) {
        return Err(Error::InvalidIpv4);
    }
    match s.parse::<Ipv4Addr>() {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::InvalidIpv4),
    }
}

fn check_ipv6(s: &str) -> Result<(), Error> {
    // Colons and hex digits only, then a real parse.
    if !s.bytes().all(|b| b == b':' || b.is_ascii_hexdigit()) {
        return Err(Error::InvalidIpv6);
    }
    match s.parse::<Ipv6Addr>() {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::InvalidIpv6),
    }
}

/// RFC 5322 addr-spec: `local@domain` where the local part is a dot-atom or
/// quoted string and the domain is a host name or a bracketed IP literal.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    is_local_part(local) && is_email_domain(domain)
}

fn is_local_part(s: &str) -> bool {
    if s.is_empty() || s.len() > 64 {
        return false;
    }
    if s.starts_with('"') {
        return is_quoted_local(s);
    }
    if s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| c == '.' || is_atext(c))
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

fn is_quoted_local(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[bytes.len() - 1] != b'"' {
        return false;
    }
    let inner = &bytes[1..bytes.len() - 1];
    let mut i = 0;
    while i < inner.len() {
        match inner[i] {
            b'\\' => {
                if i + 1 >= inner.len() {
                    return false;
                }
                i += 2;
            }
            b'"' => return false,
            0x20..=0x7E => i += 1,
            _ => return false,
        }
    }
    true
}

fn is_email_domain(s: &str) -> bool {
    if let Some(lit) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        if let Some(v6) = lit.strip_prefix("IPv6:") {
            return v6.parse::<Ipv6Addr>().is_ok();
        }
        return lit.parse::<Ipv4Addr>().is_ok();
    }
    is_hostname(s)
}
