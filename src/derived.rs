//! Derived mappings (spec.md §4.4): logical types that reuse an existing
//! wire tag rather than adding a new one. Each of these is a convention
//! layered on top of [`crate::element::Value`], not a new [`crate::marker::Tag`] —
//! exactly the same relationship the teacher's `value.rs` draws between its
//! schema-level convenience types and its wire-level `Element` variants.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::element::Value;
use crate::error::Error;
use crate::integer::Integer;
use crate::reader::FromElement;

/// Encode a `bool` the way spec.md §4.4 requires: `false` packs as the
/// integer `0` (tag `0x14`, no payload byte); `true` packs as the integer
/// `1` (tag `0x15`, payload `0x01`). There is no dedicated boolean tag.
pub fn bool_to_value(b: bool) -> Value {
    Value::Int(Integer::from(if b { 1i64 } else { 0i64 }))
}

/// Decode a `bool` per spec.md §4.4's liberal fallback table: any integer
/// other than exactly `0` is `true`; an empty byte/unicode string is
/// `false` and a nonempty one is `true`; a float of `0.0` is `false` and
/// any other float is `true`. No variant is rejected as malformed — the
/// open question of whether to reject unrecognized "truthy" encodings was
/// decided in favor of matching the table literally (see DESIGN.md).
pub fn value_to_bool(v: &Value) -> bool {
    match v {
        Value::Int(n) => n.as_i64() != Some(0),
        Value::Bytes(b) => !b.is_empty(),
        Value::Unicode(s) => !s.is_empty(),
        Value::Float(f) => *f != 0.0,
        Value::Double(d) => *d != 0.0,
        Value::Null => false,
        Value::Uuid128(_) | Value::Uuid64(_) | Value::Tuple(_) => true,
    }
}

impl FromElement for bool {
    fn from_element(value: Value) -> crate::error::Result<Self> {
        Ok(value_to_bool(&value))
    }
}

/// Encode a single `char` as a one-character unicode string, the same
/// wire shape `String::from_element` already round-trips through.
pub fn char_to_value(c: char) -> Value {
    Value::Unicode(c.to_string())
}

impl FromElement for char {
    fn from_element(value: Value) -> crate::error::Result<Self> {
        match value {
            Value::Unicode(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::MalformedTuple {
                        offset: 0,
                        reason: "expected a single-character unicode string".to_string(),
                    }),
                }
            }
            other => Err(Error::Unsupported {
                type_name: crate::reader::debug_type_name(&other),
            }),
        }
    }
}

const DAYS_PER_400Y: i64 = 146097;
const DAY_SECONDS: f64 = 86_400.0;

/// Civil-calendar day count since 1970-01-01, via Howard Hinnant's
/// `days_from_civil` algorithm (proleptic Gregorian, valid across the
/// full `i32` year range). No calendar library is pulled in for this —
/// it's a closed-form integer computation, not I/O.
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * DAYS_PER_400Y + doe - 719468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - DAYS_PER_400Y + 1 } / DAYS_PER_400Y;
    let doe = z - era * DAYS_PER_400Y;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Encode a civil timestamp as fractional days since the Unix epoch
/// (spec.md §4.4), the format every date/time value is packed as.
pub fn timestamp_to_days(year: i64, month: u32, day: u32, seconds_of_day: f64) -> f64 {
    days_from_civil(year, month, day) as f64 + seconds_of_day / DAY_SECONDS
}

/// Inverse of [`timestamp_to_days`]: splits fractional days since epoch
/// back into a civil date and a seconds-of-day offset.
pub fn days_to_timestamp(days: f64) -> (i64, u32, u32, f64) {
    let whole_days = days.floor();
    let (y, m, d) = civil_from_days(whole_days as i64);
    let seconds_of_day = (days - whole_days) * DAY_SECONDS;
    (y, m, d, seconds_of_day)
}

/// Parse the ISO-8601 subset spec.md's date/time decode fallback needs:
/// `YYYY-MM-DDTHH:MM:SS[.fff]Z`. Returns fractional days since epoch.
pub fn parse_iso8601_datetime(s: &str) -> crate::error::Result<f64> {
    let malformed = || Error::MalformedTuple {
        offset: 0,
        reason: format!("not a recognized ISO-8601 timestamp: {s:?}"),
    };
    let s = s.strip_suffix('Z').unwrap_or(s);
    let (date, time) = s.split_once('T').ok_or_else(malformed)?;
    let mut date_parts = date.splitn(3, '-');
    let year: i64 = date_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let month: u32 = date_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let day: u32 = date_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let mut time_parts = time.splitn(3, ':');
    let hour: f64 = time_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let minute: f64 = time_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let second: f64 = time_parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let seconds_of_day = hour * 3600.0 + minute * 60.0 + second;
    Ok(timestamp_to_days(year, month, day, seconds_of_day))
}

/// Render fractional days since epoch as the same ISO-8601 shape
/// [`parse_iso8601_datetime`] accepts, for round-tripping the decoder's
/// string fallback.
pub fn format_iso8601_datetime(days: f64) -> String {
    let (y, m, d, seconds_of_day) = days_to_timestamp(days);
    let hour = (seconds_of_day / 3600.0).floor();
    let minute = ((seconds_of_day - hour * 3600.0) / 60.0).floor();
    let second = seconds_of_day - hour * 3600.0 - minute * 60.0;
    format!("{y:04}-{m:02}-{d:02}T{hour:02.0}:{minute:02.0}:{second:06.3}Z")
}

/// Parse the ISO-8601 duration subset spec.md's duration decode fallback
/// needs: `P[nD][T[nH][nM][nS]]`, with an optional leading `-` for a
/// negative duration. Year/month components are rejected — their length
/// is calendar-dependent and can't be reduced to a fixed second count
/// (see DESIGN.md).
pub fn parse_iso8601_duration(s: &str) -> crate::error::Result<f64> {
    let malformed = |reason: &str| Error::MalformedTuple {
        offset: 0,
        reason: format!("not a recognized ISO-8601 duration: {s:?} ({reason})"),
    };
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('P').ok_or_else(|| malformed("missing P"))?;
    let (date_part, time_part) = match s.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };
    if date_part.contains('Y') || date_part.contains('M') {
        return Err(malformed("calendar year/month components are not supported"));
    }
    let mut seconds = 0.0;
    seconds += parse_unit(date_part, 'D', 86_400.0, &malformed)?;
    seconds += parse_unit(date_part, 'W', 604_800.0, &malformed)?;
    if let Some(t) = time_part {
        seconds += parse_unit(t, 'H', 3_600.0, &malformed)?;
        seconds += parse_unit(t, 'M', 60.0, &malformed)?;
        seconds += parse_unit(t, 'S', 1.0, &malformed)?;
    }
    Ok(if negative { -seconds } else { seconds })
}

fn parse_unit(
    s: &str,
    unit: char,
    scale: f64,
    malformed: &dyn Fn(&str) -> Error,
) -> crate::error::Result<f64> {
    let Some(idx) = s.find(unit) else {
        return Ok(0.0);
    };
    let start = s[..idx]
        .rfind(|c: char| !c.is_ascii_digit() && c != '.')
        .map(|p| p + 1)
        .unwrap_or(0);
    let number = &s[start..idx];
    if number.is_empty() {
        return Err(malformed("empty numeric component"));
    }
    number
        .parse::<f64>()
        .map(|n| n * scale)
        .map_err(|_| malformed("non-numeric component"))
}

/// Render a total-seconds duration as the same `PnDTnHnMnS` shape
/// [`parse_iso8601_duration`] accepts.
pub fn format_iso8601_duration(total_seconds: f64) -> String {
    let negative = total_seconds < 0.0;
    let mut remaining = total_seconds.abs();
    let days = (remaining / 86_400.0).floor();
    remaining -= days * 86_400.0;
    let hours = (remaining / 3_600.0).floor();
    remaining -= hours * 3_600.0;
    let minutes = (remaining / 60.0).floor();
    remaining -= minutes * 60.0;
    let sign = if negative { "-" } else { "" };
    format!("{sign}P{days:.0}DT{hours:.0}H{minutes:.0}M{remaining:.3}S")
}

/// Encode an IPv4 address as its 4 raw octets (spec.md §4.4).
pub fn ipv4_to_value(addr: Ipv4Addr) -> Value {
    Value::Bytes(addr.octets().to_vec())
}

/// Encode an IPv6 address as its 16 raw octets.
pub fn ipv6_to_value(addr: Ipv6Addr) -> Value {
    Value::Bytes(addr.octets().to_vec())
}

/// Decode an IP address from whichever of the three accepted encodings
/// is present: raw 4/16-byte strings, dotted/colon text, or a 128-bit
/// UUID reinterpreted as 16 address octets. A 4-byte or v4-text source
/// decodes back to `IpAddr::V4`, preserving the original family rather
/// than forcing every address through a v6-mapped representation.
pub fn value_to_ip(v: &Value) -> crate::error::Result<IpAddr> {
    match v {
        Value::Bytes(b) if b.len() == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(b);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        Value::Bytes(b) if b.len() == 4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(b);
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        Value::Unicode(s) => s
            .parse::<Ipv4Addr>()
            .map(IpAddr::V4)
            .or_else(|_| s.parse::<Ipv6Addr>().map(IpAddr::V6))
            .map_err(|_| Error::MalformedTuple {
                offset: 0,
                reason: format!("not a recognized IP address: {s:?}"),
            }),
        Value::Uuid128(bytes) => Ok(IpAddr::V6(Ipv6Addr::from(*bytes))),
        other => Err(Error::Unsupported {
            type_name: crate::reader::debug_type_name(other),
        }),
    }
}

impl FromElement for IpAddr {
    fn from_element(value: Value) -> crate::error::Result<Self> {
        value_to_ip(&value)
    }
}
