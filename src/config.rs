// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Parse a polling interval such as "10m", "1h30m", "45s" or "500ms"
///
/// A bare number is read as minutes.
pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidInterval {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    if let Ok(minutes) = trimmed.parse::<u64>() {
        return match minutes {
            0 => Err(invalid("must be greater than zero")),
            _ => Ok(Duration::from_secs(minutes * 60)),
        };
    }

    let mut total = Duration::ZERO;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit"))?;
        if digits_end == 0 {
            return Err(invalid("expected a number"));
        }
        let amount: u64 = rest[..digits_end]
            .parse()
            .map_err(|_| invalid("number too large"))?;
        rest = &rest[digits_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_end] {
            "h" => Duration::from_secs(3600),
            "m" => Duration::from_secs(60),
            "s" => Duration::from_secs(1),
            "ms" => Duration::from_millis(1),
            other => return Err(invalid(&format!("unknown unit '{other}'"))),
        };
        rest = &rest[unit_end..];

        let amount = u32::try_from(amount).map_err(|_| invalid("number too large"))?;
        total += unit * amount;
    }

    if total.is_zero() {
        return Err(invalid("must be greater than zero"));
    }
    Ok(total)
}

/// Build the Transmission RPC endpoint, e.g. `http://host:9091/transmission/rpc`
pub fn transmission_url(
    protocol: &str,
    host: &str,
    port: u16,
    rpc_path: &str,
) -> Result<Url, ConfigError> {
    let path = if rpc_path.starts_with('/') {
        rpc_path.to_string()
    } else {
        format!("/{rpc_path}")
    };
    Ok(Url::parse(&format!("{protocol}://{host}:{port}{path}"))?)
}
