use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;

use crate::stats::{DslStats, Field};

/// Positions of each statistic in the `GetDSLInfo.cgi` response once doubled
/// separators are collapsed and the body is split on `|`.
///
/// The layout is undocumented and firmware-specific; when the modem firmware
/// changes, this table is the only thing that should need editing.
///
/// Not mapped because no captured response confirms where they live:
/// `LossOfPowerLink` (likely 16), `LossOfSignalLink` (likely 18) and
/// `LinkTrainErrors` (likely 20, which clashes with `SNRUp`).
const STATUS_POSITIONS: [(usize, Field); 19] = [
    (2, Field::Down),
    (3, Field::Up),
    // colon-delimited, normalized to whole seconds
    (6, Field::LinkUptime),
    (7, Field::Retrains),
    (13, Field::UnavailableSeconds),
    (19, Field::SnrDown),
    (20, Field::SnrUp),
    (21, Field::AttenuationDown),
    (22, Field::AttenuationUp),
    (23, Field::PowerDown),
    (24, Field::PowerUp),
    (25, Field::PacketsDown),
    (26, Field::PacketsUp),
    (27, Field::ErrorPacketsDown),
    (28, Field::ErrorPacketsUp),
    (37, Field::CrcNearEnd),
    (38, Field::CrcFarEnd),
    (41, Field::RsNearEnd),
    (42, Field::RsFarEnd),
];

/// Splits a raw status page into trimmed fields. The modem's template emits `||`
/// between some fields; those are collapsed first so positions stay stable.
pub fn split_fields(body: &str) -> Vec<String> {
    body.replace("||", "|")
        .split('|')
        .map(|field| field.trim().to_string())
        .collect()
}

/// Maps a raw status page onto [`DslStats`] by position.
pub fn parse_status(body: &str) -> Result<DslStats> {
    let parts = split_fields(body);
    let mut stats = DslStats::default();
    for (index, field) in STATUS_POSITIONS {
        let raw = parts.get(index).ok_or_else(|| {
            anyhow!(
                "status page has {} fields, {} expected at index {}",
                parts.len(),
                field.name(),
                index
            )
        })?;
        if field == Field::LinkUptime {
            let uptime = parse_uptime(raw).unwrap_or_else(|err| {
                tracing::warn!(uptime = %raw, error = %err, "unparseable link uptime, reporting zero");
                Duration::ZERO
            });
            stats.set(field, uptime.as_secs().to_string());
        } else {
            stats.set(field, raw.as_str());
        }
    }
    Ok(stats)
}

/// Parses the modem's link uptime.
///
/// Accepts plain clock notation read right to left (`SS`, `MM:SS`, `HH:MM:SS`,
/// `D:HH:MM:SS`) or unit-suffixed segments such as `1h:02m:03s` and `2days:4h`.
pub fn parse_uptime(raw: &str) -> Result<Duration> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("uptime is empty");
    }

    let segments: Vec<&str> = trimmed.split(':').map(str::trim).collect();
    let clock_notation = segments
        .iter()
        .all(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
    if clock_notation {
        return parse_clock(trimmed, &segments);
    }

    parse_unit_expression(&trimmed.replace(':', "").to_ascii_lowercase())
}

fn parse_clock(raw: &str, segments: &[&str]) -> Result<Duration> {
    const SCALES: [u64; 4] = [1, 60, 60 * 60, 24 * 60 * 60];
    if segments.len() > SCALES.len() {
        bail!("uptime '{raw}' has more than {} segments", SCALES.len());
    }
    let mut secs: u64 = 0;
    for (segment, scale) in segments.iter().rev().zip(SCALES) {
        let value: u64 = segment
            .parse()
            .with_context(|| format!("invalid uptime segment '{segment}' in '{raw}'"))?;
        secs = value
            .checked_mul(scale)
            .and_then(|part| secs.checked_add(part))
            .ok_or_else(|| anyhow!("uptime '{raw}' overflows"))?;
    }
    Ok(Duration::from_secs(secs))
}

fn parse_unit_expression(text: &str) -> Result<Duration> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = compact.as_str();
    let mut total = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            bail!("expected a number at '{rest}' in uptime '{text}'");
        }
        let value: f64 = rest[..number_len]
            .parse()
            .with_context(|| format!("invalid number '{}' in uptime '{text}'", &rest[..number_len]))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = unit_seconds(unit)
            .ok_or_else(|| anyhow!("unknown unit '{unit}' in uptime '{text}'"))?;
        total += value * scale;
        rest = &rest[unit_len..];
    }
    Duration::try_from_secs_f64(total).with_context(|| format!("uptime '{text}' out of range"))
}

fn unit_seconds(unit: &str) -> Option<f64> {
    match unit {
        "d" | "day" | "days" => Some(86_400.0),
        "h" | "hr" | "hour" | "hours" => Some(3_600.0),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60.0),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1.0),
        _ => None,
    }
}
