//! Display helpers shared by the dashboard endpoints.

use chrono::{DateTime, TimeZone, Utc};

/// `$1.23B`, `$4.56M`, `$7.89K`, `$12.00`
pub fn format_tvl(tvl: f64) -> String {
    if tvl >= 1e9 {
        format!("${:.2}B", tvl / 1e9)
    } else if tvl >= 1e6 {
        format!("${:.2}M", tvl / 1e6)
    } else if tvl >= 1e3 {
        format!("${:.2}K", tvl / 1e3)
    } else {
        format!("${:.2}", tvl)
    }
}

/// Formats a wei amount given as a decimal string.
pub fn format_eth(wei: &str) -> String {
    let Ok(wei) = wei.trim().parse::<f64>() else {
        return "N/A".to_string();
    };
    let eth = wei / 1e18;
    if eth >= 1_000_000.0 {
        format!("{:.2}M ETH", eth / 1_000_000.0)
    } else if eth >= 1_000.0 {
        format!("{:.2}K ETH", eth / 1_000.0)
    } else {
        format!("{:.4} ETH", eth)
    }
}

pub fn format_token_amount(amount: &str, decimals: u32) -> String {
    let Ok(raw) = amount.trim().parse::<f64>() else {
        return "N/A".to_string();
    };
    let value = raw / 10f64.powi(decimals as i32);
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.4}", value)
    }
}

/// `0x1234...abcd`; strings too short to shorten are returned as is.
pub fn format_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

fn from_unix(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0).single()
}

pub fn format_timestamp(timestamp: i64) -> String {
    from_unix(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}

/// `April 7, 2021`
pub fn format_date(timestamp: i64) -> String {
    from_unix(timestamp)
        .map(|t| t.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

pub fn time_ago(timestamp: i64) -> String {
    time_ago_at(timestamp, Utc::now())
}

pub fn time_ago_at(timestamp: i64, now: DateTime<Utc>) -> String {
    let elapsed = now.timestamp() - timestamp;
    let days = elapsed / 86_400;
    let hours = elapsed / 3_600;
    let minutes = elapsed / 60;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}
