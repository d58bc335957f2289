use crate::utils::error::{Result, StockError};
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(StockError::validation(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(StockError::validation(
            field_name,
            path,
            "Path contains null bytes",
        ));
    }

    Ok(())
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse::<SocketAddr>().map_err(|e| {
        StockError::validation(field_name, addr, format!("Invalid socket address: {}", e))
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(StockError::validation(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Parses a decimal identifier the way the admin forms and CSV files submit it.
pub fn parse_numeric_id(field_name: &str, raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StockError::validation(
            field_name,
            raw,
            "Expected a numeric identifier",
        ));
    }
    trimmed
        .parse::<u64>()
        .map_err(|e| StockError::validation(field_name, raw, e.to_string()))
}
