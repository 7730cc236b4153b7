use crate::error::{internal::InternalError, AppError};

/// Parses a u64 value from a string slice
///
/// # Arguments
/// - `value` - The string to attempt to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed the string to `u64`
/// - `Err(AppError::InternalErr(ParseStringId))` - Failed to parse
///   the string as a u64
pub fn parse_u64_from_str(value: &str) -> Result<u64, AppError> {
    let result = value
        .trim()
        .parse::<u64>()
        .map_err(|e| InternalError::ParseStringId {
            value: value.to_string(),
            source: e,
        })?;

    Ok(result)
}

/// Splits a comma-separated option value into trimmed, non-empty items.
///
/// Used for the `preferred_tags` command option, e.g. `"Night Court, Day Court,"` becomes
/// `["Night Court", "Day Court"]`.
pub fn parse_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a list of channels given as mentions or raw ids.
///
/// Items are separated by commas or whitespace, e.g. `"<#10>, <#20> 30"` becomes
/// `[10, 20, 30]`. Duplicates are dropped, keeping the first occurrence.
///
/// # Returns
/// - `Ok(Vec<u64>)` - Channel ids in the order given
/// - `Err(AppError::BadRequest)` - An item is neither a mention nor an id
pub fn parse_channel_list(value: &str) -> Result<Vec<u64>, AppError> {
    let mut ids = Vec::new();

    for item in value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
    {
        let raw = item
            .strip_prefix("<#")
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(item);
        let id = parse_u64_from_str(raw)
            .map_err(|_| AppError::BadRequest(format!("`{}` is not a channel.", item)))?;

        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}
