// HTTP routes
pub mod health;
pub mod places;
pub mod root;
pub mod stats;

pub use health::*;
pub use places::*;
pub use root::*;
pub use stats::*;

use crate::server::ApiError;

/// Query-string boolean: `true`/`false`/`1`/`0`
pub(crate) fn parse_bool_param(field: &str, value: Option<&str>) -> Result<Option<bool>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(_) => Err(ApiError::invalid(field, "Invalid value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_param() {
        assert_eq!(parse_bool_param("expand", None).unwrap(), None);
        assert_eq!(parse_bool_param("expand", Some("1")).unwrap(), Some(true));
        assert_eq!(parse_bool_param("expand", Some("false")).unwrap(), Some(false));
        assert!(parse_bool_param("expand", Some("yes")).is_err());
    }
}
