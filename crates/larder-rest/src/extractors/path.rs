//! Typed ids from path segments.

use crate::responses::AppError;
use larder_core::LarderError;
use std::str::FromStr;

/// Parses a path segment into a typed id; a malformed id is a 400.
pub fn parse_id<T: FromStr>(raw: &str, resource: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError(LarderError::bad_request(format!("Invalid {resource} id: {raw}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::FoodId;

    #[test]
    fn test_parse_id() {
        let id = FoodId::new();
        let parsed: FoodId = parse_id(&id.to_string(), "food").unwrap();
        assert_eq!(parsed, id);

        let err = parse_id::<FoodId>("not-a-uuid", "food").unwrap_err();
        assert!(matches!(err.0, LarderError::BadRequest(_)));
    }
}
