//! Order identifier extraction from the payment provider's redirect URL.

use crate::error::PollError;
use order_store::OrderId;

/// Query keys that may carry the order id, in order of preference.
const ID_KEYS: [&str; 2] = ["orderId", "order_id"];

/// Extracts the order id from a redirect query string such as
/// `?orderId=12345&session=abc`.
///
/// A leading `?` is ignored and values are percent-decoded. Keys are tried in
/// order of preference and an empty value counts as absent, so
/// `orderId=&order_id=7` yields 7. No usable value is
/// [`PollError::MissingIdentifier`]; anything that is not a non-negative integer
/// is [`PollError::InvalidIdentifier`].
pub fn order_id_from_query(query: &str) -> Result<OrderId, PollError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|_| PollError::InvalidIdentifier(query.to_string()))?;

    let raw = ID_KEYS
        .iter()
        .find_map(|key| {
            pairs
                .iter()
                .filter(|(name, _)| name == key)
                .map(|(_, value)| value.trim())
                .find(|value| !value.is_empty())
        })
        .ok_or(PollError::MissingIdentifier)?;

    raw.parse::<u64>()
        .map(OrderId)
        .map_err(|_| PollError::InvalidIdentifier(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_order_id() {
        assert_eq!(order_id_from_query("?orderId=12345"), Ok(OrderId(12345)));
        assert_eq!(
            order_id_from_query("session=cs_test&orderId=42"),
            Ok(OrderId(42))
        );
    }

    #[test]
    fn accepts_snake_case_key() {
        assert_eq!(order_id_from_query("order_id=7"), Ok(OrderId(7)));
    }

    #[test]
    fn prefers_camel_case_key() {
        assert_eq!(
            order_id_from_query("order_id=1&orderId=2"),
            Ok(OrderId(2))
        );
    }

    #[test]
    fn empty_value_does_not_hide_other_key() {
        assert_eq!(order_id_from_query("orderId=&order_id=7"), Ok(OrderId(7)));
        assert_eq!(order_id_from_query("orderId=&orderId=8"), Ok(OrderId(8)));
    }

    #[test]
    fn values_are_percent_decoded() {
        assert_eq!(order_id_from_query("orderId=%31%32"), Ok(OrderId(12)));
        assert_eq!(order_id_from_query("?order%49d=5"), Ok(OrderId(5)));
        assert_eq!(
            order_id_from_query("orderId=%20+42+"),
            Ok(OrderId(42))
        );
    }

    #[test]
    fn missing_identifier() {
        assert_eq!(order_id_from_query(""), Err(PollError::MissingIdentifier));
        assert_eq!(
            order_id_from_query("?session=abc"),
            Err(PollError::MissingIdentifier)
        );
        assert_eq!(
            order_id_from_query("orderId="),
            Err(PollError::MissingIdentifier)
        );
    }

    #[test]
    fn invalid_identifier() {
        assert_eq!(
            order_id_from_query("orderId=abc"),
            Err(PollError::InvalidIdentifier("abc".into()))
        );
        assert_eq!(
            order_id_from_query("orderId=-5"),
            Err(PollError::InvalidIdentifier("-5".into()))
        );
    }
}
