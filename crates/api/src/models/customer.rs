//! Customer domain model and its request/response shapes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use order_management_core::{CustomerId, PhoneNumber};

use super::{ValidationError, required_text};

/// Maximum length of a customer's full name.
pub const FULL_NAME_MAX_LENGTH: usize = 100;
/// Maximum length of a customer's address.
pub const ADDRESS_MAX_LENGTH: usize = 200;

/// A customer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Store-assigned id.
    pub id: CustomerId,
    /// Full name (1-100 characters).
    pub full_name: String,
    /// Postal address (1-200 characters).
    pub address: String,
    /// Unique phone number.
    pub phone_number: PhoneNumber,
}

/// Validated fields for creating or updating a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub full_name: String,
    pub address: String,
    pub phone_number: PhoneNumber,
}

/// JSON body for `POST /customers` and `PUT /customers/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[schema(example = "Nguyễn Văn A", max_length = 100)]
    pub full_name: String,
    #[schema(max_length = 200)]
    pub address: String,
    #[schema(example = "0901234567")]
    pub phone_number: String,
}

impl CustomerRequest {
    /// Validate the request body into a [`CustomerInput`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a field is blank, too long, or the phone
    /// number is not a valid phone format.
    pub fn validate(self) -> Result<CustomerInput, ValidationError> {
        let full_name = required_text("fullName", &self.full_name, FULL_NAME_MAX_LENGTH)?;
        let address = required_text("address", &self.address, ADDRESS_MAX_LENGTH)?;
        let phone_number = PhoneNumber::parse(&self.phone_number)
            .map_err(|e| ValidationError(format!("phoneNumber: {e}")))?;

        Ok(CustomerInput {
            full_name,
            address,
            phone_number,
        })
    }
}

/// Customer as returned by the API (and stored in the cache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    #[schema(value_type = i32)]
    pub customer_id: CustomerId,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
}

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            full_name: customer.full_name.clone(),
            address: customer.address.clone(),
            phone_number: customer.phone_number.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(full_name: &str, address: &str, phone_number: &str) -> CustomerRequest {
        CustomerRequest {
            full_name: full_name.to_owned(),
            address: address.to_owned(),
            phone_number: phone_number.to_owned(),
        }
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        let input = request("A", "X", "0900000001").validate().unwrap();
        assert_eq!(input.full_name, "A");
        assert_eq!(input.address, "X");
        assert_eq!(input.phone_number.as_str(), "0900000001");
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let name = "a".repeat(FULL_NAME_MAX_LENGTH + 1);
        let err = request(&name, "X", "0900000001").validate().unwrap_err();
        assert!(err.0.contains("fullName"));
    }

    #[test]
    fn test_validate_rejects_missing_address() {
        let err = request("A", "", "0900000001").validate().unwrap_err();
        assert_eq!(err.0, "address is required");
    }

    #[test]
    fn test_validate_rejects_bad_phone() {
        let err = request("A", "X", "not-a-phone").validate().unwrap_err();
        assert!(err.0.starts_with("phoneNumber"));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let body = r#"{"fullName":"A","address":"X","phoneNumber":"0900000001"}"#;
        let parsed: CustomerRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.full_name, "A");
    }

    #[test]
    fn test_dto_from_customer() {
        let customer = Customer {
            id: CustomerId::new(5),
            full_name: "A".to_owned(),
            address: "X".to_owned(),
            phone_number: PhoneNumber::parse("0900000001").unwrap(),
        };

        let json = serde_json::to_value(CustomerDto::from(&customer)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customerId": 5,
                "fullName": "A",
                "address": "X",
                "phoneNumber": "0900000001"
            })
        );
    }
}
