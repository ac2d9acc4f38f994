//! Validation of the forms that feed the stores and the API.

use std::collections::BTreeMap;

use common::{ItemId, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid input: {}", describe(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

fn describe(fields: &BTreeMap<&'static str, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Returns the message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Credentials submitted on the login screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "Email is required");
        errors.require("password", &self.password, "Password is required");
        errors.into_result()
    }
}

/// Account details submitted on the signup screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("username", &self.username, "Name is required");
        errors.require("email", &self.email, "Email is required");
        errors.require("password", &self.password, "Password is required");
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// A one-time verification code: four characters, `A-Z` or `0-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    pub const LENGTH: usize = 4;

    /// Parses user input, uppercasing it first.
    pub fn parse(input: &str) -> Result<Self, ValidationErrors> {
        let code = input.trim().to_ascii_uppercase();
        let well_formed = code.len() == Self::LENGTH
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if well_formed {
            Ok(Self(code))
        } else {
            let mut errors = ValidationErrors::new();
            errors.add("otp", "OTP must be 4 letters or digits");
            Err(errors)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an order goes: entered on the order confirmation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub phone_number: String,
    pub where_to_send: String,
}

impl DeliveryDetails {
    pub fn new(phone_number: impl Into<String>, where_to_send: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            where_to_send: where_to_send.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require(
            "phoneNumber",
            &self.phone_number,
            "Please input your phone number!",
        );
        errors.require(
            "whereToSend",
            &self.where_to_send,
            "Please input the delivery address!",
        );
        errors.into_result()
    }
}

fn require_price(errors: &mut ValidationErrors, price: Money) {
    if price.is_negative() {
        errors.add("price", "Price must not be negative");
    }
}

/// A new product, as entered on the admin product form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Money,
}

impl ProductForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Please input the product name!");
        errors.require("description", &self.description, "Please input the description!");
        require_price(&mut errors, self.price);
        errors.into_result()
    }
}

/// A new package bundling existing products, as entered on the admin
/// package form. `include` holds product ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageForm {
    pub name: String,
    pub include: Vec<ItemId>,
    pub price: Money,
}

impl PackageForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Please input the package name!");
        if self.include.is_empty() {
            errors.add("include", "Please select the items to include!");
        }
        require_price(&mut errors, self.price);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));

        assert!(LoginForm::new("a@b.c", "secret").validate().is_ok());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let errors = LoginForm::new("   ", "pw").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), None);
    }

    #[test]
    fn signup_checks_password_confirmation() {
        let form = SignupForm {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
    }

    #[test]
    fn signup_missing_name() {
        let form = SignupForm {
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
            ..SignupForm::default()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("username"), Some("Name is required"));
    }

    #[test]
    fn otp_is_uppercased_and_checked() {
        assert_eq!(OtpCode::parse("a1b2").unwrap().as_str(), "A1B2");
        assert_eq!(OtpCode::parse(" 9Z9Z ").unwrap().to_string(), "9Z9Z");

        for bad in ["", "abc", "abcde", "ab-1", "ÄB12"] {
            assert!(OtpCode::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn delivery_details_required() {
        let errors = DeliveryDetails::default().validate().unwrap_err();
        assert_eq!(errors.get("phoneNumber"), Some("Please input your phone number!"));
        assert_eq!(
            errors.get("whereToSend"),
            Some("Please input the delivery address!")
        );
        assert!(DeliveryDetails::new("0123", "Main St").validate().is_ok());
    }

    #[test]
    fn product_form_requires_fields_and_non_negative_price() {
        let form = ProductForm {
            price: Money::from_cents(-1),
            ..ProductForm::default()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Please input the product name!"));
        assert_eq!(errors.get("description"), Some("Please input the description!"));
        assert_eq!(errors.get("price"), Some("Price must not be negative"));

        let ok = ProductForm {
            name: "Shiro".to_string(),
            description: "Chickpea stew".to_string(),
            price: Money::from_dollars(5),
        };
        assert!(ok.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"name": "Shiro", "description": "Chickpea stew", "price": 5})
        );
    }

    #[test]
    fn package_form_needs_included_products() {
        let form = PackageForm {
            name: "Family box".to_string(),
            include: Vec::new(),
            price: Money::from_dollars(40),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("include"), Some("Please select the items to include!"));

        let form = PackageForm {
            include: vec!["p1".into(), "p2".into()],
            ..form
        };
        assert!(form.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&form).unwrap()["include"],
            serde_json::json!(["p1", "p2"])
        );
    }

    #[test]
    fn error_message_lists_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "invalid input: email: Email is required; password: Password is required"
        );
    }
}
