//! Checkout input and placed orders.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use liahna_core::cart::{CartLineItem, CartTotals};
use liahna_core::{Money, OrderId};

/// Buyer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Brazilian delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    /// CEP, with or without punctuation.
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub district: String,
    pub city: String,
    /// UF.
    pub state: String,
    pub complement: String,
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Card,
}

impl PaymentMethod {
    /// Parse the submitted value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pix" => Some(Self::Pix),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: Customer,
    pub address: Address,
    pub payment_method: Option<String>,
    pub coupon: Option<String>,
}

/// Per-field validation messages, keyed by the camelCase field name.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

fn digits(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

impl Customer {
    fn validate(&self, errors: &mut FieldErrors) {
        if self.name.trim().is_empty() {
            errors.insert("name", "Informe seu nome.");
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            errors.insert("email", "Email inválido.");
        }
        if digits(&self.phone) < 10 {
            errors.insert("phone", "Telefone inválido.");
        }
    }
}

impl Address {
    fn validate(&self, errors: &mut FieldErrors) {
        if digits(&self.postal_code) != 8 {
            errors.insert("postalCode", "CEP inválido.");
        }
        let required = [
            ("street", &self.street, "Rua é obrigatória."),
            ("number", &self.number, "Número é obrigatório."),
            ("district", &self.district, "Bairro é obrigatório."),
            ("city", &self.city, "Cidade é obrigatória."),
            ("state", &self.state, "UF é obrigatória."),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }
    }
}

impl CheckoutRequest {
    /// Check every field, collecting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the field messages if anything is invalid.
    pub fn validate(&self) -> Result<PaymentMethod, FieldErrors> {
        let mut errors = FieldErrors::new();
        self.customer.validate(&mut errors);
        self.address.validate(&mut errors);

        let method = self.payment_method.as_deref().and_then(PaymentMethod::parse);
        if method.is_none() {
            errors.insert("paymentMethod", "Escolha uma forma de pagamento.");
        }

        match method {
            Some(method) if errors.is_empty() => Ok(method),
            _ => Err(errors),
        }
    }
}

/// A placed order, kept in the visitor's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    #[serde(default)]
    pub coupon: Option<String>,
    /// Amount charged after the coupon.
    pub final_total: Money,
    pub customer: Customer,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            customer: Customer {
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                phone: "(11) 98765-4321".into(),
            },
            address: Address {
                postal_code: "01310-100".into(),
                street: "Av. Paulista".into(),
                number: "1000".into(),
                district: "Bela Vista".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
                complement: String::new(),
            },
            payment_method: Some("pix".into()),
            coupon: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert_eq!(valid_request().validate().unwrap(), PaymentMethod::Pix);
    }

    #[test]
    fn test_all_errors_are_collected() {
        let request = CheckoutRequest::default();
        let errors = request.validate().unwrap_err();

        for field in [
            "name",
            "email",
            "phone",
            "postalCode",
            "street",
            "number",
            "district",
            "city",
            "state",
            "paymentMethod",
        ] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_phone_and_cep_count_digits_only() {
        let mut request = valid_request();
        request.customer.phone = "11 9876-543".into();
        request.address.postal_code = "01310-10".into();

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("phone"));
        assert!(errors.contains_key("postalCode"));
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut request = valid_request();
        request.payment_method = Some("boleto".into());
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["paymentMethod"]);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"customer": {"name": "Ana"}, "address": {"postalCode": "01310100"}, "paymentMethod": "card"}"#,
        )
        .unwrap();
        assert_eq!(request.address.postal_code, "01310100");
        assert_eq!(request.payment_method.as_deref(), Some("card"));
    }
}
