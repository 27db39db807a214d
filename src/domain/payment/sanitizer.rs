//! Payment data sanitizer.
//!
//! Reduces a raw processor payment to the minimal tagged record stored on a
//! subscription. Cards keep at most the last four digits, UPI addresses are
//! masked, and nothing else identifying is retained.

use serde::{Deserialize, Serialize};

use super::raw::{PaymentMethodKind, RawPayment};
use crate::domain::foundation::Timestamp;

/// Fields every sanitized payment carries regardless of method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<Timestamp>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(flatten)]
    pub summary: PaymentSummary,
    pub last4: Option<String>,
    pub network: Option<String>,
    pub issuer: Option<String>,
    pub card_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpiDetails {
    #[serde(flatten)]
    pub summary: PaymentSummary,
    pub vpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetbankingDetails {
    #[serde(flatten)]
    pub summary: PaymentSummary,
    pub bank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetails {
    #[serde(flatten)]
    pub summary: PaymentSummary,
    pub wallet: Option<String>,
}

/// Sanitized payment method, serialized as `{"type": ..., "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card(CardDetails),
    Upi(UpiDetails),
    Netbanking(NetbankingDetails),
    Wallet(WalletDetails),
    Other(PaymentSummary),
}

impl PaymentMethod {
    /// Common fields shared by every variant.
    pub fn summary(&self) -> &PaymentSummary {
        match self {
            PaymentMethod::Card(d) => &d.summary,
            PaymentMethod::Upi(d) => &d.summary,
            PaymentMethod::Netbanking(d) => &d.summary,
            PaymentMethod::Wallet(d) => &d.summary,
            PaymentMethod::Other(s) => s,
        }
    }
}

/// Builds the stored payment method from a raw processor payment.
pub fn sanitize(raw: &RawPayment) -> PaymentMethod {
    let summary = PaymentSummary {
        payment_id: raw.id.clone(),
        amount: raw.amount,
        currency: raw.currency.clone(),
        status: raw.status.clone(),
        captured_at: if raw.captured {
            raw.created_at.and_then(Timestamp::from_unix_secs)
        } else {
            None
        },
        method: raw.method.clone(),
    };

    match raw.method_kind() {
        PaymentMethodKind::Card => {
            let card = raw.card.clone().unwrap_or_default();
            PaymentMethod::Card(CardDetails {
                summary,
                last4: card.last4.as_deref().and_then(last_four_digits),
                network: card.network,
                issuer: card.issuer,
                card_type: card.card_type,
            })
        }
        PaymentMethodKind::Upi => PaymentMethod::Upi(UpiDetails {
            summary,
            vpa: raw.vpa.as_deref().and_then(mask_vpa),
        }),
        PaymentMethodKind::Netbanking => PaymentMethod::Netbanking(NetbankingDetails {
            summary,
            bank: raw.bank.clone(),
        }),
        PaymentMethodKind::Wallet => PaymentMethod::Wallet(WalletDetails {
            summary,
            wallet: raw.wallet.clone(),
        }),
        PaymentMethodKind::Other => PaymentMethod::Other(summary),
    }
}

/// Keeps at most the trailing four digits of a card number fragment.
fn last_four_digits(value: &str) -> Option<String> {
    let digits: Vec<char> = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let start = digits.len().saturating_sub(4);
    Some(digits[start..].iter().collect())
}

/// Masks a UPI VPA as `first char + "***@" + domain`.
///
/// A value without `@` keeps only its first character.
pub fn mask_vpa(vpa: &str) -> Option<String> {
    let vpa = vpa.trim();
    let first = vpa.chars().next()?;
    match vpa.split_once('@') {
        Some((_, domain)) => Some(format!("{}***@{}", first, domain)),
        None => Some(format!("{}***", first)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::raw::RawCard;
    use proptest::prelude::*;

    fn raw(method: &str) -> RawPayment {
        RawPayment {
            id: "pay_1".to_string(),
            amount: 49900,
            currency: "INR".to_string(),
            status: "captured".to_string(),
            method: method.to_string(),
            captured: true,
            created_at: Some(1_700_000_000),
            subscription_id: Some("sub_1".to_string()),
            card: None,
            vpa: None,
            bank: None,
            wallet: None,
            error_code: None,
            error_description: None,
        }
    }

    // ─── Card ───

    #[test]
    fn card_keeps_only_last_four_and_metadata() {
        let mut payment = raw("card");
        payment.card = Some(RawCard {
            last4: Some("1111".to_string()),
            network: Some("Visa".to_string()),
            issuer: Some("HDFC".to_string()),
            card_type: Some("credit".to_string()),
        });

        let PaymentMethod::Card(details) = sanitize(&payment) else {
            panic!("expected card");
        };
        assert_eq!(details.last4.as_deref(), Some("1111"));
        assert_eq!(details.network.as_deref(), Some("Visa"));
        assert_eq!(details.card_type.as_deref(), Some("credit"));
        assert_eq!(details.summary.payment_id, "pay_1");
    }

    #[test]
    fn card_with_full_number_in_last4_is_truncated() {
        let mut payment = raw("card");
        payment.card = Some(RawCard {
            last4: Some("4111 1111 1111 1234".to_string()),
            ..RawCard::default()
        });

        let PaymentMethod::Card(details) = sanitize(&payment) else {
            panic!("expected card");
        };
        assert_eq!(details.last4.as_deref(), Some("1234"));
    }

    #[test]
    fn card_without_card_object_still_sanitizes() {
        let PaymentMethod::Card(details) = sanitize(&raw("card")) else {
            panic!("expected card");
        };
        assert_eq!(details.last4, None);
    }

    // ─── UPI ───

    #[test]
    fn upi_vpa_is_masked() {
        let mut payment = raw("upi");
        payment.vpa = Some("gaurav.kumar@okhdfcbank".to_string());

        let PaymentMethod::Upi(details) = sanitize(&payment) else {
            panic!("expected upi");
        };
        assert_eq!(details.vpa.as_deref(), Some("g***@okhdfcbank"));
    }

    #[test]
    fn mask_vpa_without_domain_keeps_first_char() {
        assert_eq!(mask_vpa("success").as_deref(), Some("s***"));
        assert_eq!(mask_vpa(""), None);
    }

    // ─── Other methods ───

    #[test]
    fn netbanking_keeps_bank_name() {
        let mut payment = raw("netbanking");
        payment.bank = Some("HDFC".to_string());

        assert!(matches!(
            sanitize(&payment),
            PaymentMethod::Netbanking(NetbankingDetails { bank: Some(ref b), .. }) if b == "HDFC"
        ));
    }

    #[test]
    fn wallet_keeps_provider_name() {
        let mut payment = raw("wallet");
        payment.wallet = Some("paytm".to_string());

        assert!(matches!(
            sanitize(&payment),
            PaymentMethod::Wallet(WalletDetails { wallet: Some(ref w), .. }) if w == "paytm"
        ));
    }

    #[test]
    fn unknown_method_becomes_other() {
        let method = sanitize(&raw("emi"));
        assert!(matches!(method, PaymentMethod::Other(_)));
        assert_eq!(method.summary().method, "emi");
    }

    #[test]
    fn captured_at_only_set_when_captured() {
        let mut payment = raw("netbanking");
        assert!(sanitize(&payment).summary().captured_at.is_some());

        payment.captured = false;
        assert!(sanitize(&payment).summary().captured_at.is_none());
    }

    #[test]
    fn serializes_as_type_and_details() {
        let mut payment = raw("upi");
        payment.vpa = Some("a@upi".to_string());

        let json = serde_json::to_value(sanitize(&payment)).unwrap();
        assert_eq!(json["type"], "upi");
        assert_eq!(json["details"]["paymentId"], "pay_1");
        assert_eq!(json["details"]["vpa"], "a***@upi");
        assert_eq!(json["details"]["method"], "upi");
    }

    // ─── Properties ───

    proptest! {
        #[test]
        fn card_never_retains_more_than_four_digits(number in "[0-9 -]{0,24}") {
            let mut payment = raw("card");
            payment.card = Some(RawCard { last4: Some(number), ..RawCard::default() });

            let json = serde_json::to_string(&sanitize(&payment)).unwrap();
            let PaymentMethod::Card(details) = sanitize(&payment) else {
                panic!("expected card");
            };
            if let Some(last4) = details.last4 {
                prop_assert!(last4.len() <= 4);
                prop_assert!(last4.chars().all(|c| c.is_ascii_digit()));
            }
            prop_assert!(!json.contains("number"));
        }

        #[test]
        fn masked_vpa_never_contains_local_part_beyond_first_char(
            local in "[a-z0-9.]{2,20}",
            domain in "[a-z]{2,12}",
        ) {
            let masked = mask_vpa(&format!("{}@{}", local, domain)).unwrap();
            let first = local.chars().next().unwrap();
            prop_assert_eq!(masked, format!("{}***@{}", first, domain));
        }
    }
}
