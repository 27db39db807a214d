//! Razorpay REST API object shapes.
//!
//! Only the fields this service reads are modelled. Razorpay serialises empty
//! `notes` as `[]` rather than `{}`, so notes are decoded leniently.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::customer::{CustomerData, CustomerIdentity, CustomerNotes};
use crate::ports::GatewaySubscription;

/// Paged collection wrapper (`{"entity":"collection","count":n,"items":[...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayCollection<T> {
    #[serde(default)]
    pub count: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayCustomer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes: CustomerNotes,
}

impl From<RazorpayCustomer> for CustomerIdentity {
    fn from(c: RazorpayCustomer) -> Self {
        CustomerIdentity {
            id: c.id,
            name: c.name.unwrap_or_default(),
            email: c.email.unwrap_or_default(),
            contact: c.contact.unwrap_or_default(),
            notes: c.notes,
        }
    }
}

/// Body for `POST /customers` and `PUT /customers/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerBody<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub contact: &'a str,
    #[serde(skip_serializing_if = "CustomerNotes::is_empty")]
    pub notes: &'a CustomerNotes,
}

impl<'a> From<&'a CustomerData> for CustomerBody<'a> {
    fn from(data: &'a CustomerData) -> Self {
        CustomerBody {
            name: data.name.trim(),
            email: data.email.trim(),
            contact: data.contact.trim(),
            notes: &data.notes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpaySubscription {
    pub id: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub current_start: Option<i64>,
    #[serde(default)]
    pub current_end: Option<i64>,
    #[serde(default)]
    pub charge_at: Option<i64>,
    #[serde(default)]
    pub paid_count: u32,
    #[serde(default)]
    pub remaining_count: Option<u32>,
    #[serde(default)]
    pub short_url: Option<String>,
}

impl From<RazorpaySubscription> for GatewaySubscription {
    fn from(s: RazorpaySubscription) -> Self {
        GatewaySubscription {
            id: s.id,
            plan_id: s.plan_id,
            customer_id: s.customer_id,
            status: s.status,
            current_start: s.current_start,
            current_end: s.current_end,
            charge_at: s.charge_at,
            paid_count: s.paid_count,
            remaining_count: s.remaining_count,
            short_url: s.short_url,
        }
    }
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorEnvelope {
    pub error: RazorpayErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

fn lenient_notes<'de, D>(deserializer: D) -> Result<CustomerNotes, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let notes = match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        _ => CustomerNotes::new(),
    };
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_with_array_notes_decodes() {
        let customer: RazorpayCustomer = serde_json::from_value(json!({
            "id": "cust_1",
            "entity": "customer",
            "name": "Asha",
            "email": "asha@example.com",
            "contact": null,
            "notes": []
        }))
        .unwrap();

        let identity = CustomerIdentity::from(customer);
        assert_eq!(identity.id, "cust_1");
        assert_eq!(identity.contact, "");
        assert!(identity.notes.is_empty());
    }

    #[test]
    fn customer_notes_values_are_stringified() {
        let customer: RazorpayCustomer = serde_json::from_value(json!({
            "id": "cust_1",
            "notes": {"user_id": "u-1", "tier": 2}
        }))
        .unwrap();

        assert_eq!(customer.notes.get("user_id").map(String::as_str), Some("u-1"));
        assert_eq!(customer.notes.get("tier").map(String::as_str), Some("2"));
    }

    #[test]
    fn customer_body_omits_blank_fields() {
        let data = CustomerData {
            name: "Asha".into(),
            email: "  ".into(),
            contact: "+919876543210".into(),
            notes: CustomerNotes::new(),
        };

        let body = serde_json::to_value(CustomerBody::from(&data)).unwrap();
        assert_eq!(body, json!({"name": "Asha", "contact": "+919876543210"}));
    }

    #[test]
    fn subscription_maps_to_gateway_shape() {
        let sub: RazorpaySubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "plan_id": "plan_1",
            "status": "created",
            "paid_count": 0,
            "remaining_count": 12,
            "short_url": "https://rzp.io/i/abc"
        }))
        .unwrap();

        let gateway = GatewaySubscription::from(sub);
        assert_eq!(gateway.status, "created");
        assert_eq!(gateway.remaining_count, Some(12));
        assert_eq!(gateway.customer_id, None);
    }
}
