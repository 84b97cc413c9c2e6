//! HTTP SMS gateway adapter.
//!
//! Implements `SmsGateway` against a JSON gateway exposing `POST /sendsms` and
//! `POST /filterDLR` with static credentials in the request body.

use crate::domain::DomainError;
use crate::ports::{DeliveryReceipt, SendReceipt, SentMessage, SmsGateway};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway message signalling rejected credentials.
const INVALID_CREDENTIALS: &str = "Invalid Username or Password";

/// Static credentials sent with every request.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub user: String,
    pub password: String,
    pub sender_id: String,
}

/// reqwest-backed gateway client.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    base_url: String,
    credentials: GatewayCredentials,
    country_code: String,
}

impl HttpSmsGateway {
    /// Create a gateway client.
    ///
    /// # Arguments
    /// * `base_url` - Gateway root, e.g. "https://sms.example.com/api" (no trailing slash)
    /// * `credentials` - user, password and sender id
    /// * `country_code` - prepended to every destination number (e.g. "237")
    /// * `timeout` - per-request timeout
    pub fn new(
        base_url: String,
        credentials: GatewayCredentials,
        country_code: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            country_code,
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, DomainError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DomainError::Auth(INVALID_CREDENTIALS.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, endpoint, body = %text, "gateway returned HTTP error");
            return Err(DomainError::Gateway(format!("HTTP error! status: {}", status)));
        }
        Ok(response)
    }
}

#[derive(Serialize)]
struct SendSmsRequest<'a> {
    user: &'a str,
    password: &'a str,
    senderid: &'a str,
    sms: &'a str,
    mobiles: String,
}

#[derive(Serialize)]
struct FilterDlrRequest<'a> {
    user: &'a str,
    password: &'a str,
    startdate: &'a str,
    enddate: &'a str,
}

#[derive(Deserialize)]
struct SendSmsResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    responsecode: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    responsedescription: String,
    #[serde(default, deserialize_with = "lenient_string")]
    responsemessage: String,
    #[serde(default)]
    sms: Option<Vec<SmsEntry>>,
}

#[derive(Deserialize)]
struct SmsEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    messageid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    mobileno: String,
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    errorcode: String,
    #[serde(default, deserialize_with = "lenient_string")]
    errordescription: String,
}

#[derive(Deserialize)]
struct FilterDlrResponse {
    #[serde(default)]
    dlrlist: Option<Vec<DlrEntry>>,
}

#[derive(Deserialize)]
struct DlrEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    messageid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    mobileno: String,
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
}

/// Gateways are inconsistent about quoting numbers; accept both.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(-1),
        _ => -1,
    })
}

#[async_trait::async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send_sms(
        &self,
        national_number: &str,
        body: &str,
    ) -> Result<SendReceipt, DomainError> {
        let request = SendSmsRequest {
            user: &self.credentials.user,
            password: &self.credentials.password,
            senderid: &self.credentials.sender_id,
            sms: body,
            mobiles: format!("{}{}", self.country_code, national_number),
        };
        let response = self.post("sendsms", &request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::Gateway(format!("read response: {}", e)))?;
        debug!(to = %request.mobiles, body = %text, "sendsms response");

        let data: SendSmsResponse = serde_json::from_str(&text).map_err(|e| {
            DomainError::Gateway(format!("Invalid response format: {}", e))
        })?;

        if data.responsecode == 0 && data.responsedescription.eq_ignore_ascii_case("error") {
            if data
                .responsemessage
                .eq_ignore_ascii_case(INVALID_CREDENTIALS)
            {
                return Err(DomainError::Auth(data.responsemessage));
            }
            let message = if data.responsemessage.is_empty() {
                "Error sending SMS".to_string()
            } else {
                data.responsemessage
            };
            return Err(DomainError::Gateway(message));
        }

        let sms = data.sms.ok_or_else(|| {
            DomainError::Gateway("Invalid response format: sms property is not an array".into())
        })?;

        Ok(SendReceipt {
            response_code: data.responsecode,
            response_description: data.responsedescription,
            response_message: data.responsemessage,
            sms: sms
                .into_iter()
                .map(|s| SentMessage {
                    message_id: s.messageid,
                    mobile_no: s.mobileno,
                    status: s.status,
                    error_code: s.errorcode,
                    error_description: s.errordescription,
                })
                .collect(),
        })
    }

    async fn filter_dlr(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<DeliveryReceipt>, DomainError> {
        let request = FilterDlrRequest {
            user: &self.credentials.user,
            password: &self.credentials.password,
            startdate: start,
            enddate: end,
        };
        let response = self.post("filterDLR", &request).await?;
        let data: FilterDlrResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Gateway(format!("Invalid response format: {}", e)))?;
        let list = data.dlrlist.ok_or_else(|| {
            DomainError::Gateway(
                "Invalid response format: dlrlist property is not an array".into(),
            )
        })?;
        debug!(start, end, receipts = list.len(), "filterDLR response");

        Ok(list
            .into_iter()
            .map(|d| DeliveryReceipt {
                message_id: d.messageid,
                mobile_no: d.mobileno,
                status: d.status,
            })
            .collect())
    }
}
