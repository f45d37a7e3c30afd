//! Signed request pipeline.
//!
//! [`Client`] turns a caller's [`FieldMap`] into a signed XML request and the
//! provider's reply back into fields. Endpoints are described by data
//! ([`Endpoint`]) rather than by one method per API, so any v2 call that
//! follows the common envelope can be issued:
//!
//! ```rust,ignore
//! use wxpay_lib::{Client, Endpoint, FieldMap, MerchantConfig};
//!
//! let client = Client::from_config(MerchantConfig::from_env().unwrap())?;
//!
//! let order = client
//!     .request(
//!         &Endpoint::new("/pay/orderquery"),
//!         FieldMap::new().with("out_trade_no", "1217752501201407033233368018"),
//!     )
//!     .await?;
//! println!("trade_state = {:?}", order.get_str("trade_state"));
//!
//! let refund = client
//!     .request(
//!         &Endpoint::new("/secapi/pay/refund").with_cert(),
//!         FieldMap::new()
//!             .with("out_trade_no", "1217752501201407033233368018")
//!             .with("out_refund_no", "1217752501201407033233368019")
//!             .with("total_fee", 100)
//!             .with("refund_fee", 100),
//!     )
//!     .await?;
//! ```

use std::borrow::Cow;

use crate::config::{MerchantConfig, SANDBOX_PREFIX};
use crate::crypto::{encrypt_field, nonce_str};
use crate::fields::{FieldMap, SIGN_FIELD};
use crate::notify;
use crate::secret::SecretKey;
use crate::signing::{self, SignMethod};
use crate::transport::Transport;
use crate::xml::{from_xml, to_xml};
use crate::{Result, WxPayError};

/// How a merchant identifier is attached to a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IdField {
    /// Under its usual name (`appid` / `mch_id`).
    #[default]
    Default,
    /// Under another name, e.g. `mch_appid` for transfers.
    Renamed(Cow<'static, str>),
    /// Not sent at all.
    Omitted,
}

/// Description of one provider endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Path below the base URL, e.g. `/pay/orderquery`.
    pub path: Cow<'static, str>,
    /// Absolute URL used instead of base URL + path (some APIs live on
    /// another host). Not affected by sandbox mode.
    pub url_override: Option<Cow<'static, str>>,
    /// Whether the call needs the merchant's client certificate.
    pub requires_cert: bool,
    /// How `appid` is attached.
    pub app_id_field: IdField,
    /// How `mch_id` is attached.
    pub mch_id_field: IdField,
}

impl Endpoint {
    /// Sandbox signing-key endpoint. Signed with the real key, no `appid`.
    pub const SANDBOX_SIGN_KEY: Endpoint = Endpoint {
        path: Cow::Borrowed("/pay/getsignkey"),
        url_override: None,
        requires_cert: false,
        app_id_field: IdField::Omitted,
        mch_id_field: IdField::Default,
    };

    /// RSA public-key endpoint on the risk-control host.
    pub const RSA_PUBLIC_KEY: Endpoint = Endpoint {
        path: Cow::Borrowed("/risk/getpublickey"),
        url_override: Some(Cow::Borrowed(
            "https://fraud.mch.weixin.qq.com/risk/getpublickey",
        )),
        requires_cert: true,
        app_id_field: IdField::Omitted,
        mch_id_field: IdField::Default,
    };

    /// An endpoint at a static path, with default id fields and no certificate.
    pub const fn new(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            url_override: None,
            requires_cert: false,
            app_id_field: IdField::Default,
            mch_id_field: IdField::Default,
        }
    }

    /// An endpoint at a runtime path.
    pub fn custom(path: impl Into<String>) -> Self {
        Self {
            path: Cow::Owned(path.into()),
            ..Self::new("")
        }
    }

    /// Require the client certificate.
    pub fn with_cert(mut self) -> Self {
        self.requires_cert = true;
        self
    }

    /// Send to an absolute URL instead of base URL + path.
    pub fn with_url(mut self, url: impl Into<Cow<'static, str>>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    /// Send `appid` under another name.
    pub fn rename_app_id(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.app_id_field = IdField::Renamed(name.into());
        self
    }

    /// Do not send `appid`.
    pub fn omit_app_id(mut self) -> Self {
        self.app_id_field = IdField::Omitted;
        self
    }

    /// Send `mch_id` under another name.
    pub fn rename_mch_id(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.mch_id_field = IdField::Renamed(name.into());
        self
    }

    /// Do not send `mch_id`.
    pub fn omit_mch_id(mut self) -> Self {
        self.mch_id_field = IdField::Omitted;
        self
    }
}

fn attach_id(fields: &mut FieldMap, how: &IdField, default_name: &str, value: &str) {
    match how {
        IdField::Default => {
            fields.insert(default_name, value);
        }
        IdField::Renamed(name) => {
            fields.insert(name.to_string(), value);
        }
        IdField::Omitted => {}
    }
}

/// Fail with [`WxPayError::Return`] when `return_code` is `FAIL`.
pub fn ensure_return_success(fields: &FieldMap) -> Result<()> {
    match fields.get_str("return_code") {
        Some("FAIL") => Err(WxPayError::Return {
            code: "FAIL".to_string(),
            msg: fields.get_string("return_msg").unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}

/// Fail with [`WxPayError::Business`] when `result_code` is `FAIL`.
pub fn ensure_result_success(fields: &FieldMap) -> Result<()> {
    match fields.get_str("result_code") {
        Some("FAIL") => Err(WxPayError::Business {
            err_code: fields.get_string("err_code"),
            err_code_des: fields.get_string("err_code_des"),
        }),
        _ => Ok(()),
    }
}

/// WeChat Pay v2 client.
///
/// Cheap to share behind an `Arc`; all calls take `&self` except the
/// sandbox switches.
pub struct Client<T: Transport> {
    config: MerchantConfig,
    transport: T,
    sandbox: bool,
    sandbox_key: Option<SecretKey>,
}

impl<T: Transport> Client<T> {
    /// Create a client over an existing transport.
    ///
    /// `config.sandbox` is not acted on here, since switching needs a network
    /// round trip; call [`Client::apply_sandbox_setting`] for that.
    pub fn new(config: MerchantConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            sandbox: false,
            sandbox_key: None,
        })
    }

    /// The merchant configuration.
    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether requests currently go to the sandbox.
    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// The key requests are signed with and notifications checked against:
    /// the sandbox key while sandbox mode is on, the merchant key otherwise.
    pub fn signing_key(&self) -> &SecretKey {
        match (&self.sandbox_key, self.sandbox) {
            (Some(key), true) => key,
            _ => &self.config.key,
        }
    }

    /// Full URL for an endpoint under the current mode.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        self.url_in_mode(endpoint, self.sandbox)
    }

    fn url_in_mode(&self, endpoint: &Endpoint, sandbox: bool) -> String {
        if let Some(url) = &endpoint.url_override {
            return url.to_string();
        }
        let prefix = if sandbox { SANDBOX_PREFIX } else { "" };
        format!(
            "{}{}{}",
            self.config.base_url.trim_end_matches('/'),
            prefix,
            endpoint.path
        )
    }

    /// Build the signed request fields without sending them.
    ///
    /// Adds the id fields as the endpoint asks, a fresh `nonce_str`, and the
    /// `sign` computed with the method named by `sign_type` (MD5 if absent).
    pub fn signed_fields(&self, endpoint: &Endpoint, fields: FieldMap) -> Result<FieldMap> {
        self.sign_with(endpoint, fields, self.signing_key())
    }

    fn sign_with(&self, endpoint: &Endpoint, mut fields: FieldMap, key: &SecretKey) -> Result<FieldMap> {
        let method = SignMethod::from_fields(&fields)?;
        attach_id(&mut fields, &endpoint.app_id_field, "appid", &self.config.app_id);
        attach_id(&mut fields, &endpoint.mch_id_field, "mch_id", &self.config.mch_id);
        fields.insert("nonce_str", nonce_str());
        fields.remove(SIGN_FIELD);
        let signature = signing::sign(method, &fields, key);
        fields.insert(SIGN_FIELD, signature.into_string());
        Ok(fields)
    }

    async fn send(&self, endpoint: &Endpoint, fields: FieldMap, key: &SecretKey, sandbox: bool) -> Result<String> {
        let signed = self.sign_with(endpoint, fields, key)?;
        let url = self.url_in_mode(endpoint, sandbox);

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %url, fields = signed.len(), "sending signed request");

        self.transport
            .post(&url, to_xml(&signed)?, endpoint.requires_cert)
            .await
    }

    /// Issue a signed call and return the parsed reply.
    ///
    /// # Errors
    ///
    /// - [`WxPayError::Return`] when the provider answers `return_code=FAIL`
    /// - [`WxPayError::Business`] when it answers `result_code=FAIL`
    /// - [`WxPayError::Xml`] when the reply is not a flat XML document
    /// - transport errors from the underlying [`Transport`]
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(path = %endpoint.path, sandbox = self.sandbox))
    )]
    pub async fn request(&self, endpoint: &Endpoint, fields: FieldMap) -> Result<FieldMap> {
        let body = self
            .send(endpoint, fields, self.signing_key(), self.sandbox)
            .await?;
        let reply = from_xml(&body)?;
        ensure_return_success(&reply)?;
        ensure_result_success(&reply)?;
        Ok(reply)
    }

    /// Issue a signed call whose successful reply is raw text (bills, fund flows).
    ///
    /// Error replies arrive as XML and are turned into errors as in
    /// [`Client::request`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(path = %endpoint.path, sandbox = self.sandbox))
    )]
    pub async fn download(&self, endpoint: &Endpoint, fields: FieldMap) -> Result<String> {
        let body = self
            .send(endpoint, fields, self.signing_key(), self.sandbox)
            .await?;
        if body.trim_start().starts_with('<') {
            if let Ok(reply) = from_xml(&body) {
                ensure_return_success(&reply)?;
                ensure_result_success(&reply)?;
            }
        }
        Ok(body)
    }

    /// Switch to the sandbox, fetching its signing key on first use.
    ///
    /// The key request is signed with the merchant key. On failure the
    /// client stays in its previous mode.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn enable_sandbox(&mut self) -> Result<()> {
        if self.sandbox_key.is_none() {
            let body = self
                .send(&Endpoint::SANDBOX_SIGN_KEY, FieldMap::new(), &self.config.key, true)
                .await?;
            let reply = from_xml(&body)?;
            ensure_return_success(&reply)?;
            let key = reply.get_string("sandbox_signkey").ok_or_else(|| {
                WxPayError::invalid_data("sandbox_signkey", "missing from getsignkey reply")
            })?;
            self.sandbox_key = Some(SecretKey::new(key)?);
        }
        self.sandbox = true;

        #[cfg(feature = "tracing")]
        tracing::info!("sandbox mode enabled");

        Ok(())
    }

    /// Switch back to production. The fetched sandbox key is kept for reuse.
    pub fn disable_sandbox(&mut self) {
        self.sandbox = false;
    }

    /// Enable the sandbox if the configuration asks for it.
    pub async fn apply_sandbox_setting(&mut self) -> Result<()> {
        if self.config.sandbox {
            self.enable_sandbox().await?;
        }
        Ok(())
    }

    /// Fetch the provider's RSA public key (PEM) for field encryption.
    ///
    /// Needs the client certificate.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn fetch_rsa_public_key(&self) -> Result<String> {
        let reply = self
            .request(
                &Endpoint::RSA_PUBLIC_KEY,
                FieldMap::new().with("sign_type", SignMethod::Md5.as_str()),
            )
            .await?;
        reply
            .get_string("pub_key")
            .ok_or_else(|| WxPayError::invalid_data("pub_key", "missing from getpublickey reply"))
    }

    /// Fetch the public key once and RSA-encrypt each value with it.
    ///
    /// Used for the payee's bank account number and real name.
    pub async fn encrypt_sensitive(&self, values: &[&str]) -> Result<Vec<String>> {
        let pem = self.fetch_rsa_public_key().await?;
        values
            .iter()
            .map(|value| encrypt_field(&pem, value).map_err(WxPayError::from))
            .collect()
    }

    /// Signed parameters for a JSAPI (`WeixinJSBridge` / `chooseWXPay`) payment.
    ///
    /// `prepay_id` comes from the unified-order reply. The signature travels
    /// as `paySign` and covers `appId`, `timeStamp`, `nonceStr`, `package`
    /// and `signType`.
    pub fn jsapi_pay_params(&self, prepay_id: &str, method: SignMethod) -> FieldMap {
        self.jsapi_pay_params_at(prepay_id, method, chrono::Utc::now().timestamp())
    }

    fn jsapi_pay_params_at(&self, prepay_id: &str, method: SignMethod, timestamp: i64) -> FieldMap {
        let mut params = FieldMap::new()
            .with("appId", self.config.app_id.as_str())
            .with("timeStamp", timestamp)
            .with("nonceStr", nonce_str())
            .with("package", format!("prepay_id={}", prepay_id))
            .with("signType", method.as_str());
        let signature = signing::sign(method, &params, self.signing_key());
        params.insert("paySign", signature.into_string());
        params
    }

    /// Signed parameters for an in-app (`APP` trade type) payment.
    pub fn app_pay_params(&self, prepay_id: &str, method: SignMethod) -> FieldMap {
        self.app_pay_params_at(prepay_id, method, chrono::Utc::now().timestamp())
    }

    fn app_pay_params_at(&self, prepay_id: &str, method: SignMethod, timestamp: i64) -> FieldMap {
        let mut params = FieldMap::new()
            .with("appid", self.config.app_id.as_str())
            .with("partnerid", self.config.mch_id.as_str())
            .with("prepayid", prepay_id)
            .with("package", "Sign=WXPay")
            .with("noncestr", nonce_str())
            .with("timestamp", timestamp);
        let signature = signing::sign(method, &params, self.signing_key());
        params.insert(SIGN_FIELD, signature.into_string());
        params
    }

    /// Signed query parameters for a contract-signing (entrust) page.
    ///
    /// `options` are laid over `appid` / `mch_id` and signed with
    /// HMAC-SHA256. `timestamp` and `version` are attached after signing and
    /// are not covered by `sign`.
    pub fn entrust_params(&self, options: FieldMap) -> FieldMap {
        self.entrust_params_at(options, chrono::Utc::now().timestamp())
    }

    fn entrust_params_at(&self, options: FieldMap, timestamp: i64) -> FieldMap {
        let mut params = FieldMap::new()
            .with("appid", self.config.app_id.as_str())
            .with("mch_id", self.config.mch_id.as_str());
        params.merge(options);
        params.remove(SIGN_FIELD);
        let signature = signing::sign(SignMethod::HmacSha256, &params, self.signing_key());
        params.insert(SIGN_FIELD, signature.into_string());
        params.insert("timestamp", timestamp);
        params.insert("version", "1.0");
        params
    }

    /// Verify a signed payload against the effective key, using its `sign_type`.
    pub fn verify(&self, fields: &FieldMap) -> bool {
        signing::verify_declared(fields, self.signing_key())
    }

    /// Parse and verify a payment notification. See [`notify::parse_pay_notification`].
    pub fn pay_notification(&self, body: &str) -> Result<FieldMap> {
        notify::parse_pay_notification(body, self.signing_key())
    }

    /// Parse and decrypt a refund notification. See [`notify::decode_refund_notification`].
    pub fn refund_notification(&self, body: &str) -> Result<FieldMap> {
        notify::decode_refund_notification(body, self.signing_key())
    }
}

#[cfg(feature = "http-client")]
impl Client<crate::transport::HttpTransport> {
    /// Create a client with the HTTPS transport.
    pub fn from_config(config: MerchantConfig) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(&config)?;
        Self::new(config, transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockTransport, TestFixtures};

    fn client(transport: MockTransport) -> Client<MockTransport> {
        Client::new(TestFixtures::config(), transport).unwrap()
    }

    fn sent_fields(transport: &MockTransport) -> FieldMap {
        from_xml(&transport.last_request().unwrap().body).unwrap()
    }

    #[tokio::test]
    async fn test_request_assembly() {
        let client = client(MockTransport::new().respond_with(TestFixtures::success_reply()));
        let reply = client
            .request(
                &Endpoint::new("/pay/orderquery"),
                FieldMap::new().with("out_trade_no", "1217752501201407033233368018"),
            )
            .await
            .unwrap();
        assert_eq!(reply.get_str("result_code"), Some("SUCCESS"));

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.url, "https://api.mch.weixin.qq.com/pay/orderquery");
        assert!(!request.use_client_cert);

        let sent = sent_fields(client.transport());
        assert_eq!(sent.get_str("appid"), Some(TestFixtures::APP_ID));
        assert_eq!(sent.get_str("mch_id"), Some(TestFixtures::MCH_ID));
        assert_eq!(sent.get_str("nonce_str").map(str::len), Some(32));
        assert!(signing::verify(&sent, SignMethod::Md5, &TestFixtures::key()));
    }

    #[tokio::test]
    async fn test_hmac_sign_type_honoured() {
        let client = client(MockTransport::new().respond_with(TestFixtures::success_reply()));
        client
            .request(
                &Endpoint::new("/pay/micropay"),
                FieldMap::new().with("sign_type", "HMAC-SHA256"),
            )
            .await
            .unwrap();
        let sent = sent_fields(client.transport());
        assert_eq!(sent.get_str("sign").map(str::len), Some(64));
        assert!(signing::verify(&sent, SignMethod::HmacSha256, &TestFixtures::key()));
    }

    #[tokio::test]
    async fn test_unsupported_sign_type_rejected_before_sending() {
        let client = client(MockTransport::new());
        let err = client
            .request(&Endpoint::new("/pay/micropay"), FieldMap::new().with("sign_type", "RSA"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::WxPayErrorCode::UnsupportedSignMethod);
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_id_field_renaming_and_omission() {
        let client = client(MockTransport::new().respond_with(TestFixtures::success_reply()));
        let endpoint = Endpoint::new("/mmpaymkttransfers/promotion/transfers")
            .with_cert()
            .rename_app_id("mch_appid")
            .rename_mch_id("mchid");
        client.request(&endpoint, FieldMap::new()).await.unwrap();

        let sent = sent_fields(client.transport());
        assert_eq!(sent.get_str("mch_appid"), Some(TestFixtures::APP_ID));
        assert_eq!(sent.get_str("mchid"), Some(TestFixtures::MCH_ID));
        assert!(!sent.contains_key("appid"));
        assert!(!sent.contains_key("mch_id"));
        assert!(client.transport().last_request().unwrap().use_client_cert);

        let endpoint = Endpoint::custom("/pay/closeorder").omit_app_id().omit_mch_id();
        client.transport().push_response(TestFixtures::success_reply());
        client.request(&endpoint, FieldMap::new()).await.unwrap();
        let sent = sent_fields(client.transport());
        assert!(!sent.contains_key("appid"));
        assert!(!sent.contains_key("mch_id"));
    }

    #[tokio::test]
    async fn test_return_fail() {
        let client = client(MockTransport::new().respond_with(
            "<xml><return_code><![CDATA[FAIL]]></return_code><return_msg><![CDATA[签名错误]]></return_msg></xml>",
        ));
        let err = client
            .request(&Endpoint::new("/pay/orderquery"), FieldMap::new())
            .await
            .unwrap_err();
        match err {
            WxPayError::Return { code, msg } => {
                assert_eq!(code, "FAIL");
                assert_eq!(msg, "签名错误");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_result_fail() {
        let client = client(MockTransport::new().respond_with(
            "<xml><return_code>SUCCESS</return_code><result_code>FAIL</result_code>\
             <err_code>ORDERNOTEXIST</err_code><err_code_des>此交易订单号不存在</err_code_des></xml>",
        ));
        let err = client
            .request(&Endpoint::new("/pay/orderquery"), FieldMap::new())
            .await
            .unwrap_err();
        match err {
            WxPayError::Business { err_code, err_code_des } => {
                assert_eq!(err_code.as_deref(), Some("ORDERNOTEXIST"));
                assert_eq!(err_code_des.as_deref(), Some("此交易订单号不存在"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_returns_raw_text() {
        let bill = "交易时间,公众账号ID,商户号\n`2014-11-10 16:33:45,`wx2421b1c4370ec43b,`10000100\n";
        let client = client(MockTransport::new().respond_with(bill));
        let text = client
            .download(
                &Endpoint::new("/pay/downloadbill"),
                FieldMap::new().with("bill_date", "20141110").with("bill_type", "ALL"),
            )
            .await
            .unwrap();
        assert_eq!(text, bill);

        client.transport().push_response(
            "<xml><return_code>FAIL</return_code><return_msg>No Bill Exist</return_msg></xml>",
        );
        let err = client
            .download(&Endpoint::new("/pay/downloadbill"), FieldMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "FAIL: No Bill Exist");
    }

    #[tokio::test]
    async fn test_sandbox_switching() {
        let mut client = client(
            MockTransport::new()
                .respond_with(TestFixtures::sandbox_key_reply())
                .respond_with(TestFixtures::success_reply()),
        );
        client.enable_sandbox().await.unwrap();
        assert!(client.is_sandbox());
        assert_eq!(client.signing_key().expose(), TestFixtures::SANDBOX_KEY);

        // key fetch: sandbox URL, merchant key, no appid
        let fetch = client.transport().requests()[0].clone();
        assert_eq!(fetch.url, "https://api.mch.weixin.qq.com/sandboxnew/pay/getsignkey");
        let fetch_fields = from_xml(&fetch.body).unwrap();
        assert!(!fetch_fields.contains_key("appid"));
        assert!(signing::verify(&fetch_fields, SignMethod::Md5, &TestFixtures::key()));

        client
            .request(&Endpoint::new("/pay/orderquery"), FieldMap::new())
            .await
            .unwrap();
        let request = client.transport().last_request().unwrap();
        assert_eq!(request.url, "https://api.mch.weixin.qq.com/sandboxnew/pay/orderquery");
        let sandbox_key = SecretKey::new(TestFixtures::SANDBOX_KEY).unwrap();
        assert!(signing::verify(&sent_fields(client.transport()), SignMethod::Md5, &sandbox_key));

        client.disable_sandbox();
        assert_eq!(client.signing_key().expose(), TestFixtures::KEY);
        assert_eq!(
            client.url_for(&Endpoint::new("/pay/orderquery")),
            "https://api.mch.weixin.qq.com/pay/orderquery"
        );

        // cached key, no second fetch
        client.enable_sandbox().await.unwrap();
        assert_eq!(client.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_sandbox_fetch_failure_keeps_mode() {
        let mut client = client(MockTransport::new().respond_with(
            "<xml><return_code>FAIL</return_code><return_msg>mch_id invalid</return_msg></xml>",
        ));
        assert!(client.enable_sandbox().await.is_err());
        assert!(!client.is_sandbox());
        assert_eq!(client.signing_key().expose(), TestFixtures::KEY);
    }

    #[tokio::test]
    async fn test_fetch_public_key_and_encrypt() {
        let client = client(MockTransport::new().respond_with(TestFixtures::public_key_reply()));
        let values = client.encrypt_sensitive(&["6222000000000000", "张三"]).await.unwrap();
        assert_eq!(values.len(), 2);

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.url, "https://fraud.mch.weixin.qq.com/risk/getpublickey");
        assert!(request.use_client_cert);
        let sent = from_xml(&request.body).unwrap();
        assert_eq!(sent.get_str("sign_type"), Some("MD5"));
        assert!(!sent.contains_key("appid"));
    }

    #[tokio::test]
    async fn test_public_key_override_ignores_sandbox() {
        let mut client = client(MockTransport::new().respond_with(TestFixtures::sandbox_key_reply()));
        client.enable_sandbox().await.unwrap();
        assert_eq!(
            client.url_for(&Endpoint::RSA_PUBLIC_KEY),
            "https://fraud.mch.weixin.qq.com/risk/getpublickey"
        );
    }

    #[tokio::test]
    async fn test_markup_in_field_name_never_sent() {
        let client = client(MockTransport::new().respond_with(TestFixtures::success_reply()));
        let err = client
            .request(
                &Endpoint::new("/pay/unifiedorder"),
                FieldMap::new()
                    .with("a></a><total_fee>1</total_fee><b", "x")
                    .with("total_fee", 100),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::WxPayErrorCode::Xml);
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let mut config = TestFixtures::config();
        config.base_url = "https://api.mch.weixin.qq.com/".to_string();
        let client = Client::new(config, MockTransport::new()).unwrap();
        assert_eq!(
            client.url_for(&Endpoint::new("/pay/orderquery")),
            "https://api.mch.weixin.qq.com/pay/orderquery"
        );
    }

    /// Move a `paySign` under `sign` so the usual verifier can check it.
    fn with_sign_field(mut params: FieldMap, name: &str) -> FieldMap {
        let signature = params.remove(name).unwrap();
        params.insert(SIGN_FIELD, signature);
        params
    }

    #[test]
    fn test_jsapi_pay_params() {
        let client = client(MockTransport::new());
        let params = client.jsapi_pay_params_at("wx201410272009395522657a690389285100", SignMethod::Md5, 1414561699);

        assert_eq!(params.get_str("appId"), Some(TestFixtures::APP_ID));
        assert_eq!(params.get_string("timeStamp").as_deref(), Some("1414561699"));
        assert_eq!(params.get_str("package"), Some("prepay_id=wx201410272009395522657a690389285100"));
        assert_eq!(params.get_str("signType"), Some("MD5"));
        assert_eq!(params.get_str("nonceStr").map(str::len), Some(32));
        assert!(!params.contains_key(SIGN_FIELD));

        let checked = with_sign_field(params, "paySign");
        assert!(signing::verify(&checked, SignMethod::Md5, &TestFixtures::key()));
    }

    #[test]
    fn test_jsapi_pay_params_hmac() {
        let client = client(MockTransport::new());
        let params = client.jsapi_pay_params("wx2014", SignMethod::HmacSha256);
        assert_eq!(params.get_str("signType"), Some("HMAC-SHA256"));
        assert_eq!(params.get_str("paySign").map(str::len), Some(64));

        let checked = with_sign_field(params, "paySign");
        assert!(signing::verify(&checked, SignMethod::HmacSha256, &TestFixtures::key()));
        assert!(!signing::verify(&checked, SignMethod::Md5, &TestFixtures::key()));
    }

    #[test]
    fn test_app_pay_params() {
        let client = client(MockTransport::new());
        let params = client.app_pay_params_at("wx201410272009395522657a690389285100", SignMethod::Md5, 1414561699);

        assert_eq!(params.get_str("appid"), Some(TestFixtures::APP_ID));
        assert_eq!(params.get_str("partnerid"), Some(TestFixtures::MCH_ID));
        assert_eq!(params.get_str("prepayid"), Some("wx201410272009395522657a690389285100"));
        assert_eq!(params.get_str("package"), Some("Sign=WXPay"));
        assert_eq!(params.get_string("timestamp").as_deref(), Some("1414561699"));
        assert!(signing::verify(&params, SignMethod::Md5, &TestFixtures::key()));
    }

    #[tokio::test]
    async fn test_pay_params_use_sandbox_key() {
        let mut client = client(MockTransport::new().respond_with(TestFixtures::sandbox_key_reply()));
        client.enable_sandbox().await.unwrap();
        let params = client.app_pay_params("wx2014", SignMethod::Md5);
        let sandbox_key = SecretKey::new(TestFixtures::SANDBOX_KEY).unwrap();
        assert!(signing::verify(&params, SignMethod::Md5, &sandbox_key));
        assert!(!signing::verify(&params, SignMethod::Md5, &TestFixtures::key()));
    }

    #[test]
    fn test_entrust_params() {
        let client = client(MockTransport::new());
        let params = client.entrust_params_at(
            FieldMap::new()
                .with("plan_id", 12535)
                .with("contract_code", "100000")
                .with("request_serial", 1000)
                .with("contract_display_account", "微信代扣")
                .with("notify_url", "https://example.com/entrust/notify")
                .with("sign", "STALE"),
            1414561699,
        );

        assert_eq!(params.get_str("appid"), Some(TestFixtures::APP_ID));
        assert_eq!(params.get_str("mch_id"), Some(TestFixtures::MCH_ID));
        assert_eq!(params.get_str("version"), Some("1.0"));
        assert_eq!(params.get_string("timestamp").as_deref(), Some("1414561699"));
        assert_eq!(params.get_str("sign").map(str::len), Some(64));

        // signed before timestamp and version were attached
        let mut covered = params.clone();
        covered.remove("timestamp");
        covered.remove("version");
        assert!(signing::verify(&covered, SignMethod::HmacSha256, &TestFixtures::key()));
        assert!(!signing::verify(&params, SignMethod::HmacSha256, &TestFixtures::key()));
    }

    #[test]
    fn test_entrust_options_override_ids() {
        let client = client(MockTransport::new());
        let params = client.entrust_params(FieldMap::new().with("appid", "wxd678efh567hg6787"));
        assert_eq!(params.get_str("appid"), Some("wxd678efh567hg6787"));
        assert!(chrono::Utc::now().timestamp() - params.parse::<i64>("timestamp").unwrap() < 60);
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = TestFixtures::config();
        config.app_id.clear();
        assert!(Client::new(config, MockTransport::new()).is_err());
    }

    #[test]
    fn test_signed_fields_replace_stale_sign() {
        let client = client(MockTransport::new());
        let signed = client
            .signed_fields(&Endpoint::new("/pay/orderquery"), FieldMap::new().with("sign", "STALE"))
            .unwrap();
        assert_ne!(signed.get_str("sign"), Some("STALE"));
        assert!(client.verify(&signed));
    }
}
