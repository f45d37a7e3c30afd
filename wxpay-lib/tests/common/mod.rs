//! Common test utilities for wxpay-lib integration tests

use wxpay_lib::test_utils::TestFixtures;
use wxpay_lib::{to_xml, FieldMap, MerchantConfig, SecretKey, SignMethod};

pub use wxpay_lib::test_utils::encrypt_notification;

#[allow(dead_code)]
pub const APP_ID: &str = TestFixtures::APP_ID;
#[allow(dead_code)]
pub const MCH_ID: &str = TestFixtures::MCH_ID;

#[allow(dead_code)]
pub fn key() -> SecretKey {
    TestFixtures::key()
}

/// Merchant configuration pointed at a mock server
#[allow(dead_code)]
pub fn config(base_url: &str) -> MerchantConfig {
    TestFixtures::config()
        .with_base_url(base_url)
        .with_timeout(5)
}

/// Sign `fields` and render them as XML
#[allow(dead_code)]
pub fn signed_xml(fields: FieldMap, method: SignMethod, key: &SecretKey) -> String {
    TestFixtures::signed_xml(fields, method, key)
}

#[allow(dead_code)]
pub fn success_reply(extra: &[(&str, &str)]) -> String {
    let mut fields = FieldMap::new()
        .with("return_code", "SUCCESS")
        .with("return_msg", "OK")
        .with("result_code", "SUCCESS");
    for (k, v) in extra {
        fields.insert(*k, *v);
    }
    to_xml(&fields).unwrap()
}
