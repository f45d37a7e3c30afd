//! Test utilities for the WeChat Pay client.
//!
//! - A scripted [`MockTransport`] that records every request
//! - [`TestFixtures`] with merchant credentials and canned provider replies
//! - Assertion helpers for signed request bodies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wxpay_lib::test_utils::{MockTransport, TestFixtures};
//! use wxpay_lib::{Client, Endpoint, FieldMap};
//!
//! let transport = MockTransport::new().respond_with(TestFixtures::success_reply());
//! let client = Client::new(TestFixtures::config(), transport)?;
//! client.request(&Endpoint::new("/pay/orderquery"), FieldMap::new()).await?;
//!
//! let sent = client.transport().last_request().unwrap();
//! assert_signed(&sent.body, &TestFixtures::key());
//! ```

mod assertions;
mod fixtures;
mod mock_transport;

pub use assertions::{assert_return_error, assert_signed};
pub use fixtures::TestFixtures;
pub use mock_transport::{MockTransport, RecordedRequest};

pub use crate::crypto::aes::encrypt_notification;
