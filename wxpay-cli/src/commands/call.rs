//! Call command - issue a signed request with credentials from the environment

use anyhow::Result;
use wxpay_lib::{Client, Endpoint, HttpTransport};

use crate::ui;

async fn connect(sandbox: bool) -> Result<Client<HttpTransport>> {
    let config = super::load_config()?;
    let sandbox = sandbox || config.sandbox;
    let mut client = Client::from_config(config)?;

    if sandbox {
        client.enable_sandbox().await?;
        ui::info("sandbox mode");
    }
    Ok(client)
}

pub async fn run(
    path: &str,
    pairs: Vec<(String, String)>,
    cert: bool,
    sandbox: bool,
    raw: bool,
) -> Result<()> {
    let client = connect(sandbox).await?;
    let mut endpoint = Endpoint::custom(path);
    if cert {
        endpoint = endpoint.with_cert();
    }
    let fields = super::fields_from_pairs(pairs);

    tracing::info!(url = %client.url_for(&endpoint), "calling");

    if raw {
        ui::value(&client.download(&endpoint, fields).await?);
    } else {
        let reply = client.request(&endpoint, fields).await?;
        ui::json(&serde_json::to_value(&reply)?)?;
    }
    Ok(())
}

pub async fn public_key(sandbox: bool) -> Result<()> {
    let client = connect(sandbox).await?;
    let pem = client.fetch_rsa_public_key().await?;
    ui::key_value("mch_id", &client.config().mch_id);
    ui::value(&pem);
    Ok(())
}
