//! wxpay CLI
//!
//! Command-line front end for the WeChat Pay v2 signing protocol: sign and
//! verify payloads, decrypt refund notifications, encrypt sensitive fields,
//! and issue ad-hoc signed calls.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod ui;

use commands::parse_pair;

#[derive(Parser, Debug)]
#[command(name = "wxpay")]
#[command(about = "WeChat Pay v2 signing and request tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign key=value pairs
    Sign {
        /// Fields as key=value
        #[arg(value_parser = parse_pair)]
        pairs: Vec<(String, String)>,

        /// Merchant API secret
        #[arg(short, long, env = "WXPAY_KEY", hide_env_values = true)]
        key: String,

        /// Sign method (MD5 or HMAC-SHA256)
        #[arg(short, long, default_value = "MD5")]
        method: String,

        /// Print the signed XML document instead of the signature
        #[arg(long)]
        xml: bool,
    },

    /// Verify the signature of an XML payload
    Verify {
        /// XML file (reads stdin when omitted or "-")
        file: Option<PathBuf>,

        /// Merchant API secret
        #[arg(short, long, env = "WXPAY_KEY", hide_env_values = true)]
        key: String,
    },

    /// Decrypt a req_info value or a whole refund notification
    Decrypt {
        /// Base64 req_info, notification XML, or "-" for stdin
        input: String,

        /// Merchant API secret
        #[arg(short, long, env = "WXPAY_KEY", hide_env_values = true)]
        key: String,
    },

    /// RSA-encrypt a value with the provider public key
    Encrypt {
        /// Value to encrypt
        value: String,

        /// PEM public key file
        #[arg(long)]
        pem: PathBuf,

        /// Use PKCS#1 v1.5 padding instead of OAEP
        #[arg(long)]
        pkcs1: bool,
    },

    /// Generate a nonce_str
    Nonce {
        /// Number of characters
        #[arg(short, long, default_value = "32")]
        len: usize,
    },

    /// Issue a signed call (credentials from WXPAY_* variables)
    Call {
        /// Endpoint path, e.g. /pay/orderquery
        path: String,

        /// Request fields as key=value
        #[arg(value_parser = parse_pair)]
        pairs: Vec<(String, String)>,

        /// Present the client certificate
        #[arg(long)]
        cert: bool,

        /// Use the sandbox environment
        #[arg(long)]
        sandbox: bool,

        /// Print the raw reply (bill downloads)
        #[arg(long)]
        raw: bool,
    },

    /// Fetch the RSA public key for field encryption
    PublicKey {
        /// Use the sandbox environment
        #[arg(long)]
        sandbox: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "wxpay_cli=debug,wxpay_lib=debug"
    } else {
        "wxpay_cli=info,wxpay_lib=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch commands
    let outcome = match cli.command {
        Commands::Sign {
            pairs,
            key,
            method,
            xml,
        } => commands::sign::run(pairs, &key, &method, xml),
        Commands::Verify { file, key } => commands::verify::run(file.as_deref(), &key),
        Commands::Decrypt { input, key } => commands::decrypt::run(&input, &key),
        Commands::Encrypt { value, pem, pkcs1 } => commands::encrypt::run(&value, &pem, pkcs1),
        Commands::Nonce { len } => commands::nonce::run(len),
        Commands::Call {
            path,
            pairs,
            cert,
            sandbox,
            raw,
        } => commands::call::run(&path, pairs, cert, sandbox, raw).await,
        Commands::PublicKey { sandbox } => commands::call::public_key(sandbox).await,
    };

    if let Err(e) = &outcome {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
