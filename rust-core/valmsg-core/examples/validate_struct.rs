//! Validate a user record and print the resulting report
//!
//! Run with `RUST_LOG=valmsg=debug cargo run --example validate_struct`
//! to see the validation trace.

use serde::Serialize;
use tracing_subscriber::EnvFilter;
use validator::Validate;
use valmsg::{Error, MessageCatalog, Record, Validator};

#[derive(Serialize, Validate, Record)]
struct User {
    #[serde(rename = "username")]
    #[validate(required, length(min = 6, max = 32))]
    username: Option<String>,
    #[serde(rename = "email")]
    #[validate(required, email)]
    email: Option<String>,
    #[serde(rename = "password")]
    #[validate(required, length(min = 8, max = 32))]
    password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = MessageCatalog::new();
    catalog.load_json(r#"{"email": "field value must be a valid email address"}"#)?;
    let validator = Validator::with_catalog(catalog);

    let user = User {
        username: Some("inv".to_string()),
        email: Some("inv.com".to_string()),
        password: Some("inv".to_string()),
    };

    match validator.validate(&user) {
        Ok(()) => println!("user is valid"),
        Err(Error::ValidationFailed(report)) => {
            println!("{}", valmsg::json::to_json_pretty(&report)?);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
