//! Walks an error from a failing leaf function up to the top-level handler.
//!
//! This example demonstrates:
//! - Declaring a template hierarchy once and stamping records from it
//! - Explaining a failure on its way up the stack
//! - Classifying the failure against the hierarchy
//! - Printing the JSON form and the human report
//!
//! Run with:
//! ```bash
//! RUST_LOG=khata=debug cargo run -p khata --example checkout
//! ```

use khata::{ErrorRecord, IntoRecord, ReportConfig, ResultExt, Template, explain, handle_khata_with};

struct Templates {
    payment: Template,
    declined: Template,
    malformed: Template,
}

impl Templates {
    fn new() -> Self {
        let payment = Template::new()
            .with_type("PaymentError")
            .with_exit_code(-1)
            .with_property("service", "checkout");
        let declined = payment.extend().with_code(402).with_message("card declined");
        let malformed = payment.extend().with_code(422).with_type("MalformedAmount");
        Self {
            payment,
            declined,
            malformed,
        }
    }
}

fn parse_amount(raw: &str, templates: &Templates) -> Result<u64, ErrorRecord> {
    raw.parse::<u64>()
        .into_record_with(&templates.malformed)
        .explain("parsing the cart total")
}

fn charge(customer: &str, raw_amount: &str, templates: &Templates) -> Result<(), ErrorRecord> {
    let amount = parse_amount(raw_amount, templates)?;
    if amount > 10_000 {
        let mut err = templates.declined.new_error(Vec::<String>::new());
        err.set_property("amount", amount);
        explain!(err, "charging {} cents to {}", amount, customer);
        return Err(err);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let templates = Templates::new();
    let config = ReportConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default report configuration");
        ReportConfig::default()
    });

    for (customer, amount) in [("c_42", "25000"), ("c_7", "12.50")] {
        let Err(mut err) = charge(customer, amount, &templates).explain("checking out") else {
            continue;
        };

        if err.is_related_to(&templates.payment) {
            println!("payment failure, code {}", err.code());
        }
        println!("{}", err.to_json());
        handle_khata_with(err, &config);
    }
}
