use crate::output::print_json;
use siteid_core::grammar::{parse_facility_suffix, parse_order_id};

pub fn run(id: &str, json: bool) -> anyhow::Result<()> {
    if let Some(suffix) = parse_facility_suffix(id) {
        if json {
            print_json(&serde_json::json!({
                "kind": "facility_id",
                "value": id,
                "suffix": suffix,
            }))?;
        } else {
            println!(
                "{id}: valid facility id (region {}, sequence {})",
                suffix.region,
                suffix.seq_text()
            );
        }
        return Ok(());
    }

    if let Some(order) = parse_order_id(id) {
        if json {
            print_json(&serde_json::json!({
                "kind": "order_id",
                "value": id,
                "order": order,
            }))?;
        } else {
            println!(
                "{id}: valid order id (year {}, sequence {})",
                order.year, order.seq
            );
        }
        return Ok(());
    }

    anyhow::bail!("'{id}' is neither a facility id (SITE-<REGION>-<SEQ>) nor an order id (ORD-<YEAR>-<SEQ>)")
}
