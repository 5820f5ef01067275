use crate::output::print_json;
use siteid_core::config::EngineConfig;
use siteid_core::grammar::derive_order_id;

pub fn run(
    config: &EngineConfig,
    facility_id: &str,
    year: Option<i32>,
    json: bool,
) -> anyhow::Result<()> {
    let year = year.unwrap_or_else(|| config.year());
    let order_id = derive_order_id(facility_id, Some(year))?;

    if json {
        print_json(&serde_json::json!({
            "facility_id": facility_id,
            "order_id": order_id,
        }))?;
    } else {
        println!("{order_id}");
    }
    Ok(())
}
