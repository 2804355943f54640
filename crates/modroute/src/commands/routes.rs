//! Routes command: bake and print the route table

use modroute_common::config::ModrouteConfig;
use modroute_core::ModManager;
use starbase::AppResult;

use super::{fail, fail_build};

/// Run the routes command
pub fn run_routes(config: &ModrouteConfig, json: bool) -> AppResult {
    let mut manager = ModManager::from_config(config);
    let table = match manager.rebuild() {
        Ok(table) => table,
        Err(e) => return fail_build(&e, manager.disabled()),
    };

    if json {
        return match serde_json::to_string_pretty(table.as_ref()) {
            Ok(output) => {
                println!("{}", output);
                Ok(None)
            }
            Err(e) => fail(format!("Failed to serialize route table: {}", e)),
        };
    }

    if table.is_empty() {
        println!("No routes. Enable extensions with 'modroute extension enable <id>'");
        return Ok(None);
    }

    let enabled = manager.enabled_extensions().map_or(0, |ids| ids.len());
    println!("Routes from {} enabled extension(s):", enabled);
    println!();
    for (virtual_url, physical_url) in table.iter() {
        println!("  {:<48} -> {}", virtual_url, physical_url);
    }
    println!();
    println!("{} route(s)", table.len());

    Ok(None)
}
