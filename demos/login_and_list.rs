// SPDX-License-Identifier: MPL-2.0

//! Login and system listing example.
//!
//! Logs in to the AlphaESS cloud, lists the systems of the account and, for
//! each one, prints its settings summary, latest power flow and the status of
//! every charging pile.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example login_and_list -- <username> <password> [base_url]
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Public cloud
//! cargo run --example login_and_list -- user@example.com secret
//!
//! # Local mock or proxy
//! cargo run --example login_and_list -- user@example.com secret http://127.0.0.1:8080/api
//! ```

use std::env;

use alphaess_cloud::{AlphaCloud, CloudConfig, System};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let mut config = CloudConfig::new(&args[1], &args[2]);
    if let Some(base_url) = args.get(3) {
        config = config.with_base_url(base_url);
    }

    println!("=== AlphaESS Cloud ===");
    println!("Endpoint: {}", config.base_url());
    println!();

    let mut cloud = AlphaCloud::with_config(config)?;

    if !cloud.login().await? {
        eprintln!("Login rejected, check the credentials");
        std::process::exit(1);
    }
    if let Some(token) = cloud.session().token() {
        println!("Logged in, token valid until {}", token.expires_at());
    }

    let ids: Vec<String> = cloud.fetch_system_list().await?.keys().cloned().collect();
    if ids.is_empty() {
        println!("No systems found");
        return Ok(());
    }

    for id in ids {
        let Some(mut handle) = cloud.system_mut(&id) else {
            continue;
        };

        if handle.fetch_settings().await?.is_none() {
            println!("System {id}: settings unavailable");
            continue;
        }
        print_system(handle.system());

        match handle.fetch_last_power_data().await? {
            Some(power) => {
                println!("  PV power:      {:.0} W", power.pv_power);
                println!("  EV power:      {:.0} W", power.ev_power);
                if let Some(battery) = power.battery_power {
                    println!("  Battery power: {battery:.0} W");
                }
                if let Some(soc) = power.battery_soc {
                    println!("  Battery SOC:   {soc:.1} %");
                }
            }
            None => println!("  Power data unavailable"),
        }

        let pile_ids: Vec<String> = handle.system().piles().keys().cloned().collect();
        for pile_id in pile_ids {
            let Some(mut pile) = handle.pile(&pile_id) else {
                continue;
            };
            // A failed status read is reported per pile, not fatal
            match pile.fetch_charging_status().await {
                Ok(status) => println!("  Pile {pile_id}: {status}"),
                Err(e) => println!("  Pile {pile_id}: status unavailable ({e})"),
            }
        }
        println!();
    }

    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} <username> <password> [base_url]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} user@example.com secret");
    eprintln!("  {program} user@example.com secret http://127.0.0.1:8080/api");
}

/// Prints identity and hardware details of a system.
fn print_system(system: &System) {
    println!("System {} ({})", system.system_id(), system.serial_number());
    if let Some(inverter) = system.model_inverter() {
        println!("  Inverter:      {inverter}");
    }
    if let Some(battery) = system.model_battery() {
        println!("  Battery:       {battery}");
    }
    match system.version_backupbox() {
        Some(version) => println!("  Backup box:    {version}"),
        None => println!("  Backup box:    none"),
    }
    println!("  Charging piles: {}", system.piles().len());
}
