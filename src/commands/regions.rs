//! List the built-in SLS regional endpoints.

use crate::config::Region;

pub fn run() {
    println!("{:<6} Base URL", "Region");
    for region in Region::ALL {
        println!("{:<6} {}", region.code(), region.base_url());
    }
    println!();
    println!("Use --region <code>, or --base-url <url> for a tenant-specific endpoint.");
}
