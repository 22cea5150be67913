#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel map API server binary.

use parcel_map_carto::{CartoClient, HostConfig};
use parcel_map_catalog::Catalog;
use parcel_map_server::{AppState, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let host = HostConfig::load().map_err(std::io::Error::other)?;
    log::info!("Using rendering host {} ({})", host.name, host.map_api_url);

    let catalog = Catalog::from_registry();
    log::info!("Loaded {} datasets", catalog.get_datasets().len());

    run_server(AppState {
        catalog,
        carto: CartoClient::new(host),
    })
    .await
}
