#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the parcel map styling core.
//!
//! ```text
//! parcel_map datasets [--mode category]
//! parcel_map fields <dataset> [--mode range]
//! parcel_map palettes
//! parcel_map values <dataset> <field>
//! parcel_map style <dataset> <field> [--target line] [--tiles] [--sample] category --item R=red
//! parcel_map style <dataset> <field> range --min 0 --max 100000 --color blue
//! parcel_map style <dataset> <field> choropleth --palette blue --bins 5 [--method jenks] [--reverse]
//! parcel_map highlight <dataset> <field> <value> --color pink
//! parcel_map base [--tiles]
//! parcel_map parcel --lat 40.44 --lng -79.99
//! ```
//!
//! Commands that need the rendering host read it from
//! `PARCEL_MAP_HOST_CONFIG`, falling back to the embedded default.

use clap::{Parser, Subcommand};
use parcel_map_carto::{CartoClient, HostConfig};
use parcel_map_catalog::Catalog;
use parcel_map_style::layers::{self, StyleLayer};
use parcel_map_style::{build_style, legend, parse_quantification_method, query, ramp};
use parcel_map_style_models::{
    CategoryColor, ChoroplethStyle, Field, FieldType, FieldValue, QuantificationMethod,
    RangeStyle, RenderTarget, StyleMode, StyleModeState,
};

#[derive(Parser)]
#[command(
    name = "parcel_map",
    about = "Generate styled parcel map layers for the rendering host"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List datasets, optionally only those a mode can style
    Datasets {
        /// Styling mode (category, range, choropleth)
        #[arg(long)]
        mode: Option<StyleMode>,
    },
    /// List the fields of a dataset
    Fields {
        /// Dataset id
        dataset: String,
        /// Styling mode (category, range, choropleth)
        #[arg(long)]
        mode: Option<StyleMode>,
    },
    /// List color palettes, their ramps, and the quantification methods
    Palettes,
    /// Fetch the distinct values of a field from the host
    Values {
        /// Dataset id
        dataset: String,
        /// Field id
        field: String,
    },
    /// Print the query, style, and legend for a styled layer
    Style {
        /// Dataset id
        dataset: String,
        /// Field id
        field: String,
        /// Geometry to color (polygon, line)
        #[arg(long, default_value = "polygon")]
        target: RenderTarget,
        /// Also compile the layer on the host and print its tile URL
        #[arg(long)]
        tiles: bool,
        /// Fetch field values from the host to fill in the legend
        #[arg(long)]
        sample: bool,
        #[command(subcommand)]
        mode: ModeArgs,
    },
    /// Print the layer highlighting parcels that share a value
    Highlight {
        /// Dataset id
        dataset: String,
        /// Field id
        field: String,
        /// Value to highlight
        value: String,
        /// Highlight color
        #[arg(long, default_value = "yellow")]
        color: String,
        /// Geometry to color (polygon, line)
        #[arg(long, default_value = "polygon")]
        target: RenderTarget,
    },
    /// Print the parcel outline layer
    Base {
        /// Also compile the layer on the host and print its tile URL
        #[arg(long)]
        tiles: bool,
    },
    /// Find the parcel under a point
    Parcel {
        /// Latitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[derive(Subcommand)]
enum ModeArgs {
    /// One color per category value
    Category {
        /// `value=color` pair; repeat for each category, in drawing order
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<CategoryColor>,
    },
    /// A single color for values inside [min, max]
    Range {
        /// Lower bound, inclusive
        #[arg(long, allow_hyphen_values = true)]
        min: f64,
        /// Upper bound, inclusive
        #[arg(long, allow_hyphen_values = true)]
        max: f64,
        /// Color for values inside the range
        #[arg(long)]
        color: String,
    },
    /// A binned color ramp
    Choropleth {
        /// Palette name
        #[arg(long)]
        palette: String,
        /// Number of bins (3 through 7)
        #[arg(long, default_value = "5")]
        bins: usize,
        /// Quantification method (quantiles, jenks, equal, headtails)
        #[arg(long)]
        method: Option<String>,
        /// Reverse the ramp
        #[arg(long)]
        reverse: bool,
    },
}

impl ModeArgs {
    fn into_state(self) -> Result<StyleModeState, parcel_map_style::StyleError> {
        Ok(match self {
            Self::Category { items } => StyleModeState::Category { items },
            Self::Range { min, max, color } => StyleModeState::Range(RangeStyle { min, max, color }),
            Self::Choropleth {
                palette,
                bins,
                method,
                reverse,
            } => StyleModeState::Choropleth(ChoroplethStyle {
                palette,
                bin_count: bins,
                method: parse_quantification_method(method.as_deref())?,
                reverse,
            }),
        })
    }
}

/// Parses a `value=color` pair. The last `=` separates the color so
/// values may contain `=`.
fn parse_item(s: &str) -> Result<CategoryColor, String> {
    let (category, color) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected value=color, got '{s}'"))?;
    if color.trim().is_empty() {
        return Err(format!("missing color in '{s}'"));
    }
    Ok(CategoryColor::new(category, color.trim()))
}

/// Types a highlight value by the field it is compared against, so numeric
/// fields match on the number's canonical form.
fn highlight_value(field: &Field, value: String) -> FieldValue {
    match field.field_type {
        FieldType::Numeric => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map_or(FieldValue::Text(value), FieldValue::Number),
        FieldType::Category => FieldValue::Text(value),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn client() -> Result<CartoClient, Box<dyn std::error::Error>> {
    Ok(CartoClient::new(HostConfig::load()?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let catalog = Catalog::from_registry();

    match cli.command {
        Commands::Datasets { mode } => {
            for dataset in catalog.available_datasets(mode) {
                println!("{:<20} {}", dataset.id, dataset.name);
            }
        }
        Commands::Fields { dataset, mode } => {
            for field in catalog.available_fields(mode, &dataset)? {
                println!("{:<24} {:<10} {}", field.id, field.field_type, field.name);
            }
        }
        Commands::Palettes => {
            for palette in ramp::COLOR_RAMPS {
                println!("{}", palette.name);
                for bins in ramp::MIN_BIN_COUNT..=ramp::MAX_BIN_COUNT {
                    if let Some(colors) = palette.colors(bins) {
                        println!("  {bins}: {}", colors.join(" "));
                    }
                }
            }
            println!("methods");
            for method in QuantificationMethod::all() {
                println!("  {:<10} {}", method.to_string(), method.title());
            }
        }
        Commands::Values { dataset, field } => {
            let client = client()?;
            let values = client
                .field_values(
                    catalog.get_dataset(&dataset)?,
                    catalog.get_field(&dataset, &field)?,
                )
                .await?;
            print_json(&values)?;
        }
        Commands::Style {
            dataset,
            field,
            target,
            tiles,
            sample,
            mode,
        } => {
            let state = mode.into_state()?;
            log::debug!("Styling {dataset}.{field} as {}", state.mode());
            let dataset = catalog.get_dataset(&dataset)?;
            let field = catalog.get_field(&dataset.id, &field)?;
            let base = HostConfig::load()?.base_table;
            let layer = StyleLayer {
                query: query::build_style_query(&base, dataset, field)?,
                style: build_style(dataset, field, &state, target)?,
            };

            let values: Vec<FieldValue> = if sample {
                client()?.field_values(dataset, field).await?
            } else {
                Vec::new()
            };
            let legend = legend::project(target, Some(&state), &values)?;

            let tile_url = if tiles {
                Some(client()?.request_layer(&layer).await?)
            } else {
                None
            };

            print_json(&serde_json::json!({
                "sql": layer.query,
                "css": layer.css(),
                "legend": legend,
                "tileUrl": tile_url,
            }))?;
        }
        Commands::Highlight {
            dataset,
            field,
            value,
            color,
            target,
        } => {
            let dataset = catalog.get_dataset(&dataset)?;
            let field = catalog.get_field(&dataset.id, &field)?;
            let base = HostConfig::load()?.base_table;
            let layer = layers::similar_items_layer(
                &base,
                dataset,
                field,
                &highlight_value(field, value),
                &color,
                target,
            )?;
            print_json(&serde_json::json!({
                "sql": layer.query,
                "css": layer.css(),
            }))?;
        }
        Commands::Base { tiles } => {
            let client = client()?;
            let layer = layers::base_parcel_layer(&client.host().base_table);
            let tile_url = if tiles {
                Some(client.request_layer(&layer).await?)
            } else {
                None
            };
            print_json(&serde_json::json!({
                "sql": layer.query,
                "css": layer.css(),
                "tileUrl": tile_url,
            }))?;
        }
        Commands::Parcel { lat, lng } => {
            let client = client()?;
            let parcel_id = client.parcel_at_point(lat, lng).await?;
            let layer = layers::selected_parcel_layer(&client.host().base_table, &parcel_id);
            print_json(&serde_json::json!({
                "parcelId": parcel_id,
                "sql": layer.query,
                "css": layer.css(),
            }))?;
        }
    }

    Ok(())
}
