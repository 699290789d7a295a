//! Image Classification Example
//!
//! This example plays the role of the HTTP handler: it resolves an uploaded
//! image and a model name under the configured roots, classifies the image and
//! prints the response body the service would send.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example classify -- [OPTIONS] --model <MODEL> <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-c, --config` - JSON service configuration (defaults apply when omitted)
//! * `-m, --model` - Model file or bundle name under the models root
//! * `-s, --size` - Square input resolution expected by the model
//! * `<IMAGES>...` - Image names under the uploads root
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=info cargo run --example classify -- \
//!     -c config.json -m mobilenet.onnx -s 224 lesion1.jpg lesion2.png
//! ```

use clap::Parser;
use pox_classifier::core::config::ServiceConfig;
use pox_classifier::pipeline::{ClassificationResponse, Classifier};
use pox_classifier::prelude::ClassifierError;
use pox_classifier::processors::parse_target_size;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the classification example
#[derive(Parser)]
#[command(name = "classify")]
#[command(about = "Image Classification Example - classifies images with a chained stage model")]
struct Args {
    /// JSON service configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model file or bundle name under the models root
    #[arg(short, long)]
    model: String,

    /// Image names under the uploads root
    #[arg(required = true)]
    images: Vec<String>,

    /// Square input resolution expected by the model
    #[arg(short, long, default_value = "224", allow_negative_numbers = true)]
    size: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pox_classifier::utils::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServiceConfig::from_json_file(path)?,
        None => ServiceConfig::default(),
    };
    let classifier = Classifier::from_config(&config)?;

    for name in &args.images {
        let start = Instant::now();
        match classify_one(&config, &classifier, name, &args.model, args.size) {
            Ok(response) => {
                info!(image = %name, elapsed = ?start.elapsed(), "classified");
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Err(e) => {
                error!(image = %name, status = e.status_code(), "request failed");
                let body = serde_json::json!({ "detail": e.detail() });
                println!("{} {}", e.status_code(), body);
            }
        }
    }

    info!(cached_models = ?classifier.cache().keys(), "done");
    Ok(())
}

fn classify_one(
    config: &ServiceConfig,
    classifier: &Classifier,
    image_name: &str,
    model_name: &str,
    size: i64,
) -> Result<ClassificationResponse, ClassifierError> {
    let target_size = parse_target_size(size)?;
    let image_path = config.resolve_image(image_name)?;
    let model_path = config.resolve_model(model_name)?;
    let result = classifier.classify_path(&image_path, &model_path.to_string_lossy(), target_size)?;
    Ok(ClassificationResponse::from(result))
}
