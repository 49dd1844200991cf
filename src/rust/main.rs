use affect::{AssetManager, BuiltinModel, Classifier, Prediction, RemoteAsset};
use log::info;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to classify
    image: PathBuf,

    /// Directory cached assets are materialized into
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Directory holding the bundled model and labels files
    #[arg(long)]
    bundle_dir: Option<PathBuf>,

    /// ONNX model file to use instead of the builtin asset
    #[arg(long, requires = "labels")]
    model: Option<String>,

    /// Labels file to use with --model
    #[arg(long, requires = "model")]
    labels: Option<String>,

    /// Download the model artifact from this URL when it is not cached
    #[arg(long, requires = "model_sha256")]
    model_url: Option<String>,

    /// Expected SHA-256 of the downloaded model artifact
    #[arg(long)]
    model_sha256: Option<String>,

    /// Remove cached assets before materializing them again
    #[arg(short, long)]
    fresh: bool,

    /// Print the full prediction as JSON
    #[arg(long)]
    json: bool,
}

fn asset_manager(args: &Args) -> std::io::Result<AssetManager> {
    let assets_dir = args.assets_dir.clone().unwrap_or_else(AssetManager::get_default_assets_dir);
    let bundle_dir = args.bundle_dir.clone().unwrap_or_else(AssetManager::get_default_bundle_dir);
    AssetManager::new(assets_dir, bundle_dir)
}

async fn ensure_assets(manager: &AssetManager, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let info = BuiltinModel::EnetB2Affectnet.get_model_info();

    if args.fresh {
        info!("Fresh materialization requested - removing cached assets...");
        manager.remove_asset(&info.model_file)?;
        manager.remove_asset(&info.labels_file)?;
    }

    if let (Some(url), Some(sha256)) = (&args.model_url, &args.model_sha256) {
        let asset = RemoteAsset {
            name: info.model_file.clone(),
            url: url.clone(),
            sha256: sha256.clone(),
        };
        manager.ensure_asset(&asset).await?;
    }

    Ok(())
}

fn build_classifier(manager: &AssetManager, args: &Args) -> Result<Classifier, Box<dyn std::error::Error>> {
    let builder = Classifier::builder();
    let builder = match (&args.model, &args.labels) {
        (Some(model), Some(labels)) => builder.with_custom_model(model, labels)?,
        _ => builder.with_model_from(manager, BuiltinModel::EnetB2Affectnet)?,
    };
    Ok(builder.build()?)
}

fn report(prediction: &Prediction, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(prediction)?);
        return Ok(());
    }

    println!("Predicted emotion: {}", prediction.label);
    println!("Logits:");
    for (index, score) in prediction.scores.iter().enumerate() {
        let marker = if index == prediction.index { "*" } else { " " };
        println!("  {} {:>2}: {:>8.4}", marker, index, score);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Emotion Classifier ===");

    let manager = asset_manager(&args)?;
    ensure_assets(&manager, &args).await?;

    let start_time = Instant::now();
    info!("Building classifier...");
    // Initialization errors are fatal
    let classifier = build_classifier(&manager, &args)?;
    let build_time = start_time.elapsed();
    info!("=== Classifier Built Successfully (took {:.2?}) ===", build_time);

    let image = args.image.clone();
    let classify_start = Instant::now();
    // predict blocks on CPU work
    let prediction = tokio::task::spawn_blocking(move || classifier.predict_file(&image)).await?;

    match prediction {
        Ok(prediction) => {
            info!("Classification time: {:.2?}", classify_start.elapsed());
            report(&prediction, args.json)
        }
        Err(e) => {
            eprintln!("\nError classifying {}: {}", args.image.display(), e);
            eprintln!("Consider:");
            eprintln!("  - Checking that the file is a JPEG or PNG image");
            eprintln!("  - Checking that the image is RGB and not empty");
            Err(e.into())
        }
    }
}
