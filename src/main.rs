use anyhow::{Context, bail};

use voyager_doc::document::{Document, DocumentData};
use voyager_doc::settings::ViewerSettings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1) else {
        bail!("usage: voyager-doc <document path or url> [--json]");
    };
    let dump_json = args.iter().any(|a| a == "--json");

    let settings = ViewerSettings::load();
    let rt = tokio::runtime::Runtime::new()?;

    let text = if path.starts_with("http://") || path.starts_with("https://") {
        rt.block_on(fetch(path))?
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?
    };
    let data: DocumentData =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path))?;

    let mut document = Document::new();
    document.default_quality = settings.default_quality;
    let base_path = path.rsplit_once('/').map(|(base, _)| base).unwrap_or("");
    document
        .open(&data, Some(base_path), None)
        .with_context(|| format!("opening {}", path))?;

    if dump_json {
        if settings.pretty_json {
            println!("{}", document.dump_json()?);
        } else {
            println!("{}", serde_json::to_string(&document.serialize(None)?)?);
        }
    } else {
        print!("{}", document.dump_tree());
    }
    Ok(())
}

async fn fetch(url: &str) -> anyhow::Result<String> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        bail!("HTTP {} from {}", response.status(), url);
    }
    Ok(response.text().await?)
}
