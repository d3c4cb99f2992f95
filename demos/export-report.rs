//! Export a threat catalog to PDF.
//!
//! ```text
//! cargo run --example export-report -- catalog.json font.ttf --view summary --search сервер
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use threat_report::{Catalog, ExportRequest, Exporter, LayoutConfig, ViewMode};

#[derive(Parser)]
#[command(name = "export-report")]
#[command(about = "Export a threat catalog to a paginated PDF report", long_about = None)]
struct Cli {
    /// Threat catalog JSON
    #[arg(value_name = "CATALOG")]
    catalog: PathBuf,

    /// TrueType font with Cyrillic coverage
    #[arg(value_name = "FONT")]
    font: PathBuf,

    /// Report layout
    #[arg(long, value_enum, default_value = "per-item")]
    view: View,

    /// Only include objects and methods matching this text
    #[arg(long)]
    search: Option<String>,

    /// Layout configuration JSON; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    /// One section per threat
    PerItem,
    /// Every object and method once
    Summary,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::PerItem => ViewMode::PerItem,
            View::Summary => ViewMode::Summary,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let file = std::fs::File::open(&cli.catalog).expect("can open catalog");
    let catalog = Catalog::from_reader(std::io::BufReader::new(file)).expect("can parse catalog");

    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).expect("can read config");
            LayoutConfig::from_json(&json).expect("can parse config")
        }
        None => LayoutConfig::default(),
    };

    let mut request = ExportRequest::new(catalog.sorted_ids(), cli.view.into());
    if let Some(search) = &cli.search {
        request = request.with_search(search);
    }

    let exporter = Exporter::new(config).expect("config is valid");
    let artifact = exporter
        .export_with_font_file(&catalog, &request, &cli.font)
        .expect("can export report");
    let path = artifact.write_to_dir(&cli.output).expect("can write report");
    println!("{} ({} pages)", path.display(), artifact.page_count);
}
