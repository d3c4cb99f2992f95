use std::cell::Cell;
use std::path::PathBuf;
use threat_report::layout::{width_of_text, wrap_text};
use threat_report::{
    Catalog, ExportRequest, Exporter, Font, LayoutConfig, Pt, ReportError, ViewMode,
};

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A system font with Cyrillic coverage, if one is installed
fn system_font() -> Option<PathBuf> {
    let found = FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file());
    if found.is_none() {
        eprintln!("Skipping: no system TrueType font found");
    }
    found
}

const CATALOG: &str = r#"{
    "1.1": {
        "description": "Test",
        "objects": [{"id": "O1", "name": "Server"}],
        "implementations": [{"id": "I1", "name": "Exploit", "risk_level": "High"}]
    },
    "1.2": {
        "description": "Угроза утечки информации по техническим каналам",
        "objects": [{"id": "O2", "name": "Сетевое оборудование", "type": "Аппаратное обеспечение"}],
        "implementations": [{"id": "I2", "name": "Перехват трафика", "category": "Сетевая"}]
    }
}"#;

#[test]
fn exports_pdf_artifact() {
    let _ = env_logger::builder().is_test(true).try_init();
    let Some(font_path) = system_font() else {
        return;
    };

    let catalog = Catalog::from_json(CATALOG).expect("catalog parses");
    let exporter = Exporter::new(LayoutConfig::default()).expect("valid config");
    let request = ExportRequest::new(["1.1"], ViewMode::PerItem);

    let artifact = exporter
        .export_with_font_file(&catalog, &request, &font_path)
        .expect("export succeeds");

    assert_eq!(artifact.page_count, 1);
    assert!(artifact.bytes.starts_with(b"%PDF-"));
    assert!(artifact.file_name.starts_with("Отчет_по_угрозам_"));
    assert!(artifact.file_name.ends_with(".pdf"));

    let dir = tempfile::tempdir().expect("temp dir");
    let path = artifact.write_to_dir(dir.path()).expect("artifact written");
    let written = std::fs::read(&path).expect("artifact readable");
    assert_eq!(written, artifact.bytes);
}

#[test]
fn typeface_is_loaded_once() {
    let Some(font_path) = system_font() else {
        return;
    };

    let catalog = Catalog::from_json(CATALOG).expect("catalog parses");
    let exporter = Exporter::new(LayoutConfig::default()).expect("valid config");
    let fetches = Cell::new(0);

    for view in [ViewMode::PerItem, ViewMode::Summary] {
        let request = ExportRequest::new(["1.1", "1.2"], view);
        exporter
            .export(&catalog, &request, || {
                fetches.set(fetches.get() + 1);
                std::fs::read(&font_path).map_err(Into::into)
            })
            .expect("export succeeds");
    }

    assert_eq!(fetches.get(), 1);
    assert!(exporter.typeface().is_loaded());
}

#[test]
fn failed_load_is_retried_on_next_export() {
    let Some(font_path) = system_font() else {
        return;
    };

    let catalog = Catalog::from_json(CATALOG).expect("catalog parses");
    let exporter = Exporter::new(LayoutConfig::default()).expect("valid config");
    let request = ExportRequest::new(["1.2"], ViewMode::Summary);

    let result = exporter.export(&catalog, &request, || Ok(b"<html>404</html>".to_vec()));
    assert!(matches!(result, Err(ReportError::FontLoad(_))));
    assert!(!exporter.typeface().is_loaded());

    let artifact = exporter
        .export_with_font_file(&catalog, &request, &font_path)
        .expect("second attempt succeeds");
    assert!(artifact.bytes.starts_with(b"%PDF-"));
}

#[test]
fn long_report_spans_pages() {
    let Some(font_path) = system_font() else {
        return;
    };

    let mut catalog = Catalog::from_json(CATALOG).expect("catalog parses");
    let template = catalog.get("1.2").cloned().expect("1.2 present");
    for n in 3..=60 {
        catalog.insert(format!("1.{n}"), template.clone());
    }

    let exporter = Exporter::new(LayoutConfig::default()).expect("valid config");
    let request = ExportRequest::new(catalog.sorted_ids(), ViewMode::PerItem);
    let artifact = exporter
        .export_with_font_file(&catalog, &request, &font_path)
        .expect("export succeeds");

    assert!(artifact.page_count > 1);
    let count = format!("/Count {}", artifact.page_count);
    let haystack = String::from_utf8_lossy(&artifact.bytes);
    assert!(haystack.contains(&count));
}

#[test]
fn wraps_with_real_metrics() {
    let Some(font_path) = system_font() else {
        return;
    };
    let font = Font::load_file(&font_path).expect("font loads");

    let text = "Угроза несанкционированного доступа к информации, обрабатываемой в \
                информационной системе, путем использования уязвимостей программного обеспечения";
    let max_width = Pt(200.0);
    let lines = wrap_text(text, max_width, Pt(12.0), &font);

    assert!(lines.len() > 1);
    for line in lines.iter() {
        assert!(width_of_text(line, &font, Pt(12.0)) <= max_width, "{line}");
    }
    assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
}
