use omr_scanner::analyzer::AnalysisReport;
use omr_scanner::config::{load_config, RuntimeConfig};
use omr_scanner::image::io::{load_gray, write_json_file, PngDebugSink};
use omr_scanner::image::Rotation;
use omr_scanner::SheetAnalyzer;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config = parse_cli()?;

    let gray = load_gray(&config.input_path)?;
    let mut analyzer = SheetAnalyzer::new(config.analyzer.clone());
    if let Some(dir) = &config.output.debug_dir {
        analyzer = analyzer.with_debug_sink(Box::new(PngDebugSink::new(dir)));
    }

    let report = analyzer
        .analyze_with_diagnostics(gray.as_view(), Rotation::None)
        .map_err(|e| e.to_string())?;

    print_text_summary(&report);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    } else {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
        println!("{json}");
    }
    if let Some(dir) = &config.output.debug_dir {
        println!("Debug frames written to {}", dir.display());
    }

    Ok(())
}

fn parse_cli() -> Result<RuntimeConfig, String> {
    let mut args = env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(flag), Some(path)) if flag == "--config" => load_config(Path::new(&path)),
        (Some(input), None) if !input.starts_with('-') => Ok(RuntimeConfig {
            input_path: input.into(),
            output: Default::default(),
            analyzer: Default::default(),
        }),
        _ => Err("usage: omr-scanner <image> | omr-scanner --config <config.json>".to_string()),
    }
}

fn print_text_summary(report: &AnalysisReport) {
    let res = &report.result;
    println!("Analysis summary");
    match &res.metadata {
        Some(meta) => println!(
            "  metadata: type={:?} set={:?} seat={:?}",
            meta.test_type, meta.set_number, meta.seat_number
        ),
        None => println!("  metadata: none"),
    }
    println!("  answers: {}", res.answers.len());
    println!("  total_ms: {:.3}", report.timing.total_ms);
}
