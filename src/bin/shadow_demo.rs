use shadow_synth::config::shadow::{self, ShadowToolConfig};
use shadow_synth::diagnostics::SynthesisReport;
use shadow_synth::error::Result;
use shadow_synth::image::io::{
    load_depth_map, load_mask, load_rgba, mask_from_alpha, save_gray_f32, write_json_file,
};
use shadow_synth::{ShadowRequest, ShadowSynthesizer};
use std::env;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "shadow_demo".to_string());
    let config = shadow::parse_cli(&program, args)?;

    let background = load_rgba(&config.background)?;
    let subject = load_rgba(&config.subject)?;
    let mask = match &config.mask {
        Some(path) => load_mask(path)?,
        None => mask_from_alpha(&subject),
    };
    let depth = config.depth.as_deref().map(load_depth_map).transpose()?;

    let synthesizer = ShadowSynthesizer::new(config.params);
    let report = synthesizer.process_with_diagnostics(&ShadowRequest {
        background: &background,
        subject: &subject,
        mask: &mask,
        depth: depth.as_ref(),
        light: config.light,
    })?;

    print_text_summary(&report);
    save_artifacts(&config, &report)?;
    Ok(())
}

fn print_text_summary(report: &SynthesisReport) {
    let trace = &report.trace;
    println!("Shadow synthesis summary");
    println!("  {}", trace.summary());
    if let Some(contact) = &trace.contact {
        println!(
            "  contact: {}/{} columns, lowest row {:?}",
            contact.contact_columns, contact.columns, contact.lowest_row
        );
    }
    if let Some(projection) = &trace.projection {
        println!(
            "  projection: {} footprints, reach {:.1}px, {} clipped",
            projection.footprints, projection.reach_px, projection.clipped_footprints
        );
    }
    for notice in &trace.notices {
        println!("  notice: {notice:?}");
    }
    for stage in &trace.timings.stages {
        println!("  {:<15} {:>9.3} ms", stage.label, stage.elapsed_ms);
    }
}

fn save_artifacts(config: &ShadowToolConfig, report: &SynthesisReport) -> Result<()> {
    let saved = report.outputs.save(&config.output.dir)?;
    println!("Composite written to {}", saved.composite.display());
    println!("Shadow layer written to {}", saved.shadow_only.display());
    println!("Mask debug written to {}", saved.mask_debug.display());

    if let Some(path) = &config.output.shadow_layer_png {
        save_gray_f32(&report.outputs.shadow_layer, path)?;
        println!("Shadow opacity written to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report.trace)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}
