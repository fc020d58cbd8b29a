/// Inspection tool for saved annotation sessions.
///
/// Usage: `pxlabel <summary.json> [<planes-dir> <out-dir>]`
///
/// Writes the default configuration file on first run, then prints every
/// record grouped by frame. When a plane directory and an
/// output directory are given, writes the identity image of every frame with
/// stored label planes.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use pxlabel::config::SessionConfig;

    let config_exists = SessionConfig::default_path().is_some_and(|path| path.exists());
    let config = SessionConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    // First run: leave an editable configuration behind
    let written = if config_exists {
        Ok(())
    } else {
        config.save_to_default_path()
    };
    if let Err(e) = written {
        log::warn!("Failed to write default configuration: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.as_slice() {
        [summary] => cli::run(Path::new(summary), None),
        [summary, planes, out] => cli::run(
            Path::new(summary),
            Some((Path::new(planes), Path::new(out))),
        ),
        _ => {
            eprintln!("Usage: pxlabel <summary.json> [<planes-dir> <out-dir>]");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{MAIN_SEPARATOR, Path};

    use pxlabel::config::SourceInfo;
    use pxlabel::export::save_identity_image;
    use pxlabel::format::{FormatError, SessionSummary, planes};

    pub fn run(summary_path: &Path, output: Option<(&Path, &Path)>) -> Result<(), FormatError> {
        let summary = SessionSummary::load(summary_path)?;
        let catalog = summary.catalog();
        let record = summary.build_record()?;

        if let Some(source) = &summary.source {
            println!("{}{}", source.directory, source.file_name);
        }
        println!(
            "{} records over {} frames, {} classes",
            record.len(),
            record.frame_count(),
            catalog.len()
        );

        for frame in 0..record.frame_count() {
            let ids = record.frame_record_ids(frame);
            if ids.is_empty() {
                continue;
            }
            println!("frame {}:", frame);
            for object in ids.iter().filter_map(|&id| record.get(id)) {
                let name = catalog
                    .get(object.class_id)
                    .map(|class| class.name.as_str())
                    .unwrap_or("?");
                let rect = object.bounding_box;
                println!(
                    "  {} #{} [{}, {}) x [{}, {})",
                    name, object.object_id, rect.left, rect.right, rect.top, rect.bottom
                );
            }
        }

        let Some((planes_dir, out_dir)) = output else {
            return Ok(());
        };

        let target = SourceInfo {
            directory: format!("{}{}", out_dir.display(), MAIN_SEPARATOR),
            file_name: summary
                .source
                .as_ref()
                .map(|source| source.file_name.clone())
                .unwrap_or_else(|| "frames".to_string()),
        };

        let mut written = 0;
        for frame in 0..record.frame_count() {
            if !planes::has_plane(planes_dir, frame) {
                continue;
            }
            let plane = planes::load_plane(planes_dir, frame)?;
            let file_name = summary.configuration.naming.image_file_name(&target, frame);
            save_identity_image(Path::new(&file_name), &catalog, &record, &plane, frame)?;
            written += 1;
        }
        println!("Wrote {} identity images to {}", written, out_dir.display());
        Ok(())
    }
}

// WASM has no command line
#[cfg(target_arch = "wasm32")]
fn main() {}
