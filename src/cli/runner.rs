use std::fs;
use std::path::PathBuf;

use tracing::info;

use satscene::api;
use satscene::render::{OverlaySet, RenderParams, load_overlays};
use satscene::scene::ChannelQuery;
use satscene::types::InputFormat;

use super::args::CliArgs;
use super::errors::AppError;

/// What the user asked to render.
enum Selection {
    Single(ChannelQuery),
    Composite(Vec<ChannelQuery>),
}

fn parse_target_size(size: &str) -> Result<Option<usize>, AppError> {
    if size == "original" {
        return Ok(None);
    }
    let parsed_size = size.parse::<usize>().map_err(|_| AppError::InvalidSize {
        size: size.to_string(),
    })?;
    if parsed_size == 0 {
        return Err(AppError::ZeroSize { size: parsed_size });
    }
    Ok(Some(parsed_size))
}

fn build_selection(args: &CliArgs) -> Result<Selection, AppError> {
    let mut selectors = Vec::new();
    if args.channel.is_some() {
        selectors.push("--channel");
    }
    if args.wavelength.is_some() {
        selectors.push("--wavelength");
    }
    if args.composite.is_some() {
        selectors.push("--composite");
    }
    if selectors.len() > 1 {
        return Err(AppError::ConflictingSelectors {
            selectors: selectors.join(", "),
        });
    }

    if let Some(listing) = &args.composite {
        let names: Vec<&str> = listing.split(',').map(str::trim).collect();
        if names.len() != 3 || names.iter().any(|n| n.is_empty()) {
            return Err(AppError::InvalidComposite {
                got: listing.to_string(),
            });
        }
        return Ok(Selection::Composite(
            names.into_iter().map(ChannelQuery::from).collect(),
        ));
    }
    if let Some(name) = &args.channel {
        return Ok(Selection::Single(ChannelQuery::Name(name.clone())));
    }
    if let Some(um) = args.wavelength {
        return Ok(Selection::Single(ChannelQuery::Wavelength(um)));
    }
    Err(AppError::MissingArgument {
        arg: "--channel, --wavelength or --composite".to_string(),
    })
}

fn list_scene(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let summary = api::scene_summary(input)?;
    println!(
        "{} / {}  [{} - {}]",
        summary.platform, summary.sensor, summary.start_time, summary.end_time
    );
    println!("area: {} ({})", summary.area_id, summary.projection);
    println!("channels:");
    for channel in &summary.channels {
        let wavelength = channel
            .wavelength
            .map(|band| format!(" {}", band))
            .unwrap_or_default();
        println!(
            "  {:<8} {}x{} {} {} [{}]{}",
            channel.name,
            channel.rows,
            channel.cols,
            channel.dtype,
            channel.calibration,
            channel.units,
            wavelength
        );
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    // Only scene directories exist today
    match args.input_format {
        InputFormat::SceneDir => {}
    }

    if args.list {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        return list_scene(&input);
    }

    let params = RenderParams {
        format: args.format,
        bit_depth: args.bit_depth,
        stretch: args.stretch,
        size: parse_target_size(&args.size)?,
        pad: args.pad,
        graticule: args.graticule,
    };

    let overlays: Vec<OverlaySet> = match &args.overlay {
        Some(path) => load_overlays(path)?,
        None => Vec::new(),
    };

    let selection = build_selection(&args)?;
    let animation_mode = args.input_dir.is_some();

    if animation_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        let query = match selection {
            Selection::Single(query) => query,
            Selection::Composite(_) => {
                return Err(AppError::MissingArgument {
                    arg: "--channel or --wavelength (composites are single-scene only)"
                        .to_string(),
                }
                .into());
            }
        };

        let mut inputs: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&input_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                inputs.push(path);
            } else {
                info!("Skipping non-directory: {:?}", path);
            }
        }
        inputs.sort();

        info!("Starting animation from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = api::animate_to_dir(
            &inputs,
            &query,
            &output_dir,
            args.chunk_rows,
            &params,
            &overlays,
        )?;
        info!("Frames: {}", report.frames);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        match selection {
            Selection::Single(query) => {
                api::quicklook_to_path(
                    &input,
                    &query,
                    &output,
                    args.chunk_rows,
                    &params,
                    &overlays,
                )?;
            }
            Selection::Composite(queries) => {
                api::composite_to_path(
                    &input,
                    &queries,
                    &output,
                    args.chunk_rows,
                    &params,
                    &overlays,
                )?;
            }
        }
        info!("Successfully processed: {:?} -> {:?}\n", input, output);
    }

    Ok(())
}
