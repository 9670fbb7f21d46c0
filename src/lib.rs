#![doc = r#"
SATSCENE — a lazy, metadata-preserving satellite scene toolkit.

This crate loads satellite scenes as labeled lazy arrays: chunked, deferred
2-D grids that carry acquisition metadata and a geolocation descriptor
through arithmetic, slicing, and reduction, and are only materialized by an
explicit force that runs chunk tasks on a worker pool. On top of the
container it resolves channels by name or wavelength, computes per-pixel
geolocation, stacks scenes along a time axis, and renders quicklooks
(grayscale or RGB composites with stretch, resize, padding, and map
overlays) to JPEG or TIFF. It powers the SATSCENE CLI and can be embedded
in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases. Breaking
changes can occur.

Quick start: render a channel to a file
---------------------------------------
```rust,no_run
use std::path::Path;
use satscene::{
    quicklook_to_path,
    ChannelQuery, RenderParams,
    BitDepthArg, OutputFormat, StretchStrategy,
};

fn main() -> satscene::Result<()> {
    let params = RenderParams {
        format: OutputFormat::JPEG,
        bit_depth: BitDepthArg::U8,
        stretch: StretchStrategy::Robust,
        size: Some(1024),
        pad: true,
        graticule: Some(10.0),
    };

    quicklook_to_path(
        Path::new("/data/goes_east_20240301T1200"),
        &ChannelQuery::Wavelength(0.485),
        Path::new("/out/blue.jpg"),
        None, // default chunk granularity
        &params,
        &[],
    )
}
```

Work with lazy containers directly
----------------------------------
```rust,no_run
use std::path::Path;
use satscene::{ChannelQuery, SceneReader};

fn main() -> satscene::Result<()> {
    let reader = SceneReader::open(Path::new("/data/goes_east_20240301T1200"))?;

    // Channel names are known before any sample is read.
    println!("available: {:?}", reader.available_channels());

    let c02 = reader.load(&ChannelQuery::from("C02"))?;
    let c03 = reader.load(&ChannelQuery::from("C03"))?;

    // Still deferred: nothing has been read or computed yet.
    let ndvi = (&c03 - &c02) / (&c03 + &c02);
    let highlight = ndvi.gt_value(0.3);

    // Forcing runs chunk tasks on the worker pool.
    let values = highlight.force()?;
    println!("vegetation fraction: {}", values.mean().unwrap_or(f64::NAN));

    // Reductions force to scalars.
    println!("peak NDVI: {:?}", ndvi.max().force()?);
    Ok(())
}
```

Per-pixel geolocation
---------------------
```rust,no_run
use std::path::Path;
use satscene::{ChannelQuery, SceneReader};

fn main() -> satscene::Result<()> {
    let reader = SceneReader::open(Path::new("/data/goes_east_20240301T1200"))?;
    let channel = reader.load(&ChannelQuery::from("C13"))?;

    if let Some(area) = &channel.meta().area {
        println!("projection: {}", area.proj_string());
        // Deferred lon/lat grids, chunked 512 rows at a time.
        let (lon, lat) = area.lonlats(512);
        let lon = lon.force()?;
        let lat = lat.force()?;
        println!("pixel (0,0) at {} E, {} N", lon[[0, 0]], lat[[0, 0]]);
    }
    Ok(())
}
```

Time series across scenes
-------------------------
```rust,no_run
use std::path::Path;
use satscene::{ChannelQuery, MultiScene};

fn main() -> satscene::Result<()> {
    let group = MultiScene::from_dir(Path::new("/data/goes_east"))?;
    let stack = group.timeseries(&ChannelQuery::from("C13"))?;

    println!("{} frames: {:?}", stack.len(), stack.times());
    let mean = stack.mean_over_time(); // still deferred
    let values = mean.force()?;
    println!("time-mean grid: {:?}", values.dim());
    Ok(())
}
```

Error handling
--------------
All public functions return `satscene::Result<T>`; match on
`satscene::Error` to handle specific cases, e.g. scene-reader or
force-time compute errors.

```rust,no_run
use std::path::Path;
use satscene::{ChannelQuery, Error, SceneReader};

fn main() {
    match SceneReader::open(Path::new("/bad/scene")) {
        Ok(reader) => match reader.load(&ChannelQuery::Wavelength(1.38)) {
            Ok(_) => {}
            Err(e) => eprintln!("lookup error: {e}"),
        },
        Err(e) => eprintln!("scene error: {e}"),
    }

    let _ = Error::Processing("deferred chains fail at force time".to_string());
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`core`] — the lazy containers: task graph, chunking, force engine.
- [`geo`] — area definitions and projections.
- [`io`] — scene reader and quicklook writers.
- [`render`] — stretch, resize, overlays, composites.
- [`types`] — enums and core types (e.g. `Calibration`, `StretchStrategy`).
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod geo;
pub mod io;
pub mod multi;
pub mod render;
pub mod scene;
pub mod types;

// Curated public API surface
// Types
pub use error::{Error, Result};
pub use render::params::RenderParams;
pub use types::{
    BitDepth, BitDepthArg, Calibration, InputFormat, OutputFormat, SampleType, StretchStrategy,
};

// Lazy containers and metadata
pub use core::{
    ChannelMetadata, ChunkSource, ComputeError, LazyArray, LazyScalar, LazyStack, MemorySource,
    WavelengthBand, Window,
};

// Geolocation
pub use geo::{AreaDefinition, GeosGrid, LatLongGrid, Projection, SweepAxis};

// Readers and scenes
pub use io::{SceneDescriptor, SceneError, SceneReader};
pub use multi::MultiScene;
pub use scene::{ChannelQuery, Scene};

// Rendering
pub use render::{OverlaySet, Quicklook, load_overlays};

// High-level API re-exports
pub use api::{
    BatchReport, ChannelSummary, SceneSummary, animate_to_dir, composite_to_path,
    quicklook_to_buffer, quicklook_to_path, scene_summary, write_quicklook,
};
