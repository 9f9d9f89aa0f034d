use meshweld::{config::DEFAULT_MAX_BONES_PER_VERTEX, ImportOptions};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Full => f.write_str("full"),
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Which controller of the generated scene is instantiated.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum Instance {
    /// The plain grid geometry
    Geometry,
    /// The grid blended with a raised copy of itself
    Morph,
    /// The morph, bound to a two-bone skeleton
    Skin,
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instance::Geometry => f.write_str("geometry"),
            Instance::Morph => f.write_str("morph"),
            Instance::Skin => f.write_str("skin"),
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,meshweld=info,weld=info",
        env = "WELD_LOG_FILTER"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    /// Number of grid cells along each axis
    #[arg(short, long, default_value = "64,64", value_parser = parse_grid, value_name = "COLS,ROWS")]
    pub grid: (u32, u32),
    /// What to convert
    #[arg(short, long, default_value_t = Instance::Skin)]
    pub instance: Instance,
    /// Number of time samples taken over one second of animation
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,
    /// Mirror the grid's node, keeping source winding
    #[arg(long)]
    pub invert: bool,
    /// Fix all geometry to this size, appending it to mesh names
    #[arg(long, env = "WELD_FIXED_SIZE")]
    pub fixed_size: Option<i32>,
    /// Keep bone scale in bind poses
    #[arg(long)]
    pub ignore_node_scale: bool,
    /// The largest number of bones influencing a single vertex
    #[arg(long, default_value_t = DEFAULT_MAX_BONES_PER_VERTEX, value_parser = parse_max_bones)]
    pub max_bones: usize,
}

impl Cli {
    pub fn import_options(&self) -> ImportOptions {
        let options = ImportOptions::default()
            .with_ignore_node_scale(self.ignore_node_scale)
            .with_max_bones_per_vertex(self.max_bones);
        match self.fixed_size {
            Some(size) => options.with_fixed_size(size),
            None => options,
        }
    }
}

fn parse_grid(s: &str) -> Result<(u32, u32), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let (cols, rows) = s
        .trim()
        .split_once(',')
        .ok_or("expected two comma-separated cell counts")?;
    let (cols, rows) = (cols.trim().parse()?, rows.trim().parse()?);
    if cols == 0 || rows == 0 {
        return Err("grid must have at least one cell along each axis".into());
    }
    Ok((cols, rows))
}

fn parse_max_bones(s: &str) -> Result<usize, Box<dyn std::error::Error + Send + Sync + 'static>> {
    match s.trim().parse()? {
        0 => Err("vertices must accept at least one bone".into()),
        max => Ok(max),
    }
}

/// Set up pretty log output
pub(crate) fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
    let tsub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::current_local_offset().unwrap_or_else(|e| {
                tracing::warn!("couldn't get local time offset: {:?}", e);
                time::UtcOffset::UTC
            }),
            time::macros::format_description!("[hour]:[minute]:[second]"),
        ))
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_env_filter(log_filter);

    match log_format {
        LogFormat::Compact => tsub.compact().init(),
        LogFormat::Full => tsub.init(),
        LogFormat::Pretty => tsub.pretty().init(),
        LogFormat::Json => tsub.json().init(),
    }
}
