use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mapclass_rs::config::{self, Config};
use mapclass_rs::error::LoadError;
use mapclass_rs::models::ColumnKind;
use mapclass_rs::paint::{GeometryKind, InMemoryLayers, maplibre};
use mapclass_rs::viz::{Legend, LegendBody};
use mapclass_rs::{ClassMethod, Rgb8, StyleMode, StyleSession, stats, storage, viz};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "mapclass",
    version,
    about = "Classify query results, build map paint expressions and render legends"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print class breaks (or categories) with row counts.
    Classify(ClassifyArgs),
    /// Write an SVG legend.
    Legend(LegendArgs),
    /// Print the paint expression and filter as MapLibre JSON.
    Expr(ExprArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Single,
    Graduated,
    Categorical,
}

impl From<ModeArg> for StyleMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Single => StyleMode::Single,
            ModeArg::Graduated => StyleMode::Graduated,
            ModeArg::Categorical => StyleMode::Categorical,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MethodArg {
    Quantile,
    EqualInterval,
    NaturalBreaks,
}

impl From<MethodArg> for ClassMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Quantile => ClassMethod::Quantile,
            MethodArg::EqualInterval => ClassMethod::EqualInterval,
            MethodArg::NaturalBreaks => ClassMethod::NaturalBreaks,
        }
    }
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Result set to style (.csv with header row, or .json rows)
    input: PathBuf,
    /// Column to style by. Defaults to the first styleable column.
    #[arg(short, long)]
    column: Option<String>,
    /// Styling mode. Inferred from the column kind when --column is given.
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,
    /// Classification method for graduated styles.
    #[arg(long, value_enum)]
    method: Option<MethodArg>,
    /// Number of classes (3-9).
    #[arg(short = 'k', long)]
    classes: Option<usize>,
    /// Color ramp name (viridis, blues, greens, reds, oranges, purples, yl-or-rd,
    /// yl-gn-bu, rd-yl-bu, spectral).
    #[arg(long)]
    ramp: Option<String>,
    /// Reverse the ramp.
    #[arg(long, default_value_t = false)]
    invert: bool,
    /// Fill opacity (0-1).
    #[arg(long)]
    opacity: Option<f64>,
    /// Color for single mode (#RRGGBB).
    #[arg(long)]
    color: Option<String>,
    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Range selection in value space (MIN:MAX), graduated styles only.
    #[arg(long)]
    range: Option<String>,
    /// Categories to hide, separated by comma or semicolon.
    #[arg(long)]
    hide: Option<String>,
    /// Hide the "Other" bucket of categories past the palette limit.
    #[arg(long)]
    hide_other: bool,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    #[command(flatten)]
    style: StyleArgs,
    /// Print summary statistics of the styled column.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Save the rows with their assigned color as CSV.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LegendArgs {
    #[command(flatten)]
    style: StyleArgs,
    #[command(flatten)]
    filter: FilterArgs,
    /// Output path (.svg).
    #[arg(long)]
    out: PathBuf,
    /// Legend width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Minimum legend height in pixels; grows to fit the rows.
    #[arg(long)]
    height: Option<u32>,
    /// Locale for count separators (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct ExprArgs {
    #[command(flatten)]
    style: StyleArgs,
    #[command(flatten)]
    filter: FilterArgs,
    /// Write the JSON to a file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn fmt_num(x: f64) -> String {
    if x.is_finite() {
        let s = format!("{:.4}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "NA".to_string()
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_range(s: &str) -> Option<(f64, f64)> {
    let (a, b) = s.split_once(':')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Classify(args) => cmd_classify(args),
        Command::Legend(args) => cmd_legend(args),
        Command::Expr(args) => cmd_expr(args),
    }
}

/// Load input and config, apply the requested style to an in-memory layer set.
fn prepare(args: &StyleArgs, locale: Option<&str>, width: Option<u32>) -> Result<Prepared> {
    let cfg = match &args.config {
        Some(p) => config::load_config(p)?,
        None => Config::default(),
    };
    let results = Arc::new(storage::load_result_set(&args.input)?);

    let column_kind = match &args.column {
        Some(name) => match results.column(name) {
            Some(c) => Some(c.kind),
            None => {
                return Err(LoadError::UnknownColumn {
                    column: name.clone(),
                    available: results.columns.iter().map(|c| c.name.clone()).collect(),
                }
                .into());
            }
        },
        None => None,
    };

    let locale = locale.unwrap_or(cfg.legend.locale.as_str()).to_string();
    let width = width.unwrap_or(cfg.legend.width);
    let mut session = StyleSession::new(results, cfg.classify)
        .with_locale(locale)
        .with_legend_width(width);

    let mut settings = cfg.style.clone();
    settings.column = args
        .column
        .clone()
        .or(settings.column)
        .or_else(|| session.settings().column.clone());
    settings.mode = match (args.mode, column_kind) {
        (Some(m), _) => m.into(),
        (None, Some(ColumnKind::Numeric)) => StyleMode::Graduated,
        (None, Some(ColumnKind::Categorical)) => StyleMode::Categorical,
        (None, None) => settings.mode,
    };
    if let Some(m) = args.method {
        settings.method = m.into();
    }
    if let Some(k) = args.classes {
        settings.class_count = k;
    }
    if let Some(r) = &args.ramp {
        settings.ramp = r.clone();
    }
    settings.ramp_inverted |= args.invert;
    if let Some(o) = args.opacity {
        settings.opacity = o;
    }
    if let Some(c) = &args.color {
        settings.single_color =
            Rgb8::from_hex(c).ok_or_else(|| LoadError::InvalidColor(c.clone()))?;
    }
    session.update_settings(settings);

    let mut layers = InMemoryLayers::with_layers(
        GeometryKind::ALL.map(|k| session.adapter().layer_id(k)),
    );
    session.apply(&mut layers);
    Ok(Prepared {
        session,
        layers,
        config: cfg,
    })
}

struct Prepared {
    session: StyleSession,
    layers: InMemoryLayers,
    config: Config,
}

impl Prepared {
    fn apply_filters(&mut self, args: &FilterArgs) -> Result<()> {
        if let Some(r) = &args.range {
            let (min, max) =
                parse_range(r).ok_or_else(|| anyhow::anyhow!("invalid --range, expected MIN:MAX"))?;
            if self.session.set_range(min, max, &mut self.layers).is_none() {
                bail!("--range needs a graduated style on a numeric column");
            }
        }
        if let Some(h) = &args.hide {
            for key in parse_list(h) {
                if self.session.toggle_category(&key, &mut self.layers).is_none() {
                    bail!("--hide needs a categorical style");
                }
            }
        }
        if args.hide_other && self.session.toggle_other(&mut self.layers).is_none() {
            bail!("--hide-other needs a categorical style");
        }
        Ok(())
    }
}

fn print_legend(legend: &Legend) {
    println!("{}", legend.title);
    match &legend.body {
        LegendBody::Swatch {
            color,
            label,
            count,
        } => {
            println!(
                "  {}  {}  {}",
                color.to_hex(),
                label,
                count.as_deref().unwrap_or("")
            );
        }
        LegendBody::Categorical { rows } => {
            for row in rows {
                println!(
                    "  {}  {}  {}{}",
                    row.color.to_hex(),
                    row.label,
                    row.count_label,
                    if row.visible { "" } else { "  (hidden)" }
                );
            }
        }
        LegendBody::Graduated(g) => {
            for (i, row) in g.rows.iter().enumerate() {
                println!(
                    "  class {}  {}  {}  {}",
                    i + 1,
                    row.color.to_hex(),
                    row.label,
                    row.count_label
                );
            }
        }
    }
}

fn cmd_classify(args: ClassifyArgs) -> Result<()> {
    let p = prepare(&args.style, None, None)?;
    let Some(applied) = p.session.applied() else {
        bail!("nothing applied");
    };

    if applied.mode() == StyleMode::Graduated {
        println!(
            "method: {}  classes: {}",
            applied.settings.method.label(),
            applied.breaks.len().saturating_sub(1)
        );
        println!(
            "breaks: {}",
            applied
                .breaks
                .iter()
                .map(|b| fmt_num(*b))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    print_legend(&p.session.legend());

    if args.stats {
        let s = stats::summarize(&applied.numeric);
        println!(
            "count={} missing={}  min={} max={} mean={} median={}",
            s.count,
            s.missing,
            s.min.map(fmt_num).unwrap_or_else(|| "NA".into()),
            s.max.map(fmt_num).unwrap_or_else(|| "NA".into()),
            s.mean.map(fmt_num).unwrap_or_else(|| "NA".into()),
            s.median.map(fmt_num).unwrap_or_else(|| "NA".into()),
        );
        if applied.mode() == StyleMode::Graduated {
            let gvf = stats::goodness_of_variance_fit(&applied.numeric.values(), &applied.breaks);
            println!("gvf={}", fmt_num(gvf));
        }
    }

    if let Some(path) = args.out.as_ref() {
        let results = p.session.model().results();
        let column = applied.column.as_deref();
        let labels: Vec<String> = results
            .rows
            .iter()
            .map(|row| {
                let value = column.and_then(|c| row.get(c));
                value
                    .map(|v| applied.expression.evaluate(v).to_hex())
                    .unwrap_or_default()
            })
            .collect();
        storage::save_csv(results, Some(("color", labels.as_slice())), path)?;
        eprintln!("Saved {} rows to {}", results.rows.len(), path.display());
    }
    Ok(())
}

fn cmd_legend(args: LegendArgs) -> Result<()> {
    let ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext != "svg" {
        bail!("legend output must be .svg");
    }
    let mut p = prepare(&args.style, args.locale.as_deref(), args.width)?;
    p.apply_filters(&args.filter)?;
    let legend = p.session.legend();
    let width = args.width.unwrap_or(p.config.legend.width);
    let height = args.height.unwrap_or(p.config.legend.height);
    viz::draw_legend_svg(&legend, &args.out, width, height)?;
    eprintln!("Wrote legend to {}", args.out.display());
    Ok(())
}

fn cmd_expr(args: ExprArgs) -> Result<()> {
    let mut p = prepare(&args.style, None, None)?;
    p.apply_filters(&args.filter)?;
    let Some(applied) = p.session.applied() else {
        bail!("nothing applied");
    };
    let out = serde_json::json!({
        "paint": maplibre::paint(&applied.expression),
        "opacity": applied.settings.opacity,
        "filter": maplibre::filter(&p.session.filter_predicate()),
        "selectedRows": p.session.rows_in_selection().map(|rows| rows.len()),
    });
    match args.out.as_ref() {
        Some(path) => {
            storage::save_json(&out, path)?;
            eprintln!("Wrote expressions to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&out)?),
    }
    Ok(())
}
