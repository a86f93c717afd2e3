use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use colorcard::{
    parse_hex, AppState, Direction, FontLibrary, Palette, RenderRequest,
};

#[derive(Parser, Debug)]
#[command(name = "colorcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single card as a PNG.
    Render(RenderArgs),
    /// Serve the card renderer over HTTP.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Palette combination id.
    id: u32,

    /// Markdown content; prefix with `@` to read it from a file.
    #[arg(long)]
    markdown: Option<String>,

    /// Panel background color, 6 hex digits.
    #[arg(long, default_value = "#FFFFFF")]
    background_color: String,

    /// Gradient direction.
    #[arg(long, value_enum, default_value_t = DirectionChoice::BottomRight)]
    direction: DirectionChoice,

    /// Output PNG path.
    #[arg(long, default_value = "card.png")]
    out: PathBuf,

    /// Palette JSON path.
    #[arg(long, default_value = "colors.json")]
    palette: PathBuf,

    /// Text font file (system fonts are searched when omitted).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Monospace font file for code spans.
    #[arg(long)]
    mono_font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:5001")]
    addr: SocketAddr,

    /// Palette JSON path.
    #[arg(long, default_value = "colors.json")]
    palette: PathBuf,

    /// Text font file (system fonts are searched when omitted).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Monospace font file for code spans.
    #[arg(long)]
    mono_font: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionChoice {
    Vertical,
    Horizontal,
    Diagonal,
    BottomRight,
}

impl From<DirectionChoice> for Direction {
    fn from(choice: DirectionChoice) -> Self {
        match choice {
            DirectionChoice::Vertical => Direction::Vertical,
            DirectionChoice::Horizontal => Direction::Horizontal,
            DirectionChoice::Diagonal => Direction::Diagonal,
            DirectionChoice::BottomRight => Direction::BottomRight,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn read_markdown(arg: Option<&str>) -> anyhow::Result<String> {
    match arg {
        None => Ok(String::new()),
        Some(value) => match value.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("read markdown file '{path}'")),
            None => Ok(value.to_string()),
        },
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let palette = Palette::load(&args.palette)?;
    let fonts = FontLibrary::load(args.font.as_deref(), args.mono_font.as_deref())?;
    let combination = palette.lookup(args.id)?;

    let request = RenderRequest {
        colors: combination.colors.clone(),
        markdown: read_markdown(args.markdown.as_deref())?,
        background: parse_hex(&args.background_color)?,
        direction: args.direction.into(),
    };

    let bytes = colorcard::render_card_png(&request, &fonts)?;
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!(
        "wrote {} for '{}' (id {})",
        args.out.display(),
        combination.name,
        args.id
    );
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState {
        palette: Arc::new(Palette::load(&args.palette)?),
        fonts: Arc::new(FontLibrary::load(
            args.font.as_deref(),
            args.mono_font.as_deref(),
        )?),
    };

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    runtime.block_on(colorcard::serve(args.addr, state))?;
    Ok(())
}
