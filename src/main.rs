use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use income_atlas::app::App;
use income_atlas::config::{Args, SceneConfig};
use income_atlas::{svg, ui};
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    if let Some(path) = &args.svg {
        return export_svg(&args, path);
    }

    // Load before taking over the terminal so a failure is reported plainly
    let (width, height) = crossterm::terminal::size()?;
    let area = ui::map_area(Rect::new(0, 0, width, height));
    let (px, py) = area.pixels();
    let mut app = start(&args, args.canvas_scene(px, py));
    app.area = area;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app, &args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

/// Build the app and load its data. A load failure ends the process before
/// anything is drawn.
fn start(args: &Args, config: SceneConfig) -> App {
    let mut app = App::new(config);
    if let Err(err) = app.start(&args.sources(), &args.columns(), &args.object) {
        tracing::error!(error = %err, "initial data load failed");
        std::process::exit(1);
    }
    app
}

fn export_svg(args: &Args, path: &Path) -> Result<()> {
    let app = start(args, args.svg_scene());
    let document = svg::to_svg(
        &app.scene,
        &app.legend,
        &app.overlay.group_transform,
        svg::WIDTH,
        svg::HEIGHT,
    );
    fs::write(path, document).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        shapes = app.scene.shapes().len(),
        "wrote svg"
    );
    Ok(())
}

fn run(terminal: &mut DefaultTerminal, app: &mut App, args: &Args) -> Result<()> {
    loop {
        // Re-place the globe when the terminal was resized
        let size = terminal.size()?;
        let area = ui::map_area(Rect::new(0, 0, size.width, size.height));
        if area != app.area {
            let (px, py) = area.pixels();
            app.relayout(args.canvas_scene(px, py), area);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
