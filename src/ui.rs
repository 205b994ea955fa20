use crate::app::{App, MapArea};
use crate::map::Legend;
use crate::raster::ColorCanvas;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Split the terminal into the map area and the status bar.
fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    (chunks[0], chunks[1])
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World income groups ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

/// The map area (inside the border) for a terminal of the given size.
pub fn map_area(terminal: Rect) -> MapArea {
    let inner = map_block().inner(split(terminal).0);
    MapArea {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height,
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let (map, status) = split(frame.area());

    let block = map_block();
    let inner = block.inner(map);
    frame.render_widget(block, map);

    frame.render_widget(MapWidget { canvas: app.raster() }, inner);

    if app.show_legend && !app.legend.is_empty() {
        frame.render_widget(LegendWidget { legend: &app.legend }, inner);
    }

    render_tooltip(frame, app, inner);
    render_status_bar(frame, app, status);
}

/// Half-block colour raster of the map
struct MapWidget<'a> {
    canvas: &'a ColorCanvas,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let Some(cell) = self.canvas.cell(col as usize, row as usize) else {
                    continue;
                };
                let target = &mut buf[(area.x + col, area.y + row)];
                target.set_char(cell.ch).set_fg(cell.fg.into());
                if let Some(bg) = cell.bg {
                    target.set_bg(bg.into());
                }
            }
        }
    }
}

/// Legend stacked against the bottom-left corner of the map
struct LegendWidget<'a> {
    legend: &'a Legend,
}

impl Widget for LegendWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = self.legend.layout;
        let entries = self.legend.entries();
        let rows = (entries.len() as f64 * layout.spacing).ceil() as u16;
        let top = area.y + area.height.saturating_sub(rows);
        let left = area.x + 1;
        let swatch = "█".repeat((layout.radius * 2.0).round().max(1.0) as usize);
        let label_style = Style::default().fg(Color::White).bg(Color::Black);

        for entry in entries {
            let x = left + (entry.position.0 - layout.origin.0).max(0.0) as u16;
            let y = top + (entry.position.1 - layout.origin.1).max(0.0) as u16;
            if y >= area.y + area.height {
                break;
            }
            let right = area.x + area.width;
            buf.set_stringn(
                x,
                y,
                &swatch,
                right.saturating_sub(x) as usize,
                Style::default().fg(entry.color.into()),
            );
            let label_x = x + layout.text_offset as u16;
            if label_x < right {
                buf.set_stringn(
                    label_x,
                    y,
                    &entry.label,
                    (right - label_x) as usize,
                    label_style,
                );
            }
        }
    }
}

fn render_tooltip(frame: &mut Frame, app: &App, area: Rect) {
    let tooltip = &app.overlay.tooltip;
    if !tooltip.is_visible() || area.width == 0 || area.height == 0 {
        return;
    }

    let text = format!(" {} ", tooltip.text());
    let width = (text.chars().count() as u16).min(area.width);
    let pos = tooltip.position();
    // Keep the box inside the map
    let max_x = (area.width - width) as i32;
    let x = area.x + pos.x.clamp(0, max_x) as u16;
    let y = area.y + pos.y.clamp(0, area.height as i32 - 1) as u16;

    let style = Style::default()
        .fg(Color::Black)
        .bg(Color::Rgb(0xff, 0xf7, 0xbc))
        .add_modifier(Modifier::BOLD);
    frame
        .buffer_mut()
        .set_stringn(x, y, &text, width as usize, style);
}

fn toggle(on: bool, label_on: &'static str, label_off: &'static str) -> Span<'static> {
    Span::styled(
        if on { label_on } else { label_off },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hovered = app
        .hovered()
        .map(|shape| shape.display_name().to_string())
        .unwrap_or_else(|| "-".to_string());

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        Span::styled(
            app.overlay.group_transform.to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(hovered, Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        // Toggle indicators
        toggle(app.options.show_borders, "[B]order ", "[b]order "),
        toggle(app.show_legend, "[L]egend ", "[l]egend "),
        Span::styled(
            "| hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::interaction::Pointer;
    use crate::map::{assign_colors, LegendLayout, Stereographic};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app(size: Rect) -> App {
        let area = map_area(size);
        let (w, h) = area.pixels();
        let mut app = App::new(SceneConfig::for_canvas(Stereographic::new(10.0, (0.0, 0.0)), w, h));
        app.area = area;
        app
    }

    #[test]
    fn test_map_area_excludes_border_and_status() {
        let area = map_area(Rect::new(0, 0, 80, 24));
        assert_eq!(
            area,
            MapArea {
                x: 1,
                y: 1,
                width: 78,
                height: 21
            }
        );
    }

    #[test]
    fn test_legend_and_tooltip_are_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = app(Rect::new(0, 0, 60, 20));
        let scale = assign_colors(vec!["1. High income".into(), "5. Low income".into()]);
        app.legend = Legend::new(&scale, LegendLayout::TERMINAL);
        app.overlay
            .tooltip
            .show("Chad", Some("5. Low income"), Pointer { x: 10, y: 5 });

        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("High income"));
        assert!(text.contains("Low income"));
        assert!(text.contains("Chad: Low income"));
        assert!(text.contains("Zoom: 1.00x"));
    }

    #[test]
    fn test_hidden_legend() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut app = app(Rect::new(0, 0, 60, 20));
        let scale = assign_colors(vec!["1. High income".into()]);
        app.legend = Legend::new(&scale, LegendLayout::TERMINAL);
        app.toggle_legend();

        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        assert!(!screen(&terminal).contains("High income"));
    }
}
