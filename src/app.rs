use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use geojson::Feature;

use crate::config::{Columns, SceneConfig};
use crate::data::{self, index_by_key, merge_properties, Dataset, Sources};
use crate::error::LoadResult;
use crate::interaction::{HoverTracker, Overlay, Pointer, Subscriptions, ViewTransform, ZoomBehavior};
use crate::map::{assign_colors, build_domain, rasterize, ColorScale, Legend, PathBuilder, RenderOptions};
use crate::raster::ColorCanvas;
use crate::scene::{Scene, Shape};

/// Pixels moved per pan key press
const PAN_STEP_X: f64 = 10.0;
const PAN_STEP_Y: f64 = 6.0;

/// Map area inside the terminal, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl MapArea {
    /// Canvas size in pixels (two pixels per cell vertically).
    pub fn pixels(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize * 2)
    }

    /// Terminal cell to a position relative to the map area.
    fn local(&self, col: u16, row: u16) -> Option<Pointer> {
        let inside = col >= self.x
            && row >= self.y
            && col < self.x + self.width
            && row < self.y + self.height;
        inside.then(|| Pointer {
            x: (col - self.x) as i32,
            y: (row - self.y) as i32,
        })
    }

    fn centre_pixel(&self) -> (f64, f64) {
        let (w, h) = self.pixels();
        (w as f64 / 2.0, h as f64 / 2.0)
    }
}

/// Centre of the cell under the pointer, in canvas pixels.
fn pixel(pointer: Pointer) -> (f64, f64) {
    (pointer.x as f64 + 0.5, pointer.y as f64 * 2.0 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RasterKey {
    width: usize,
    height: usize,
    transform: ViewTransform,
    options: RenderOptions,
}

/// Application state
pub struct App {
    pub scene: Scene,
    pub legend: Legend,
    pub overlay: Overlay,
    pub zoom: ZoomBehavior,
    pub options: RenderOptions,
    pub show_legend: bool,
    pub should_quit: bool,
    pub area: MapArea,
    config: SceneConfig,
    columns: Columns,
    features: Vec<Feature>,
    scale: ColorScale,
    subscriptions: Subscriptions,
    hover: HoverTracker,
    raster: Option<(RasterKey, ColorCanvas)>,
}

impl App {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            scene: Scene::new(config.offset),
            legend: Legend::empty(config.legend),
            overlay: Overlay::default(),
            zoom: ZoomBehavior::new(),
            options: RenderOptions::default(),
            show_legend: true,
            should_quit: false,
            area: MapArea::default(),
            config,
            columns: Columns::default(),
            features: Vec::new(),
            scale: ColorScale::ordinal(Vec::new(), Vec::new()),
            subscriptions: Subscriptions::default(),
            hover: HoverTracker::default(),
            raster: None,
        }
    }

    /// Load both documents, join the table onto the features and build the
    /// scene and legend.
    ///
    /// On failure nothing is drawn: the scene and legend stay empty.
    pub fn start(&mut self, sources: &Sources, columns: &Columns, object: &str) -> LoadResult<()> {
        let Dataset { records, features } = data::load(sources, object)?;
        let mut features = features.features;

        let index = index_by_key(&records, &columns.key);
        let matched = merge_properties(&mut features, &index);
        tracing::info!(
            matched,
            unmatched = features.len() - matched,
            "joined table onto features"
        );

        self.scale = assign_colors(build_domain(&features, &columns.category));
        self.columns = columns.clone();
        self.features = features;
        self.build();
        Ok(())
    }

    /// Re-place the map for a new canvas, keeping the current pan/zoom.
    pub fn relayout(&mut self, config: SceneConfig, area: MapArea) {
        self.config = config;
        self.area = area;
        if !self.features.is_empty() {
            self.build();
        }
    }

    fn build(&mut self) {
        let builder = PathBuilder::new(self.config.projection.clone());
        let mut subscriptions = Subscriptions::default();
        let mut scene = Scene::new(self.config.offset);

        scene.add_sphere(&builder);
        scene.add_countries(
            &self.features,
            &builder,
            &self.scale,
            &self.columns,
            &mut subscriptions,
        );
        subscriptions.on_gesture(|overlay, transform| overlay.group_transform = transform);

        self.scene = scene;
        self.legend = Legend::new(&self.scale, self.config.legend);
        self.subscriptions = subscriptions;
        self.hover = HoverTracker::default();
        self.overlay.tooltip.hide();
        self.raster = None;
        self.emit(self.zoom.transform());
    }

    fn emit(&mut self, transform: ViewTransform) {
        self.subscriptions.gesture(&mut self.overlay, transform);
    }

    /// Rasterized map for the current view, rebuilt only when the size,
    /// transform or options changed.
    pub fn raster(&mut self) -> &ColorCanvas {
        let (width, height) = (self.area.width as usize, self.area.height as usize);
        let key = RasterKey {
            width,
            height,
            transform: self.overlay.group_transform,
            options: self.options,
        };
        if self.raster.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.raster = None;
        }
        let (_, canvas) = self.raster.get_or_insert_with(|| {
            tracing::trace!(width, height, "rasterizing");
            (key, rasterize(&self.scene, &key.transform, width, height, key.options))
        });
        canvas
    }

    pub fn hovered(&self) -> Option<&Shape> {
        self.hover.current().and_then(|id| self.scene.shape(id))
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        let t = self.zoom.pan_by(dx, dy);
        self.emit(t);
    }

    /// Zoom about the centre of the map area.
    pub fn zoom_in(&mut self) {
        let t = self.zoom.zoom_by(ZoomBehavior::STEP, self.area.centre_pixel());
        self.emit(t);
    }

    pub fn zoom_out(&mut self) {
        let t = self.zoom.zoom_by(1.0 / ZoomBehavior::STEP, self.area.centre_pixel());
        self.emit(t);
    }

    pub fn reset_view(&mut self) {
        let t = self.zoom.reset();
        self.emit(t);
    }

    pub fn toggle_borders(&mut self) {
        self.options.show_borders = !self.options.show_borders;
    }

    pub fn toggle_legend(&mut self) {
        self.show_legend = !self.show_legend;
    }

    /// Status line: zoom factor
    pub fn zoom_level(&self) -> String {
        format!("{:.2}x", self.overlay.group_transform.k)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),

            // Pan with hjkl or arrow keys
            KeyCode::Left | KeyCode::Char('h') => self.pan(PAN_STEP_X, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.pan(-PAN_STEP_X, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.pan(0.0, PAN_STEP_Y),
            KeyCode::Down | KeyCode::Char('j') => self.pan(0.0, -PAN_STEP_Y),

            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom_out(),

            KeyCode::Char('r') | KeyCode::Char('0') => self.reset_view(),

            KeyCode::Char('b') | KeyCode::Char('B') => self.toggle_borders(),
            KeyCode::Char('L') => self.toggle_legend(),

            _ => {}
        }
    }

    /// Mouse events: wheel zooms about the pointer, left drag pans, and any
    /// movement updates the hover target.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(pointer) = self.area.local(mouse.column, mouse.row) else {
            if matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left)) {
                self.zoom.release();
            }
            self.hover
                .update(None, Pointer::default(), &mut self.subscriptions, &mut self.overlay);
            return;
        };
        let at = pixel(pointer);

        match mouse.kind {
            MouseEventKind::ScrollUp => {
                let t = self.zoom.wheel(at, true);
                self.emit(t);
            }
            MouseEventKind::ScrollDown => {
                let t = self.zoom.wheel(at, false);
                self.emit(t);
            }
            MouseEventKind::Down(MouseButton::Left) => self.zoom.press(at),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(t) = self.zoom.drag(at) {
                    self.emit(t);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.zoom.release(),
            _ => {}
        }

        self.pointer_moved(pointer);
    }

    /// Hit-test the scene under the pointer and fire enter/leave handlers.
    pub fn pointer_moved(&mut self, pointer: Pointer) {
        let hit = self.scene.hit_test(pixel(pointer), &self.overlay.group_transform);
        self.hover
            .update(hit, pointer, &mut self.subscriptions, &mut self.overlay);
    }
}
