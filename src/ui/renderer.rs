/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Pixels and cells
///
/// The simulation works in pixels. The map area below the HUD is treated
/// as a viewport of `CELL_W × CELL_H` pixels per terminal cell, so a
/// pixel rect maps to the cells it covers. Mouse cells map back to the
/// pixel at the cell's centre.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::app::{App, Phase};
use crate::domain::action::{Action, Keybinds};
use crate::domain::entity::{Color as Hue, ContainerState, Highlight, ItemKind, ItemState, Outcome};
use crate::domain::geometry::Rect;
use crate::sim::world::{Snapshot, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Recolour the background of an existing cell, keeping its glyph.
    fn tint(&mut self, x: usize, y: usize, bg: Color) {
        let mut cell = self.get(x, y);
        if x < self.width && y < self.height {
            cell.bg = bg;
            self.set(x, y, cell);
        }
    }
}

// ── Layout constants ──

/// Pixels per terminal column / row in the map area.
pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Rows under the map: message bar and help line.
const FOOTER_ROWS: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const LEVEL_BG: Color = Color::Rgb { r: 30, g: 30, b: 46 };
const TITLE_C: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };

/// Pixel viewport of the map area for a terminal of `cols × rows`.
pub fn viewport(cols: u16, rows: u16) -> [f64; 2] {
    let map_rows = (rows as usize).saturating_sub(MAP_ROW + FOOTER_ROWS).max(1);
    [cols.max(1) as f64 * CELL_W, map_rows as f64 * CELL_H]
}

/// Pixel at the centre of a terminal cell, in map coordinates.
pub fn cell_to_pixel(col: u16, row: u16) -> [f64; 2] {
    [
        (col as f64 + 0.5) * CELL_W,
        (row as f64 - MAP_ROW as f64 + 0.5) * CELL_H,
    ]
}

/// First and last cell index covered by `[start, start + len)`.
/// Always at least one cell, so thin shapes stay visible.
fn span(start: f64, len: f64, cell: f64) -> (i64, i64) {
    let first = (start / cell).floor() as i64;
    let last = ((start + len) / cell - 1e-6).floor() as i64;
    (first, last.max(first))
}

fn hue(color: Hue) -> Color {
    match color {
        Hue::Blue => Color::Rgb { r: 60, g: 110, b: 220 },
        Hue::Red => Color::Rgb { r: 200, g: 60, b: 60 },
        Hue::Green => Color::Rgb { r: 60, g: 170, b: 80 },
        Hue::Purple => Color::Rgb { r: 150, g: 80, b: 200 },
        Hue::Orange => Color::Rgb { r: 230, g: 140, b: 40 },
        Hue::Other => Color::Rgb { r: 120, g: 120, b: 120 },
    }
}

/// Darkened version of a colour, for container interiors.
fn shade(color: Color, factor: f64) -> Color {
    match color {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: (r as f64 * factor) as u8,
            g: (g as f64 * factor) as u8,
            b: (b as f64 * factor) as u8,
        },
        other => other,
    }
}

fn highlight_color(h: Highlight) -> Option<Color> {
    match h {
        Highlight::None => None,
        Highlight::Ready => Some(Color::Rgb { r: 40, g: 200, b: 70 }),
        Highlight::Misaligned => Some(Color::Rgb { r: 220, g: 200, b: 40 }),
        Highlight::Locked => Some(Color::Rgb { r: 230, g: 40, b: 40 }),
    }
}

fn item_glyph(item: &ItemState) -> (char, Color) {
    match item.kind {
        ItemKind::Exit => ('▣', Color::Rgb { r: 120, g: 255, b: 160 }),
        ItemKind::Lever { color } => {
            let tilted_left = item.lever_angle().map_or(false, |deg| deg > 90.0);
            (if tilted_left { '\\' } else { '/' }, hue(color))
        }
        ItemKind::Plate { color } => (if item.activated { '▁' } else { '▃' }, hue(color)),
        ItemKind::Box => ('▩', Color::Rgb { r: 190, g: 140, b: 80 }),
        ItemKind::Collectible => ('◆', Color::Rgb { r: 255, g: 220, b: 50 }),
        ItemKind::Spike => ('▲', Color::Rgb { r: 210, g: 210, b: 220 }),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode on the alternate screen with mouse capture. Returns
    /// whether the terminal reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize_buffers(tw as usize, th as usize);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    fn resize_buffers(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, app: &App) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize_buffers(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(app.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(app.phase);
        }

        self.compose(app);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, app: &App) {
        self.front.clear();
        match app.phase {
            Phase::LevelSelect => self.compose_level_select(app),
            Phase::Playing => {
                if let Some(world) = &app.world {
                    self.compose_game(app, world);
                    if world.game.complete {
                        self.compose_complete(world);
                    } else if world.game.paused {
                        self.compose_pause_overlay(app);
                    }
                }
            }
            Phase::EnterInitials => self.compose_initials(app),
            Phase::Leaderboard => self.compose_leaderboard(app),
        }
    }

    fn map_rows(&self) -> usize {
        self.front.height.saturating_sub(MAP_ROW + FOOTER_ROWS)
    }

    /// Map cells covered by an absolute pixel rect: (first col, last col,
    /// first row, last row), rows relative to the map.
    fn cells_of(rect: &Rect) -> (i64, i64, i64, i64) {
        let (c0, c1) = span(rect.left, rect.width, CELL_W);
        let (r0, r1) = span(rect.top, rect.height, CELL_H);
        (c0, c1, r0, r1)
    }

    fn fill_cells(&mut self, (c0, c1, r0, r1): (i64, i64, i64, i64), ch: char, fg: Color, bg: Color) {
        let rows = self.map_rows() as i64;
        for r in r0.max(0)..=r1.min(rows - 1) {
            for c in c0.max(0)..=c1 {
                self.front.set(c as usize, MAP_ROW + r as usize, Cell::new(ch, fg, bg));
            }
        }
    }

    /// Paint every map cell covered by an absolute pixel rect.
    fn fill_px(&mut self, rect: &Rect, ch: char, fg: Color, bg: Color) {
        self.fill_cells(Self::cells_of(rect), ch, fg, bg);
    }

    fn tint_px(&mut self, rect: &Rect, bg: Color) {
        let (c0, c1, r0, r1) = Self::cells_of(rect);
        let rows = self.map_rows() as i64;
        for r in r0.max(0)..=r1.min(rows - 1) {
            for c in c0.max(0)..=c1 {
                self.front.tint(c as usize, MAP_ROW + r as usize, bg);
            }
        }
    }

    fn compose_game(&mut self, app: &App, w: &World) {
        let snap = w.snapshot();

        // ── HUD row ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(
            " {:<24}  Score:{:<7}  Lives:{}",
            w.level_name, snap.game.score, snap.game.display_lives(),
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Level box ──
        let layout = &w.layout;
        let level_box = Rect::new(
            layout.origin[0],
            layout.origin[1],
            layout.size[0] + 2.0 * layout.border,
            layout.size[1] + 2.0 * layout.border,
        );
        self.fill_px(&level_box, ' ', Color::White, LEVEL_BG);

        for c in &snap.containers {
            self.compose_container(c, &snap);
        }
        self.compose_character(&snap);

        // ── Message bar ──
        let msg_row = MAP_ROW + self.map_rows();
        if !app.message.is_empty() {
            let bar = Color::Rgb { r: 200, g: 180, b: 50 };
            self.front.fill_row(msg_row, bar);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", app.message), Color::Black, bar);
        }

        // ── Help bar ──
        let help = help_line(&app.keybinds);
        self.front.put_str(0, msg_row + 1, &help, Color::DarkGrey, Color::Reset);
    }

    fn compose_container(&mut self, c: &ContainerState, snap: &Snapshot) {
        let wall = hue(c.color);
        let inside = shade(wall, 0.25);
        let (wall_ch, wall_fg) = if c.motion.is_attached() {
            ('▒', Color::White)
        } else if c.is_locked() {
            ('▓', shade(wall, 0.6))
        } else {
            (' ', Color::White)
        };
        // Walls are always one cell thick, whatever the pixel border.
        let (c0, c1, r0, r1) = Self::cells_of(&c.rect);
        self.fill_cells((c0, c1, r0, r1), wall_ch, wall_fg, wall);
        if c1 - c0 >= 2 && r1 - r0 >= 2 {
            self.fill_cells((c0 + 1, c1 - 1, r0 + 1, r1 - 1), ' ', Color::White, inside);
        }

        let border = snap.border;
        let ox = c.rect.left + border;
        let oy = c.rect.top + border;

        let abs = |r: &Rect| Rect::new(ox + r.left, oy + r.top, r.width, r.height);

        for o in &c.openings {
            let bg = highlight_color(o.highlight).unwrap_or(inside);
            self.fill_px(&abs(&o.rect), ' ', Color::White, bg);
        }
        for p in &c.platforms {
            self.fill_px(&abs(&p.rect), '▀', Color::Rgb { r: 200, g: 200, b: 200 }, Color::Rgb { r: 110, g: 110, b: 120 });
        }
        for item in c.items.iter().filter(|i| i.is_visible()) {
            let (ch, fg) = item_glyph(item);
            self.fill_px(&abs(&item.rect), ch, fg, inside);
            if let Some(bg) = highlight_color(item.highlight) {
                self.tint_px(&abs(&item.rect), bg);
            }
        }
    }

    fn compose_character(&mut self, snap: &Snapshot) {
        let Some(c) = snap.containers.iter().find(|c| c.id == snap.character.container) else {
            return;
        };
        let r = &snap.character.rect;
        let rect = Rect::new(
            c.rect.left + snap.border + r.left,
            c.rect.top + snap.border + r.top,
            r.width,
            r.height,
        );
        self.fill_px(&rect, '█', Color::Rgb { r: 245, g: 245, b: 245 }, Color::Reset);
        let (col, _) = span(rect.left, rect.width, CELL_W);
        let (row, _) = span(rect.top, rect.height, CELL_H);
        if col >= 0 && row >= 0 && (row as usize) < self.map_rows() {
            self.front.set(col as usize, MAP_ROW + row as usize, Cell::new('☻', Color::Black, Color::Rgb { r: 245, g: 245, b: 245 }));
        }
    }

    /// Centred dark box with a title; returns (x, y, width) of its body.
    fn dialog(&mut self, title: &str, box_w: usize, box_h: usize) -> (usize, usize, usize) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let box_w = box_w.min(self.front.width);
        let box_h = box_h.min(self.front.height);
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = self.front.height.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }
        let tx = box_x + box_w.saturating_sub(title.chars().count()) / 2;
        self.front.put_str(tx, box_y + 1, title, TITLE_C, dim);
        (box_x + 2, box_y + 3, box_w.saturating_sub(4))
    }

    fn compose_pause_overlay(&mut self, app: &App) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };
        let blink = (app.anim_tick / 16) % 2 == 0;
        let title = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        let (x, y, _) = self.dialog(title, 36, 8);
        let resume = format!("{}  Resume", bound_keys(&app.keybinds, Action::Pause));
        self.front.put_str(x, y, &resume, key_c, dim);
        self.front.put_str(x, y + 1, "R  Restart level", key_c, dim);
        self.front.put_str(x, y + 2, "Q  Back to level select", key_c, dim);
    }

    fn compose_complete(&mut self, w: &World) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let desc = Color::Rgb { r: 180, g: 180, b: 180 };
        match w.game.outcome() {
            Some(Outcome::Won) => {
                let (x, y, _) = self.dialog("★  LEVEL COMPLETE  ★", 40, 8);
                self.front.put_str(x, y, &format!("Final score: {}", w.game.score), HI, dim);
                self.front.put_str(x, y + 2, "ENTER  Save score", desc, dim);
                self.front.put_str(x, y + 3, "ESC    Level select", desc, dim);
            }
            _ => {
                let (x, y, _) = self.dialog("✖  LEVEL FAILED  ✖", 40, 8);
                self.front.put_str(x, y, "Out of lives.", Color::Rgb { r: 255, g: 90, b: 90 }, dim);
                self.front.put_str(x, y + 2, "ENTER  Try again", desc, dim);
                self.front.put_str(x, y + 3, "ESC    Level select", desc, dim);
            }
        }
    }

    fn compose_level_select(&mut self, app: &App) {
        let normal = Color::White;
        let dim = Color::DarkGrey;
        let cursor_bg = Color::Rgb { r: 30, g: 60, b: 30 };

        self.front.put_str(2, 1, "╔══════════════════════════════════════════╗", TITLE_C, Color::Reset);
        self.front.put_str(2, 2, "║        U N C O N T A I N E D             ║", TITLE_C, Color::Reset);
        self.front.put_str(2, 3, "╚══════════════════════════════════════════╝", TITLE_C, Color::Reset);

        let list_top = 5;
        for (i, def) in app.levels.iter().enumerate() {
            let row = list_top + i;
            if row + 4 >= self.front.height { break; }
            let stars: String = "★".repeat(def.difficulty as usize);
            let line = format!("{:>3}. {:<30} {}", def.id, def.name, stars);
            if i == app.select_cursor {
                for x in 0..48.min(self.front.width) {
                    self.front.set(x, row, Cell::new(' ', normal, cursor_bg));
                }
                self.front.put_str(2, row, "▸", HI, cursor_bg);
                self.front.put_str(3, row, &line, HI, cursor_bg);
            } else {
                self.front.put_str(3, row, &line, normal, Color::Reset);
            }
        }

        let footer = list_top + app.levels.len() + 1;
        if let Some(def) = app.levels.get(app.select_cursor) {
            if !def.description.is_empty() {
                self.front.put_str(4, footer, &def.description, Color::Rgb { r: 180, g: 180, b: 180 }, Color::Reset);
            }
        }
        self.front.put_str(2, footer + 2, "ENTER: Play   ↑↓: Select   L: Leaderboard   ESC: Quit", dim, Color::Reset);
        if !app.message.is_empty() {
            self.front.put_str(2, footer + 3, &app.message, Color::Rgb { r: 255, g: 120, b: 80 }, Color::Reset);
        }
    }

    fn compose_initials(&mut self, app: &App) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let score = app.world.as_ref().map_or(0, |w| w.game.score);
        let (x, y, _) = self.dialog("NEW SCORE", 36, 9);
        self.front.put_str(x, y, &format!("Score: {score}"), HI, dim);

        let slots: String = (0..3)
            .map(|i| app.initials.chars().nth(i).unwrap_or('_'))
            .flat_map(|c| [c, ' '])
            .collect();
        self.front.put_str(x, y + 2, "Initials: ", Color::White, dim);
        self.front.put_str(x + 10, y + 2, &slots, TITLE_C, dim);
        self.front.put_str(x, y + 4, "ENTER save   ESC skip", Color::DarkGrey, dim);
        if !app.message.is_empty() {
            self.front.put_str(x, y + 5, &app.message, Color::Rgb { r: 255, g: 120, b: 80 }, dim);
        }
    }

    fn compose_leaderboard(&mut self, app: &App) {
        let title = match app.board_level_id() {
            Some(id) => format!("LEADERBOARD  ·  LEVEL {id}"),
            None => "LEADERBOARD".to_string(),
        };
        self.front.put_str(4, 1, &title, TITLE_C, Color::Reset);

        if app.board.is_empty() {
            self.front.put_str(4, 3, "No scores yet.", Color::DarkGrey, Color::Reset);
        }
        for (rank, e) in app.board.iter().take(10).enumerate() {
            let line = format!("{:>2}.  {}  {:>7}", rank + 1, e.initials, e.score);
            let fg = if rank == 0 { HI } else { Color::White };
            self.front.put_str(4, 3 + rank, &line, fg, Color::Reset);
        }
        let footer = 4 + app.board.len().min(10);
        self.front.put_str(4, footer + 1, "ENTER / ESC: Back", Color::DarkGrey, Color::Reset);
    }
}

fn bound_keys(keybinds: &Keybinds, action: Action) -> String {
    keybinds.keys_for(action).join("/").to_uppercase()
}

fn help_line(keybinds: &Keybinds) -> String {
    format!(
        " {}:Left  {}:Right  {}:Jump  {}:Use  {}:Pause  │  Mouse: drag blue/red",
        bound_keys(keybinds, Action::Left),
        bound_keys(keybinds, Action::Right),
        bound_keys(keybinds, Action::Jump),
        bound_keys(keybinds, Action::Interact),
        bound_keys(keybinds, Action::Pause),
    )
}
