/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The scene lives in world units; `CellScale` maps them onto terminal
/// cells. Composition is a pure function of the world so it can be
/// checked without a terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::assets::AssetId;
use crate::domain::message;
use crate::sim::world::{Overlay, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gap between rows matches the cell colour on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── Palette ──

const FLOOR_FG: Color = Color::Rgb { r: 60, g: 140, b: 60 };
const FLOOR_BG: Color = Color::Rgb { r: 30, g: 70, b: 30 };
const WALL_FG: Color = Color::Rgb { r: 220, g: 200, b: 180 };
const WALL_BG: Color = Color::Rgb { r: 150, g: 60, b: 40 };
const LADDER_FG: Color = Color::Rgb { r: 200, g: 150, b: 70 };
const KEY_FG: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const LOGO_BG: Color = Color::Rgb { r: 200, g: 40, b: 120 };
const HUD_FG: Color = Color::Rgb { r: 230, g: 230, b: 230 };
const VILLAIN_FG: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const BOX_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BOX_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };

/// Brick wall extent in world units. Its foot is where the ladder rests.
const WALL_HEIGHT: f32 = 250.0;
const WALL_HALF_WIDTH: f32 = 40.0;

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Signed coordinates; anything off-grid is dropped.
    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 { return; }
        let (x, y) = (x as usize, y as usize);
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg, bg));
        }
    }

    /// Like `put_str`, but spaces keep whatever is underneath.
    fn put_sprite(&mut self, x: i32, y: i32, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if ch == ' ' { continue; }
            let cx = x + i as i32;
            let bg = if cx >= 0 && y >= 0 { self.get(cx as usize, y as usize).bg } else { Cell::BASE_BG };
            self.set(cx, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cell: Cell) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, cell);
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── World ↔ cell mapping ──

/// Size of one terminal cell in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellScale {
    pub cell_width: f32,
    pub cell_height: f32,
}

impl CellScale {
    pub fn from_config(display: &DisplayConfig) -> Self {
        CellScale { cell_width: display.cell_width, cell_height: display.cell_height }
    }

    /// Viewport size in world units for a terminal of `cols × rows`.
    pub fn world_size(&self, cols: u16, rows: u16) -> (f32, f32) {
        (cols as f32 * self.cell_width, rows as f32 * self.cell_height)
    }

    /// Cell containing the world point.
    pub fn to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.cell_width).floor() as i32, (y / self.cell_height).floor() as i32)
    }

    /// Centre of a cell in world units.
    pub fn to_world(&self, col: u16, row: u16) -> (f32, f32) {
        ((col as f32 + 0.5) * self.cell_width, (row as f32 + 0.5) * self.cell_height)
    }

    fn col(&self, x: f32) -> i32 {
        self.to_cell(x, 0.0).0
    }

    fn row(&self, y: f32) -> i32 {
        self.to_cell(0.0, y).1
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    scale: CellScale,
}

impl Renderer {
    pub fn new(scale: CellScale) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            scale,
        }
    }

    pub fn scale(&self) -> CellScale {
        self.scale
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize_buffers(tw, th);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize_buffers(&mut self, tw: u16, th: u16) {
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize_buffers(tw, th);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        compose(&mut self.front, world, &self.scale);

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

        // Explicit base colours; ResetColor would fall back to the
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
}

// ══════════════════════════════════════════════════════════════
// Compose: build front buffer content
// ══════════════════════════════════════════════════════════════

fn compose(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    compose_floor(buf, w, s);
    compose_wall(buf, w, s);
    compose_key(buf, w, s);
    compose_ladder(buf, w, s);
    compose_player(buf, w, s);
    compose_logo(buf, w, s);
    compose_hud(buf, w);

    match w.state.overlay {
        Overlay::Idle => {}
        Overlay::ShowingAntagonist(kind) => {
            let label = kind.label();
            let cols = buf.width as i32;
            buf.put_str((cols - label.chars().count() as i32) / 2, 1, label, VILLAIN_FG, Cell::BASE_BG);
            compose_art_centred(buf, kind.asset().art(), VILLAIN_FG);
        }
        Overlay::ShowingMessage(kind) => compose_message_box(buf, kind.text()),
    }
}

fn compose_floor(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let top = s.row(w.physics.floor_y);
    let cols = buf.width as i32;
    buf.fill(0, top, cols, top + 1, Cell::new('▀', FLOOR_FG, FLOOR_BG));
    buf.fill(0, top + 1, cols, buf.height as i32, Cell::new(' ', FLOOR_FG, FLOOR_BG));
}

fn compose_wall(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let bottom = w.physics.ladder_bottom_y;
    let (x0, y0) = s.to_cell(w.wall_x - WALL_HALF_WIDTH, bottom - WALL_HEIGHT);
    let (x1, y1) = s.to_cell(w.wall_x + WALL_HALF_WIDTH, bottom);
    let pattern: Vec<char> = AssetId::BrickWall.art()[0].chars().collect();
    for y in y0..y1 {
        // Offset alternate courses by half a brick
        let shift = if y % 2 == 0 { 0 } else { pattern.len() as i32 / 2 };
        for x in x0..x1 {
            let ch = pattern[(x + shift).rem_euclid(pattern.len() as i32) as usize];
            buf.set(x, y, Cell::new(ch, WALL_FG, WALL_BG));
        }
    }
}

fn compose_key(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let art = AssetId::Key.art();
    let width = art_width(art);
    buf.put_sprite(s.col(w.key_x) - width / 2, 0, art[0], KEY_FG);
}

fn compose_ladder(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let l = &w.ladder;
    let art = AssetId::Ladder.art();
    let left = s.col(l.x) - art_width(art) / 2;
    let top = s.row(l.y);
    let bottom = s.row(l.bottom() - 0.01);
    for (i, y) in (top..=bottom).enumerate() {
        buf.put_sprite(left, y, art[i % art.len()], LADDER_FG);
    }
}

fn compose_player(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let b = &w.player.body;
    let art = AssetId::Player.art();
    let left = s.col(b.x) - art_width(art) / 2;
    // Feet on the cell just above the body's y
    let feet = s.row(b.y - 0.01);
    let top = feet - art.len() as i32 + 1;
    for (i, line) in art.iter().enumerate() {
        buf.put_sprite(left, top + i as i32, line, Color::White);
    }
}

fn compose_logo(buf: &mut FrameBuffer, w: &WorldState, s: &CellScale) {
    let art = AssetId::Logo.art();
    let (cx, cy) = s.to_cell(w.logo.x, w.logo.y);
    let left = cx - art_width(art) / 2;
    for (i, line) in art.iter().enumerate() {
        let row = cy + i as i32;
        buf.set(left - 1, row, Cell::new(' ', Color::White, LOGO_BG));
        buf.put_str(left, row, line, Color::White, LOGO_BG);
        buf.set(left + line.chars().count() as i32, row, Cell::new(' ', Color::White, LOGO_BG));
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState) {
    for (i, line) in w.info_lines().iter().enumerate() {
        buf.put_str(1, i as i32, line, HUD_FG, Cell::BASE_BG);
    }
}

fn compose_art_centred(buf: &mut FrameBuffer, art: &[&str], fg: Color) {
    let left = (buf.width as i32 - art_width(art)) / 2;
    let top = (buf.height as i32 - art.len() as i32) / 2;
    for (i, line) in art.iter().enumerate() {
        buf.put_str(left, top + i as i32, line, fg, Cell::BASE_BG);
    }
}

/// Bordered box at 80% of the screen width, text word-wrapped inside.
fn compose_message_box(buf: &mut FrameBuffer, text: &str) {
    let box_w = ((buf.width as f32 * 0.8) as usize).max(5);
    let inner = box_w - 4;
    let lines = message::wrap(text, inner);
    let box_h = lines.len() + 2;

    let x0 = (buf.width as i32 - box_w as i32) / 2;
    let y0 = (buf.height as i32 - box_h as i32) / 2;
    let x1 = x0 + box_w as i32 - 1;
    let y1 = y0 + box_h as i32 - 1;

    buf.fill(x0, y0, x1 + 1, y1 + 1, Cell::new(' ', BOX_FG, BOX_BG));
    for x in x0 + 1..x1 {
        buf.set(x, y0, Cell::new('─', BOX_FG, BOX_BG));
        buf.set(x, y1, Cell::new('─', BOX_FG, BOX_BG));
    }
    for y in y0 + 1..y1 {
        buf.set(x0, y, Cell::new('│', BOX_FG, BOX_BG));
        buf.set(x1, y, Cell::new('│', BOX_FG, BOX_BG));
    }
    buf.set(x0, y0, Cell::new('┌', BOX_FG, BOX_BG));
    buf.set(x1, y0, Cell::new('┐', BOX_FG, BOX_BG));
    buf.set(x0, y1, Cell::new('└', BOX_FG, BOX_BG));
    buf.set(x1, y1, Cell::new('┘', BOX_FG, BOX_BG));

    for (i, line) in lines.iter().enumerate() {
        let pad = (inner - line.chars().count()) as i32 / 2;
        buf.put_str(x0 + 2 + pad, y0 + 1 + i as i32, line, Color::White, BOX_BG);
    }
}

fn art_width(art: &[&str]) -> i32 {
    art.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32
}
