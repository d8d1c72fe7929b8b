//! The VT screen: an ANSI byte stream folded into a styled cell grid with
//! scrollback. Parsing is an explicit state machine so that chunk
//! boundaries never corrupt a sequence in flight.
//!
//! Malformed input never raises: an unrecognized CSI final or a truncated
//! OSC/APC string is dropped and the parser resynchronizes at the next
//! `ESC` or printable byte.

use discode_core::util::clamp_i64;
use std::collections::{HashMap, VecDeque};

const MIN_COLS: i64 = 20;
const MAX_COLS: i64 = 240;
const MIN_ROWS: i64 = 6;
const MAX_ROWS: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    italic: bool,
    underline: bool,
    inverse: bool,
}

/// One grid position. Wide glyphs occupy a leader cell (`width == 2`)
/// followed by a continuation cell (`width == 0`, never printed) so that
/// column arithmetic stays one-cell-per-column throughout the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub width: u8,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
}

impl Cell {
    fn blank() -> Self {
        Cell {
            ch: ' ',
            width: 1,
            fg: None,
            bg: None,
            bold: false,
            italic: false,
            underline: false,
            inverse: false,
        }
    }

    fn from_style(ch: char, width: u8, style: Style) -> Self {
        Cell {
            ch,
            width,
            fg: style.fg,
            bg: style.bg,
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            inverse: style.inverse,
        }
    }

    fn continuation(style: Style) -> Self {
        Self::from_style('\0', 0, style)
    }

    fn is_leader(&self) -> bool {
        self.width > 0
    }
}

/// A run of cells sharing one style, with inverse already resolved into
/// concrete fg/bg.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

pub type StyledLine = Vec<StyledSpan>;

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub lines: Vec<StyledLine>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub cursor_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Ground,
    Escape,
    CsiParam,
    CsiIntermediate,
    OscString,
    ApcString,
}

pub struct Screen {
    cols: usize,
    rows: usize,
    primary: Vec<Vec<Cell>>,
    alternate: Vec<Vec<Cell>>,
    using_alternate: bool,
    scrollback: VecDeque<Vec<Cell>>,
    cursor_row: usize,
    cursor_col: usize,
    saved_cursor: (usize, usize),
    style: Style,
    private_modes: HashMap<u16, bool>,
    scroll_top: usize,
    scroll_bottom: usize,
    absolute_cursor_used: bool,

    state: ParserState,
    param_buf: String,
    private_marker: bool,
    intermediate: Vec<u8>,
    osc_buf: Vec<u8>,
    apc_buf: Vec<u8>,
    string_pending_esc: bool,
    utf8_pending: Vec<u8>,
}

impl Screen {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = clamp_i64(cols as i64, MIN_COLS, MAX_COLS) as usize;
        let rows = clamp_i64(rows as i64, MIN_ROWS, MAX_ROWS) as usize;
        Self {
            cols,
            rows,
            primary: blank_grid(cols, rows),
            alternate: blank_grid(cols, rows),
            using_alternate: false,
            scrollback: VecDeque::new(),
            cursor_row: 0,
            cursor_col: 0,
            saved_cursor: (0, 0),
            style: Style::default(),
            private_modes: HashMap::new(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            absolute_cursor_used: false,
            state: ParserState::Ground,
            param_buf: String::new(),
            private_marker: false,
            intermediate: Vec::new(),
            osc_buf: Vec::new(),
            apc_buf: Vec::new(),
            string_pending_esc: false,
            utf8_pending: Vec::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }
    pub fn private_mode(&self, n: u16) -> bool {
        default_on_mode(&self.private_modes, n)
    }

    fn max_scrollback(&self) -> usize {
        (self.rows * 6).max(200)
    }

    fn grid(&self) -> &Vec<Vec<Cell>> {
        if self.using_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        if self.using_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// Feed raw PTY bytes into the parser. Never fails.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.process_byte(byte);
        }
    }

    fn process_byte(&mut self, byte: u8) {
        match self.state {
            ParserState::Ground => self.process_ground(byte),
            ParserState::Escape => self.process_escape(byte),
            ParserState::CsiParam | ParserState::CsiIntermediate => self.feed_csi_byte(byte),
            ParserState::OscString => self.feed_string_byte(byte, true),
            ParserState::ApcString => self.feed_string_byte(byte, false),
        }
    }

    fn process_ground(&mut self, byte: u8) {
        if byte == 0x1B {
            self.utf8_pending.clear();
            self.state = ParserState::Escape;
            return;
        }
        if byte < 0x20 {
            self.handle_c0(byte);
            return;
        }
        if byte == 0x7F {
            return;
        }
        self.feed_utf8_byte(byte);
    }

    fn feed_utf8_byte(&mut self, byte: u8) {
        if self.utf8_pending.is_empty() && byte < 0x80 {
            self.put_char(byte as char);
            return;
        }
        self.utf8_pending.push(byte);
        let expected = match self.utf8_pending[0] {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => {
                // invalid lead byte, drop and resync
                self.utf8_pending.clear();
                return;
            }
        };
        if self.utf8_pending.len() < expected {
            return;
        }
        match std::str::from_utf8(&self.utf8_pending) {
            Ok(s) => {
                if let Some(ch) = s.chars().next() {
                    self.put_char(ch);
                }
            }
            Err(_) => {
                // malformed sequence: drop silently, resync on next byte
            }
        }
        self.utf8_pending.clear();
    }

    fn put_char(&mut self, ch: char) {
        let width = crate::width::char_width(ch);
        if width == 0 {
            return;
        }
        if self.cursor_col + width as usize > self.cols {
            self.line_feed();
        }
        let row = self.cursor_row;
        let col = self.cursor_col;
        let style = self.style;
        let grid = self.grid_mut();
        if row < grid.len() && col < grid[row].len() {
            grid[row][col] = Cell::from_style(ch, width, style);
            if width == 2 && col + 1 < grid[row].len() {
                grid[row][col + 1] = Cell::continuation(style);
            }
        }
        self.cursor_col = (self.cursor_col + width as usize).min(self.cols);
    }

    fn handle_c0(&mut self, byte: u8) {
        match byte {
            b'\r' => self.cursor_col = 0,
            b'\n' => self.line_feed(),
            0x08 => self.cursor_col = self.cursor_col.saturating_sub(1),
            0x09 => {
                let next_stop = ((self.cursor_col / 8) + 1) * 8;
                self.cursor_col = next_stop.min(self.cols.saturating_sub(1));
            }
            _ => {}
        }
    }

    fn line_feed(&mut self) {
        self.cursor_col = 0;
        if self.cursor_row == self.scroll_bottom {
            self.scroll_region_up(1);
        } else if self.cursor_row + 1 < self.rows {
            self.cursor_row += 1;
        }
    }

    fn scroll_region_up(&mut self, n: usize) {
        let top = self.scroll_top;
        let bottom = self.scroll_bottom;
        let full_screen = top == 0 && bottom == self.rows.saturating_sub(1);
        for _ in 0..n {
            if full_screen && !self.using_alternate {
                let retired = self.primary.remove(top);
                self.scrollback.push_back(retired);
                while self.scrollback.len() > self.max_scrollback() {
                    self.scrollback.pop_front();
                }
                self.primary.insert(bottom, blank_row(self.cols));
            } else {
                let grid = self.grid_mut();
                if bottom < grid.len() {
                    grid.remove(top);
                    grid.insert(bottom, blank_row(self.cols));
                }
            }
        }
    }

    fn scroll_region_down(&mut self, n: usize) {
        let top = self.scroll_top;
        let bottom = self.scroll_bottom;
        for _ in 0..n {
            let grid = self.grid_mut();
            if bottom < grid.len() {
                grid.remove(bottom);
                grid.insert(top, blank_row(self.cols));
            }
        }
    }

    fn process_escape(&mut self, byte: u8) {
        match byte {
            b'[' => {
                self.state = ParserState::CsiParam;
                self.param_buf.clear();
                self.private_marker = false;
                self.intermediate.clear();
            }
            b']' => {
                self.state = ParserState::OscString;
                self.osc_buf.clear();
                self.string_pending_esc = false;
            }
            b'_' => {
                self.state = ParserState::ApcString;
                self.apc_buf.clear();
                self.string_pending_esc = false;
            }
            b'7' => {
                self.saved_cursor = (self.cursor_row, self.cursor_col);
                self.state = ParserState::Ground;
            }
            b'8' => {
                let (row, col) = self.saved_cursor;
                self.cursor_row = row.min(self.rows.saturating_sub(1));
                self.cursor_col = col.min(self.cols.saturating_sub(1));
                self.state = ParserState::Ground;
            }
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn feed_string_byte(&mut self, byte: u8, is_osc: bool) {
        if byte == 0x07 {
            self.state = ParserState::Ground;
            return;
        }
        if self.string_pending_esc {
            self.string_pending_esc = false;
            if byte == b'\\' {
                self.state = ParserState::Ground;
                return;
            }
        }
        if byte == 0x1B {
            self.string_pending_esc = true;
            return;
        }
        if is_osc {
            self.osc_buf.push(byte);
        } else {
            self.apc_buf.push(byte);
        }
    }

    fn feed_csi_byte(&mut self, byte: u8) {
        match byte {
            0x3F if self.param_buf.is_empty() && !self.private_marker => {
                self.private_marker = true;
            }
            0x30..=0x3F => {
                self.param_buf.push(byte as char);
            }
            0x20..=0x2F => {
                self.state = ParserState::CsiIntermediate;
                self.intermediate.push(byte);
            }
            0x40..=0x7E => {
                let params = parse_params(&self.param_buf);
                self.dispatch_csi(byte, &params);
                self.state = ParserState::Ground;
            }
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8, params: &[i64]) {
        let n = |i: usize, default: i64| -> i64 {
            params.get(i).copied().filter(|&v| v != 0).unwrap_or(default)
        };

        match final_byte {
            b'A' => self.cursor_row = self.cursor_row.saturating_sub(n(0, 1) as usize),
            b'B' => {
                self.cursor_row = (self.cursor_row + n(0, 1) as usize).min(self.rows - 1);
            }
            b'C' => {
                self.cursor_col = (self.cursor_col + n(0, 1) as usize).min(self.cols - 1);
            }
            b'D' => self.cursor_col = self.cursor_col.saturating_sub(n(0, 1) as usize),
            b'E' => {
                self.cursor_row = (self.cursor_row + n(0, 1) as usize).min(self.rows - 1);
                self.cursor_col = 0;
            }
            b'F' => {
                self.cursor_row = self.cursor_row.saturating_sub(n(0, 1) as usize);
                self.cursor_col = 0;
            }
            b'G' => {
                self.cursor_col = clamp_i64(n(0, 1) - 1, 0, self.cols as i64 - 1) as usize;
                self.absolute_cursor_used = true;
            }
            b'H' | b'f' => {
                self.cursor_row = clamp_i64(n(0, 1) - 1, 0, self.rows as i64 - 1) as usize;
                self.cursor_col = clamp_i64(n(1, 1) - 1, 0, self.cols as i64 - 1) as usize;
                self.absolute_cursor_used = true;
            }
            b'd' => {
                self.cursor_row = clamp_i64(n(0, 1) - 1, 0, self.rows as i64 - 1) as usize;
                self.absolute_cursor_used = true;
            }
            b'J' => {
                self.erase_in_display(params.first().copied().unwrap_or(0));
                self.absolute_cursor_used = true;
            }
            b'K' => self.erase_in_line(params.first().copied().unwrap_or(0)),
            b's' => self.saved_cursor = (self.cursor_row, self.cursor_col),
            b'u' => {
                let (row, col) = self.saved_cursor;
                self.cursor_row = row;
                self.cursor_col = col;
            }
            b'm' => self.apply_sgr(params),
            b'h' | b'l' => self.set_mode(final_byte == b'h', params),
            b'r' => {
                let top = clamp_i64(n(0, 1) - 1, 0, self.rows as i64 - 1) as usize;
                let bottom = clamp_i64(n(1, self.rows as i64) - 1, 0, self.rows as i64 - 1) as usize;
                if top < bottom {
                    self.scroll_top = top;
                    self.scroll_bottom = bottom;
                } else {
                    self.scroll_top = 0;
                    self.scroll_bottom = self.rows - 1;
                }
            }
            b'L' => self.insert_lines(n(0, 1) as usize),
            b'M' => self.delete_lines(n(0, 1) as usize),
            b'@' => self.insert_chars(n(0, 1) as usize),
            b'P' => self.delete_chars(n(0, 1) as usize),
            b'S' => self.scroll_region_up(n(0, 1) as usize),
            b'T' => self.scroll_region_down(n(0, 1) as usize),
            _ => {}
        }
    }

    fn set_mode(&mut self, enable: bool, params: &[i64]) {
        if !self.private_marker {
            return;
        }
        for &p in params {
            match p {
                1049 | 47 => self.swap_alternate(enable),
                other => {
                    self.private_modes.insert(other as u16, enable);
                }
            }
        }
    }

    fn swap_alternate(&mut self, enable: bool) {
        if enable && !self.using_alternate {
            self.saved_cursor = (self.cursor_row, self.cursor_col);
            self.alternate = blank_grid(self.cols, self.rows);
            self.using_alternate = true;
            self.cursor_row = 0;
            self.cursor_col = 0;
        } else if !enable && self.using_alternate {
            self.using_alternate = false;
            let (row, col) = self.saved_cursor;
            self.cursor_row = row.min(self.rows - 1);
            self.cursor_col = col.min(self.cols - 1);
        }
    }

    fn erase_in_display(&mut self, mode: i64) {
        let (row, col, cols, rows) = (self.cursor_row, self.cursor_col, self.cols, self.rows);
        let grid = self.grid_mut();
        match mode {
            0 => {
                clear_row_from(grid, row, col, cols);
                for r in (row + 1)..rows {
                    grid[r] = blank_row(cols);
                }
            }
            1 => {
                for r in 0..row {
                    grid[r] = blank_row(cols);
                }
                clear_row_to(grid, row, col);
            }
            _ => {
                for r in grid.iter_mut() {
                    *r = blank_row(cols);
                }
            }
        }
    }

    fn erase_in_line(&mut self, mode: i64) {
        let (row, col, cols) = (self.cursor_row, self.cursor_col, self.cols);
        let grid = self.grid_mut();
        match mode {
            0 => clear_row_from(grid, row, col, cols),
            1 => clear_row_to(grid, row, col),
            _ => {
                if row < grid.len() {
                    grid[row] = blank_row(cols);
                }
            }
        }
    }

    fn insert_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        let cols = self.cols;
        let row = self.cursor_row;
        let grid = self.grid_mut();
        for _ in 0..n {
            if bottom < grid.len() {
                grid.remove(bottom);
                grid.insert(row, blank_row(cols));
            }
        }
    }

    fn delete_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        let cols = self.cols;
        let row = self.cursor_row;
        let grid = self.grid_mut();
        for _ in 0..n {
            if row < grid.len() {
                grid.remove(row);
                grid.insert(bottom, blank_row(cols));
            }
        }
    }

    fn insert_chars(&mut self, n: usize) {
        let (row, col, cols) = (self.cursor_row, self.cursor_col, self.cols);
        let grid = self.grid_mut();
        if row >= grid.len() {
            return;
        }
        for _ in 0..n.min(cols.saturating_sub(col)) {
            grid[row].insert(col, Cell::blank());
            grid[row].truncate(cols);
        }
    }

    fn delete_chars(&mut self, n: usize) {
        let (row, col, cols) = (self.cursor_row, self.cursor_col, self.cols);
        let grid = self.grid_mut();
        if row >= grid.len() {
            return;
        }
        for _ in 0..n.min(cols.saturating_sub(col)) {
            if col < grid[row].len() {
                grid[row].remove(col);
            }
            grid[row].push(Cell::blank());
        }
    }

    fn apply_sgr(&mut self, params: &[i64]) {
        let ps: Vec<i64> = if params.is_empty() {
            vec![0]
        } else {
            params.to_vec()
        };
        let mut i = 0;
        while i < ps.len() {
            match ps[i] {
                0 => self.style = Style::default(),
                1 => self.style.bold = true,
                22 => self.style.bold = false,
                3 => self.style.italic = true,
                23 => self.style.italic = false,
                4 => self.style.underline = true,
                24 => self.style.underline = false,
                7 => self.style.inverse = true,
                27 => self.style.inverse = false,
                39 => self.style.fg = None,
                49 => self.style.bg = None,
                v @ 30..=37 => self.style.fg = Some(Color::Indexed((v - 30) as u8)),
                v @ 90..=97 => self.style.fg = Some(Color::Indexed((v - 90 + 8) as u8)),
                v @ 40..=47 => self.style.bg = Some(Color::Indexed((v - 40) as u8)),
                v @ 100..=107 => self.style.bg = Some(Color::Indexed((v - 100 + 8) as u8)),
                v @ (38 | 48) => {
                    let is_fg = v == 38;
                    match ps.get(i + 1) {
                        Some(5) => {
                            if let Some(&idx) = ps.get(i + 2) {
                                let color = Color::Indexed(idx.clamp(0, 255) as u8);
                                if is_fg {
                                    self.style.fg = Some(color);
                                } else {
                                    self.style.bg = Some(color);
                                }
                                i += 2;
                            }
                        }
                        Some(2) => {
                            if let (Some(&r), Some(&g), Some(&b)) =
                                (ps.get(i + 2), ps.get(i + 3), ps.get(i + 4))
                            {
                                let color = Color::Rgb(
                                    r.clamp(0, 255) as u8,
                                    g.clamp(0, 255) as u8,
                                    b.clamp(0, 255) as u8,
                                );
                                if is_fg {
                                    self.style.fg = Some(color);
                                } else {
                                    self.style.bg = Some(color);
                                }
                                i += 4;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Resize both grids, clamping to the supported dimension range and
    /// clipping/padding existing content rather than discarding it.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = clamp_i64(cols as i64, MIN_COLS, MAX_COLS) as usize;
        let rows = clamp_i64(rows as i64, MIN_ROWS, MAX_ROWS) as usize;
        self.primary = resize_grid(&self.primary, cols, rows);
        self.alternate = resize_grid(&self.alternate, cols, rows);
        self.cols = cols;
        self.rows = rows;
        self.cursor_row = self.cursor_row.min(rows - 1);
        self.cursor_col = self.cursor_col.min(cols - 1);
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
    }

    /// Render a snapshot clamped to `(cols, rows)`. When the stream has
    /// used absolute positioning or a full clear, the view is the top of
    /// the grid (the application drew a full screen); otherwise it is the
    /// tail of the scrollback + grid (append-only log behavior).
    pub fn snapshot(&self, cols: usize, rows: usize) -> Snapshot {
        let cols = cols.min(self.cols).max(1);
        let rows = rows.max(1);

        let lines: Vec<StyledLine> = if self.absolute_cursor_used {
            self.grid()
                .iter()
                .take(rows)
                .map(|row| row_to_spans(row, cols))
                .collect()
        } else {
            let mut combined: Vec<&Vec<Cell>> = self.scrollback.iter().collect();
            combined.extend(self.grid().iter());
            combined
                .into_iter()
                .rev()
                .take(rows)
                .rev()
                .map(|row| row_to_spans(row, cols))
                .collect()
        };

        Snapshot {
            lines,
            cursor_row: self.cursor_row,
            cursor_col: self.cursor_col,
            cursor_visible: self.private_mode(25),
        }
    }

    /// Plain-text rendering of the current view (same top/tail rule as
    /// [`Screen::snapshot`]), trailing spaces trimmed per line.
    pub fn text_snapshot(&self) -> String {
        let snap = self.snapshot(self.cols, self.rows);
        snap.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|s| s.text.as_str())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn default_on_mode(modes: &HashMap<u16, bool>, n: u16) -> bool {
    modes.get(&n).copied().unwrap_or(n == 7 || n == 25)
}

fn blank_row(cols: usize) -> Vec<Cell> {
    vec![Cell::blank(); cols]
}

fn blank_grid(cols: usize, rows: usize) -> Vec<Vec<Cell>> {
    vec![blank_row(cols); rows]
}

fn resize_grid(grid: &[Vec<Cell>], cols: usize, rows: usize) -> Vec<Vec<Cell>> {
    let mut out = Vec::with_capacity(rows);
    for r in 0..rows {
        if let Some(existing) = grid.get(r) {
            let mut row = existing.clone();
            row.resize(cols, Cell::blank());
            out.push(row);
        } else {
            out.push(blank_row(cols));
        }
    }
    out
}

fn clear_row_from(grid: &mut [Vec<Cell>], row: usize, from_col: usize, cols: usize) {
    if row >= grid.len() {
        return;
    }
    for c in from_col..cols.min(grid[row].len()) {
        grid[row][c] = Cell::blank();
    }
}

fn clear_row_to(grid: &mut [Vec<Cell>], row: usize, to_col: usize) {
    if row >= grid.len() {
        return;
    }
    for c in 0..=to_col.min(grid[row].len().saturating_sub(1)) {
        grid[row][c] = Cell::blank();
    }
}

fn parse_params(buf: &str) -> Vec<i64> {
    if buf.is_empty() {
        return Vec::new();
    }
    buf.split(';').map(|p| p.parse().unwrap_or(0)).collect()
}

fn row_to_spans(row: &[Cell], cols: usize) -> StyledLine {
    let mut spans: StyledLine = Vec::new();
    for cell in row.iter().take(cols) {
        if !cell.is_leader() {
            continue;
        }
        let (fg, bg) = if cell.inverse {
            (cell.bg, cell.fg)
        } else {
            (cell.fg, cell.bg)
        };
        let matches_last = spans.last().map_or(false, |s: &StyledSpan| {
            s.fg == fg && s.bg == bg && s.bold == cell.bold && s.italic == cell.italic
                && s.underline == cell.underline
        });
        if matches_last {
            spans.last_mut().unwrap().text.push(cell.ch);
        } else {
            spans.push(StyledSpan {
                text: cell.ch.to_string(),
                fg,
                bg,
                bold: cell.bold,
                italic: cell.italic,
                underline: cell.underline,
            });
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_never_exceeds_requested_bounds() {
        let mut screen = Screen::new(80, 24);
        screen.write(b"hello\r\nworld\r\n");
        let snap = screen.snapshot(80, 24);
        assert!(snap.lines.len() <= 24);
        for line in &snap.lines {
            let len: usize = line.iter().map(|s| s.text.chars().count()).sum();
            assert!(len <= 80);
        }
    }

    #[test]
    fn sgr_reset_restores_default_style() {
        let mut screen = Screen::new(80, 24);
        screen.write(b"\x1b[1;31mred-bold\x1b[0mplain");
        let snap = screen.snapshot(80, 24);
        let spans = &snap.lines[0];
        assert_eq!(spans[0].text, "red-bold");
        assert!(spans[0].bold);
        assert_eq!(spans[1].text, "plain");
        assert!(!spans[1].bold);
        assert_eq!(spans[1].fg, None);
    }

    #[test]
    fn wide_glyph_at_last_column_wraps() {
        let mut screen = Screen::new(21, 6);
        screen.write("x".repeat(20).as_bytes());
        screen.write("한".as_bytes());
        assert_eq!(screen.cursor_row(), 1);
    }

    #[test]
    fn alternate_screen_enter_clears_and_leave_restores() {
        let mut screen = Screen::new(80, 24);
        screen.write(b"primary content");
        screen.write(b"\x1b[?1049h");
        assert!(screen.using_alternate);
        screen.write(b"alt content");
        screen.write(b"\x1b[?1049l");
        assert!(!screen.using_alternate);
        let text = screen.text_snapshot();
        assert!(text.starts_with("primary content"));
    }

    #[test]
    fn malformed_sequence_never_panics_and_resyncs() {
        let mut screen = Screen::new(80, 24);
        screen.write(b"\x1b[9999zgarbage\x1b[999999999999999999m ok");
        let text = screen.text_snapshot();
        assert!(text.contains("ok") || text.contains("garbage"));
    }

    #[test]
    fn scrollback_never_grows_unbounded() {
        let mut screen = Screen::new(80, 24);
        for i in 0..5000 {
            screen.write(format!("line {i}\r\n").as_bytes());
        }
        assert!(screen.scrollback.len() <= screen.max_scrollback());
    }
}
