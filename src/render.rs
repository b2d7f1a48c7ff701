//! Lays out an UpSet plot of `Intersections` and draws it with `plotters`,
//! as SVG or as a PNG bitmap.
//!
//! The plot has three parts: a bar for each intersection along the top, a
//! matrix of dots underneath (one row per set, one column per intersection,
//! with the member sets of each column filled in and joined by a line), and a
//! horizontal bar for each set's size to the left of the matrix. Every bar is
//! labelled with its count.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use std::borrow::Cow;
use std::path::Path;

use anyhow::{anyhow, Result};
use bstr::ByteSlice;
use once_cell::sync::OnceCell;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontDesc, FontFamily, FontStyle, FontTransform};

use crate::intersections::{Intersections, SetOrder, SubsetOrder};

/// The title used unless the command line gives another
pub const DEFAULT_TITLE: &str = "Intersection of private data among jif snapshots";

/// What to draw, and in what order
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// The title drawn across the top of the plot
    pub title: String,
    /// The order of the intersection columns
    pub subset_order: SubsetOrder,
    /// The order of the set rows
    pub set_order: SetOrder,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            title: DEFAULT_TITLE.to_string(),
            subset_order: SubsetOrder::default(),
            set_order: SetOrder::default(),
        }
    }
}

/// An UpSet plot ready to be drawn: its title, and its rows and columns in
/// display order
#[derive(Debug, Clone)]
pub struct Chart {
    /// The plot's title, as given
    pub title: String,
    rows: Vec<Row>,
    columns: Vec<Column>,
}

#[derive(Debug, Clone)]
struct Row {
    name: String,
    total: usize,
}

#[derive(Debug, Clone)]
struct Column {
    // by row
    members: Vec<bool>,
    size: usize,
}

// Geometry, in pixels
const MARGIN: i32 = 20;
const GAP: i32 = 10;
const TITLE_HEIGHT: i32 = 40;
const BARS_HEIGHT: i32 = 220;
const COUNT_ROOM: i32 = 40; // headroom above the tallest bar for its label
const COLUMN_WIDTH: i32 = 28;
const ROW_HEIGHT: i32 = 26;
const TOTALS_WIDTH: i32 = 180;
const TOTALS_ROOM: i32 = 60; // to the left of the longest total bar
const DOT_RADIUS: i32 = 7;
const CHAR_WIDTH: i32 = 7; // rough advance of a 12px sans-serif glyph
const SMALL_CHAR_WIDTH: i32 = 6; // likewise at 10px
const TITLE_CHAR_WIDTH: i32 = 9; // likewise at 16px

const INK: RGBColor = RGBColor(0x22, 0x22, 0x22);
const PALE: RGBColor = RGBColor(0xd6, 0xd6, 0xd6);
const SHADE: RGBColor = RGBColor(0xf2, 0xf2, 0xf2);

// The bitmap backend has no system fonts to fall back on
static SANS_SERIF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Arranges `intersections` into the rows and columns of an UpSet plot
#[must_use]
pub fn chart(intersections: &Intersections, options: &PlotOptions) -> Chart {
    let arrangement = intersections.arrange(options.subset_order, options.set_order);
    let rows = arrangement
        .sets
        .iter()
        .map(|&set| Row {
            name: printable(&intersections.names()[set].to_str_lossy()).into_owned(),
            total: intersections.totals()[set],
        })
        .collect();
    let columns = arrangement
        .subsets
        .iter()
        .map(|subset| Column {
            members: arrangement.sets.iter().map(|&set| subset.combination.contains(set)).collect(),
            size: subset.size,
        })
        .collect();
    Chart { title: options.title.clone(), rows, columns }
}

type Drawn<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

impl Chart {
    /// The set names labelling the rows, top row first
    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.name.as_str())
    }

    /// The intersection sizes, leftmost column first
    pub fn column_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().map(|column| column.size)
    }

    /// Width and height of the drawing, in pixels
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let layout = Layout::new(self);
        (layout.width as u32, layout.height as u32)
    }

    /// Draws the plot as a complete SVG document
    pub fn to_svg(&self) -> Result<String> {
        load_font()?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size()).into_drawing_area();
            self.draw(&root).map_err(drawing_failed)?;
            root.present().map_err(drawing_failed)?;
        }
        Ok(svg)
    }

    /// Draws the plot into a PNG file at `path`
    pub fn write_png(&self, path: &Path) -> Result<()> {
        load_font()?;
        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        self.draw(&root).map_err(drawing_failed)?;
        root.present().map_err(drawing_failed)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Drawn<DB> {
        let layout = Layout::new(self);
        root.fill(&WHITE)?;
        let title = printable(&self.title).into_owned();
        let middle = (layout.width / 2, MARGIN + TITLE_HEIGHT / 2);
        root.draw(&Text::new(title, middle, text_style(16.0, HPos::Center, VPos::Center)))?;
        self.draw_intersection_bars(root, &layout)?;
        self.draw_matrix(root, &layout)?;
        self.draw_totals(root, &layout)
    }

    fn draw_intersection_bars<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, layout: &Layout) -> Drawn<DB> {
        let largest = self.column_sizes().max().unwrap_or(0).max(1);
        let span = BARS_HEIGHT - COUNT_ROOM;
        let bars_top = layout.bars_bottom - span;

        // y axis
        let axis = layout.matrix_left - 4;
        root.draw(&PathElement::new(vec![(axis, bars_top), (axis, layout.bars_bottom)], INK.stroke_width(1)))?;
        let axis_label = text_style(12.0, HPos::Center, VPos::Bottom).transform(FontTransform::Rotate270);
        root.draw(&Text::new("Intersection size", (axis - 6, (bars_top + layout.bars_bottom) / 2), axis_label))?;

        for (column, subset) in self.columns.iter().enumerate() {
            let center = layout.column_center(column);
            let top = layout.bars_bottom - scaled(subset.size, largest, span);
            let half = COLUMN_WIDTH * 3 / 10;
            root.draw(&Rectangle::new([(center - half, top), (center + half, layout.bars_bottom)], INK.filled()))?;

            let label = with_thousands(subset.size);
            let style = if label.len() as i32 * SMALL_CHAR_WIDTH <= COLUMN_WIDTH {
                text_style(10.0, HPos::Center, VPos::Bottom)
            } else {
                text_style(10.0, HPos::Left, VPos::Center).transform(FontTransform::Rotate270)
            };
            root.draw(&Text::new(label, (center, top - 4), style))?;
        }
        Ok(())
    }

    fn draw_matrix<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, layout: &Layout) -> Drawn<DB> {
        let right = layout.matrix_left + self.columns.len() as i32 * COLUMN_WIDTH;
        for (row, set) in self.rows.iter().enumerate() {
            let center = layout.row_center(row);
            if row % 2 == 0 {
                let band = [(MARGIN, center - ROW_HEIGHT / 2), (right, center + ROW_HEIGHT / 2)];
                root.draw(&Rectangle::new(band, SHADE.filled()))?;
            }
            let style = text_style(12.0, HPos::Right, VPos::Center);
            root.draw(&Text::new(set.name.as_str(), (layout.matrix_left - GAP, center), style))?;
        }

        for (column, subset) in self.columns.iter().enumerate() {
            let x = layout.column_center(column);
            let first = subset.members.iter().position(|&member| member);
            let last = subset.members.iter().rposition(|&member| member);
            if let (Some(first), Some(last)) = (first, last) {
                if first != last {
                    let joint = vec![(x, layout.row_center(first)), (x, layout.row_center(last))];
                    root.draw(&PathElement::new(joint, INK.stroke_width(3)))?;
                }
            }
            for (row, &member) in subset.members.iter().enumerate() {
                let fill = if member { INK } else { PALE };
                root.draw(&Circle::new((x, layout.row_center(row)), DOT_RADIUS, fill.filled()))?;
            }
        }
        Ok(())
    }

    fn draw_totals<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, layout: &Layout) -> Drawn<DB> {
        let largest = self.rows.iter().map(|row| row.total).max().unwrap_or(0).max(1);
        let room = TOTALS_WIDTH - TOTALS_ROOM;
        let half = ROW_HEIGHT * 3 / 10;
        for (row, set) in self.rows.iter().enumerate() {
            let center = layout.row_center(row);
            let left = layout.totals_right - scaled(set.total, largest, room);
            root.draw(&Rectangle::new([(left, center - half), (layout.totals_right, center + half)], INK.filled()))?;
            let style = text_style(10.0, HPos::Right, VPos::Center);
            root.draw(&Text::new(with_thousands(set.total), (left - 4, center), style))?;
        }
        let style = text_style(12.0, HPos::Center, VPos::Top);
        root.draw(&Text::new("Set size", (layout.totals_right - room / 2, layout.matrix_bottom + 8), style))?;
        Ok(())
    }
}

/// The positions of the parts of the plot
struct Layout {
    width: i32,
    height: i32,
    totals_right: i32,
    matrix_left: i32,
    bars_bottom: i32,
    matrix_top: i32,
    matrix_bottom: i32,
}

impl Layout {
    fn new(chart: &Chart) -> Self {
        let longest_name = chart.rows.iter().map(|row| row.name.chars().count()).max().unwrap_or(0);
        let label_width = (longest_name as i32 * CHAR_WIDTH).max(40);

        let totals_right = MARGIN + TOTALS_WIDTH;
        let matrix_left = totals_right + GAP + label_width + GAP;
        let matrix_width = chart.columns.len() as i32 * COLUMN_WIDTH;
        let bars_bottom = MARGIN + TITLE_HEIGHT + BARS_HEIGHT;
        let matrix_top = bars_bottom + GAP;
        let matrix_bottom = matrix_top + chart.rows.len() as i32 * ROW_HEIGHT;

        let title_width = chart.title.chars().count() as i32 * TITLE_CHAR_WIDTH;
        let width = (matrix_left + matrix_width + MARGIN).max(title_width + 2 * MARGIN);
        let height = matrix_bottom + 2 * MARGIN;
        Layout { width, height, totals_right, matrix_left, bars_bottom, matrix_top, matrix_bottom }
    }

    fn column_center(&self, column: usize) -> i32 {
        self.matrix_left + column as i32 * COLUMN_WIDTH + COLUMN_WIDTH / 2
    }

    fn row_center(&self, row: usize) -> i32 {
        self.matrix_top + row as i32 * ROW_HEIGHT + ROW_HEIGHT / 2
    }
}

/// `value` as a share of `span` pixels, where `largest` fills all of it
fn scaled(value: usize, largest: usize, span: i32) -> i32 {
    (value as f64 / largest as f64 * f64::from(span)).round() as i32
}

fn text_style(size: f64, horizontal: HPos, vertical: VPos) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&INK).pos(Pos::new(horizontal, vertical))
}

fn load_font() -> Result<()> {
    static LOADED: OnceCell<()> = OnceCell::new();
    LOADED
        .get_or_try_init(|| {
            register_font("sans-serif", FontStyle::Normal, SANS_SERIF)
                .map_err(|_| anyhow!("Can't load the built-in sans-serif font"))
        })
        .map(|_| ())
}

fn drawing_failed<E>(error: DrawingAreaErrorKind<E>) -> anyhow::Error
where
    E: std::error::Error + Send + Sync,
{
    anyhow!("Can't draw the plot: {error}")
}

/// Formats `n` with a comma between each group of three digits
#[must_use]
pub fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

/// Replaces control characters, which SVG text can't hold, with U+FFFD
#[must_use]
pub fn printable(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().map(|c| if c.is_control() { '\u{FFFD}' } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::dataset::Dataset;
    use crate::intersections::Membership;
    use assert_fs::{prelude::*, TempDir};

    fn chart_of(text: &[u8], options: &PlotOptions) -> Chart {
        let dataset = Dataset::from_text(text).unwrap();
        let intersections = Membership::from_dataset(&dataset).intersections();
        chart(&intersections, options)
    }

    fn filled_dots(chart: &Chart) -> usize {
        chart.columns.iter().flat_map(|column| &column.members).filter(|&&member| member).count()
    }

    #[test]
    fn thousands_are_separated_by_commas() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(65536), "65,536");
        assert_eq!(with_thousands(1234567), "1,234,567");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert!(matches!(printable("plain.jif"), Cow::Borrowed("plain.jif")));
        assert_eq!(printable("x\u{1}y\n"), "x\u{FFFD}y\u{FFFD}");
    }

    #[test]
    fn there_is_a_dot_for_each_set_in_each_column() {
        let chart = chart_of(b"a.txt: 1, 2, 3\nb.txt: 2, 3, 4\n", &PlotOptions::default());
        assert_eq!(chart.row_names().collect::<Vec<_>>(), ["a.txt", "b.txt"]);
        // one hash each in {a}, {b}; two in {a, b}
        assert_eq!(chart.column_sizes().collect::<Vec<_>>(), [1, 1, 2]);
        assert_eq!(filled_dots(&chart), 4);

        let svg = chart.to_svg().unwrap();
        assert_eq!(svg.matches("<circle").count(), 6);
    }

    #[test]
    fn the_title_and_names_are_drawn() {
        let chart = chart_of(b"a.txt: 1, 2, 3\nb.txt: 2, 3, 4\n", &PlotOptions::default());
        assert_eq!(chart.title, DEFAULT_TITLE);
        let svg = chart.to_svg().unwrap();
        assert!(svg.starts_with("<svg "), "{svg}");
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(DEFAULT_TITLE));
        assert!(svg.contains("a.txt") && svg.contains("b.txt"));
    }

    #[test]
    fn counts_are_labelled_with_thousands_separators() {
        let hashes: Vec<String> = (0..1234).map(|n| format!("{n:x}")).collect();
        let text = format!("big.jif: {}\nsmall.jif: 0\n", hashes.join(", "));
        let svg = chart_of(text.as_bytes(), &PlotOptions::default()).to_svg().unwrap();
        // 1,233 hashes only in big.jif; 1,234 in big.jif overall
        assert!(svg.contains("1,233"));
        assert!(svg.contains("1,234"));
    }

    #[test]
    fn names_that_are_not_utf8_are_drawn_lossily() {
        let chart = chart_of(b"\xff.jif: 1\n\xfe.jif: 2\n", &PlotOptions::default());
        assert_eq!(chart.row_names().collect::<Vec<_>>(), ["\u{FFFD}.jif", "\u{FFFD}.jif"]);
        assert_eq!(chart.column_sizes().collect::<Vec<_>>(), [1, 1]);
    }

    #[test]
    fn a_long_title_widens_the_plot() {
        let short = chart_of(b"a: 1\n", &PlotOptions { title: "t".to_string(), ..PlotOptions::default() });
        let long = PlotOptions { title: "t".repeat(200), ..PlotOptions::default() };
        let long = chart_of(b"a: 1\n", &long);
        assert_eq!(long.size().0, (200 * TITLE_CHAR_WIDTH + 2 * MARGIN) as u32);
        assert!(short.size().0 < long.size().0);
        assert_eq!(short.size().1, long.size().1);
    }

    #[test]
    fn empty_input_draws_an_empty_plot() {
        let chart = chart_of(b"", &PlotOptions::default());
        assert_eq!(chart.column_sizes().count(), 0);
        assert!(chart.to_svg().unwrap().contains(DEFAULT_TITLE));

        let chart = chart_of(b"a.txt:\n", &PlotOptions::default());
        assert_eq!(chart.row_names().collect::<Vec<_>>(), ["a.txt"]);
        assert_eq!(chart.to_svg().unwrap().matches("<circle").count(), 0);
    }

    #[test]
    fn png_files_are_written() {
        let temp = TempDir::new().unwrap();
        let out = temp.child("plot.png");
        let chart = chart_of(b"a.txt: 1, 2, 3\nb.txt: 2, 3, 4\n", &PlotOptions::default());
        chart.write_png(out.path()).unwrap();
        let bytes = std::fs::read(out.path()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}
