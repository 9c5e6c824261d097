//! Drawing the map: ANSI true-colour frames for a terminal and SVG snapshots.
//!
//! In a terminal frame each column takes four character cells: two painted
//! with the hex colour and a two-cell gap of ocean. Odd rows are indented by
//! two cells, which mirrors the half-step offset of the pixel layout.

use hexgene_core::GridConfig;
use hexgene_world::layout::{Fill, OCEAN_RGB};
use hexgene_world::{GridModel, HexLayout};

const RESET: &str = "\x1b[0m";

/// Moves the cursor to the top-left corner so frames overwrite each other.
pub const CURSOR_HOME: &str = "\x1b[H";

/// Clears the screen before the first frame.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

fn paint(out: &mut String, (r, g, b): (u8, u8, u8), text: &str) {
    out.push_str(&format!("\x1b[48;2;{};{};{}m{}", r, g, b, text));
}

/// Render every row of `grid` as one line, in row order.
pub fn render_frame(grid: &GridModel) -> String {
    if grid.is_empty() {
        return String::new();
    }

    let columns = grid.columns().max(0) as usize;
    let mut out = String::with_capacity(grid.len() * 40);

    for (index, view) in grid.views().enumerate() {
        if index % columns == 0 {
            if index > 0 {
                out.push_str(RESET);
                out.push('\n');
            }
            if view.coordinate.parity() == 1 {
                paint(&mut out, OCEAN_RGB, "  ");
            }
        }

        let colour = Fill::for_cell(&view).map_or(OCEAN_RGB, |fill| fill.rgb());
        paint(&mut out, colour, "  ");
        paint(&mut out, OCEAN_RGB, "  ");
    }

    out.push_str(RESET);
    out.push('\n');
    out
}

/// Render `grid` as an SVG document: the ocean as background and one
/// polygon per land cell.
pub fn render_svg(grid: &GridModel, layout: &HexLayout) -> String {
    let (width, height) = layout.canvas_size(&GridConfig {
        columns: grid.columns(),
        rows: grid.rows(),
    });
    let (r, g, b) = OCEAN_RGB;

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.2} {:.2}\">\n",
        width.ceil(),
        height.ceil(),
        width,
        height
    );
    out.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"#{:02X}{:02X}{:02X}\"/>\n",
        r, g, b
    ));

    for view in grid.views() {
        let Some(fill) = Fill::for_cell(&view) else {
            continue;
        };
        let points: Vec<String> = layout
            .vertices(view.coordinate)
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        out.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\"/>\n",
            points.join(" "),
            fill
        ));
    }

    out.push_str("</svg>\n");
    out
}
