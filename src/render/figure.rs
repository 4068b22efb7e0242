use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;

use super::{PlotError, PlotStyle, axis_range, draw_err};
use crate::color::generate_palette;
use crate::data::extract::Series;

/// Points → pixels for the current canvas.
#[derive(Clone, Copy)]
struct Scale(f64);

impl Scale {
    fn px(self, pt: f64) -> i32 {
        ((pt * self.0).round() as i32).max(1)
    }

    fn width(self, pt: f64) -> u32 {
        self.px(pt) as u32
    }
}

fn font(style: &PlotStyle, size: f64, scale: Scale, bold: bool) -> TextStyle<'_> {
    let desc = (style.font_family.as_str(), f64::from(scale.px(size))).into_font();
    let desc = if bold { desc.style(FontStyle::Bold) } else { desc };
    desc.color(&BLACK)
}

/// Draw the whole figure: axes on the left, legend in the strip to the right.
pub(super) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[Series],
    style: &PlotStyle,
    scale: f64,
) -> Result<(), PlotError> {
    let scale = Scale(scale);
    root.fill(&WHITE).map_err(draw_err)?;

    let (width, _) = root.dim_in_pixel();
    let split = (f64::from(width) * style.plot_fraction.clamp(0.1, 1.0)).round() as u32;
    let (plot_area, legend_area) = root.split_horizontally(split);

    let colours: Vec<RGBColor> = generate_palette(series.len())
        .into_iter()
        .map(|c| RGBColor(c.red, c.green, c.blue))
        .collect();

    let x_range = axis_range(series.iter().flat_map(|s| s.points().map(|(x, _)| x)));
    let y_range = axis_range(series.iter().flat_map(|s| s.points().map(|(_, z)| z)));

    let mut builder = ChartBuilder::on(&plot_area);
    builder
        .margin(scale.px(10.0))
        .x_label_area_size(scale.px(style.axis_label_size * 3.2))
        .y_label_area_size(scale.px(style.axis_label_size * 4.4));
    if let Some(title) = &style.title {
        builder.caption(title, font(style, style.title_size, scale, true));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .axis_desc_style(font(style, style.axis_label_size, scale, true))
        .label_style(font(style, style.tick_label_size, scale, false))
        .set_all_tick_mark_size(scale.px(style.major_tick_length))
        .axis_style(BLACK.stroke_width(scale.width(style.axis_width)));
    if style.grid.enabled {
        let grid_width = scale.width(style.grid.line_width);
        mesh.bold_line_style(BLACK.mix(style.grid.alpha * 0.5).stroke_width(grid_width))
            .light_line_style(BLACK.mix(style.grid.alpha * 0.2).stroke_width(grid_width))
            .max_light_lines(style.grid.minor_lines);
    } else {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(draw_err)?;

    let marker_radius = scale.px(style.marker_size / 2.0);
    for (s, colour) in series.iter().zip(&colours) {
        for segment in s.segments() {
            chart
                .draw_series(LineSeries::new(
                    segment,
                    colour.stroke_width(scale.width(style.line_width)),
                ))
                .map_err(draw_err)?;
        }
        if style.markers {
            chart
                .draw_series(
                    s.points()
                        .map(|p| Circle::new(p, marker_radius, colour.filled())),
                )
                .map_err(draw_err)?;
        }
    }

    let entries: Vec<(String, RGBColor)> = series
        .iter()
        .zip(&colours)
        .map(|(s, c)| (s.label(&style.label_prefix), *c))
        .collect();
    draw_legend(&legend_area, &entries, style, scale)
}

/// Framed legend anchored to the top-left of its strip.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[(String, RGBColor)],
    style: &PlotStyle,
    scale: Scale,
) -> Result<(), PlotError> {
    let title_font = font(style, style.legend_title_size, scale, true);
    let entry_font = font(style, style.legend_font_size, scale, true);

    let pad = scale.px(6.0);
    let gap = scale.px(6.0);
    let sample = scale.px(24.0);
    let row_height = scale.px(style.legend_font_size * 1.6);
    let title_height = scale.px(style.legend_title_size * 1.8);

    let (title_w, _) = area
        .estimate_text_size(&style.legend_title, &title_font)
        .map_err(draw_err)?;
    let mut entry_w = 0;
    for (label, _) in entries {
        let (w, _) = area
            .estimate_text_size(label, &entry_font)
            .map_err(draw_err)?;
        entry_w = entry_w.max(w as i32);
    }

    let inner_w = (title_w as i32).max(sample + gap + entry_w);
    let x0 = scale.px(8.0);
    let y0 = scale.px(10.0);
    let x1 = x0 + inner_w + 2 * pad;
    let y1 = y0 + 2 * pad + title_height + row_height * entries.len() as i32;

    if style.legend_shadow {
        let off = scale.px(3.0);
        area.draw(&Rectangle::new(
            [(x0 + off, y0 + off), (x1 + off, y1 + off)],
            BLACK.mix(0.3).filled(),
        ))
        .map_err(draw_err)?;
    }
    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], WHITE.filled()))
        .map_err(draw_err)?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x1, y1)],
        BLACK.stroke_width(scale.width(0.8)),
    ))
    .map_err(draw_err)?;

    let title_x = x0 + pad + (inner_w - title_w as i32) / 2;
    area.draw(&Text::new(
        style.legend_title.clone(),
        (title_x, y0 + pad),
        title_font.clone(),
    ))
    .map_err(draw_err)?;

    let marker_radius = scale.px(style.marker_size / 2.0);
    for (i, (label, colour)) in entries.iter().enumerate() {
        let mid_y = y0 + pad + title_height + row_height * i as i32 + row_height / 2;
        let left = x0 + pad;
        area.draw(&PathElement::new(
            vec![(left, mid_y), (left + sample, mid_y)],
            colour.stroke_width(scale.width(style.line_width)),
        ))
        .map_err(draw_err)?;
        if style.markers {
            area.draw(&Circle::new(
                (left + sample / 2, mid_y),
                marker_radius,
                colour.filled(),
            ))
            .map_err(draw_err)?;
        }
        let (_, text_h) = area
            .estimate_text_size(label, &entry_font)
            .map_err(draw_err)?;
        area.draw(&Text::new(
            label.clone(),
            (left + sample + gap, mid_y - text_h as i32 / 2),
            entry_font.clone(),
        ))
        .map_err(draw_err)?;
    }

    Ok(())
}
