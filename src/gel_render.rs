use crate::error::{AdlemanError, Result};
use std::collections::BTreeMap;
use svg::Document;
use svg::node::element::{Group, Line, Rectangle, Text};

const SVG_WIDTH: f32 = 520.0;
const ROW_HEIGHT: f32 = 34.0;
const GEL_LEFT: f32 = 60.0;
const GEL_RIGHT: f32 = SVG_WIDTH - 120.0;
const GEL_TOP: f32 = 70.0;
const LANE_WIDTH: f32 = 64.0;
const FOOTER: f32 = 50.0;

#[derive(Clone, Debug)]
pub struct GelLaneBand {
    pub size: usize,
    pub intensity: f32,
    pub count: usize,
    pub selected: bool,
}

#[derive(Clone, Debug)]
pub struct GelLane {
    pub name: String,
    pub is_ladder: bool,
    pub bands: Vec<GelLaneBand>,
}

/// Lanes of a simulated gel. Band positions are in segment counts.
#[derive(Clone, Debug)]
pub struct GelLayout {
    pub lanes: Vec<GelLane>,
    pub duplex_count: usize,
    pub target_size: Option<usize>,
    pub range_min: usize,
    pub range_max: usize,
}

impl GelLayout {
    /// One row per segment count, longest duplexes at the top.
    pub fn rows(&self) -> usize {
        self.range_max.saturating_sub(self.range_min) + 1
    }

    pub fn y_for_size(&self, size: usize) -> f32 {
        let size = size.clamp(self.range_min, self.range_max);
        let row = self.range_max - size;
        GEL_TOP + (row as f32 + 0.5) * ROW_HEIGHT
    }

    fn gel_bottom(&self) -> f32 {
        GEL_TOP + self.rows() as f32 * ROW_HEIGHT
    }
}

/// One ladder lane with a rung for every segment count up to the largest
/// duplex, and one sample lane from the gel's size histogram.
pub fn build_gel_layout(
    histogram: &BTreeMap<usize, usize>,
    target_size: Option<usize>,
) -> Result<GelLayout> {
    let duplex_count: usize = histogram.values().sum();
    let Some(largest) = histogram.keys().copied().filter(|s| *s > 0).max() else {
        return Err(AdlemanError::EmptyGel);
    };
    let ladder_top = largest.max(target_size.unwrap_or(0));
    let ladder = GelLane {
        name: "Segments".to_string(),
        is_ladder: true,
        bands: (1..=ladder_top)
            .rev()
            .map(|size| GelLaneBand {
                size,
                intensity: 0.6,
                count: 1,
                selected: false,
            })
            .collect(),
    };
    let max_count = histogram.values().copied().max().unwrap_or(1).max(1);
    let sample = GelLane {
        name: format!("Pool (n={duplex_count})"),
        is_ladder: false,
        bands: histogram
            .iter()
            .rev()
            .filter(|(size, count)| **size > 0 && **count > 0)
            .map(|(size, count)| GelLaneBand {
                size: *size,
                intensity: (0.3 + 0.7 * (*count as f32 / max_count as f32)).clamp(0.3, 1.0),
                count: *count,
                selected: Some(*size) == target_size,
            })
            .collect(),
    };

    let range_min = 1;
    let range_max = ladder_top.max(2);
    Ok(GelLayout {
        lanes: vec![ladder, sample],
        duplex_count,
        target_size,
        range_min,
        range_max,
    })
}

fn text(content: String, x: f32, y: f32, font_size: u32) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("font-family", "monospace")
        .set("font-size", font_size)
        .set("fill", "#111827")
}

fn rect(x: f32, y: f32, width: f32, height: f32, radius: f32, fill: &str) -> Rectangle {
    Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", width)
        .set("height", height)
        .set("rx", radius)
        .set("ry", radius)
        .set("fill", fill)
}

/// Grid line and label for one segment count.
fn rung(size: usize, y: f32) -> Group {
    Group::new()
        .add(
            Line::new()
                .set("x1", GEL_LEFT)
                .set("y1", y)
                .set("x2", GEL_RIGHT)
                .set("y2", y)
                .set("stroke", "#2d3238")
                .set("stroke-width", 1),
        )
        .add(text(format!("{size} seg"), GEL_RIGHT + 10.0, y + 4.0, 12))
}

fn band_label(band: &GelLaneBand) -> String {
    match band.count {
        0 | 1 => format!("{} seg", band.size),
        n => format!("{} seg (x{n})", band.size),
    }
}

fn band(layout: &GelLayout, lane: &GelLane, band: &GelLaneBand, x: f32) -> Group {
    let y = layout.y_for_size(band.size);
    let width = LANE_WIDTH * (0.5 + 0.4 * band.intensity);
    let height = if lane.is_ladder { 3.0 } else { 4.0 + 4.0 * band.intensity };
    let fill = match (lane.is_ladder, band.selected) {
        (true, _) => "#e5e7eb",
        (false, true) => "#22c55e",
        (false, false) => "#f59e0b",
    };
    let mut ret = Group::new().add(
        rect(x - width * 0.5, y - height * 0.5, width, height, 2.0, fill)
            .set("opacity", band.intensity.clamp(0.3, 1.0)),
    );
    if !lane.is_ladder {
        ret = ret.add(text(band_label(band), x + LANE_WIDTH * 0.5 + 6.0, y + 4.0, 11));
    }
    ret
}

fn lane(layout: &GelLayout, lane: &GelLane, x: f32) -> Group {
    let bottom = layout.gel_bottom();
    let fill = if lane.is_ladder { "#1a2028" } else { "#1f252e" };
    let mut ret = Group::new()
        .add(rect(
            x - LANE_WIDTH * 0.5,
            GEL_TOP + 4.0,
            LANE_WIDTH,
            bottom - GEL_TOP - 8.0,
            6.0,
            fill,
        ))
        .add(text(lane.name.clone(), x, bottom + 24.0, 13).set("text-anchor", "middle"));
    for b in &lane.bands {
        ret = ret.add(band(layout, lane, b, x));
    }
    ret
}

/// Renders a layout with one grid rung per segment count.
pub fn export_gel_svg(layout: &GelLayout) -> String {
    let height = layout.gel_bottom() + FOOTER;
    let target = layout
        .target_size
        .map(|size| format!(" | target: {size} seg"))
        .unwrap_or_default();
    let title = format!("Gel Preview ({} duplex(es)){target}", layout.duplex_count);

    let mut doc = Document::new()
        .set("viewBox", (0, 0, SVG_WIDTH, height))
        .set("width", SVG_WIDTH)
        .set("height", height)
        .add(rect(0.0, 0.0, SVG_WIDTH, height, 0.0, "#f9fafb"))
        .add(rect(
            GEL_LEFT,
            GEL_TOP,
            GEL_RIGHT - GEL_LEFT,
            layout.gel_bottom() - GEL_TOP,
            10.0,
            "#111315",
        ))
        .add(text(title, GEL_LEFT, 36.0, 16));

    for size in layout.range_min..=layout.range_max {
        doc = doc.add(rung(size, layout.y_for_size(size)));
    }
    let lane_gap = (GEL_RIGHT - GEL_LEFT) / (layout.lanes.len() as f32 + 1.0);
    for (idx, l) in layout.lanes.iter().enumerate() {
        doc = doc.add(lane(layout, l, GEL_LEFT + lane_gap * (idx as f32 + 1.0)));
    }
    doc.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram() -> BTreeMap<usize, usize> {
        BTreeMap::from([(1, 1), (2, 2), (3, 1)])
    }

    #[test]
    fn test_build_gel_layout() {
        let layout = build_gel_layout(&histogram(), Some(3)).unwrap();
        assert_eq!(layout.lanes.len(), 2);
        assert!(layout.lanes[0].is_ladder);
        assert_eq!(layout.lanes[0].bands.len(), 3);
        let sample = &layout.lanes[1];
        assert_eq!(sample.bands.iter().map(|b| b.size).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(sample.bands.iter().filter(|b| b.selected).count(), 1);
        assert_eq!(layout.duplex_count, 4);
        assert!(layout.range_max > layout.range_min);
    }

    #[test]
    fn test_longer_duplexes_stay_higher() {
        let layout = build_gel_layout(&histogram(), None).unwrap();
        let y3 = layout.y_for_size(3);
        let y2 = layout.y_for_size(2);
        let y1 = layout.y_for_size(1);
        assert!(y3 < y2 && y2 < y1);
        assert_eq!(y2 - y3, y1 - y2);
        assert_eq!(layout.rows(), 3);
    }

    #[test]
    fn test_empty_gel_is_an_error() {
        assert!(matches!(
            build_gel_layout(&BTreeMap::new(), Some(3)),
            Err(AdlemanError::EmptyGel)
        ));
    }

    #[test]
    fn test_export_gel_svg() {
        let layout = build_gel_layout(&histogram(), Some(3)).unwrap();
        let svg = export_gel_svg(&layout);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Gel Preview (4 duplex(es)) | target: 3 seg"));
        assert!(svg.contains("2 seg (x2)"));
        assert_eq!(svg.matches("<line").count(), layout.rows());
    }
}
