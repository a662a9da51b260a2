//! Headless turtle interpretation of tree structure strings.
//!
//! The turtle starts at the origin facing up and draws a trunk stroke. Tip
//! symbols draw tip-coloured strokes, other variables draw stem strokes, `[`
//! saves position and heading then turns left, `]` restores them and turns
//! right. Anything else is recorded as an anomaly and skipped.

use std::fmt::Write as _;

use rand::Rng;
use serde::Serialize;
use tracing::warn;

use crate::species::{Palette, SpeciesParams, StrokeLengths};

pub const BRANCH_OPEN: char = '[';
pub const BRANCH_CLOSE: char = ']';

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Trunk,
    Stem,
    Tip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub kind: StrokeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    UnknownSymbol,
    UnbalancedClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub position: usize,
    pub symbol: char,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawing {
    pub segments: Vec<Segment>,
    pub anomalies: Vec<Anomaly>,
    pub palette: Palette,
}

struct Turtle {
    position: Point,
    heading_deg: f64,
}

impl Turtle {
    fn forward(&mut self, distance: f64) -> (Point, Point) {
        let from = self.position;
        let radians = self.heading_deg.to_radians();
        self.position = Point {
            x: from.x + distance * radians.cos(),
            y: from.y + distance * radians.sin(),
        };
        (from, self.position)
    }
}

pub struct TurtleRenderer<'a> {
    params: &'a SpeciesParams,
}

impl<'a> TurtleRenderer<'a> {
    pub fn new(params: &'a SpeciesParams) -> Self {
        Self { params }
    }

    pub fn render<R: Rng + ?Sized>(&self, structure: &str, rng: &mut R) -> Drawing {
        let strokes: StrokeLengths = self.params.strokes;
        let angle = self.params.form_angle_deg;
        let mut turtle = Turtle {
            position: Point { x: 0.0, y: 0.0 },
            heading_deg: 90.0,
        };
        let mut saved: Vec<(Point, f64)> = Vec::new();
        let mut segments = Vec::new();
        let mut anomalies = Vec::new();

        let (from, to) = turtle.forward(strokes.trunk.sample(rng));
        segments.push(Segment {
            from,
            to,
            kind: StrokeKind::Trunk,
        });

        for (position, symbol) in structure.chars().enumerate() {
            if symbol == self.params.branch_symbol {
                let (from, to) = turtle.forward(strokes.tip.sample(rng));
                segments.push(Segment {
                    from,
                    to,
                    kind: StrokeKind::Tip,
                });
            } else if self.params.grammar.is_variable(symbol) {
                let (from, to) = turtle.forward(strokes.stem.sample(rng));
                segments.push(Segment {
                    from,
                    to,
                    kind: StrokeKind::Stem,
                });
            } else if symbol == BRANCH_OPEN {
                saved.push((turtle.position, turtle.heading_deg));
                turtle.heading_deg += angle;
            } else if symbol == BRANCH_CLOSE {
                match saved.pop() {
                    Some((position, heading)) => {
                        turtle.position = position;
                        turtle.heading_deg = heading - angle;
                    }
                    None => {
                        warn!(position, "branch close without a saved position");
                        anomalies.push(Anomaly {
                            position,
                            symbol,
                            kind: AnomalyKind::UnbalancedClose,
                        });
                    }
                }
            } else {
                warn!(position, %symbol, "symbol has no drawing operation");
                anomalies.push(Anomaly {
                    position,
                    symbol,
                    kind: AnomalyKind::UnknownSymbol,
                });
            }
        }

        Drawing {
            segments,
            anomalies,
            palette: self.params.palette.clone(),
        }
    }
}

impl Drawing {
    /// (min, max) corners of the segments' bounding box.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.segments.iter().flat_map(|s| [s.from, s.to]);
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    pub fn to_svg(&self) -> String {
        const MARGIN: f64 = 10.0;
        let (min, max) = self
            .bounds()
            .unwrap_or((Point { x: 0.0, y: 0.0 }, Point { x: 0.0, y: 0.0 }));
        // y grows downwards in SVG
        let view_x = min.x - MARGIN;
        let view_y = -max.y - MARGIN;
        let width = max.x - min.x + 2.0 * MARGIN;
        let height = max.y - min.y + 2.0 * MARGIN;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{view_x:.2} {view_y:.2} {width:.2} {height:.2}">"#
        );
        for segment in &self.segments {
            let color = match segment.kind {
                StrokeKind::Tip => &self.palette.tip,
                StrokeKind::Trunk | StrokeKind::Stem => &self.palette.stem,
            };
            let _ = writeln!(
                svg,
                r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" />"#,
                segment.from.x, -segment.from.y, segment.to.x, -segment.to.y
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}
