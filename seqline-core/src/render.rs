//! Painting a laid-out diagram
//!
//! Rendering is split from geometry: the layout engine produces positions,
//! and a [`Surface`] turns drawing calls into output. [`SvgSurface`] is the
//! built-in backend; hosts can paint onto anything else by implementing the
//! trait.

use std::fmt::Write as _;

use crate::ast::{ArrowHead, Diagram, Element, LineKind, NoteLocation, ParticipantKind};
use crate::layout::{layout, DiagramLayout};
use crate::measure::{HeuristicMeasurer, MemoMeasurer, TextMeasurer};
use crate::parser::{parse, ParseError};
use crate::theme::{Align, DiagramOptions, FontOptions, LineOptions, StrokeOptions};

/// Filled or open arrowhead at the end of a polyline
#[derive(Debug, Clone, Copy)]
pub struct Head {
    pub kind: ArrowHead,
    /// Head height; the head extends back along the line by the same amount
    pub size: f64,
}

/// Style for a rectangle
#[derive(Debug, Clone, Copy)]
pub struct RectStyle<'a> {
    pub fill: &'a str,
    pub stroke: &'a StrokeOptions,
    pub rounding: f64,
}

/// Drawing backend. Coordinates are absolute canvas coordinates; text y is
/// the baseline of the first line.
pub trait Surface {
    /// Start a canvas of the given size, optionally filled
    fn clear(&mut self, width: f64, height: f64, background: Option<&str>);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &RectStyle);
    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, stroke: &StrokeOptions);
    /// Stroke a polyline, optionally finishing with an arrowhead pointed
    /// along the last segment
    fn polyline(&mut self, points: &[(f64, f64)], line: &LineOptions, head: Option<Head>);
    fn text(&mut self, x: f64, y: f64, text: &str, font: &FontOptions, align: Align);
}

/// Render a diagram source string to SVG with the default theme
pub fn render(source: &str) -> Result<String, ParseError> {
    render_with_options(source, &DiagramOptions::default_theme())
}

/// Render a diagram source string to SVG with explicit options
pub fn render_with_options(source: &str, options: &DiagramOptions) -> Result<String, ParseError> {
    let diagram = parse(source)?;
    let mut measurer = MemoMeasurer::new(HeuristicMeasurer);
    let mut surface = SvgSurface::new();
    render_to(&diagram, options, &mut measurer, &mut surface);
    Ok(surface.finish())
}

/// Lay out a parsed diagram and paint it onto a surface
pub fn render_to(
    diagram: &Diagram,
    options: &DiagramOptions,
    measurer: &mut dyn TextMeasurer,
    surface: &mut dyn Surface,
) {
    let laid = layout(diagram, options, measurer);
    Painter {
        diagram,
        options,
        layout: &laid,
        origin_x: options.padding,
    }
    .paint(surface);
}

struct Painter<'a> {
    diagram: &'a Diagram,
    options: &'a DiagramOptions,
    layout: &'a DiagramLayout,
    origin_x: f64,
}

impl Painter<'_> {
    fn paint(&self, surface: &mut dyn Surface) {
        surface.clear(
            self.layout.width,
            self.layout.height,
            self.options.background.as_deref(),
        );
        self.paint_title(surface);
        self.paint_participants(surface);
        self.paint_activations(surface);
        self.paint_elements(surface);
    }

    /// Absolute x of a participant lane's center
    fn lane_cx(&self, lane: usize) -> f64 {
        self.origin_x + self.layout.lanes.lanes[lane].cx()
    }

    fn body_top(&self) -> f64 {
        self.layout.body_top(self.options)
    }

    fn paint_title(&self, surface: &mut dyn Surface) {
        let Some(title) = self.diagram.title.as_deref() else {
            return;
        };
        let opts = &self.options.title;
        let x = match opts.align {
            Align::Left => self.options.padding,
            Align::Middle => self.layout.width / 2.0,
            Align::Right => self.layout.width - self.options.padding,
        };
        draw_text_block(surface, x, self.options.padding, title, &opts.font, opts.align);
    }

    /// Header boxes above and below the body, with the lifeline between them
    fn paint_participants(&self, surface: &mut dyn Surface) {
        let opts = &self.options.participants;
        let header_top = self.layout.header_top(self.options);
        let body_top = self.body_top();
        let body_bottom = body_top + self.layout.body.height;

        for (index, participant) in self.diagram.participants.iter().enumerate() {
            let lane = &self.layout.lanes.lanes[index + 1];
            let cx = self.origin_x + lane.cx();

            surface.polyline(
                &[(cx, body_top), (cx, body_bottom)],
                &opts.lifeline,
                None,
            );

            // boxes bottom-align on the tallest header
            let top_y =
                header_top + self.layout.lanes.max_box_height - lane.dimensions.height;
            self.paint_header_box(surface, participant.kind, &participant.alias, lane, top_y);
            self.paint_header_box(surface, participant.kind, &participant.alias, lane, body_bottom);
        }
    }

    fn paint_header_box(
        &self,
        surface: &mut dyn Surface,
        kind: ParticipantKind,
        alias: &str,
        lane: &crate::layout::Lane,
        top_y: f64,
    ) {
        let opts = &self.options.participants;
        let text_box = &opts.text_box;
        let x = self.origin_x + lane.x + text_box.margin;
        let y = top_y + text_box.margin;
        let width = lane.dimensions.width - 2.0 * text_box.margin;
        let height = lane.dimensions.height - 2.0 * text_box.margin;

        surface.rect(
            x,
            y,
            width,
            height,
            &RectStyle {
                fill: &text_box.fill,
                stroke: &text_box.stroke,
                rounding: text_box.rounding,
            },
        );

        let mut text_cx = x + width / 2.0;
        if kind == ParticipantKind::Actor {
            let icon = &opts.icon;
            self.paint_actor_icon(
                surface,
                x + text_box.padding,
                y + (height - icon.height) / 2.0,
            );
            text_cx += (icon.width + icon.padding_right) / 2.0;
        }
        draw_text_block(
            surface,
            text_cx,
            y + text_box.padding,
            alias,
            &text_box.font,
            Align::Middle,
        );
    }

    /// Small stick figure, drawn inside the icon allowance
    fn paint_actor_icon(&self, surface: &mut dyn Surface, x: f64, y: f64) {
        let icon = &self.options.participants.icon;
        let stroke = &self.options.participants.text_box.stroke;
        let line = LineOptions {
            color: stroke.color.clone(),
            width: stroke.width,
            dash: None,
        };
        let cx = x + icon.width / 2.0;
        let head_r = icon.height * 0.2;

        surface.circle(cx, y + head_r, head_r, "none", stroke);
        let neck = y + 2.0 * head_r;
        let hip = y + icon.height * 0.65;
        let foot = y + icon.height;
        surface.polyline(&[(cx, neck), (cx, hip)], &line, None);
        surface.polyline(
            &[(x, y + icon.height * 0.45), (x + icon.width, y + icon.height * 0.45)],
            &line,
            None,
        );
        surface.polyline(&[(x, foot), (cx, hip), (x + icon.width, foot)], &line, None);
    }

    fn paint_activations(&self, surface: &mut dyn Surface) {
        let opts = &self.options.activations;
        let half = opts.half_width();
        let body_top = self.body_top();

        for lane in &self.layout.lanes.lanes {
            let cx = self.origin_x + lane.cx();
            for bar in &lane.activations {
                let end_y = bar.end_y.unwrap_or(self.layout.body.height);
                surface.rect(
                    cx - half + bar.depth as f64 * half,
                    body_top + bar.start_y,
                    opts.width,
                    (end_y - bar.start_y).max(1.0),
                    &RectStyle {
                        fill: &opts.fill,
                        stroke: &opts.stroke,
                        rounding: 0.0,
                    },
                );
            }
        }
    }

    fn paint_elements(&self, surface: &mut dyn Surface) {
        for (element, item) in self.diagram.elements.iter().zip(&self.layout.body.boxes) {
            match element {
                Element::Message {
                    source,
                    target,
                    text,
                    arrow,
                    ..
                } => {
                    let s = self.layout.lanes.lane_of(*source);
                    let t = self.layout.lanes.lane_of(*target);
                    if s == t {
                        self.paint_self_message(surface, s, text, arrow, item);
                    } else {
                        self.paint_message(surface, s, t, text, arrow, item);
                    }
                }
                Element::Note {
                    location,
                    targets,
                    text,
                } => self.paint_note(surface, *location, targets, text, item),
            }
        }
    }

    fn arrow_line(&self, kind: LineKind) -> LineOptions {
        let mut line = self.options.messages.arrow.clone();
        line.dash = match kind {
            LineKind::Solid => None,
            LineKind::Dashed => line.dash.or_else(|| Some("4".to_string())),
        };
        line
    }

    fn paint_message(
        &self,
        surface: &mut dyn Surface,
        source_lane: usize,
        target_lane: usize,
        text: &str,
        arrow: &crate::ast::Arrow,
        item: &crate::layout::ElementBox,
    ) {
        let msg = &self.options.messages;
        let sx = self.lane_cx(source_lane);
        let tx = self.lane_cx(target_lane);
        let y = self.body_top() + item.arrow_y;

        surface.polyline(
            &[(sx, y), (tx, y)],
            &self.arrow_line(arrow.line),
            Some(Head {
                kind: arrow.head,
                size: msg.arrow_head_height,
            }),
        );

        if !text.is_empty() {
            let mid = (sx + tx) / 2.0;
            let top = self.body_top() + item.y + msg.padding;
            draw_text_block(surface, mid, top, text, &msg.font, Align::Middle);
        }
    }

    fn paint_self_message(
        &self,
        surface: &mut dyn Surface,
        lane: usize,
        text: &str,
        arrow: &crate::ast::Arrow,
        item: &crate::layout::ElementBox,
    ) {
        let msg = &self.options.messages;
        let cx = self.lane_cx(lane);
        let reach = cx + msg.self_arrow_width;
        let top = self.body_top() + item.arrow_y;
        let bottom = self.body_top() + item.y + item.dimensions.height - msg.padding;

        surface.polyline(
            &[(cx, top), (reach, top), (reach, bottom), (cx, bottom)],
            &self.arrow_line(arrow.line),
            Some(Head {
                kind: arrow.head,
                size: msg.arrow_head_height,
            }),
        );

        if !text.is_empty() {
            draw_text_block(
                surface,
                reach + msg.padding,
                self.body_top() + item.y + msg.padding,
                text,
                &msg.font,
                Align::Left,
            );
        }
    }

    fn paint_note(
        &self,
        surface: &mut dyn Surface,
        location: NoteLocation,
        targets: &[crate::ast::ParticipantId],
        text: &str,
        item: &crate::layout::ElementBox,
    ) {
        let opts = &self.options.notes;
        let text_box = &opts.text_box;
        let first_cx = self.lane_cx(self.layout.lanes.lane_of(targets[0]));

        let (x, width) = match location {
            NoteLocation::LeftOf => (first_cx - item.dimensions.width, item.dimensions.width),
            NoteLocation::RightOf => (first_cx, item.dimensions.width),
            NoteLocation::Over if targets.len() == 2 => {
                let second_cx = self.lane_cx(self.layout.lanes.lane_of(targets[1]));
                let span = second_cx - first_cx + 2.0 * opts.overlap;
                (first_cx - opts.overlap, span.max(item.dimensions.width))
            }
            NoteLocation::Over => (
                first_cx - item.dimensions.width / 2.0,
                item.dimensions.width,
            ),
        };

        let x = x + text_box.margin;
        let y = self.body_top() + item.y + text_box.margin;
        let width = width - 2.0 * text_box.margin;
        let height = item.dimensions.height - 2.0 * text_box.margin;

        surface.rect(
            x,
            y,
            width,
            height,
            &RectStyle {
                fill: &text_box.fill,
                stroke: &text_box.stroke,
                rounding: text_box.rounding,
            },
        );
        draw_text_block(
            surface,
            x + width / 2.0,
            y + text_box.padding,
            text,
            &text_box.font,
            Align::Middle,
        );
    }
}

/// Draw a (possibly multi-line) text block whose top edge is `top`.
///
/// Line height mirrors the heuristic measurer so painted text fits the
/// measured box.
fn draw_text_block(
    surface: &mut dyn Surface,
    x: f64,
    top: f64,
    text: &str,
    font: &FontOptions,
    align: Align,
) {
    let line_height = font.size + 4.0;
    for (i, line) in text.lines().enumerate() {
        // baseline sits a descender's worth above the line box bottom
        let baseline = top + (i + 1) as f64 * line_height - 3.0;
        surface.text(x, baseline, line, font, align);
    }
}

/// SVG backend, writing elements into a string buffer
#[derive(Debug, Default)]
pub struct SvgSurface {
    buffer: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the document and return the SVG text
    pub fn finish(mut self) -> String {
        self.buffer.push_str("</svg>\n");
        self.buffer
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn dash_attr(line: &LineOptions) -> String {
    match &line.dash {
        Some(dash) => format!(" stroke-dasharray=\"{dash}\""),
        None => String::new(),
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64, background: Option<&str>) {
        self.buffer.clear();
        let _ = writeln!(
            self.buffer,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        );
        if let Some(fill) = background {
            let _ = writeln!(
                self.buffer,
                "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{fill}\"/>"
            );
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &RectStyle) {
        let _ = writeln!(
            self.buffer,
            "  <rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" rx=\"{rx}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{sw}\"/>",
            rx = style.rounding,
            fill = style.fill,
            stroke = style.stroke.color,
            sw = style.stroke.width,
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, stroke: &StrokeOptions) {
        let _ = writeln!(
            self.buffer,
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{sw}\"/>",
            stroke = stroke.color,
            sw = stroke.width,
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], line: &LineOptions, head: Option<Head>) {
        if points.len() < 2 {
            return;
        }
        let path: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
        let _ = writeln!(
            self.buffer,
            "  <polyline points=\"{points}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{sw}\"{dash}/>",
            points = path.join(" "),
            stroke = line.color,
            sw = line.width,
            dash = dash_attr(line),
        );
        if let Some(head) = head {
            self.arrow_head(points, line, head);
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, font: &FontOptions, align: Align) {
        let anchor = match align {
            Align::Left => "start",
            Align::Middle => "middle",
            Align::Right => "end",
        };
        let _ = writeln!(
            self.buffer,
            "  <text x=\"{x}\" y=\"{y}\" font-family=\"{family}\" font-size=\"{size}\" font-weight=\"{weight}\" fill=\"{color}\" text-anchor=\"{anchor}\">{text}</text>",
            family = font.family,
            size = font.size,
            weight = font.weight,
            color = font.color,
            text = escape_xml(text),
        );
    }
}

impl SvgSurface {
    /// Arrowhead at the last point, oriented along the final segment
    fn arrow_head(&mut self, points: &[(f64, f64)], line: &LineOptions, head: Head) {
        let (tip_x, tip_y) = points[points.len() - 1];
        let (prev_x, prev_y) = points[points.len() - 2];
        let len = ((tip_x - prev_x).powi(2) + (tip_y - prev_y).powi(2)).sqrt();
        if len == 0.0 {
            return;
        }
        let (ux, uy) = ((tip_x - prev_x) / len, (tip_y - prev_y) / len);
        // perpendicular unit vector
        let (px, py) = (-uy, ux);
        let back_x = tip_x - ux * head.size;
        let back_y = tip_y - uy * head.size;
        let half = head.size / 2.0;
        let (ax, ay) = (back_x + px * half, back_y + py * half);
        let (bx, by) = (back_x - px * half, back_y - py * half);

        match head.kind {
            ArrowHead::Closed => {
                let _ = writeln!(
                    self.buffer,
                    "  <polygon points=\"{tip_x},{tip_y} {ax},{ay} {bx},{by}\" fill=\"{fill}\"/>",
                    fill = line.color,
                );
            }
            ArrowHead::Open => {
                let _ = writeln!(
                    self.buffer,
                    "  <polyline points=\"{ax},{ay} {tip_x},{tip_y} {bx},{by}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{sw}\"/>",
                    stroke = line.color,
                    sw = line.width,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_well_formed_svg() {
        let svg = render("title: Demo\nactor: user\nuser -> api: GET /things\napi --> user: 200").unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<svg ").count(), 1);
    }

    #[test]
    fn message_text_appears_escaped() {
        let svg = render("a -> b: x < y & \"z\"").unwrap();
        assert!(svg.contains("x &lt; y &amp; &quot;z&quot;"));
        assert!(!svg.contains("x < y"));
    }

    #[test]
    fn each_participant_gets_two_header_boxes() {
        let svg = render("ll: a as Alpha\nll: b as Beta").unwrap();
        assert_eq!(svg.matches(">Alpha</text>").count(), 2);
        assert_eq!(svg.matches(">Beta</text>").count(), 2);
    }

    #[test]
    fn dashed_arrows_carry_a_dash_pattern() {
        let solid = render("a -> b: hi").unwrap();
        let dashed = render("a --> b: hi").unwrap();
        let dashes_in = |svg: &str| {
            svg.lines()
                .filter(|l| l.contains("<polyline") && l.contains("stroke-dasharray"))
                .count()
        };
        assert!(dashes_in(&dashed) > dashes_in(&solid));
    }

    #[test]
    fn open_head_draws_no_polygon_for_the_arrow() {
        let closed = render("a -> b: hi").unwrap();
        let open = render("a ->> b: hi").unwrap();
        assert!(closed.contains("<polygon"));
        assert!(!open.contains("<polygon"));
    }

    #[test]
    fn activation_bars_are_painted() {
        let plain = render("a -> b: hi").unwrap();
        let activated = render("a ->+ b: hi\nb -->- a: ok").unwrap();
        let options = DiagramOptions::default_theme();
        let bar_fill = format!("fill=\"{}\"", options.activations.fill);
        assert!(!plain.contains(&bar_fill));
        assert!(activated.contains(&bar_fill));
    }

    #[test]
    fn background_is_only_painted_when_set() {
        let plain = render_with_options("a -> b: hi", &DiagramOptions::default_theme()).unwrap();
        let themed = render_with_options("a -> b: hi", &DiagramOptions::midnight()).unwrap();
        assert!(!plain.contains("fill=\"#14141c\""));
        assert!(themed.contains("fill=\"#14141c\""));
    }

    #[test]
    fn empty_input_still_renders_a_canvas() {
        let svg = render("").unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("width=\"40\""));
    }

    #[test]
    fn syntax_errors_propagate() {
        assert!(render("???").is_err());
    }
}
