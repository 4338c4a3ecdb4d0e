//! Constraint-based layout engine
//!
//! Layout runs in three passes over the parsed diagram:
//!
//! 1. [`compute_lanes`] builds one lane per participant, plus a zero-width
//!    sentinel lane on each end, and assigns provisional x positions.
//! 2. [`layout_elements`] walks the body top to bottom, sizing each element,
//!    registering horizontal spacing demands between lanes and tracking
//!    activation bars as messages open and close them.
//! 3. [`resolve_spacing`] relaxes the demands in a single left-to-right
//!    sweep, nudging lanes right until every demand is satisfied.
//!
//! All spacing demands are center-to-center distances between lanes.

use std::collections::BTreeMap;

use crate::ast::{Diagram, Element, NoteLocation, ParticipantId};
use crate::measure::{Dimensions, TextMeasurer};
use crate::theme::DiagramOptions;

/// Extra vertical drop of a self-message loop with no text
const MIN_SELF_LOOP_DROP: f64 = 10.0;

/// A vertical lane holding one participant (or a sentinel at either end)
#[derive(Debug, Clone)]
pub struct Lane {
    /// Left edge of the header box
    pub x: f64,
    /// Header box size; zero for sentinel lanes
    pub dimensions: Dimensions,
    /// Minimum center-to-center distances to lanes on the right,
    /// keyed by lane index
    spacing: BTreeMap<usize, f64>,
    /// Activation bars on this lane, in open order
    pub activations: Vec<Activation>,
}

impl Lane {
    fn new(x: f64, dimensions: Dimensions) -> Self {
        Self {
            x,
            dimensions,
            spacing: BTreeMap::new(),
            activations: Vec::new(),
        }
    }

    /// Horizontal center of the lane
    pub fn cx(&self) -> f64 {
        self.x + self.dimensions.cx()
    }

    fn open_activations(&self) -> usize {
        self.activations.iter().filter(|a| a.end_y.is_none()).count()
    }
}

/// One activation bar, in body-relative y coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Arrow line that opened the bar
    pub start_y: f64,
    /// Arrow line that closed it; `None` while still open
    pub end_y: Option<f64>,
    /// Nesting depth at open time, 0 for the outermost bar
    pub depth: usize,
}

/// Record a center-to-center spacing demand between two lanes.
///
/// Demands are grow-only: a narrower demand between the same pair is a no-op,
/// so registration order never matters.
pub fn set_spacing(lanes: &mut [Lane], a: usize, b: usize, width: f64) {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    if left == right {
        return;
    }
    let entry = lanes[left].spacing.entry(right).or_insert(0.0);
    if width > *entry {
        *entry = width;
    }
}

/// Lanes with provisional positions, before relaxation
#[derive(Debug)]
pub struct LaneLayout {
    /// Sentinel, one lane per participant, sentinel
    pub lanes: Vec<Lane>,
    /// Tallest header box, used to baseline-align all headers
    pub max_box_height: f64,
}

impl LaneLayout {
    /// Lane index for a participant (offset past the left sentinel)
    pub fn lane_of(&self, id: ParticipantId) -> usize {
        id.0 + 1
    }

    /// Total width spanned by all lanes
    pub fn width(&self) -> f64 {
        self.lanes.last().map_or(0.0, |lane| lane.x)
    }
}

/// Build lanes and assign provisional x positions by stacking header boxes
/// left to right.
pub fn compute_lanes(
    diagram: &Diagram,
    options: &DiagramOptions,
    measurer: &mut dyn TextMeasurer,
) -> LaneLayout {
    let text_box = &options.participants.text_box;
    let outset = 2.0 * (text_box.margin + text_box.padding);

    let mut lanes = Vec::with_capacity(diagram.participants.len() + 2);
    let mut x = 0.0;
    let mut max_box_height = 0.0_f64;

    lanes.push(Lane::new(x, Dimensions::NONE));
    for participant in &diagram.participants {
        let text = measurer.measure(&participant.alias, &text_box.font);
        let mut dims = Dimensions::new(text.width + outset, text.height + outset);
        if participant.kind == crate::ast::ParticipantKind::Actor {
            dims.width += options.participants.icon.width + options.participants.icon.padding_right;
        }
        max_box_height = max_box_height.max(dims.height);
        lanes.push(Lane::new(x, dims));
        x += dims.width;
    }
    lanes.push(Lane::new(x, Dimensions::NONE));

    LaneLayout {
        lanes,
        max_box_height,
    }
}

/// One laid-out body element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox {
    /// Bounding box of the element (text, padding and arrow allowance)
    pub dimensions: Dimensions,
    /// Top edge, body-relative
    pub y: f64,
    /// Arrow line, body-relative; unused for notes
    pub arrow_y: f64,
}

/// Body elements stacked top to bottom
#[derive(Debug)]
pub struct BodyLayout {
    /// One box per diagram element, in source order
    pub boxes: Vec<ElementBox>,
    /// Total body height
    pub height: f64,
}

/// Size each body element, register its spacing demands on the lanes and
/// track activation bars.
pub fn layout_elements(
    diagram: &Diagram,
    layout: &mut LaneLayout,
    options: &DiagramOptions,
    measurer: &mut dyn TextMeasurer,
) -> BodyLayout {
    let msg = &options.messages;
    let note_box = &options.notes.text_box;
    let note_outset = 2.0 * (note_box.margin + note_box.padding);
    let half_bar = options.activations.half_width();

    let mut boxes = Vec::with_capacity(diagram.elements.len());
    let mut y = 0.0;

    for element in &diagram.elements {
        let item = match element {
            Element::Message {
                source,
                target,
                text,
                activates,
                deactivates,
                ..
            } => {
                let text_dims = measurer.measure(text, &msg.font);
                let source_lane = layout.lane_of(*source);
                let target_lane = layout.lane_of(*target);

                let (dims, arrow_y) = if source_lane == target_lane {
                    let mut height = text_dims.height + 2.0 * msg.padding;
                    if text.is_empty() {
                        height += MIN_SELF_LOOP_DROP;
                    }
                    let dims = Dimensions::new(
                        text_dims.width + 2.0 * msg.padding + msg.self_arrow_width,
                        height,
                    );
                    // widen toward the right neighbour, past any open bars
                    let inflation = layout.lanes[source_lane].open_activations() as f64 * half_bar;
                    set_spacing(
                        &mut layout.lanes,
                        source_lane,
                        source_lane + 1,
                        dims.width + inflation,
                    );
                    (dims, y + msg.padding)
                } else {
                    let dims = Dimensions::new(
                        text_dims.width + 2.0 * msg.padding,
                        text_dims.height + 2.0 * msg.padding + msg.arrow_space + msg.arrow_head_height,
                    );
                    let arrow_y = y + msg.padding
                        + text_dims.height
                        + msg.arrow_space
                        + msg.arrow_head_height / 2.0;
                    let inflation = (layout.lanes[source_lane].open_activations()
                        + layout.lanes[target_lane].open_activations())
                        as f64
                        * half_bar;
                    set_spacing(
                        &mut layout.lanes,
                        source_lane,
                        target_lane,
                        dims.width + inflation,
                    );
                    (dims, arrow_y)
                };

                if *activates {
                    let lane = &mut layout.lanes[target_lane];
                    let depth = lane.open_activations();
                    lane.activations.push(Activation {
                        start_y: arrow_y,
                        end_y: None,
                        depth,
                    });
                }
                if *deactivates {
                    let lane = &mut layout.lanes[source_lane];
                    if let Some(open) = lane
                        .activations
                        .iter_mut()
                        .rev()
                        .find(|a| a.end_y.is_none())
                    {
                        open.end_y = Some(arrow_y.max(open.start_y));
                    }
                }

                ElementBox {
                    dimensions: dims,
                    y,
                    arrow_y,
                }
            }
            Element::Note {
                location,
                targets,
                text,
            } => {
                let text_dims = measurer.measure(text, &note_box.font);
                let dims = Dimensions::new(
                    text_dims.width + note_outset,
                    text_dims.height + note_outset,
                );
                let first = layout.lane_of(targets[0]);
                match location {
                    NoteLocation::LeftOf => {
                        set_spacing(&mut layout.lanes, first - 1, first, dims.width);
                    }
                    NoteLocation::RightOf => {
                        set_spacing(&mut layout.lanes, first, first + 1, dims.width);
                    }
                    NoteLocation::Over if targets.len() == 2 => {
                        let second = layout.lane_of(targets[1]);
                        let width = (dims.width - 2.0 * options.notes.overlap).max(0.0);
                        set_spacing(&mut layout.lanes, first, second, width);
                    }
                    NoteLocation::Over => {
                        let half = dims.width / 2.0;
                        set_spacing(&mut layout.lanes, first - 1, first, half);
                        set_spacing(&mut layout.lanes, first, first + 1, half);
                    }
                }
                ElementBox {
                    dimensions: dims,
                    y,
                    arrow_y: y,
                }
            }
        };

        y += item.dimensions.height;
        boxes.push(item);
    }

    // bars still open at the bottom run to the end of the body
    for lane in &mut layout.lanes {
        for activation in &mut lane.activations {
            if activation.end_y.is_none() {
                activation.end_y = Some(y.max(activation.start_y));
            }
        }
    }

    BodyLayout { boxes, height: y }
}

/// Relax spacing demands in one left-to-right sweep.
///
/// For each unsatisfied demand, the target lane and every lane to its right
/// are nudged rightward. Moving a suffix of lanes can only widen gaps already
/// visited, so one sweep satisfies every demand and a second sweep is a
/// no-op.
pub fn resolve_spacing(lanes: &mut [Lane]) {
    for a in 0..lanes.len() {
        let demands: Vec<(usize, f64)> =
            lanes[a].spacing.iter().map(|(&b, &w)| (b, w)).collect();
        for (b, width) in demands {
            let diff = width - (lanes[b].cx() - lanes[a].cx());
            if diff > 0.0 {
                for lane in &mut lanes[b..] {
                    lane.x += diff;
                }
            }
        }
    }
}

/// A fully laid-out diagram, ready to paint
#[derive(Debug)]
pub struct DiagramLayout {
    pub lanes: LaneLayout,
    pub body: BodyLayout,
    /// Measured title size, if the diagram has a title
    pub title: Option<Dimensions>,
    /// Canvas size
    pub width: f64,
    pub height: f64,
}

impl DiagramLayout {
    /// Vertical space taken by the title block, including its bottom padding
    pub fn title_height(&self, options: &DiagramOptions) -> f64 {
        self.title
            .map_or(0.0, |dims| dims.height + options.title.padding_bottom)
    }

    /// Top edge of the header boxes
    pub fn header_top(&self, options: &DiagramOptions) -> f64 {
        options.padding + self.title_height(options)
    }

    /// Top edge of the body (and of the y=0 body coordinate)
    pub fn body_top(&self, options: &DiagramOptions) -> f64 {
        self.header_top(options) + self.lanes.max_box_height
    }
}

/// Run the full layout pipeline
pub fn layout(
    diagram: &Diagram,
    options: &DiagramOptions,
    measurer: &mut dyn TextMeasurer,
) -> DiagramLayout {
    let mut lanes = compute_lanes(diagram, options, measurer);
    let body = layout_elements(diagram, &mut lanes, options, measurer);
    resolve_spacing(&mut lanes.lanes);

    let title = diagram
        .title
        .as_deref()
        .map(|text| measurer.measure(text, &options.title.font));

    let title_height = title.map_or(0.0, |dims| dims.height + options.title.padding_bottom);
    let width = title
        .map_or(0.0, |dims| dims.width)
        .max(lanes.width())
        + 2.0 * options.padding;
    let height =
        2.0 * options.padding + title_height + 2.0 * lanes.max_box_height + body.height;

    DiagramLayout {
        lanes,
        body,
        title,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::measure::HeuristicMeasurer;
    use crate::parser::parse;

    fn laid_out(source: &str) -> (DiagramLayout, DiagramOptions) {
        let diagram = parse(source).unwrap();
        let options = DiagramOptions::default();
        let layout = layout(&diagram, &options, &mut HeuristicMeasurer);
        (layout, options)
    }

    #[test]
    fn spacing_demands_are_grow_only() {
        let mut lanes = vec![
            Lane::new(0.0, Dimensions::NONE),
            Lane::new(0.0, Dimensions::new(50.0, 20.0)),
            Lane::new(50.0, Dimensions::new(50.0, 20.0)),
            Lane::new(100.0, Dimensions::NONE),
        ];
        set_spacing(&mut lanes, 1, 2, 80.0);
        set_spacing(&mut lanes, 2, 1, 60.0); // narrower and reversed, must not shrink
        assert_eq!(lanes[1].spacing.get(&2), Some(&80.0));
        set_spacing(&mut lanes, 1, 1, 999.0); // same lane, ignored
        assert!(lanes[1].spacing.get(&1).is_none());
    }

    #[test]
    fn sentinel_lanes_have_no_size() {
        let (layout, _) = laid_out("ll: a\nll: b");
        let lanes = &layout.lanes.lanes;
        assert_eq!(lanes.len(), 4);
        assert_eq!(lanes[0].dimensions, Dimensions::NONE);
        assert_eq!(lanes[3].dimensions, Dimensions::NONE);
        assert!(lanes[1].dimensions.width > 0.0);
    }

    #[test]
    fn resolve_satisfies_every_demand() {
        let (layout, _) = laid_out(
            "ll: a\nll: b\nll: c\n\
             a -> c: a rather long message that forces the lanes apart\n\
             a -> b: short\n\
             note over b: and a note",
        );
        let lanes = &layout.lanes.lanes;
        for a in 0..lanes.len() {
            for (&b, &width) in &lanes[a].spacing {
                let gap = lanes[b].cx() - lanes[a].cx();
                assert!(
                    gap + 1e-9 >= width,
                    "demand {a}->{b} wants {width}, gap is {gap}"
                );
            }
        }
    }

    #[test]
    fn resolve_is_idempotent() {
        let (mut layout, _) = laid_out(
            "a -> b: first\nb -> c: second\nnote over a, c: a spanning note with some text",
        );
        let before: Vec<f64> = layout.lanes.lanes.iter().map(|l| l.x).collect();
        resolve_spacing(&mut layout.lanes.lanes);
        let after: Vec<f64> = layout.lanes.lanes.iter().map(|l| l.x).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn lanes_stay_ordered() {
        let (layout, _) = laid_out(
            "note left of a: pushed from the left\n\
             a -> b: hello\n\
             note right of b: pushed from the right",
        );
        let centers: Vec<f64> = layout.lanes.lanes.iter().map(Lane::cx).collect();
        for pair in centers.windows(2) {
            assert!(pair[0] <= pair[1], "lanes out of order: {centers:?}");
        }
    }

    #[test]
    fn activations_open_and_close_on_arrows() {
        let (layout, _) = laid_out("a ->+ b: call\nb -->- a: return");
        let target = &layout.lanes.lanes[2];
        assert_eq!(target.activations.len(), 1);
        let bar = &target.activations[0];
        assert_eq!(bar.depth, 0);
        let end = bar.end_y.unwrap();
        assert!(end > bar.start_y);
        // both arrows land inside the body
        assert!(end <= layout.body.height);
    }

    #[test]
    fn nested_activations_stack_by_depth() {
        let (layout, _) = laid_out("a ->+ b: outer\na ->+ b: inner\nb -->- a: x\nb -->- a: y");
        let bars = &layout.lanes.lanes[2].activations;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].depth, 0);
        assert_eq!(bars[1].depth, 1);
        // most recent bar closes first
        assert!(bars[1].end_y.unwrap() <= bars[0].end_y.unwrap());
    }

    #[test]
    fn unclosed_activation_runs_to_body_end() {
        let (layout, _) = laid_out("a ->+ b: call\na -> b: more");
        let bar = &layout.lanes.lanes[2].activations[0];
        assert_eq!(bar.end_y, Some(layout.body.height));
    }

    #[test]
    fn deactivate_without_open_bar_is_ignored() {
        let (layout, _) = laid_out("a ->- b: stray");
        for lane in &layout.lanes.lanes {
            assert!(lane.activations.is_empty());
        }
    }

    #[test]
    fn self_message_demands_room_on_the_right() {
        let (layout, options) = laid_out("ll: a\nll: b\na -> a: think");
        let a = &layout.lanes.lanes[1];
        let b = &layout.lanes.lanes[2];
        assert!(b.cx() - a.cx() >= options.messages.self_arrow_width);
    }

    #[test]
    fn empty_self_message_keeps_a_minimum_drop() {
        let (layout, options) = laid_out("a -> a");
        let height = layout.body.boxes[0].dimensions.height;
        assert_eq!(height, 2.0 * options.messages.padding + MIN_SELF_LOOP_DROP);
    }

    #[test]
    fn note_over_two_subtracts_overlap() {
        let (layout, options) = laid_out("ll: a\nll: b\nnote over a, b: tiny");
        // a tiny note narrower than twice the overlap demands nothing
        let demand = layout.lanes.lanes[1].spacing.get(&2).copied().unwrap_or(0.0);
        let note_width = layout.body.boxes[0].dimensions.width;
        assert_eq!(demand, (note_width - 2.0 * options.notes.overlap).max(0.0));
    }

    #[test]
    fn elements_stack_without_overlap() {
        let (layout, _) = laid_out("a -> b: one\nnote over a: two\nb -> a: three");
        let boxes = &layout.body.boxes;
        for pair in boxes.windows(2) {
            assert!(pair[1].y >= pair[0].y + pair[0].dimensions.height - 1e-9);
        }
        let last = boxes.last().unwrap();
        assert_eq!(layout.body.height, last.y + last.dimensions.height);
    }

    #[test]
    fn canvas_encloses_title_and_lanes() {
        let (layout, options) = laid_out("title: A very long diagram title indeed\na -> b: hi");
        let title = layout.title.unwrap();
        assert!(layout.width >= title.width + 2.0 * options.padding);
        assert!(layout.width >= layout.lanes.width() + 2.0 * options.padding);
        assert_eq!(
            layout.height,
            2.0 * options.padding
                + title.height
                + options.title.padding_bottom
                + 2.0 * layout.lanes.max_box_height
                + layout.body.height
        );
    }

    #[test]
    fn empty_diagram_lays_out() {
        let (layout, options) = laid_out("");
        assert_eq!(layout.lanes.lanes.len(), 2);
        assert_eq!(layout.body.height, 0.0);
        assert_eq!(layout.height, 2.0 * options.padding);
    }
}
