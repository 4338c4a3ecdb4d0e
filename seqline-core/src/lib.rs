//! Sequence diagrams from a small text notation.
//!
//! The pipeline has three stages: [`parse`] turns source text into a
//! [`Diagram`], the layout engine positions lanes and elements by relaxing
//! spacing constraints, and the render pass paints the result onto a
//! [`Surface`] (SVG by default).
//!
//! ```
//! let svg = seqline_core::render(
//!     "title: Checkout\n\
//!      actor: user\n\
//!      user ->+ cart: add item\n\
//!      cart -->- user: updated",
//! )
//! .unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! Themes and individual knobs are exposed through [`DiagramOptions`]:
//!
//! ```
//! use seqline_core::DiagramOptions;
//!
//! let options = DiagramOptions::by_name("midnight").unwrap();
//! let svg = seqline_core::render_with_options("a -> b: hello", &options).unwrap();
//! # assert!(svg.contains("svg"));
//! ```

pub mod ast;
pub mod layout;
pub mod measure;
pub mod parser;
pub mod render;
pub mod theme;

pub use ast::{Arrow, ArrowHead, Diagram, Element, LineKind, NoteLocation, Participant, ParticipantId, ParticipantKind};
pub use measure::{Dimensions, HeuristicMeasurer, MemoMeasurer, TextMeasurer};
pub use parser::{parse, ParseError};
pub use render::{render, render_to, render_with_options, Surface, SvgSurface};
pub use theme::{DiagramOptions, FontOptions, Overrides};
