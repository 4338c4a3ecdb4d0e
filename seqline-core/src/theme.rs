//! Theme and layout options
//!
//! Configuration is resolved in one explicit layer: a defaults struct
//! overlaid field-by-field by a caller-supplied [`Overrides`] patch. There is
//! no dynamic merging; every knob is a typed field.

const DEFAULT_COLOUR: &str = "#000";
const DEFAULT_CONTRAST_COLOUR: &str = "#fff";

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Middle,
    Right,
}

/// Font attributes handed to the measurement oracle and the surface
#[derive(Debug, Clone, PartialEq)]
pub struct FontOptions {
    pub family: String,
    pub size: f64,
    pub weight: String,
    pub color: String,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            family: "Courier New".to_string(),
            size: 12.0,
            weight: "normal".to_string(),
            color: DEFAULT_COLOUR.to_string(),
        }
    }
}

/// Stroke colour and width
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeOptions {
    pub color: String,
    pub width: f64,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOUR.to_string(),
            width: 1.0,
        }
    }
}

/// A stroked line, optionally dashed
#[derive(Debug, Clone, PartialEq)]
pub struct LineOptions {
    pub color: String,
    pub width: f64,
    /// SVG dash pattern; `None` draws solid
    pub dash: Option<String>,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOUR.to_string(),
            width: 1.0,
            dash: None,
        }
    }
}

/// Box around a piece of text (participant headers, notes)
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxOptions {
    pub fill: String,
    pub stroke: StrokeOptions,
    /// Outside the border
    pub margin: f64,
    /// Between border and text
    pub padding: f64,
    pub rounding: f64,
    pub font: FontOptions,
    pub align: Align,
}

impl Default for TextBoxOptions {
    fn default() -> Self {
        Self {
            fill: DEFAULT_CONTRAST_COLOUR.to_string(),
            stroke: StrokeOptions::default(),
            margin: 5.0,
            padding: 6.0,
            rounding: 7.0,
            font: FontOptions::default(),
            align: Align::Middle,
        }
    }
}

/// Actor icon allowance inside the header box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconOptions {
    pub width: f64,
    pub height: f64,
    pub padding_right: f64,
}

impl Default for IconOptions {
    fn default() -> Self {
        Self {
            width: 15.0,
            height: 15.0,
            padding_right: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleOptions {
    pub font: FontOptions,
    pub align: Align,
    pub padding_bottom: f64,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            font: FontOptions {
                size: 18.0,
                ..FontOptions::default()
            },
            align: Align::Middle,
            padding_bottom: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticipantOptions {
    pub text_box: TextBoxOptions,
    pub lifeline: LineOptions,
    pub icon: IconOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageOptions {
    pub font: FontOptions,
    pub arrow: LineOptions,
    /// Around the text and the arrow
    pub padding: f64,
    /// Between text baseline and arrow line
    pub arrow_space: f64,
    pub arrow_head_height: f64,
    /// Horizontal reach of a self-message loop
    pub self_arrow_width: f64,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            font: FontOptions::default(),
            arrow: LineOptions::default(),
            padding: 5.0,
            arrow_space: 5.0,
            arrow_head_height: 8.0,
            self_arrow_width: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteOptions {
    pub text_box: TextBoxOptions,
    /// How far a two-lane note creeps past each anchor lane
    pub overlap: f64,
}

impl Default for NoteOptions {
    fn default() -> Self {
        Self {
            text_box: TextBoxOptions {
                fill: "#feffeb".to_string(),
                rounding: 0.0,
                ..TextBoxOptions::default()
            },
            overlap: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationOptions {
    pub width: f64,
    pub fill: String,
    pub stroke: StrokeOptions,
}

impl Default for ActivationOptions {
    fn default() -> Self {
        Self {
            width: 9.0,
            fill: "#AFECFD".to_string(),
            stroke: StrokeOptions::default(),
        }
    }
}

impl ActivationOptions {
    /// Half the bar width, the unit by which nested bars fan out
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }
}

/// Fully resolved rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramOptions {
    /// Uniform outer padding around the whole canvas
    pub padding: f64,
    pub title: TitleOptions,
    pub participants: ParticipantOptions,
    pub messages: MessageOptions,
    pub notes: NoteOptions,
    pub activations: ActivationOptions,
    /// Background fill colour; `None` leaves the canvas transparent
    pub background: Option<String>,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            padding: 20.0,
            title: TitleOptions::default(),
            participants: ParticipantOptions::default(),
            messages: MessageOptions::default(),
            notes: NoteOptions::default(),
            activations: ActivationOptions::default(),
            background: None,
        }
    }
}

/// Caller-side patch over [`DiagramOptions`]. Unset fields keep defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub padding: Option<f64>,
    pub background: Option<String>,
    pub default_font: Option<FontOptions>,
    pub title_align: Option<Align>,
    pub title_font: Option<FontOptions>,
    pub participant_fill: Option<String>,
    pub lifeline: Option<LineOptions>,
    pub message_font: Option<FontOptions>,
    pub note_fill: Option<String>,
    pub note_overlap: Option<f64>,
    pub activation_fill: Option<String>,
    pub activation_width: Option<f64>,
}

impl DiagramOptions {
    /// Overlay a patch on top of these options, field by field
    pub fn resolve(mut self, overrides: &Overrides) -> Self {
        if let Some(padding) = overrides.padding {
            self.padding = padding;
        }
        if overrides.background.is_some() {
            self.background = overrides.background.clone();
        }
        if let Some(font) = &overrides.default_font {
            self.participants.text_box.font = font.clone();
            self.notes.text_box.font = font.clone();
            self.messages.font = font.clone();
            self.title.font = FontOptions {
                size: self.title.font.size,
                ..font.clone()
            };
        }
        if let Some(align) = overrides.title_align {
            self.title.align = align;
        }
        if let Some(font) = &overrides.title_font {
            self.title.font = font.clone();
        }
        if let Some(fill) = &overrides.participant_fill {
            self.participants.text_box.fill = fill.clone();
        }
        if let Some(line) = &overrides.lifeline {
            self.participants.lifeline = line.clone();
        }
        if let Some(font) = &overrides.message_font {
            self.messages.font = font.clone();
        }
        if let Some(fill) = &overrides.note_fill {
            self.notes.text_box.fill = fill.clone();
        }
        if let Some(overlap) = overrides.note_overlap {
            self.notes.overlap = overlap;
        }
        if let Some(fill) = &overrides.activation_fill {
            self.activations.fill = fill.clone();
        }
        if let Some(width) = overrides.activation_width {
            self.activations.width = width;
        }
        self
    }

    /// Default look: black on white, dashed lifelines, pale blue activations
    pub fn default_theme() -> Self {
        let mut options = Self::default();
        options.participants.lifeline.dash = Some("4".to_string());
        options.messages.arrow.dash = Some("4".to_string());
        options
    }

    /// Light-on-dark theme
    pub fn midnight() -> Self {
        let ink = "#e8e8f0".to_string();
        let mut options = Self::default_theme();
        options.background = Some("#14141c".to_string());
        options.participants.text_box.fill = "#1f1f2e".to_string();
        options.participants.text_box.stroke.color = ink.clone();
        options.participants.text_box.font.color = ink.clone();
        options.participants.lifeline.color = "#6a6a86".to_string();
        options.messages.font.color = ink.clone();
        options.messages.arrow.color = ink.clone();
        options.notes.text_box.fill = "#2e2b1f".to_string();
        options.notes.text_box.stroke.color = ink.clone();
        options.notes.text_box.font.color = ink.clone();
        options.activations.fill = "#2d4a5e".to_string();
        options.activations.stroke.color = ink.clone();
        options.title.font.color = ink;
        options
    }

    /// Warm paper-coloured theme with serif titles
    pub fn parchment() -> Self {
        let mut options = Self::default_theme();
        options.background = Some("#faf6ec".to_string());
        options.participants.text_box.fill = "#f3ead2".to_string();
        options.participants.text_box.stroke.color = "#6b5537".to_string();
        options.participants.lifeline.color = "#6b5537".to_string();
        options.messages.arrow.color = "#4a3a24".to_string();
        options.notes.text_box.fill = "#fdf3c9".to_string();
        options.activations.fill = "#e4cf9a".to_string();
        options.title.font.family = "Georgia".to_string();
        options
    }

    /// Monochrome wireframe: solid lifelines, no fills
    pub fn wire() -> Self {
        let mut options = Self::default();
        options.notes.text_box.fill = DEFAULT_CONTRAST_COLOUR.to_string();
        options.activations.fill = "#ddd".to_string();
        options
    }

    /// Get a named theme
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "midnight" | "dark" => Some(Self::midnight()),
            "parchment" | "paper" => Some(Self::parchment()),
            "wire" | "wireframe" | "plain" => Some(Self::wire()),
            _ => None,
        }
    }

    /// List all named themes
    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "midnight", "parchment", "wire"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_defaults() {
        let resolved = DiagramOptions::default().resolve(&Overrides::default());
        assert_eq!(resolved, DiagramOptions::default());
    }

    #[test]
    fn overrides_overlay_field_by_field() {
        let overrides = Overrides {
            padding: Some(8.0),
            note_overlap: Some(12.0),
            activation_width: Some(14.0),
            ..Overrides::default()
        };
        let resolved = DiagramOptions::default().resolve(&overrides);
        assert_eq!(resolved.padding, 8.0);
        assert_eq!(resolved.notes.overlap, 12.0);
        assert_eq!(resolved.activations.half_width(), 7.0);
        // untouched fields keep their defaults
        assert_eq!(resolved.messages.self_arrow_width, 30.0);
    }

    #[test]
    fn default_font_override_spares_title_size() {
        let overrides = Overrides {
            default_font: Some(FontOptions {
                family: "Helvetica".to_string(),
                ..FontOptions::default()
            }),
            ..Overrides::default()
        };
        let resolved = DiagramOptions::default().resolve(&overrides);
        assert_eq!(resolved.title.font.family, "Helvetica");
        assert_eq!(resolved.title.font.size, 18.0);
    }

    #[test]
    fn every_named_theme_resolves() {
        for name in DiagramOptions::available_themes() {
            assert!(DiagramOptions::by_name(name).is_some(), "{name}");
        }
        assert!(DiagramOptions::by_name("no-such-theme").is_none());
    }
}
