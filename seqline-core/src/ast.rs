//! Diagram model: participants and the time-ordered element list

/// Index of a participant within [`Diagram::participants`].
///
/// Elements refer to participants by index rather than by name, so a parsed
/// diagram can never hold a dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(pub usize);

/// A complete sequence diagram, immutable after parse
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagram {
    /// Optional title
    pub title: Option<String>,
    /// Participants in declaration / first-reference order
    pub participants: Vec<Participant>,
    /// Diagram body (messages, notes) in source order
    pub elements: Vec<Element>,
}

impl Diagram {
    /// Look up a participant by id index
    pub fn participant(&self, id: ParticipantId) -> &Participant {
        &self.participants[id.0]
    }

    /// Find an existing participant by its textual id
    pub fn find_participant(&self, id: &str) -> Option<ParticipantId> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .map(ParticipantId)
    }

    /// Return the existing participant with this id, or add a new one.
    ///
    /// First declaration or first reference wins: a later declaration of the
    /// same id reuses the existing entry rather than creating a second lane.
    pub fn get_or_add_participant(&mut self, id: &str, alias: Option<&str>, kind: ParticipantKind) -> ParticipantId {
        if let Some(existing) = self.find_participant(id) {
            return existing;
        }

        self.participants.push(Participant {
            id: id.to_string(),
            alias: alias.unwrap_or(id).to_string(),
            kind,
        });
        ParticipantId(self.participants.len() - 1)
    }
}

/// A participant in the sequence diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Unique identifier, as written in message lines
    pub id: String,
    /// Display text (defaults to the id)
    pub alias: String,
    /// Kind of participant (plain lifeline or actor)
    pub kind: ParticipantKind,
}

/// Kind of participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    /// Regular participant (box)
    Lifeline,
    /// Actor (stick figure)
    Actor,
}

/// A diagram body element
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Message between participants. `source == target` is a self-message
    /// and lays out as a loop-back arrow.
    Message {
        source: ParticipantId,
        target: ParticipantId,
        text: String,
        arrow: Arrow,
        /// Opens an activation on the target
        activates: bool,
        /// Closes the most recent activation on the source
        deactivates: bool,
    },
    /// Note attached to one or two participants
    Note {
        location: NoteLocation,
        /// One target, or two for `note over a, b`
        targets: Vec<ParticipantId>,
        text: String,
    },
}

/// Arrow style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    /// Line style
    pub line: LineKind,
    /// Arrowhead style
    pub head: ArrowHead,
}

impl Arrow {
    pub const SOLID_CLOSED: Arrow = Arrow {
        line: LineKind::Solid,
        head: ArrowHead::Closed,
    };

    pub const SOLID_OPEN: Arrow = Arrow {
        line: LineKind::Solid,
        head: ArrowHead::Open,
    };

    pub const DASHED_CLOSED: Arrow = Arrow {
        line: LineKind::Dashed,
        head: ArrowHead::Closed,
    };

    pub const DASHED_OPEN: Arrow = Arrow {
        line: LineKind::Dashed,
        head: ArrowHead::Open,
    };
}

/// Line style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Solid line (`-`)
    Solid,
    /// Dashed line (`--`)
    Dashed,
}

/// Arrowhead style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHead {
    /// Filled arrowhead (`>`)
    Closed,
    /// Open arrowhead (`>>`)
    Open,
}

/// Note placement relative to its target lane(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLocation {
    /// Left of a single participant
    LeftOf,
    /// Right of a single participant
    RightOf,
    /// Over one participant, or spanning two
    Over,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_add_reuses_existing_id() {
        let mut diagram = Diagram::default();
        let a = diagram.get_or_add_participant("api", Some("API Gateway"), ParticipantKind::Lifeline);
        let b = diagram.get_or_add_participant("api", None, ParticipantKind::Actor);
        assert_eq!(a, b);
        assert_eq!(diagram.participants.len(), 1);
        // first declaration wins, including kind and alias
        assert_eq!(diagram.participant(a).alias, "API Gateway");
        assert_eq!(diagram.participant(a).kind, ParticipantKind::Lifeline);
    }

    #[test]
    fn alias_defaults_to_id() {
        let mut diagram = Diagram::default();
        let id = diagram.get_or_add_participant("db", None, ParticipantKind::Lifeline);
        assert_eq!(diagram.participant(id).alias, "db");
    }
}
