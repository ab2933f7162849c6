//! Game tree types produced by the parser.

use std::collections::BTreeMap;
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Property tags this crate understands. Anything else is kept under its raw
/// identifier in [`Properties::unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum Tag {
    // Moves
    #[strum(serialize = "B")]
    BlackMove,
    #[strum(serialize = "W")]
    WhiteMove,

    // Setup
    #[strum(serialize = "AB")]
    AddBlack,
    #[strum(serialize = "AW")]
    AddWhite,
    #[strum(serialize = "AE")]
    AddEmpty,
    #[strum(serialize = "PL")]
    PlayerToMove,

    // Root
    #[strum(serialize = "FF")]
    FileFormat,
    #[strum(serialize = "GM")]
    GameType,
    #[strum(serialize = "SZ")]
    BoardSize,
    #[strum(serialize = "CA")]
    Charset,
    #[strum(serialize = "AP")]
    Application,
    #[strum(serialize = "ST")]
    Style,

    // Game info
    #[strum(serialize = "PB")]
    BlackPlayer,
    #[strum(serialize = "PW")]
    WhitePlayer,
    #[strum(serialize = "BR")]
    BlackRank,
    #[strum(serialize = "WR")]
    WhiteRank,
    #[strum(serialize = "BT")]
    BlackTeam,
    #[strum(serialize = "WT")]
    WhiteTeam,
    #[strum(serialize = "DT")]
    Date,
    #[strum(serialize = "EV")]
    Event,
    #[strum(serialize = "RO")]
    Round,
    #[strum(serialize = "PC")]
    Place,
    #[strum(serialize = "RE")]
    Result,
    #[strum(serialize = "RU")]
    Rules,
    #[strum(serialize = "KM")]
    Komi,
    #[strum(serialize = "HA")]
    Handicap,
    #[strum(serialize = "TM")]
    TimeLimit,
    #[strum(serialize = "OT")]
    Overtime,
    #[strum(serialize = "GN")]
    GameName,
    #[strum(serialize = "GC")]
    GameComment,
    #[strum(serialize = "ON")]
    Opening,
    #[strum(serialize = "SO")]
    Source,
    #[strum(serialize = "US")]
    User,
    #[strum(serialize = "AN")]
    Annotator,
    #[strum(serialize = "CP")]
    Copyright,

    // Node annotation and markup
    #[strum(serialize = "C")]
    Comment,
    #[strum(serialize = "N")]
    NodeName,
    #[strum(serialize = "MN")]
    MoveNumber,
    #[strum(serialize = "LB")]
    Label,
    #[strum(serialize = "TR")]
    Triangle,
    #[strum(serialize = "SQ")]
    Square,
    #[strum(serialize = "CR")]
    Circle,
    #[strum(serialize = "MA")]
    Mark,
}

/// Property bag of a single node: typed keys for known tags, raw keys for the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    known: BTreeMap<Tag, Vec<String>>,
    unknown: BTreeMap<String, Vec<String>>,
}

impl Properties {
    /// Append values under an identifier. Repeated identifiers accumulate.
    pub fn insert(&mut self, ident: &str, values: Vec<String>) {
        match Tag::from_str(ident) {
            Ok(tag) => self.known.entry(tag).or_default().extend(values),
            Err(_) => self.unknown.entry(ident.to_string()).or_default().extend(values),
        }
    }

    /// Raw (still escaped) values of a known tag.
    pub fn get(&self, tag: Tag) -> Option<&[String]> {
        self.known.get(&tag).map(Vec::as_slice)
    }

    pub fn first(&self, tag: Tag) -> Option<&str> {
        self.get(tag).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn has(&self, tag: Tag) -> bool {
        self.known.contains_key(&tag)
    }

    pub fn unknown(&self) -> &BTreeMap<String, Vec<String>> {
        &self.unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameNode {
    /// Preorder position in the owning tree (root is 0).
    pub index: usize,
    pub properties: Properties,
    pub children: Vec<GameNode>,
}

impl GameNode {
    pub fn new(properties: Properties) -> Self {
        Self {
            index: 0,
            properties,
            children: Vec::new(),
        }
    }

    /// The move played at this node, as colour and raw point value.
    ///
    /// A node carrying both `B` and `W` is malformed; black wins the tie.
    pub fn played_move(&self) -> Option<(Stone, &str)> {
        if let Some(point) = self.properties.first(Tag::BlackMove) {
            return Some((Stone::Black, point));
        }
        self.properties
            .first(Tag::WhiteMove)
            .map(|point| (Stone::White, point))
    }
}

// The default drop glue recurses once per generation, which overflows the stack on
// long games or deeply nested variations. Flatten instead.
impl Drop for GameNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// One parsed game record.
#[derive(Debug, Clone)]
pub struct GameTree {
    root: GameNode,
}

impl GameTree {
    /// Wrap a root node, numbering every node in preorder.
    pub fn new(mut root: GameNode) -> Self {
        let mut next = 0;
        let mut stack: Vec<&mut GameNode> = vec![&mut root];
        while let Some(node) = stack.pop() {
            node.index = next;
            next += 1;
            // Reverse so the first child is numbered first.
            stack.extend(node.children.iter_mut().rev());
        }
        Self { root }
    }

    pub fn root(&self) -> &GameNode {
        &self.root
    }

    /// Every node, root first, in preorder.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![&self.root],
        }
    }

    /// The main line: the root followed by the first child of each node.
    pub fn main_line(&self) -> MainLine<'_> {
        MainLine {
            next: Some(&self.root),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}

pub struct Nodes<'a> {
    stack: Vec<&'a GameNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a GameNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub struct MainLine<'a> {
    next: Option<&'a GameNode>,
}

impl<'a> Iterator for MainLine<'a> {
    type Item = &'a GameNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.children.first();
        Some(node)
    }
}
