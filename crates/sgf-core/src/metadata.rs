//! Game-info extraction from the root node.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SgfError;
use crate::parser::unescape;
use crate::selector::MAX_BOARD_SIZE;
use crate::tree::{GameTree, Properties, Tag};

/// Board size assumed when the record does not declare one.
pub const DEFAULT_BOARD_SIZE: u32 = 19;

/// The only game type this crate handles (Go).
pub const SUPPORTED_GAME_TYPE: i64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub komi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handicap: Option<u32>,
    /// Main time in seconds (`TM`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtime: Option<String>,
    /// Declared board size. `None` when the record omits `SZ`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Root properties with no known tag, keyed by raw identifier.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub other_properties: BTreeMap<String, Vec<String>>,
}

/// Extracted metadata plus the values the rest of a request depends on.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metadata: GameMetadata,
    /// Declared board size, or [`DEFAULT_BOARD_SIZE`] when absent.
    pub board_size: u32,
    pub warnings: Vec<String>,
}

/// Read the root node's game info.
///
/// Fails only for a game type other than Go or a board size outside 1-361;
/// everything else odd about the record becomes a warning.
pub fn extract_metadata(tree: &GameTree) -> Result<Extraction, SgfError> {
    let props = &tree.root().properties;
    let mut reader = Reader {
        props,
        warnings: Vec::new(),
    };

    let game_type = reader.number::<i64>(Tag::GameType);
    match (props.has(Tag::GameType), game_type) {
        (_, Some(code)) if code != SUPPORTED_GAME_TYPE => {
            return Err(SgfError::UnsupportedGame(code))
        }
        (false, _) => reader
            .warnings
            .push("No game type (GM) specified, assuming Go".to_string()),
        _ => {}
    }

    let declared_size = reader.number::<i64>(Tag::BoardSize);
    let board_size = match declared_size {
        Some(size) if size < 1 || size > i64::from(MAX_BOARD_SIZE) => {
            return Err(SgfError::BoardSize(size))
        }
        Some(size) => size as u32,
        None => {
            reader.warnings.push(format!(
                "No board size specified, assuming {DEFAULT_BOARD_SIZE}x{DEFAULT_BOARD_SIZE}"
            ));
            DEFAULT_BOARD_SIZE
        }
    };

    let metadata = GameMetadata {
        black_player: reader.text(Tag::BlackPlayer),
        white_player: reader.text(Tag::WhitePlayer),
        black_rank: reader.text(Tag::BlackRank),
        white_rank: reader.text(Tag::WhiteRank),
        black_team: reader.text(Tag::BlackTeam),
        white_team: reader.text(Tag::WhiteTeam),
        date: reader.text(Tag::Date),
        event: reader.text(Tag::Event),
        round: reader.text(Tag::Round),
        place: reader.text(Tag::Place),
        result: reader.text(Tag::Result),
        rules: reader.text(Tag::Rules),
        komi: reader.number(Tag::Komi),
        handicap: reader.number(Tag::Handicap),
        time_limit: reader.number(Tag::TimeLimit),
        overtime: reader.text(Tag::Overtime),
        board_size: declared_size.map(|_| board_size),
        file_format: reader.number(Tag::FileFormat),
        game_type,
        charset: reader.text(Tag::Charset),
        application: reader.text(Tag::Application),
        game_name: reader.text(Tag::GameName),
        game_comment: reader.text(Tag::GameComment),
        opening: reader.text(Tag::Opening),
        source: reader.text(Tag::Source),
        user: reader.text(Tag::User),
        annotator: reader.text(Tag::Annotator),
        copyright: reader.text(Tag::Copyright),
        other_properties: props
            .unknown()
            .iter()
            .map(|(ident, values)| (ident.clone(), values.iter().map(|v| unescape(v)).collect()))
            .collect(),
    };

    Ok(Extraction {
        metadata,
        board_size,
        warnings: reader.warnings,
    })
}

struct Reader<'a> {
    props: &'a Properties,
    warnings: Vec<String>,
}

impl Reader<'_> {
    fn text(&self, tag: Tag) -> Option<String> {
        self.props.first(tag).map(unescape)
    }

    /// A numeric tag. Values that do not parse, or are not finite, are treated
    /// as absent.
    fn number<T: FromStr>(&mut self, tag: Tag) -> Option<T> {
        let props = self.props;
        let raw = props.first(tag)?;
        let value = raw.trim();
        let finite = value.parse::<f64>().is_ok_and(f64::is_finite);
        match value.parse::<T>() {
            Ok(n) if finite => Some(n),
            _ => {
                self.warnings
                    .push(format!("Ignoring non-numeric {tag} value '{raw}'"));
                None
            }
        }
    }
}
