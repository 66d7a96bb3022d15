//! # Drywall Calculator
//!
//! Boards, metal framing and finishing materials for a partition wall.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, KG, M, M2, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Extra boards for cuts (fraction)
pub const BOARD_WASTE: f64 = 0.10;
/// Length of one stud or track piece (m)
pub const PROFILE_LENGTH: f64 = 3.0;
pub const SCREWS_PER_BOARD: f64 = 30.0;
/// Joint tape per m² of board
pub const TAPE_M_PER_M2: f64 = 1.5;
/// Joint compound per m² of board
pub const COMPOUND_KG_PER_M2: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardType {
    pub key: &'static str,
    /// Board width (m)
    pub width: f64,
    /// Board height (m)
    pub height: f64,
}

impl BoardType {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

pub const BOARD_TYPES: &[BoardType] = &[
    BoardType { key: "standard", width: 1.2, height: 1.8 },
    BoardType { key: "moistureResistant", width: 1.2, height: 1.8 },
    BoardType { key: "fireResistant", width: 1.2, height: 2.4 },
];

pub fn board_type(key: &str) -> Option<&'static BoardType> {
    BOARD_TYPES.iter().find(|b| b.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrywallInput {
    pub wall_length: f64,
    pub wall_height: f64,
    pub openings_area: f64,
    pub board_type: String,
    /// Number of cladded faces (1 or 2)
    pub faces: f64,
    /// Stud spacing (m)
    pub stud_spacing: f64,
}

impl Default for DrywallInput {
    fn default() -> Self {
        DrywallInput {
            wall_length: 0.0,
            wall_height: 0.0,
            openings_area: 0.0,
            board_type: "standard".to_string(),
            faces: 2.0,
            stud_spacing: 0.6,
        }
    }
}

impl DrywallInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("wallLength").label("Wall length").required().range(0.1, 1000.0),
            ValidationRule::new("wallHeight").label("Wall height").required().range(0.1, 20.0),
            ValidationRule::new("openingsArea").label("Openings area").min(0.0),
            ValidationRule::new("boardType").label("Board type").text(),
            ValidationRule::new("faces").label("Faces").range(1.0, 2.0),
            ValidationRule::new("studSpacing").label("Stud spacing").range(0.3, 1.2),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = DrywallInput::default();
        DrywallInput {
            wall_length: inputs.number_or("wallLength", d.wall_length),
            wall_height: inputs.number_or("wallHeight", d.wall_height),
            openings_area: inputs.number_or("openingsArea", d.openings_area),
            board_type: inputs.text_or("boardType", &d.board_type),
            faces: inputs.number_or("faces", d.faces),
            stud_spacing: inputs.number_or("studSpacing", d.stud_spacing),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("wallLength", self.wall_length)
            .with("wallHeight", self.wall_height)
            .with("openingsArea", self.openings_area)
            .with("boardType", self.board_type.as_str())
            .with("faces", self.faces)
            .with("studSpacing", self.stud_spacing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrywallResult {
    pub wall_area: ResultEntry,
    pub boards_needed: ResultEntry,
    pub studs: ResultEntry,
    pub tracks: ResultEntry,
    pub screws: ResultEntry,
    pub joint_tape: ResultEntry,
    pub joint_compound: ResultEntry,
    pub board_area: ResultEntry,
}

impl ResultEntries for DrywallResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("wallArea", &self.wall_area),
            ("boardsNeeded", &self.boards_needed),
            ("studs", &self.studs),
            ("tracks", &self.tracks),
            ("screws", &self.screws),
            ("jointTape", &self.joint_tape),
            ("jointCompound", &self.joint_compound),
            ("boardArea", &self.board_area),
        ]
    }
}

pub fn calculate(input: &DrywallInput) -> CalcResult<Outcome<DrywallResult>> {
    validate(&input.to_inputs(), &DrywallInput::rules()).into_result()?;

    let Some(board) = board_type(&input.board_type) else {
        return Ok(Outcome::not_found("boardType", input.board_type.as_str()));
    };

    let length = sanitize_number(input.wall_length, 0.0);
    let height = sanitize_number(input.wall_height, 0.0);
    let faces = sanitize_number(input.faces, 0.0);
    let spacing = sanitize_number(input.stud_spacing, 0.0);

    let net = round_quantity(sanitize_number(length * height - sanitize_number(input.openings_area, 0.0), 0.0));
    let cladding = round_quantity(net * faces);
    let boards = ceil_count(round_quantity(cladding * (1.0 + BOARD_WASTE)) / board.area());

    // one extra stud closes the run; tall walls splice studs
    let studs = if spacing > 0.0 {
        (ceil_count(length / spacing) + 1.0) * ceil_count(height / PROFILE_LENGTH)
    } else {
        0.0
    };
    let tracks = ceil_count(2.0 * length / PROFILE_LENGTH);

    Ok(Outcome::Computed(DrywallResult {
        wall_area: ResultEntry::primary(net, M2),
        boards_needed: ResultEntry::primary(boards, UN).highlighted(),
        studs: ResultEntry::secondary(studs, UN),
        tracks: ResultEntry::secondary(tracks, UN),
        screws: ResultEntry::secondary(boards * SCREWS_PER_BOARD, UN),
        joint_tape: ResultEntry::secondary(round_quantity(cladding * TAPE_M_PER_M2), M),
        joint_compound: ResultEntry::secondary(round_quantity(cladding * COMPOUND_KG_PER_M2), KG),
        board_area: ResultEntry::info(round_quantity(board.area()), M2),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<DrywallResult>> {
    validate(inputs, &DrywallInput::rules()).into_result()?;
    calculate(&DrywallInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> DrywallInput {
        DrywallInput {
            wall_length: 4.0,
            wall_height: 2.7,
            ..DrywallInput::default()
        }
    }

    #[test]
    fn test_double_faced_partition() {
        let result = calculate(&wall()).unwrap().computed().unwrap();
        assert!((result.wall_area.number() - 10.8).abs() < 1e-9);
        // 21.6 m² × 1.1 / 2.16 m² per board
        assert_eq!(result.boards_needed.number(), 11.0);
        assert_eq!(result.studs.number(), 8.0);
        assert_eq!(result.tracks.number(), 3.0);
        assert_eq!(result.screws.number(), 330.0);
        assert!((result.joint_tape.number() - 32.4).abs() < 1e-9);
        assert!((result.joint_compound.number() - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_single_face_halves_boards() {
        let input = DrywallInput { faces: 1.0, ..wall() };
        let result = calculate(&input).unwrap().computed().unwrap();
        // 10.8 × 1.1 / 2.16 = 5.5
        assert_eq!(result.boards_needed.number(), 6.0);
    }

    #[test]
    fn test_tall_wall_splices_studs() {
        let input = DrywallInput {
            wall_height: 4.0,
            ..wall()
        };
        let result = calculate(&input).unwrap().computed().unwrap();
        assert_eq!(result.studs.number(), 16.0);
    }

    #[test]
    fn test_unknown_board_type() {
        let input = DrywallInput {
            board_type: "acoustic".into(),
            ..wall()
        };
        assert!(!calculate(&input).unwrap().is_computed());
    }

    #[test]
    fn test_stud_spacing_bounds() {
        let input = DrywallInput {
            stud_spacing: 2.0,
            ..wall()
        };
        assert!(calculate(&input).is_err());
    }
}
