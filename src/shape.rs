//! The seven standard shapes and the validated template they build.

use crate::error::EngineError;

/// Integer offset inside a piece template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

const fn o(x: i32, y: i32) -> Offset {
    Offset { x, y }
}

const STRAIGHT: [Offset; 4] = [o(0, 0), o(1, 0), o(2, 0), o(3, 0)];
const SQUARE: [Offset; 4] = [o(0, 0), o(1, 0), o(0, 1), o(1, 1)];
const L_SHAPE: [Offset; 4] = [o(0, 0), o(1, 0), o(2, 0), o(2, 1)];
const J_SHAPE: [Offset; 4] = [o(0, 0), o(1, 0), o(2, 0), o(0, 1)];
const S_SHAPE: [Offset; 4] = [o(0, 0), o(1, 0), o(1, 1), o(2, 1)];
const T_SHAPE: [Offset; 4] = [o(0, 0), o(1, 0), o(2, 0), o(1, 1)];
const Z_SHAPE: [Offset; 4] = [o(0, 1), o(1, 1), o(1, 0), o(2, 0)];

/// Display colour of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Tetromino kinds. Offsets use y-up coordinates, so `(x, 1)` sits above `(x, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Straight,
    Square,
    LShape,
    JShape,
    SShape,
    TShape,
    ZShape,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::Straight,
        Self::Square,
        Self::LShape,
        Self::JShape,
        Self::SShape,
        Self::TShape,
        Self::ZShape,
    ];

    /// 4 cells relative to the template corner.
    pub const fn cells(self) -> &'static [Offset; 4] {
        match self {
            // ****
            Self::Straight => &STRAIGHT,
            // **
            // **
            Self::Square => &SQUARE,
            //   *
            // ***
            Self::LShape => &L_SHAPE,
            // *
            // ***
            Self::JShape => &J_SHAPE,
            //  **
            // **
            Self::SShape => &S_SHAPE,
            //  *
            // ***
            Self::TShape => &T_SHAPE,
            // **
            //  **
            Self::ZShape => &Z_SHAPE,
        }
    }

    pub const fn rotation_origin(self) -> Offset {
        match self {
            Self::Square => o(0, 0),
            _ => o(1, 0),
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            Self::Straight => Rgb(0xE0, 0x52, 0x52),
            Self::Square => Rgb(0x58, 0xAF, 0xD1),
            Self::LShape => Rgb(0xED, 0xD4, 0x45),
            Self::JShape => Rgb(0x4A, 0x6F, 0xE3),
            Self::SShape => Rgb(0xC6, 0x78, 0xDD),
            Self::TShape => Rgb(0xE5, 0x93, 0x3B),
            Self::ZShape => Rgb(0x4F, 0xB3, 0x5E),
        }
    }

    /// The square keeps its orientation.
    pub const fn can_rotate(self) -> bool {
        !matches!(self, Self::Square)
    }

    pub fn template(self) -> Result<Template, EngineError> {
        Template::new(self.cells().to_vec(), self.rotation_origin())
    }
}

/// Non-empty set of offsets with a rotation origin that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    cells: Vec<Offset>,
    rotation_origin: Offset,
}

impl Template {
    pub fn new(cells: Vec<Offset>, rotation_origin: Offset) -> Result<Self, EngineError> {
        if cells.is_empty() {
            return Err(EngineError::InvalidTemplate);
        }
        if !cells.contains(&rotation_origin) {
            return Err(EngineError::InvalidRotationOrigin {
                x: rotation_origin.x,
                y: rotation_origin.y,
            });
        }
        Ok(Self {
            cells,
            rotation_origin,
        })
    }

    pub fn cells(&self) -> &[Offset] {
        &self.cells
    }

    pub const fn rotation_origin(&self) -> Offset {
        self.rotation_origin
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bottom-left corner of the bounding box.
    pub fn min_corner(&self) -> Offset {
        let x = self.cells.iter().map(|c| c.x).min().unwrap_or(0);
        let y = self.cells.iter().map(|c| c.y).min().unwrap_or(0);
        o(x, y)
    }

    pub fn max_y(&self) -> i32 {
        self.cells.iter().map(|c| c.y).max().unwrap_or(0)
    }

    /// Size of the largest axis, measured from offset 0.
    pub fn size(&self) -> i32 {
        let max_x = self.cells.iter().map(|c| c.x).max().unwrap_or(0) + 1;
        let max_y = self.max_y() + 1;
        max_x.max(max_y)
    }
}
