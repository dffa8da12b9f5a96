//! Geometry used by inspection tooling and region constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::{mkhash, StableHash};

/// A bel position: tile coordinates plus the slot within the tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl Loc {
    /// Point at `(x, y, z)`.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl StableHash for Loc {
    fn stable_hash(&self) -> u32 {
        mkhash(self.x.stable_hash(), mkhash(self.y.stable_hash(), self.z.stable_hash()))
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loc(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

/// Inclusive rectangle of tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl BoundingBox {
    /// Box spanning the given edges.
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Manhattan distance from `loc` to the nearest point of the box.
    #[must_use]
    pub fn distance(&self, loc: Loc) -> i32 {
        let mut dist = 0;
        if loc.x < self.x0 {
            dist += self.x0 - loc.x;
        }
        if loc.x > self.x1 {
            dist += loc.x - self.x1;
        }
        if loc.y < self.y0 {
            dist += self.y0 - loc.y;
        }
        if loc.y > self.y1 {
            dist += loc.y - self.y1;
        }
        dist
    }

    /// True when `(x, y)` lies within the box.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && y >= self.y0 && x <= self.x1 && y <= self.y1
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox(x0={}, y0={}, x1={}, y1={})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

/// Shape of a graphic element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum GraphicType {
    /// Nothing drawn.
    #[default]
    None = 0,
    /// Straight line.
    Line,
    /// Line with an arrow head.
    Arrow,
    /// Rectangle.
    Box,
    /// Circle.
    Circle,
    /// Text label.
    Label,
    /// Arrow in tile-local coordinates.
    LocalArrow,
    /// Line in tile-local coordinates.
    LocalLine,
    /// Number of kinds.
    Max,
}

impl GraphicType {
    /// Every value in declaration order.
    pub const ALL: [GraphicType; 9] = [
        GraphicType::None,
        GraphicType::Line,
        GraphicType::Arrow,
        GraphicType::Box,
        GraphicType::Circle,
        GraphicType::Label,
        GraphicType::LocalArrow,
        GraphicType::LocalLine,
        GraphicType::Max,
    ];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GraphicType::None => "NONE",
            GraphicType::Line => "LINE",
            GraphicType::Arrow => "ARROW",
            GraphicType::Box => "BOX",
            GraphicType::Circle => "CIRCLE",
            GraphicType::Label => "LABEL",
            GraphicType::LocalArrow => "LOCAL_ARROW",
            GraphicType::LocalLine => "LOCAL_LINE",
            GraphicType::Max => "MAX",
        }
    }
}

/// Rendering style of a graphic element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum GraphicStyle {
    /// Background grid.
    Grid = 0,
    /// Tile frame.
    #[default]
    Frame,
    /// Not drawn.
    Hidden,
    /// Unused resource.
    Inactive,
    /// Used resource.
    Active,
    /// Highlight group 0.
    Highlighted0,
    /// Highlight group 1.
    Highlighted1,
    /// Highlight group 2.
    Highlighted2,
    /// Highlight group 3.
    Highlighted3,
    /// Highlight group 4.
    Highlighted4,
    /// Highlight group 5.
    Highlighted5,
    /// Highlight group 6.
    Highlighted6,
    /// Highlight group 7.
    Highlighted7,
    /// Selected element.
    Selected,
    /// Element under the cursor.
    Hover,
    /// Number of styles.
    Max,
}

impl GraphicStyle {
    /// Every value in declaration order.
    pub const ALL: [GraphicStyle; 16] = [
        GraphicStyle::Grid,
        GraphicStyle::Frame,
        GraphicStyle::Hidden,
        GraphicStyle::Inactive,
        GraphicStyle::Active,
        GraphicStyle::Highlighted0,
        GraphicStyle::Highlighted1,
        GraphicStyle::Highlighted2,
        GraphicStyle::Highlighted3,
        GraphicStyle::Highlighted4,
        GraphicStyle::Highlighted5,
        GraphicStyle::Highlighted6,
        GraphicStyle::Highlighted7,
        GraphicStyle::Selected,
        GraphicStyle::Hover,
        GraphicStyle::Max,
    ];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GraphicStyle::Grid => "GRID",
            GraphicStyle::Frame => "FRAME",
            GraphicStyle::Hidden => "HIDDEN",
            GraphicStyle::Inactive => "INACTIVE",
            GraphicStyle::Active => "ACTIVE",
            GraphicStyle::Highlighted0 => "HIGHLIGHTED0",
            GraphicStyle::Highlighted1 => "HIGHLIGHTED1",
            GraphicStyle::Highlighted2 => "HIGHLIGHTED2",
            GraphicStyle::Highlighted3 => "HIGHLIGHTED3",
            GraphicStyle::Highlighted4 => "HIGHLIGHTED4",
            GraphicStyle::Highlighted5 => "HIGHLIGHTED5",
            GraphicStyle::Highlighted6 => "HIGHLIGHTED6",
            GraphicStyle::Highlighted7 => "HIGHLIGHTED7",
            GraphicStyle::Selected => "SELECTED",
            GraphicStyle::Hover => "HOVER",
            GraphicStyle::Max => "MAX",
        }
    }
}

impl fmt::Display for GraphicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for GraphicStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One primitive of a decal drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicElement {
    /// Shape kind.
    #[serde(rename = "type")]
    pub element_type: GraphicType,
    /// Drawing style.
    pub style: GraphicStyle,
    /// First x coordinate.
    pub x1: f32,
    /// First y coordinate.
    pub y1: f32,
    /// Second x coordinate.
    pub x2: f32,
    /// Second y coordinate.
    pub y2: f32,
    /// Depth.
    pub z: f32,
    /// Label text.
    pub text: String,
}

impl GraphicElement {
    /// Element with every field given.
    #[must_use]
    pub fn new(
        element_type: GraphicType,
        style: GraphicStyle,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        z: f32,
    ) -> Self {
        Self {
            element_type,
            style,
            x1,
            y1,
            x2,
            y2,
            z,
            text: String::new(),
        }
    }
}

impl fmt::Display for GraphicElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GraphicElement(type={}, style={}, text='{}', x1={}, y1={}, x2={}, y2={}, z={})",
            self.element_type, self.style, self.text, self.x1, self.y1, self.x2, self.y2, self.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_inside() {
        let bb = BoundingBox::new(2, 2, 5, 6);
        assert_eq!(bb.distance(Loc::new(2, 2, 0)), 0);
        assert_eq!(bb.distance(Loc::new(4, 6, 3)), 0);
    }

    #[test]
    fn distance_is_manhattan_outside() {
        let bb = BoundingBox::new(2, 2, 5, 6);
        assert_eq!(bb.distance(Loc::new(0, 4, 0)), 2);
        assert_eq!(bb.distance(Loc::new(8, 9, 0)), 6);
        assert_eq!(bb.distance(Loc::new(0, 0, 0)), 4);
    }

    #[test]
    fn contains_is_inclusive() {
        let bb = BoundingBox::new(0, 0, 3, 3);
        assert!(bb.contains(0, 0));
        assert!(bb.contains(3, 3));
        assert!(!bb.contains(4, 0));
        assert!(!bb.contains(0, -1));
    }

    #[test]
    fn graphic_element_defaults_to_frame_none() {
        let el = GraphicElement::default();
        assert_eq!(el.element_type, GraphicType::None);
        assert_eq!(el.style, GraphicStyle::Frame);
        assert!(el.text.is_empty());
    }

    #[test]
    fn enum_names_match_variants() {
        assert_eq!(GraphicType::LocalArrow.name(), "LOCAL_ARROW");
        assert_eq!(GraphicStyle::Highlighted5.name(), "HIGHLIGHTED5");
        assert_eq!(GraphicStyle::ALL[GraphicStyle::Hover as usize], GraphicStyle::Hover);
        assert_eq!(GraphicType::ALL[GraphicType::Max as usize], GraphicType::Max);
    }
}
