//! Area and layout evaluation of a polish expression.
//!
//! The expression is scanned left to right with an explicit stack. An operand
//! pushes its module; an operator pops two nodes and pushes the room formed by
//! them. Because of the left-to-right scan, the first child of every room is
//! always its bottom (H) or left (V) child, so placements can be propagated
//! top-down from the root without any mirroring.

use crate::expression::{Partition, PolishExpression, Token};
use crate::module::ModuleCatalog;
use crate::{Error, Result};

/// Width and height of a floorplan (or any subtree of it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Horizontal size.
    pub width: f64,
    /// Vertical size.
    pub height: f64,
}

impl Extent {
    /// Bounding-box area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Combines two child extents under a cut.
    pub fn combine(first: Extent, second: Extent, partition: Partition) -> Extent {
        match partition {
            Partition::Vertical => Extent {
                width: first.width + second.width,
                height: first.height.max(second.height),
            },
            Partition::Horizontal => Extent {
                width: first.width.max(second.width),
                height: first.height + second.height,
            },
        }
    }
}

/// A node of the slicing tree: either a catalog module or a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Leaf, by catalog index.
    Module(usize),
    /// Internal node, by position in the room list.
    Room(usize),
}

/// Internal node formed by one operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Combined size of both children.
    pub extent: Extent,
    /// Bottom/left child.
    pub first: Node,
    /// Top/right child.
    pub second: Node,
    /// Cut that joined the children.
    pub partition: Partition,
    ordinal: usize,
}

impl Room {
    /// Creation-order name: `room1`, `room2`, ...
    pub fn name(&self) -> String {
        format!("room{}", self.ordinal)
    }
}

/// Slicing tree reconstructed from one scan of an expression.
#[derive(Debug, Clone)]
pub struct SlicingTree {
    rooms: Vec<Room>,
    root: Node,
    extent: Extent,
}

impl SlicingTree {
    /// Parses `expr` into rooms. Fails if the expression is not a single tree.
    pub fn build(expr: &PolishExpression, catalog: &ModuleCatalog) -> Result<Self> {
        let mut rooms: Vec<Room> = Vec::with_capacity(expr.operator_total());
        let mut stack: Vec<(Node, Extent)> = Vec::with_capacity(expr.operand_total());

        for (i, token) in expr.tokens().iter().enumerate() {
            match *token {
                Token::Operand(m) => {
                    if m >= catalog.len() {
                        return Err(Error::InvalidExpression(format!(
                            "operand {} at index {} is not in the catalog",
                            m, i
                        )));
                    }
                    let module = catalog.get(m);
                    stack.push((
                        Node::Module(m),
                        Extent {
                            width: module.width(),
                            height: module.height(),
                        },
                    ));
                }
                Token::Operator(partition) => {
                    let (second, second_extent) = stack.pop().ok_or_else(|| underflow(i))?;
                    let (first, first_extent) = stack.pop().ok_or_else(|| underflow(i))?;
                    let extent = Extent::combine(first_extent, second_extent, partition);
                    rooms.push(Room {
                        extent,
                        first,
                        second,
                        partition,
                        ordinal: rooms.len() + 1,
                    });
                    stack.push((Node::Room(rooms.len() - 1), extent));
                }
            }
        }

        match stack.as_slice() {
            [(root, extent)] => Ok(Self {
                root: *root,
                extent: *extent,
                rooms,
            }),
            [] => Err(Error::InvalidExpression("expression is empty".into())),
            nodes => Err(Error::InvalidExpression(format!(
                "{} subtrees left after scan",
                nodes.len()
            ))),
        }
    }

    /// Size of the whole floorplan.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Root of the tree.
    pub fn root(&self) -> Node {
        self.root
    }

    /// Rooms in creation order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn node_extent(&self, node: Node, catalog: &ModuleCatalog) -> Extent {
        match node {
            Node::Module(m) => {
                let module = catalog.get(m);
                Extent {
                    width: module.width(),
                    height: module.height(),
                }
            }
            Node::Room(r) => self.rooms[r].extent,
        }
    }

    /// Writes absolute lower-left corners into every module of the catalog.
    ///
    /// The root sits at the origin. A room's first child shares the room's
    /// corner; the second is offset by the first child's height (H) or width (V).
    pub fn place(&self, catalog: &mut ModuleCatalog) {
        catalog.reset_placements();

        let mut stack = vec![(self.root, 0.0_f64, 0.0_f64)];
        while let Some((node, x, y)) = stack.pop() {
            match node {
                Node::Module(m) => catalog.get_mut(m).set_placement(x, y),
                Node::Room(r) => {
                    let room = &self.rooms[r];
                    let first = self.node_extent(room.first, catalog);
                    stack.push((room.first, x, y));
                    let offset = match room.partition {
                        Partition::Horizontal => (x, y + first.height),
                        Partition::Vertical => (x + first.width, y),
                    };
                    stack.push((room.second, offset.0, offset.1));
                }
            }
        }
    }
}

fn underflow(index: usize) -> Error {
    Error::InvalidExpression(format!("operator at index {} lacks two operands", index))
}

/// Computes the bounding area of `expr` without touching placements.
pub fn compute_area(expr: &PolishExpression, catalog: &ModuleCatalog) -> Result<f64> {
    Ok(SlicingTree::build(expr, catalog)?.extent().area())
}

/// Computes the bounding area of `expr` and writes every module's placement.
pub fn compute_layout(expr: &PolishExpression, catalog: &mut ModuleCatalog) -> Result<f64> {
    let tree = SlicingTree::build(expr, catalog)?;
    tree.place(catalog);
    Ok(tree.extent().area())
}
