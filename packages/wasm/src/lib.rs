//! Tidy Tree - WASM Module
//!
//! Linear-time tidy drawings of rooted, ordered trees whose nodes have
//! arbitrary widths, heights and vertical positions. The layout is usable
//! as a plain Rust library and is compiled to WebAssembly with a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: Arena-backed tree, bulk builders and input validation
//! - `layout`: The tidy layout engine and its configuration
//! - `spatial`: R-tree over laid-out boxes for hit testing and overlap checks
//! - `engine`: Host-id bookkeeping shared by the JavaScript surface
//!
//! # Example
//!
//! ```
//! use tidy_tree_wasm::{LayoutConfig, NodeSpec, TidyLayout, Tree};
//!
//! let mut tree = Tree::new(NodeSpec::sized(10.0, 10.0));
//! let left = tree.add_child(tree.root(), NodeSpec::sized(10.0, 10.0)).unwrap();
//! let right = tree.add_child(tree.root(), NodeSpec::sized(10.0, 10.0)).unwrap();
//!
//! TidyLayout::new(LayoutConfig::stacked(5.0, 0.0))
//!     .layout(&mut tree)
//!     .unwrap();
//!
//! assert_eq!(tree[left].x(), Some(0.0));
//! assert_eq!(tree[right].x(), Some(10.0));
//! assert_eq!(tree[tree.root()].x(), Some(5.0));
//! ```

use js_sys::Float64Array;
use log::{Level, LevelFilter, ParseLevelError};
use wasm_bindgen::prelude::*;

pub mod engine;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod spatial;
pub mod tree;

pub use engine::TreeEngine;
pub use error::{LayoutError, Result};
pub use geometry::{Coordinate, Rect};
pub use layout::{layout, LayoutConfig, LayoutStats, TidyLayout, VerticalPlacement};
pub use spatial::BoxIndex;
pub use tree::{NodeId, NodeSpec, Tree};

/// Parent id marking the root in `addNode`, `data` and `computeTreeLayout`.
pub const NO_PARENT: u32 = u32::MAX;

/// Console log level until the host calls `setLogLevel`.
pub const DEFAULT_LOG_LEVEL: Level = Level::Warn;

/// Initialize the WASM module.
///
/// Sets up panic messages and routes `log` records to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(DEFAULT_LOG_LEVEL).is_err() {
        web_sys::console::warn_1(&JsValue::from_str(
            "tidy-tree-wasm: another logger is already installed",
        ));
    }
}

/// Set the console log level: "off", "error", "warn", "info", "debug" or
/// "trace".
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> std::result::Result<(), JsError> {
    apply_log_level(level)?;
    Ok(())
}

fn apply_log_level(name: &str) -> std::result::Result<LevelFilter, ParseLevelError> {
    let level: LevelFilter = name.parse()?;
    log::set_max_level(level);
    Ok(level)
}

fn config_from_js(config: JsValue) -> std::result::Result<LayoutConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(LayoutConfig::default());
    }
    let config: LayoutConfig = serde_wasm_bindgen::from_value(config)?;
    config.validate()?;
    Ok(config)
}

fn parent_from_js(parent_id: u32) -> Option<u32> {
    (parent_id != NO_PARENT).then_some(parent_id)
}

/// Main entry point for tree layout.
///
/// This struct wraps the internal TreeEngine and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct TidyTreeWasm {
    engine: TreeEngine,
}

#[wasm_bindgen]
impl TidyTreeWasm {
    /// Create an empty tree.
    ///
    /// `config` is a plain object such as
    /// `{ peerMargin: 10, parentChildMargin: 20, vertical: "layered" }`.
    /// Missing fields take their defaults; `undefined` gives the default
    /// configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<TidyTreeWasm, JsError> {
        Ok(Self {
            engine: TreeEngine::new(config_from_js(config)?),
        })
    }

    /// Replace the layout configuration.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> std::result::Result<(), JsError> {
        self.engine.set_config(config_from_js(config)?)?;
        Ok(())
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node.
    ///
    /// # Arguments
    ///
    /// * `id` - Host id, unique within the tree
    /// * `width` - Node width, greater than zero
    /// * `height` - Node height, zero or more
    /// * `y` - Top edge; ignored by the stacked and layered placements
    /// * `parent_id` - Host id of an already added parent, or `u32::MAX`
    ///   for the root
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(
        &mut self,
        id: u32,
        width: f64,
        height: f64,
        y: f64,
        parent_id: u32,
    ) -> std::result::Result<(), JsError> {
        self.engine
            .add_node(id, NodeSpec::new(width, height, y), parent_from_js(parent_id))?;
        Ok(())
    }

    /// Replace the tree with parallel arrays, one entry per node. Nodes may
    /// be listed in any order; `parentIds` uses `u32::MAX` for the root.
    pub fn data(
        &mut self,
        ids: &[u32],
        widths: &[f64],
        heights: &[f64],
        ys: &[f64],
        parent_ids: &[u32],
    ) -> std::result::Result<(), JsError> {
        for len in [widths.len(), heights.len(), ys.len()] {
            if len != ids.len() {
                return Err(LayoutError::LengthMismatch {
                    specs: ids.len(),
                    parents: len,
                }
                .into());
            }
        }

        let specs: Vec<NodeSpec> = widths
            .iter()
            .zip(heights)
            .zip(ys)
            .map(|((&width, &height), &y)| NodeSpec::new(width, height, y))
            .collect();
        let parents: Vec<Option<u32>> = parent_ids.iter().map(|&p| parent_from_js(p)).collect();

        self.engine.load(ids, &specs, &parents)?;
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns the number of nodes
    /// removed; removing the root empties the tree.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: u32) -> std::result::Result<usize, JsError> {
        Ok(self.engine.remove_node(id)?)
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    /// Get the number of nodes.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.engine.node_count()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute the layout.
    ///
    /// Returns `{ nodes, contourSteps, threads, shifts }`.
    pub fn layout(&mut self) -> std::result::Result<JsValue, JsError> {
        let stats = self.engine.layout()?;
        Ok(serde_wasm_bindgen::to_value(&stats)?)
    }

    /// Returns a Float64Array `[id0, x0, y0, id1, x1, y1, ...]` of the last
    /// layout, empty if the tree changed since.
    pub fn positions(&self) -> Float64Array {
        Float64Array::from(&self.engine.positions()[..])
    }

    /// Returns `[minX, minY, maxX, maxY]` of the last layout, or an empty
    /// array.
    pub fn bounds(&self) -> Float64Array {
        match self.engine.bounds() {
            Some(rect) => Float64Array::from(&[rect.x, rect.y, rect.right(), rect.bottom()][..]),
            None => Float64Array::new_with_length(0),
        }
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Host id of the node under the point, if any.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f64, y: f64) -> Option<u32> {
        self.engine.node_at(x, y)
    }

    /// Host ids of the nodes touching the rectangle.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.engine
            .nodes_in_rect(&Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Number of unrelated node pairs whose boxes overlap.
    pub fn overlaps(&self) -> usize {
        self.engine.overlap_count()
    }
}

/// One-shot layout of a tree given as edges.
///
/// Takes the tree edges as [parent0, child0, parent1, child1, ...] pairs
/// over `widths.len()` nodes and returns a Float64Array
/// `[x0, y0, x1, y1, ...]` with one pair per node.
///
/// # Arguments
///
/// * `widths` - Width of each node
/// * `heights` - Height of each node
/// * `edges` - Flat array of directed parent→child edge pairs
/// * `root_id` - The root node ID (u32::MAX means auto-detect)
/// * `config` - Layout configuration object, or `undefined`
#[wasm_bindgen(js_name = computeTreeLayout)]
pub fn compute_tree_layout(
    widths: &[f64],
    heights: &[f64],
    edges: &[u32],
    root_id: u32,
    config: JsValue,
) -> std::result::Result<Float64Array, JsError> {
    let config = config_from_js(config)?;
    let positions = edge_layout(widths, heights, edges, parent_from_js(root_id), config)?;
    Ok(Float64Array::from(&positions[..]))
}

/// Build from edges, lay out and interleave x and y per node index.
fn edge_layout(
    widths: &[f64],
    heights: &[f64],
    edges: &[u32],
    root: Option<u32>,
    config: LayoutConfig,
) -> Result<Vec<Coordinate>> {
    if widths.len() != heights.len() {
        return Err(LayoutError::LengthMismatch {
            specs: widths.len(),
            parents: heights.len(),
        });
    }
    let specs: Vec<NodeSpec> = widths
        .iter()
        .zip(heights)
        .map(|(&width, &height)| NodeSpec::sized(width, height))
        .collect();

    let mut tree = Tree::from_edges(&specs, edges, root)?;
    TidyLayout::new(config).layout(&mut tree)?;

    let mut positions = Vec::with_capacity(tree.node_count() * 2);
    for (_, x, y) in tree.positions() {
        positions.push(x);
        positions.push(y);
    }
    Ok(positions)
}
