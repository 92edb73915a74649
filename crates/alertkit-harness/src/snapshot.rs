#![forbid(unsafe_code)]

//! JSON snapshots of a view tree.
//!
//! Tests compare the parts they care about with [`serde_json::Value`]
//! indexing instead of walking views by hand:
//!
//! ```ignore
//! let tree = view_tree(host.window_view());
//! assert_eq!(tree["subviews"][1]["subviews"][0]["alpha"], 0.5);
//! ```

use alertkit_core::View;
use serde_json::{Value, json};

/// Frame, opacity, styling, and children of `view`, recursively.
pub fn view_tree(view: &View) -> Value {
    let frame = view.frame();
    let layer = view.layer();
    let shadow = layer.shadow.map(|s| {
        json!({
            "opacity": s.opacity,
            "radius": s.radius,
            "offset": [s.offset.width, s.offset.height],
        })
    });
    let background = view
        .background_color()
        .map(|c| format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a));
    json!({
        "frame": [frame.x(), frame.y(), frame.width(), frame.height()],
        "alpha": view.alpha(),
        "background": background,
        "corner_radius": layer.corner_radius,
        "masks_to_bounds": layer.masks_to_bounds,
        "shadow": shadow,
        "tappable": view.has_tap_handler(),
        "subviews": view.subviews().iter().map(view_tree).collect::<Vec<_>>(),
    })
}

/// Depth-first path of subview indices from `root` to `target`.
pub fn path_to(root: &View, target: &View) -> Option<Vec<usize>> {
    if root.ptr_eq(target) {
        return Some(Vec::new());
    }
    root.subviews().iter().enumerate().find_map(|(i, child)| {
        path_to(child, target).map(|mut rest| {
            rest.insert(0, i);
            rest
        })
    })
}
