//! Z-order reassignment.
//!
//! These operate on a single element; the editor session applies them to
//! the current selection and records history around them.

use serde::{Deserialize, Serialize};

use crate::{EditorError, EditorResult, ElementId, Scene};

/// Headroom above the element count that [`LayerOp::Raise`] may climb to.
pub const RAISE_HEADROOM: i32 = 10;

/// A z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerOp {
    /// Above everything: one more than the current maximum.
    BringToFront,
    /// To z-index 0 (or the lowest z-index already in use, if negative),
    /// ordered beneath every element it ties with.
    SendToBack,
    /// Up by one, capped at `element_count + RAISE_HEADROOM`.
    Raise,
    /// Down by one, floored at 0.
    Lower,
}

/// Apply `op` to element `id`, returning its new z-index.
///
/// # Errors
///
/// Returns an error if the element is not found.
pub fn apply(scene: &mut Scene, id: ElementId, op: LayerOp) -> EditorResult<i32> {
    let current = scene
        .get_element(id)
        .ok_or(EditorError::ElementNotFound(id))?
        .z_index;

    let target = match op {
        LayerOp::BringToFront => scene
            .max_z_index()
            .unwrap_or(current)
            .saturating_add(1),
        LayerOp::SendToBack => scene
            .elements()
            .filter(|e| e.id != id)
            .map(|e| e.z_index)
            .min()
            .map_or(0, |lowest| lowest.min(0)),
        LayerOp::Raise => {
            let cap = i32::try_from(scene.element_count())
                .unwrap_or(i32::MAX)
                .saturating_add(RAISE_HEADROOM);
            current.saturating_add(1).min(cap.max(current))
        }
        LayerOp::Lower => current.saturating_sub(1).max(current.min(0)),
    };

    if let Some(element) = scene.get_element_mut(id) {
        element.z_index = target;
    }
    if op == LayerOp::SendToBack {
        scene.move_to_first(id);
    }
    tracing::debug!(element = %id, ?op, from = current, to = target, "z-order changed");
    Ok(target)
}

/// Move an element above every other element.
///
/// # Errors
///
/// Returns an error if the element is not found.
pub fn bring_to_front(scene: &mut Scene, id: ElementId) -> EditorResult<i32> {
    apply(scene, id, LayerOp::BringToFront)
}

/// Move an element beneath every other element, at z-index 0 where
/// possible.
///
/// # Errors
///
/// Returns an error if the element is not found.
pub fn send_to_back(scene: &mut Scene, id: ElementId) -> EditorResult<i32> {
    apply(scene, id, LayerOp::SendToBack)
}

/// Move an element up one step.
///
/// # Errors
///
/// Returns an error if the element is not found.
pub fn raise(scene: &mut Scene, id: ElementId) -> EditorResult<i32> {
    apply(scene, id, LayerOp::Raise)
}

/// Move an element down one step.
///
/// # Errors
///
/// Returns an error if the element is not found.
pub fn lower(scene: &mut Scene, id: ElementId) -> EditorResult<i32> {
    apply(scene, id, LayerOp::Lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanvasFormat, ElementKind, Geometry, ShapeKind};

    fn two_boxes() -> (Scene, ElementId, ElementId) {
        let mut scene = Scene::new(CanvasFormat::Square);
        let a = scene.add_element(ElementKind::shape(ShapeKind::Rect), Geometry::default());
        let b = scene.add_element(ElementKind::shape(ShapeKind::Circle), Geometry::default());
        (scene, a, b)
    }

    fn order(scene: &Scene) -> Vec<ElementId> {
        scene.ordered_by_z().iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_bring_to_front() {
        let (mut scene, a, b) = two_boxes();
        assert_eq!(order(&scene), vec![a, b]);
        let z = bring_to_front(&mut scene, a).expect("front");
        assert_eq!(z, 3);
        assert_eq!(order(&scene), vec![b, a]);
    }

    #[test]
    fn test_send_to_back() {
        let (mut scene, a, b) = two_boxes();
        assert_eq!(send_to_back(&mut scene, b).expect("back"), 0);
        assert_eq!(order(&scene), vec![b, a]);
    }

    #[test]
    fn test_send_to_back_wins_ties_at_zero() {
        let (mut scene, a, b) = two_boxes();
        lower(&mut scene, a).expect("lower");
        assert_eq!(scene.get_element(a).map(|e| e.z_index), Some(0));

        assert_eq!(send_to_back(&mut scene, b).expect("back"), 0);
        assert_eq!(order(&scene), vec![b, a]);
    }

    #[test]
    fn test_send_to_back_below_negative_z() {
        let (mut scene, a, b) = two_boxes();
        scene.get_element_mut(a).expect("a").z_index = -4;
        assert_eq!(send_to_back(&mut scene, b).expect("back"), -4);
        assert_eq!(order(&scene), vec![b, a]);
    }

    #[test]
    fn test_raise_is_capped() {
        let (mut scene, a, _) = two_boxes();
        for _ in 0..50 {
            raise(&mut scene, a).expect("raise");
        }
        // Two elements plus headroom.
        assert_eq!(scene.get_element(a).map(|e| e.z_index), Some(12));
    }

    #[test]
    fn test_lower_is_floored() {
        let (mut scene, a, _) = two_boxes();
        for _ in 0..5 {
            lower(&mut scene, a).expect("lower");
        }
        assert_eq!(scene.get_element(a).map(|e| e.z_index), Some(0));
    }

    #[test]
    fn test_raise_never_pulls_an_element_down() {
        let (mut scene, a, _) = two_boxes();
        scene.get_element_mut(a).expect("a").z_index = 40;
        assert_eq!(raise(&mut scene, a).expect("raise"), 40);
    }

    #[test]
    fn test_missing_element() {
        let (mut scene, _, _) = two_boxes();
        assert!(matches!(
            raise(&mut scene, ElementId::new(77)),
            Err(EditorError::ElementNotFound(_))
        ));
    }
}
