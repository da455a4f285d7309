//! Drop-zone acceptance and re-parenting
//!
//! The drag-and-drop engine itself lives in the host. The renderer declares
//! targets and sources; a completed drop is turned into children patches for
//! the affected parents and sent through the component updater.

use crate::vdom::{DragSource, DropTarget};
use weave_core::{WeaveError, WeaveResult};
use weave_ir::{AppComponent, ComponentPatch, ComponentUpdater};

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragItem {
    /// A node already on the page
    Existing { id: String },
    /// A new node from the palette
    New(AppComponent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    pub item: DragItem,
    pub target_parent: String,
    /// Insertion index in the target's children
    pub index: usize,
}

/// Drop target for a container-like node
pub fn drop_target_for(component: &AppComponent) -> Option<DropTarget> {
    let accepts = component.component_type.accepts();
    if accepts.is_empty() {
        return None;
    }
    Some(DropTarget {
        accepts: accepts.iter().map(|t| t.as_str().to_string()).collect(),
        parent_id: component.id.clone(),
        index: component.children.len(),
    })
}

pub fn drag_source_for(component: &AppComponent, parent_id: Option<&str>, index: usize) -> DragSource {
    DragSource {
        component_id: component.id.clone(),
        parent_id: parent_id.map(str::to_string),
        index,
    }
}

fn find<'a>(roots: &'a [AppComponent], id: &str) -> Option<&'a AppComponent> {
    roots.iter().find_map(|r| r.find(id))
}

/// Parent of a node and the node's index within it
fn find_parent<'a>(roots: &'a [AppComponent], id: &str) -> Option<(&'a AppComponent, usize)> {
    fn walk<'a>(node: &'a AppComponent, id: &str) -> Option<(&'a AppComponent, usize)> {
        let children = node.child_nodes();
        if let Some(index) = children.iter().position(|c| c.id == id) {
            return Some((node, index));
        }
        children.iter().find_map(|c| walk(c, id))
    }
    roots.iter().find_map(|r| walk(r, id))
}

/// Compute the children patches a drop produces
pub fn plan_drop(
    roots: &[AppComponent],
    request: &DropRequest,
) -> WeaveResult<Vec<(String, ComponentPatch)>> {
    let target = find(roots, &request.target_parent)
        .ok_or_else(|| WeaveError::ComponentNotFound(request.target_parent.clone()))?;
    let accepts = target.component_type.accepts();
    if accepts.is_empty() {
        return Err(WeaveError::InvalidDrop(format!(
            "'{}' ({}) cannot contain children",
            target.id, target.component_type
        )));
    }
    if target.children.is_invalid() {
        return Err(WeaveError::InvalidDrop(format!(
            "'{}' has malformed children",
            target.id
        )));
    }
    let mut target_children = target.child_nodes().to_vec();

    let dragged = match &request.item {
        DragItem::New(component) => {
            if find(roots, &component.id).is_some() {
                return Err(WeaveError::InvalidDrop(format!(
                    "id '{}' already exists",
                    component.id
                )));
            }
            component.clone()
        }
        DragItem::Existing { id } => find(roots, id)
            .cloned()
            .ok_or_else(|| WeaveError::ComponentNotFound(id.clone()))?,
    };
    if !accepts.contains(&dragged.component_type) {
        return Err(WeaveError::InvalidDrop(format!(
            "'{}' does not accept {}",
            target.id, dragged.component_type
        )));
    }

    let DragItem::Existing { id } = &request.item else {
        let index = request.index.min(target_children.len());
        target_children.insert(index, dragged);
        return Ok(vec![(target.id.clone(), ComponentPatch::children(target_children))]);
    };

    if dragged.contains(&target.id) {
        return Err(WeaveError::InvalidDrop(format!(
            "cannot drop '{id}' into its own subtree"
        )));
    }
    let (source, old_index) = find_parent(roots, id).ok_or_else(|| {
        WeaveError::InvalidDrop(format!("'{id}' is a root component"))
    })?;

    if source.id == target.id {
        let moved = target_children.remove(old_index);
        let index = if request.index > old_index {
            request.index - 1
        } else {
            request.index
        };
        target_children.insert(index.min(target_children.len()), moved);
        return Ok(vec![(target.id.clone(), ComponentPatch::children(target_children))]);
    }

    // Moving up into an ancestor: the target's own subtree still holds the
    // dragged node, so detach it there and patch the target alone
    if target.contains(&source.id) {
        let mut working = target.clone();
        if let Some(parent) = working.find_mut(&source.id) {
            parent.children.nodes_mut().remove(old_index);
        }
        let children = working.children.nodes_mut();
        let index = request.index.min(children.len());
        children.insert(index, dragged);
        let children = std::mem::take(children);
        return Ok(vec![(target.id.clone(), ComponentPatch::children(children))]);
    }

    let mut source_children = source.child_nodes().to_vec();
    source_children.remove(old_index);
    let index = request.index.min(target_children.len());
    target_children.insert(index, dragged);
    Ok(vec![
        (source.id.clone(), ComponentPatch::children(source_children)),
        (target.id.clone(), ComponentPatch::children(target_children)),
    ])
}

/// Apply a drop through the updater
pub fn apply_drop(
    roots: &[AppComponent],
    request: &DropRequest,
    updater: &dyn ComponentUpdater,
) -> WeaveResult<()> {
    let patches = plan_drop(roots, request)?;
    for (id, patch) in patches {
        updater.update_component(&id, patch)?;
    }
    tracing::debug!(target = %request.target_parent, index = request.index, "drop applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weave_ir::{ComponentType, PageTree};

    fn tree() -> Vec<AppComponent> {
        vec![
            AppComponent::new("root", ComponentType::Container)
                .with_child(
                    AppComponent::new("a", ComponentType::Container)
                        .with_child(AppComponent::new("a1", ComponentType::Text))
                        .with_child(AppComponent::new("a2", ComponentType::Text))
                        .with_child(AppComponent::new("a3", ComponentType::Text)),
                )
                .with_child(AppComponent::new("b", ComponentType::Column))
                .with_child(AppComponent::new("btn", ComponentType::Button)),
        ]
    }

    fn ids(component: &AppComponent) -> Vec<&str> {
        component.child_nodes().iter().map(|c| c.id.as_str()).collect()
    }

    fn existing(id: &str, target: &str, index: usize) -> DropRequest {
        DropRequest {
            item: DragItem::Existing { id: id.into() },
            target_parent: target.into(),
            index,
        }
    }

    #[test]
    fn test_move_between_parents() {
        let page = PageTree::new(tree());
        apply_drop(&page.roots(), &existing("a2", "b", 0), &page).unwrap();
        assert_eq!(ids(&page.find("a").unwrap()), vec!["a1", "a3"]);
        assert_eq!(ids(&page.find("b").unwrap()), vec!["a2"]);
        assert_eq!(page.history().len(), 2);
    }

    #[test]
    fn test_move_up_into_ancestor() {
        let page = PageTree::new(tree());
        apply_drop(&page.roots(), &existing("a1", "root", 0), &page).unwrap();

        let roots = page.roots();
        let mut occurrences = 0;
        for root in &roots {
            root.walk(&mut |c| {
                if c.id == "a1" {
                    occurrences += 1;
                }
            });
        }
        assert_eq!(occurrences, 1);
        assert_eq!(ids(&page.find("root").unwrap()), vec!["a1", "a", "b", "btn"]);
        assert_eq!(ids(&page.find("a").unwrap()), vec!["a2", "a3"]);
        assert_eq!(page.history().len(), 1);
    }

    #[test]
    fn test_move_down_into_nested_sibling() {
        let roots = vec![
            AppComponent::new("root", ComponentType::Container)
                .with_child(AppComponent::new("t", ComponentType::Text))
                .with_child(
                    AppComponent::new("outer", ComponentType::Container)
                        .with_child(AppComponent::new("inner", ComponentType::Column)),
                ),
        ];
        let page = PageTree::new(roots);
        apply_drop(&page.roots(), &existing("t", "inner", 0), &page).unwrap();
        assert_eq!(ids(&page.find("root").unwrap()), vec!["outer"]);
        assert_eq!(ids(&page.find("inner").unwrap()), vec!["t"]);
    }

    #[test]
    fn test_reorder_within_parent() {
        let page = PageTree::new(tree());
        // Move a1 after a3
        apply_drop(&page.roots(), &existing("a1", "a", 3), &page).unwrap();
        assert_eq!(ids(&page.find("a").unwrap()), vec!["a2", "a3", "a1"]);
        // Move a1 back to the front
        apply_drop(&page.roots(), &existing("a1", "a", 0), &page).unwrap();
        assert_eq!(ids(&page.find("a").unwrap()), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_rejects_leaf_target() {
        let err = plan_drop(&tree(), &existing("a1", "btn", 0)).unwrap_err();
        assert!(matches!(err, WeaveError::InvalidDrop(_)));
    }

    #[test]
    fn test_rejects_own_subtree() {
        let err = plan_drop(&tree(), &existing("root", "a", 0)).unwrap_err();
        assert!(matches!(err, WeaveError::InvalidDrop(_)));
        let err = plan_drop(&tree(), &existing("a", "a", 0)).unwrap_err();
        assert!(matches!(err, WeaveError::InvalidDrop(_)));
    }

    #[test]
    fn test_new_component_from_palette() {
        let request = DropRequest {
            item: DragItem::New(AppComponent::new("n1", ComponentType::Image)),
            target_parent: "b".into(),
            index: 99,
        };
        let patches = plan_drop(&tree(), &request).unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].0, "b");

        let duplicate = DropRequest {
            item: DragItem::New(AppComponent::new("a1", ComponentType::Image)),
            target_parent: "b".into(),
            index: 0,
        };
        assert!(plan_drop(&tree(), &duplicate).is_err());
    }

    #[test]
    fn test_drop_target_declaration() {
        let roots = tree();
        let target = drop_target_for(&roots[0]).unwrap();
        assert_eq!(target.parent_id, "root");
        assert_eq!(target.index, 3);
        assert!(target.accepts.contains(&"button".to_string()));
        assert!(drop_target_for(roots[0].find("btn").unwrap()).is_none());
    }
}
