//! Human-readable dump of an authored scene

use std::collections::BTreeSet;
use std::fmt::Write;

use aurora_core::{
    AuthoredScene, BasisConverter, Classification, NodeId, NodeKind, NodeRole, SceneGraphWalker,
    collider_kind,
};

const INDENT: &str = "    ";

/// Render the hierarchy with each node's role and the referenced textures
pub fn render_hierarchy(scene: &AuthoredScene) -> String {
    let roots = scene.root_nodes();
    let classification = SceneGraphWalker::new(scene, BasisConverter::default()).classify(&roots);

    let mut out = String::new();
    let _ = writeln!(out, "Scene '{}' ({} nodes)", scene.name, scene.len());
    for root in roots {
        render_node(scene, &classification, root, 0, &mut out);
    }

    let _ = writeln!(
        out,
        "{} exportable, {} collider markers, {} orphaned",
        classification.exportable_count(),
        classification.marker_count(),
        classification.orphans().len()
    );

    let textures: BTreeSet<String> = scene
        .nodes
        .iter()
        .filter_map(|n| n.mesh.as_ref())
        .flat_map(|m| m.materials.iter().flat_map(|s| &s.textures))
        .map(|t| {
            let source = if t.packed.is_some() { "packed" } else { "file" };
            format!("{} ({})", t.file_name(), source)
        })
        .collect();
    let _ = writeln!(out, "Textures: {}", textures.len());
    for texture in textures {
        let _ = writeln!(out, "{}{}", INDENT, texture);
    }

    out
}

fn render_node(
    scene: &AuthoredScene,
    classification: &Classification,
    id: NodeId,
    depth: usize,
    out: &mut String,
) {
    let Some(node) = scene.node(id) else {
        return;
    };

    let kind = match node.kind {
        NodeKind::Mesh => format!("{}, {} faces", node.kind.display_name(), node.face_count()),
        other => other.display_name().to_string(),
    };

    let role = match classification.role(id) {
        Some(NodeRole::Marker) => {
            let subtype = collider_kind(node).map_or("unknown", |k| k.display_name());
            match classification.owner_of(id) {
                Some(owner) => format!("collider: {} -> {}", subtype, scene[owner].name),
                None => format!("collider: {}, no owner", subtype),
            }
        }
        Some(role) => role.display_name().to_string(),
        None => "unvisited".to_string(),
    };

    let hidden = if node.hidden { " hidden" } else { "" };
    let _ = writeln!(
        out,
        "{}{} ({}){} [{}]",
        INDENT.repeat(depth),
        node.name,
        kind,
        hidden,
        role
    );

    for &child in &node.children {
        render_node(scene, classification, child, depth + 1, out);
    }
}
